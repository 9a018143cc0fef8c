pub mod config_service;
pub mod query_service;
pub mod traits;

pub use config_service::{ConfigService, EffectiveSettings};
pub use query_service::{FetchOutcome, QueryService};
pub use traits::QueryBackend;
