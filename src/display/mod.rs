pub mod display_options;
pub mod progress;
pub mod table;

pub use display_options::{DisplayOptions, OutputFormat, is_stdout_tty};
pub use progress::{LoadingIndicator, ProgressSpinner};
pub use table::{TableDisplay, cell_text, column_headers, row_cells};
