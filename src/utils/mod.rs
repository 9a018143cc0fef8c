//! Utils module - Shared utilities and helpers
//!
//! Helpers used across the CLI, core and display layers.

/// Error conversion helpers for reqwest and terminal I/O
pub mod error_helpers;

/// `log` backend driven by the --verbose flag
pub mod logging;

/// Cell text normalisation
pub mod text;

/// Input validation for URLs, limits and timeouts
pub mod validation;
