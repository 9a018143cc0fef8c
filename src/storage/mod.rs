//! Storage layer for oda-cli
//!
//! Handles the TOML configuration file and its profiles.

use crate::error::StorageError;

pub mod config;

type Result<T> = std::result::Result<T, StorageError>;
