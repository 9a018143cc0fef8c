//! Core layer - panel state machine and the services that drive it

pub mod panel;
pub mod services;
