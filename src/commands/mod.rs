//! Command handlers
//!
//! Entry points used by the front ends. Commands are organized by concern and
//! report failures as plain strings ready to show to the user.

pub mod config;
pub mod import;
pub mod submit;

// Re-export all command functions for easy access
pub use config::*;
pub use import::*;
pub use submit::*;
