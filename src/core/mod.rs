//! Core business logic module
//!
//! The column picker state machine, its capability traits and the runtime
//! that drives it.

pub mod columns;
pub mod config;
pub mod document;
pub mod file_parser;
pub mod file_source;
pub mod models;
pub mod picker;
pub mod runtime;
pub mod submitter;

#[cfg(test)]
mod picker_tests;


// Re-export commonly used types
pub use config::AppConfig;
pub use picker::ColumnPicker;
