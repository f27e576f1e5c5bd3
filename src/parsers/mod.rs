//! File parsing modules
//!
//! Header sniffing for the column picker and row parsing for previews.

pub mod csv_parser;
pub mod header_sniffer;

// Re-export commonly used parsers
pub use csv_parser::*;
pub use header_sniffer::*;
