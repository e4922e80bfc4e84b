//! Utility functions for console output formatting.

pub mod format;

pub use format::{format_count, format_currency, truncate_string};
