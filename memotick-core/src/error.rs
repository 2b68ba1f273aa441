//! Error types for memotick operations.
//!
//! Errors are reserved for precondition and configuration violations; no
//! hot-path operation returns `Result`.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: &'static str,
        value: u64,
        reason: &'static str,
    },

    #[error("Incompatible options: {option_a} and {option_b} - {reason}")]
    IncompatibleOptions {
        option_a: &'static str,
        option_b: &'static str,
        reason: &'static str,
    },
}
