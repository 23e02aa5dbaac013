//! Error types shared across the MME crates

use thiserror::Error;

/// Errors raised by the shared value types and configuration helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A value does not fit the width allowed by 3GPP TS 36.413.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Malformed octets for a fixed-size identity (PLMN, TAC, cell id).
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}
