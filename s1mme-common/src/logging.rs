//! Logging bootstrap and protocol trace helpers
//!
//! Everything in the MME logs through `tracing`. This module installs the
//! subscriber and offers a few helpers so S1AP traffic is traced in a single
//! consistent shape: one `debug!` line per PDU with structured fields, and a
//! `trace!` hex dump of the encoded bytes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Installs the global tracing subscriber at the given level.
///
/// `RUST_LOG` takes precedence when set. Calling this twice is harmless; the
/// second installation attempt is ignored.
///
/// # Example
///
/// ```
/// use s1mme_common::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) {
    init_logging_with_filter(&level.to_string());
}

/// Installs the global tracing subscriber with a directive string such as
/// `"info,s1mme_mme::s1ap=debug"`.
pub fn init_logging_with_filter(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}

/// Protocol direction for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Received from the eNB
    Rx,
    /// Sent to the eNB
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => write!(f, "RX"),
            Direction::Tx => write!(f, "TX"),
        }
    }
}

/// Logs one protocol message at debug level and its payload at trace level.
///
/// ```
/// use s1mme_common::logging::{log_protocol_message, Direction};
///
/// log_protocol_message("S1AP", Direction::Rx, "S1SetupRequest", 7, &[0x00, 0x11]);
/// ```
pub fn log_protocol_message(
    protocol: &str,
    direction: Direction,
    msg_type: &str,
    assoc_id: u32,
    data: &[u8],
) {
    tracing::debug!(
        protocol = protocol,
        direction = %direction,
        msg_type = msg_type,
        assoc_id = assoc_id,
        len = data.len(),
        "{} {} {}",
        direction,
        protocol,
        msg_type
    );
    tracing::trace!(protocol = protocol, hex = %HexDump(data), "{} payload", protocol);
}

/// Logs an S1AP PDU exchanged on an SCTP association.
pub fn log_s1ap_message(direction: Direction, msg_type: &str, assoc_id: u32, data: &[u8]) {
    log_protocol_message("S1AP", direction, msg_type, assoc_id, data);
}

/// Wrapper for hex dump formatting
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Formats bytes as hex, grouped by `group_size` bytes (0 disables grouping).
///
/// ```
/// use s1mme_common::logging::format_hex_compact;
///
/// assert_eq!(format_hex_compact(&[0x12, 0x34, 0x56, 0x78], 2), "1234 5678");
/// ```
pub fn format_hex_compact(data: &[u8], group_size: usize) -> String {
    if group_size == 0 {
        return hex::encode(data);
    }

    data.chunks(group_size)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(" ")
}
