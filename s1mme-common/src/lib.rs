//! Common types and utilities for the S1AP MME
//!
//! This crate provides the identity types, configuration structures, error
//! type and logging bootstrap shared by the protocol and MME crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{
    ErrorIndicationPolicy, MmeConfig, S1apConfig, UnsupportedHandoverPolicy,
    DEFAULT_RELEASE_TIMER_MS, DEFAULT_UE_PER_DEREGISTER_MESSAGE,
};
pub use error::Error;
pub use logging::{
    format_hex_compact, init_logging, init_logging_with_filter, log_protocol_message,
    log_s1ap_message, Direction, HexDump, LogLevel,
};
pub use types::*;
