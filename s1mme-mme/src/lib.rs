//! s1mme-mme - S1AP core of an LTE MME
//!
//! This crate terminates the S1-MME interface towards eNodeBs. It implements:
//!
//! - eNB association lifecycle (S1 Setup, Reset, SCTP shutdown and reset)
//! - UE context tracking keyed by eNB UE id and MME UE id
//! - NAS transport, initial context setup, context modification and release
//! - E-RAB setup, release and modification
//! - S1 handover, path switch and paging
//!
//! # Architecture
//!
//! The protocol core ([`S1apMme`]) is synchronous: each SCTP event, payload,
//! application request or timer expiry is run to completion against the
//! association directory. [`S1apTask`] drives it from a tokio channel and
//! turns its queued actions into channel sends and timers.
//!
//! ```text
//! ┌──────────────┐  S1apMessage   ┌───────────────────────┐  MmeAppMessage  ┌─────────┐
//! │  SCTP layer  │ ─────────────▶ │       S1AP task       │ ──────────────▶ │ MME app │
//! │              │ ◀───────────── │  S1apMme + Directory  │ ◀────────────── │         │
//! └──────────────┘  SctpMessage   └───────────┬───────────┘   AppRequest    └─────────┘
//!                                             │
//!                                  release / clean-up timers
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use s1mme_mme::{load_and_validate_mme_config, MmeTaskBase, S1apTask, Task};
//! use s1mme_mme::DEFAULT_CHANNEL_CAPACITY;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = load_and_validate_mme_config("config/mme.yaml").unwrap();
//!     let (base, s1ap_rx, sctp_rx, app_rx) = MmeTaskBase::new(config, DEFAULT_CHANNEL_CAPACITY);
//!     let mut task = S1apTask::new(base.clone(), Box::new(s1mme_s1ap::JsonCodec));
//!     tokio::spawn(async move { task.run(s1ap_rx).await });
//!     // Wire sctp_rx / app_rx to the transport and the application...
//! }
//! ```

pub mod app;
pub mod s1ap;
pub mod tasks;

// Re-export S1AP module types
pub use s1ap::{
    Action, AppRequest, Directory, DirectoryError, EnbContext, EnbState, HandoverState,
    ReleaseCause, S1apError, S1apEvent, S1apMme, S1apTask, UeContext, UeState,
};

// Re-export app module types
pub use app::{
    load_and_validate_mme_config, load_mme_config, load_mme_config_from_str, validate_mme_config,
    ConfigError, ConfigValidationError,
};

// Re-export commonly used types
pub use tasks::{
    MmeAppMessage, MmeTaskBase, S1apMessage, SctpMessage, Task, TaskHandle, TaskMessage,
    DEFAULT_CHANNEL_CAPACITY, S1AP_PPID,
};
