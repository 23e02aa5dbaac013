//! S1AP Task Module
//!
//! This module implements the S1AP side of the MME. It is responsible for:
//! - Tracking eNB associations and the UE contexts they carry
//! - S1 Setup, Reset and SCTP association lifecycle
//! - NAS transport and UE context procedures
//! - E-RAB management, handover, path switch and paging
//!
//! # Architecture
//!
//! ```text
//! SCTP layer <---> S1AP Task <---> MME app
//!                     |
//!                     +--> release / clean-up timers
//! ```
//!
//! The S1AP task receives SCTP events and S1AP payloads, runs each
//! procedure against the association directory according to 3GPP TS 36.413,
//! and reports the outcome to the MME application.

mod directory;
mod dispatcher;
mod enb_context;
mod enb_procedures;
mod erab;
mod error;
pub mod events;
mod handover;
mod mme;
mod paging;
mod ta_list;
mod task;
mod ue_context;
mod ue_procedures;

pub use directory::{Directory, DirectoryError, DirectoryGuard, StateCache};
pub use dispatcher::{dispatch, dispatch_app_request, handler_for, Handler};
pub use enb_context::{EnbContext, EnbState, SupportedTa};
pub use error::S1apError;
pub use events::{AppRequest, ReleaseCause, S1apEvent};
pub use handover::{PATH_SWITCH_FAILURE_CAUSE, UNSUPPORTED_HANDOVER_CAUSE};
pub use mme::{Action, HandlerContext, Outbox, S1apMme};
pub use ta_list::{compare_ta_lists, TaMatch};
pub use task::S1apTask;
pub use ue_context::{HandoverState, ReleaseTimer, UeContext, UeState, INVALID_MME_UE_S1AP_ID};
