//! S1AP procedure message bodies
//!
//! One module per elementary procedure of 3GPP TS 36.413 handled by the MME.

pub mod configuration_transfer;
pub mod erab;
pub mod error_indication;
pub mod handover;
pub mod initial_context_setup;
pub mod initial_ue_message;
pub mod nas_transport;
pub mod paging;
pub mod path_switch;
pub mod reset;
pub mod s1_setup;
pub mod ue_capability;
pub mod ue_context_modification;
pub mod ue_context_release;

pub use configuration_transfer::*;
pub use erab::*;
pub use error_indication::*;
pub use handover::*;
pub use initial_context_setup::*;
pub use initial_ue_message::*;
pub use nas_transport::*;
pub use paging::*;
pub use path_switch::*;
pub use reset::*;
pub use s1_setup::*;
pub use ue_capability::*;
pub use ue_context_modification::*;
pub use ue_context_release::*;
