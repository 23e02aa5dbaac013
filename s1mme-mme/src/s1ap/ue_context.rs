//! UE Context Management for S1AP
//!
//! Each UE-associated S1 signalling connection has a context that tracks:
//! - The S1AP id pair (eNB UE id, MME UE id)
//! - The owning association and the SCTP stream pair
//! - The UE state machine
//! - The release guard timer
//! - Handover sub-state while a handover is prepared

use std::fmt;

use serde::{Deserialize, Serialize};

use s1mme_s1ap::ies::{EnbUeS1apId, ErabSetupItem, MmeUeS1apId};

/// MME UE id value meaning "not allocated yet".
pub const INVALID_MME_UE_S1AP_ID: MmeUeS1apId = MmeUeS1apId(0);

/// UE state within S1AP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UeState {
    /// Initial UE Message received, waiting for the context setup
    #[default]
    WaitingInitialContextResponse,
    /// Handover Command sent to the source eNB
    HandoverInProgress,
    /// Context established
    Connected,
    /// Release Command sent, waiting for Release Complete
    WaitingContextReleaseComplete,
}

impl UeState {
    /// Whether the state machine allows `self -> next`.
    ///
    /// `WaitingInitialContextResponse` is only entered at creation.
    pub fn can_transition_to(self, next: UeState) -> bool {
        match next {
            UeState::WaitingContextReleaseComplete => true,
            UeState::Connected => matches!(
                self,
                UeState::WaitingInitialContextResponse
                    | UeState::HandoverInProgress
                    | UeState::Connected
            ),
            UeState::HandoverInProgress => self == UeState::Connected,
            UeState::WaitingInitialContextResponse => false,
        }
    }
}

impl fmt::Display for UeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UeState::WaitingInitialContextResponse => write!(f, "WaitingInitialContextResponse"),
            UeState::HandoverInProgress => write!(f, "HandoverInProgress"),
            UeState::Connected => write!(f, "Connected"),
            UeState::WaitingContextReleaseComplete => write!(f, "WaitingContextReleaseComplete"),
        }
    }
}

/// Release guard timer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReleaseTimer {
    /// Running timer, `None` when not armed
    pub id: Option<u64>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Handover sub-state, present from Handover Request until Notify,
/// Cancel or Failure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoverState {
    /// Source eNB id
    pub source_enb_id: u32,
    /// Target eNB id
    pub target_enb_id: u32,
    /// eNB UE id on the source
    pub source_enb_ue_s1ap_id: Option<EnbUeS1apId>,
    /// eNB UE id allocated by the target
    pub target_enb_ue_s1ap_id: Option<EnbUeS1apId>,
    /// Source receive stream
    pub source_sctp_stream_recv: u16,
    /// Source send stream
    pub source_sctp_stream_send: u16,
    /// Target receive stream
    pub target_sctp_stream_recv: u16,
    /// Target send stream
    pub target_sctp_stream_send: u16,
    /// Bearers admitted by the target
    pub e_rab_admitted_list: Vec<ErabSetupItem>,
}

/// S1AP UE context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContext {
    /// eNB UE S1AP id (24 bits)
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// MME UE S1AP id, once the application layer allocated one
    pub mme_ue_s1ap_id: Option<MmeUeS1apId>,
    /// Owning association
    pub sctp_assoc_id: u32,
    /// Current state
    pub state: UeState,
    /// Stream the UE's messages arrive on
    pub sctp_stream_recv: u16,
    /// Stream used towards the eNB for this UE
    pub sctp_stream_send: u16,
    /// Release guard timer
    pub release_timer: ReleaseTimer,
    /// Handover sub-state
    pub handover: Option<HandoverState>,
}

impl UeContext {
    /// Creates a UE context in `WaitingInitialContextResponse`
    pub fn new(
        sctp_assoc_id: u32,
        enb_ue_s1ap_id: EnbUeS1apId,
        sctp_stream_recv: u16,
        sctp_stream_send: u16,
        release_timer_ms: u64,
    ) -> Self {
        Self {
            enb_ue_s1ap_id,
            mme_ue_s1ap_id: None,
            sctp_assoc_id,
            state: UeState::WaitingInitialContextResponse,
            sctp_stream_recv,
            sctp_stream_send,
            release_timer: ReleaseTimer {
                id: None,
                duration_ms: release_timer_ms,
            },
            handover: None,
        }
    }

    /// MME UE id, or the invalid sentinel when none is bound yet
    pub fn mme_id_or_invalid(&self) -> MmeUeS1apId {
        self.mme_ue_s1ap_id.unwrap_or(INVALID_MME_UE_S1AP_ID)
    }

    /// Moves to `next` if the state machine allows it.
    ///
    /// Returns false and leaves the state untouched otherwise.
    pub fn transition(&mut self, next: UeState) -> bool {
        if self.state.can_transition_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    /// Handover sub-state, created empty on first use
    pub fn handover_mut(&mut self) -> &mut HandoverState {
        self.handover.get_or_insert_with(HandoverState::default)
    }

    /// Leaves `HandoverInProgress` and drops the handover sub-state.
    ///
    /// Returns false (nothing changed) if no handover was in progress.
    pub fn abort_handover(&mut self) -> bool {
        if self.state != UeState::HandoverInProgress {
            return false;
        }
        self.state = UeState::Connected;
        self.handover = None;
        true
    }

    /// True when `(enb_id, enb_ue_s1ap_id)` is this UE's pre-handover
    /// connection on the source eNB.
    pub fn matches_handover_source(&self, enb_id: u32, enb_ue_s1ap_id: EnbUeS1apId) -> bool {
        self.handover.as_ref().is_some_and(|ho| {
            ho.source_enb_id == enb_id && ho.source_enb_ue_s1ap_id == Some(enb_ue_s1ap_id)
        })
    }
}
