//! UE Context Release Procedures
//!
//! 3GPP TS 36.413 Sections 8.3.2 (eNB initiated request) and 8.3.3 (MME
//! initiated command / complete).

use serde::{Deserialize, Serialize};

use crate::ies::{Cause, EnbUeS1apId, MmeUeS1apId, UeS1apIds};

/// UE CONTEXT RELEASE REQUEST (eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseRequest {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}

/// UE CONTEXT RELEASE COMMAND (MME → eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseCommand {
    /// UE S1AP ids
    pub ue_s1ap_ids: UeS1apIds,
    /// Cause
    pub cause: Cause,
}

/// UE CONTEXT RELEASE COMPLETE (eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextReleaseComplete {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
}
