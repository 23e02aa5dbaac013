//! Error Indication Procedure (3GPP TS 36.413 Section 8.7.4)

use serde::{Deserialize, Serialize};

use crate::ies::{Cause, EnbUeS1apId, MmeUeS1apId};

/// ERROR INDICATION (eNB → MME). Every IE is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorIndication {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: Option<MmeUeS1apId>,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: Option<EnbUeS1apId>,
    /// Cause
    pub cause: Option<Cause>,
}
