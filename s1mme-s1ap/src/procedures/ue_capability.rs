//! UE Capability Info Indication (3GPP TS 36.413 Section 8.9)

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{EnbUeS1apId, MmeUeS1apId};

/// UE CAPABILITY INFO INDICATION (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeCapabilityInfoIndication {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Opaque UE radio capability
    pub ue_radio_capability: Bytes,
}
