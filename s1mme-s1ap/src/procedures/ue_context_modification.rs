//! UE Context Modification Procedure (3GPP TS 36.413 Section 8.3.4)

use serde::{Deserialize, Serialize};

use crate::ies::{
    Cause, CsFallbackIndicator, EnbUeS1apId, Lai, MmeUeS1apId, UeAggregateMaximumBitrate,
};

/// UE CONTEXT MODIFICATION REQUEST (MME → eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationRequest {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// CS fallback indicator
    pub cs_fallback_indicator: Option<CsFallbackIndicator>,
    /// Registered LAI
    pub registered_lai: Option<Lai>,
}

/// UE CONTEXT MODIFICATION RESPONSE (eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationResponse {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
}

/// UE CONTEXT MODIFICATION FAILURE (eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeContextModificationFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}
