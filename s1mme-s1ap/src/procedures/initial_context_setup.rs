//! Initial Context Setup Procedure
//!
//! 3GPP TS 36.413 Section 8.3.1. Establishes the UE context in the eNB,
//! including the default bearer and the AS security key.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{
    Cause, CsFallbackIndicator, EnbUeS1apId, ErabItem, ErabSetupItem, ErabToBeSetupItem,
    MmeUeS1apId, UeAggregateMaximumBitrate, UeSecurityCapabilities,
};

/// INITIAL CONTEXT SETUP REQUEST (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupRequest {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: UeAggregateMaximumBitrate,
    /// Bearers to set up
    pub e_rab_to_be_setup_list: Vec<ErabToBeSetupItem>,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
    /// KeNB (32 octets)
    pub security_key: Bytes,
    /// UE radio capability
    pub ue_radio_capability: Option<Bytes>,
    /// CS fallback indicator
    pub cs_fallback_indicator: Option<CsFallbackIndicator>,
}

/// INITIAL CONTEXT SETUP RESPONSE (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupResponse {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers set up
    pub e_rab_setup_list: Vec<ErabSetupItem>,
    /// Bearers that failed
    pub e_rab_failed_to_setup_list: Option<Vec<ErabItem>>,
}

/// INITIAL CONTEXT SETUP FAILURE (eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialContextSetupFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}
