//! E-RAB Management Procedures
//!
//! 3GPP TS 36.413 Sections 8.2.1 (E-RAB Setup), 8.2.3 (E-RAB Release) and
//! 8.2.4 (E-RAB Modification Indication).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{
    Cause, EnbUeS1apId, ErabIdItem, ErabItem, ErabModificationItem, ErabSetupItem,
    ErabToBeSetupItem, MmeUeS1apId, UeAggregateMaximumBitrate,
};

/// E-RAB SETUP REQUEST (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabSetupRequest {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Bearers to set up
    pub e_rab_to_be_setup_list: Vec<ErabToBeSetupItem>,
}

/// E-RAB SETUP RESPONSE (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabSetupResponse {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers set up
    pub e_rab_setup_list: Option<Vec<ErabSetupItem>>,
    /// Bearers that failed
    pub e_rab_failed_to_setup_list: Option<Vec<ErabItem>>,
}

/// Unsuccessful outcome of E-RAB Setup: every listed bearer failed with the
/// same cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabSetupFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers of the failed request
    pub e_rab_ids: Vec<u8>,
    /// Cause
    pub cause: Cause,
}

/// E-RAB RELEASE COMMAND (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabReleaseCommand {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Bearers to release
    pub e_rab_to_be_released_list: Vec<ErabItem>,
    /// NAS PDU
    pub nas_pdu: Option<Bytes>,
}

/// E-RAB RELEASE RESPONSE (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabReleaseResponse {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Released bearers
    pub e_rab_release_list: Option<Vec<ErabIdItem>>,
    /// Bearers that failed to release
    pub e_rab_failed_to_release_list: Option<Vec<ErabItem>>,
}

/// E-RAB MODIFICATION INDICATION (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabModificationIndication {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers whose downlink endpoint changed
    pub e_rab_to_be_modified_list: Vec<ErabModificationItem>,
    /// Bearers left unchanged
    pub e_rab_not_to_be_modified_list: Option<Vec<ErabModificationItem>>,
}

/// E-RAB MODIFICATION CONFIRM (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabModificationConfirm {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Modified bearers
    pub e_rab_modify_list: Option<Vec<ErabIdItem>>,
    /// Bearers that could not be modified
    pub e_rab_failed_to_modify_list: Option<Vec<ErabItem>>,
}
