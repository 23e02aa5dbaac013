//! Handover Procedures
//!
//! 3GPP TS 36.413 Sections 8.4.1 - 8.4.7: Handover Preparation, Resource
//! Allocation, Notification, Cancel and the status transfers.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{
    Cause, EnbUeS1apId, ErabItem, ErabSetupItem, ErabToBeSetupItemHoReq, EutranCgi, HandoverType,
    MmeUeS1apId, SecurityContext, TaiIe, TargetId, UeAggregateMaximumBitrate,
    UeSecurityCapabilities,
};

/// HANDOVER REQUIRED (source eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequired {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Cause
    pub cause: Cause,
    /// Target
    pub target_id: TargetId,
    /// Source to target transparent container
    pub source_to_target_transparent_container: Bytes,
}

/// HANDOVER COMMAND (MME → source eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverCommand {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Target to source transparent container
    pub target_to_source_transparent_container: Bytes,
}

/// HANDOVER PREPARATION FAILURE (MME → source eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverPreparationFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}

/// HANDOVER REQUEST (MME → target eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequest {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Cause
    pub cause: Cause,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: UeAggregateMaximumBitrate,
    /// Bearers to set up on the target
    pub e_rab_to_be_setup_list: Vec<ErabToBeSetupItemHoReq>,
    /// Source to target transparent container
    pub source_to_target_transparent_container: Bytes,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
    /// Security context
    pub security_context: SecurityContext,
}

/// HANDOVER REQUEST ACKNOWLEDGE (target eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequestAcknowledge {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Target eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Admitted bearers
    pub e_rab_admitted_list: Vec<ErabSetupItem>,
    /// Bearers that could not be admitted
    pub e_rab_failed_to_setup_list: Option<Vec<ErabItem>>,
    /// Target to source transparent container
    pub target_to_source_transparent_container: Bytes,
}

/// HANDOVER FAILURE (target eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Cause
    pub cause: Cause,
}

/// HANDOVER NOTIFY (target eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverNotify {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Target eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Target cell
    pub eutran_cgi: EutranCgi,
    /// Target TAI
    pub tai: TaiIe,
}

/// HANDOVER CANCEL (source eNB → MME).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverCancel {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}

/// HANDOVER CANCEL ACKNOWLEDGE (MME → source eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverCancelAcknowledge {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
}

/// ENB STATUS TRANSFER / MME STATUS TRANSFER. The MME relays the container
/// untouched and only rewrites the eNB UE id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransfer {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// eNB status transfer transparent container
    pub status_transfer_transparent_container: Bytes,
}
