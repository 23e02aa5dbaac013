//! Path Switch Request Procedure (3GPP TS 36.413 Section 8.4.4)

use serde::{Deserialize, Serialize};

use crate::ies::{
    Cause, EnbUeS1apId, ErabSetupItem, EutranCgi, MmeUeS1apId, SecurityContext, TaiIe,
    UeAggregateMaximumBitrate, UeSecurityCapabilities,
};

/// PATH SWITCH REQUEST (target eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSwitchRequest {
    /// Target eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers to switch in downlink
    pub e_rab_to_be_switched_dl_list: Vec<ErabSetupItem>,
    /// MME UE S1AP id allocated for the source connection
    pub source_mme_ue_s1ap_id: MmeUeS1apId,
    /// Target cell
    pub eutran_cgi: EutranCgi,
    /// Target TAI
    pub tai: TaiIe,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
}

impl PathSwitchRequest {
    /// True when a multi-item to-be-switched list reports the same bearer id
    /// in every item.
    pub fn all_erab_ids_same(&self) -> bool {
        match self.e_rab_to_be_switched_dl_list.split_first() {
            Some((first, rest)) if !rest.is_empty() => {
                rest.iter().all(|item| item.e_rab_id == first.e_rab_id)
            }
            _ => false,
        }
    }
}

/// PATH SWITCH REQUEST ACKNOWLEDGE (MME → target eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSwitchRequestAcknowledge {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Bearers switched in uplink
    pub e_rab_to_be_switched_ul_list: Option<Vec<ErabSetupItem>>,
    /// Security context
    pub security_context: SecurityContext,
}

/// PATH SWITCH REQUEST FAILURE (MME → target eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSwitchRequestFailure {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Cause
    pub cause: Cause,
}
