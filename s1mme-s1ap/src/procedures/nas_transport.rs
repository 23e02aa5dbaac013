//! NAS Transport
//!
//! 3GPP TS 36.413 Section 8.6.2: Downlink NAS Transport, Uplink NAS Transport
//! and NAS Non Delivery Indication.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{Cause, EnbUeS1apId, EutranCgi, MmeUeS1apId, TaiIe};

/// UPLINK NAS TRANSPORT (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UplinkNasTransport {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// NAS PDU
    pub nas_pdu: Bytes,
    /// Serving cell
    pub eutran_cgi: EutranCgi,
    /// Serving TAI
    pub tai: TaiIe,
}

/// DOWNLINK NAS TRANSPORT (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownlinkNasTransport {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// NAS PDU
    pub nas_pdu: Bytes,
}

/// NAS NON DELIVERY INDICATION (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NasNonDeliveryIndication {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Undelivered NAS PDU
    pub nas_pdu: Bytes,
    /// Cause
    pub cause: Cause,
}
