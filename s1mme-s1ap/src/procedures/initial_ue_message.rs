//! Initial UE Message
//!
//! 3GPP TS 36.413 Section 8.6.2.1. First message of a UE-associated
//! signalling connection; carries the initial NAS PDU.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::{EnbUeS1apId, EutranCgi, GummeiIe, RrcEstablishmentCause, STmsi, TaiIe};

/// INITIAL UE MESSAGE (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialUeMessage {
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// NAS PDU
    pub nas_pdu: Bytes,
    /// Serving TAI
    pub tai: TaiIe,
    /// Serving cell
    pub eutran_cgi: EutranCgi,
    /// RRC establishment cause
    pub rrc_establishment_cause: RrcEstablishmentCause,
    /// S-TMSI
    pub s_tmsi: Option<STmsi>,
    /// CSG id (27 bits)
    pub csg_id: Option<u32>,
    /// GUMMEI
    pub gummei: Option<GummeiIe>,
}
