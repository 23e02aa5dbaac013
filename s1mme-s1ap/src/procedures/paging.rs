//! Paging Procedure (3GPP TS 36.413 Section 8.5)

use serde::{Deserialize, Serialize};

use crate::ies::{CnDomain, PagingDrx, TaiIe, UePagingIdentity};

/// Modulus of the UE identity index value (TS 36.304: IMSI mod 1024).
pub const UE_IDENTITY_INDEX_MODULUS: u64 = 1024;

/// PAGING (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// UE identity index value (10 bits)
    pub ue_identity_index_value: u16,
    /// Paging identity
    pub ue_paging_id: UePagingIdentity,
    /// Paging DRX
    pub paging_drx: Option<PagingDrx>,
    /// CN domain
    pub cn_domain: CnDomain,
    /// Tracking areas to page in
    pub tai_list: Vec<TaiIe>,
}
