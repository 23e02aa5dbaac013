//! S1 Setup Procedure
//!
//! 3GPP TS 36.413 Section 8.7.3. Exchanges the application-level data the eNB
//! and the MME need to interoperate on the S1 interface.

use serde::{Deserialize, Serialize};

use s1mme_common::Gummei;

use crate::ies::{Cause, GlobalEnbId, PagingDrx, PlmnIdentity, ServedGummeiItem, SupportedTaItem, TimeToWait};

/// Maximum broadcast PLMNs per supported TA item.
pub const MAX_BROADCAST_PLMNS: usize = 6;

/// Maximum supported TA items per S1 Setup Request.
pub const MAX_SUPPORTED_TAS: usize = 256;

/// S1 SETUP REQUEST (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S1SetupRequest {
    /// Global eNB id
    pub global_enb_id: GlobalEnbId,
    /// eNB name
    pub enb_name: Option<String>,
    /// Supported tracking areas
    pub supported_tas: Vec<SupportedTaItem>,
    /// Default paging DRX
    pub default_paging_drx: PagingDrx,
}

/// S1 SETUP RESPONSE (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S1SetupResponse {
    /// MME name
    pub mme_name: Option<String>,
    /// Served GUMMEIs
    pub served_gummeis: Vec<ServedGummeiItem>,
    /// Relative MME capacity
    pub relative_mme_capacity: u8,
}

impl S1SetupResponse {
    /// Builds the response from the configured GUMMEI list.
    ///
    /// All configured GUMMEIs are folded into one served-GUMMEI item; PLMN,
    /// group id and code entries are each deduplicated in configuration order.
    pub fn from_gummeis(
        mme_name: Option<String>,
        gummeis: &[Gummei],
        relative_mme_capacity: u8,
    ) -> Self {
        let mut item = ServedGummeiItem {
            served_plmns: Vec::new(),
            served_group_ids: Vec::new(),
            served_mmecs: Vec::new(),
        };
        for gummei in gummeis {
            let plmn = PlmnIdentity::from(gummei.plmn);
            if !item.served_plmns.contains(&plmn) {
                item.served_plmns.push(plmn);
            }
            if !item.served_group_ids.contains(&gummei.mme_gid) {
                item.served_group_ids.push(gummei.mme_gid);
            }
            if !item.served_mmecs.contains(&gummei.mme_code) {
                item.served_mmecs.push(gummei.mme_code);
            }
        }
        Self {
            mme_name,
            served_gummeis: vec![item],
            relative_mme_capacity,
        }
    }
}

/// S1 SETUP FAILURE (MME → eNB).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct S1SetupFailure {
    /// Cause
    pub cause: Cause,
    /// Wait hint before retrying
    pub time_to_wait: Option<TimeToWait>,
}
