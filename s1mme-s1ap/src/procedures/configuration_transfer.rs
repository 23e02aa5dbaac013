//! eNB / MME Configuration Transfer
//!
//! 3GPP TS 36.413 Sections 8.15 and 8.16. The MME relays the SON
//! configuration from the source eNB to the target eNB untouched; both
//! directions share one body.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ies::TargetEnbId;

/// SON Configuration Transfer IE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonConfigurationTransfer {
    /// Target eNB
    pub target_enb_id: TargetEnbId,
    /// Source eNB
    pub source_enb_id: TargetEnbId,
    /// Opaque SON information
    pub son_information: Bytes,
}

/// ENB CONFIGURATION TRANSFER / MME CONFIGURATION TRANSFER.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationTransfer {
    /// SON configuration transfer
    pub son_configuration_transfer: Option<SonConfigurationTransfer>,
}
