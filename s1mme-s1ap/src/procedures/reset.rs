//! Reset Procedure
//!
//! 3GPP TS 36.413 Section 8.7.1. Only the eNB-initiated direction is handled.

use serde::{Deserialize, Serialize};

use crate::ies::{Cause, UeAssociatedLogicalS1ConnectionItem};

/// Reset type CHOICE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetType {
    /// Reset of the whole S1 interface
    S1Interface,
    /// Reset of the listed UE-associated connections
    PartOfS1Interface(Vec<UeAssociatedLogicalS1ConnectionItem>),
}

/// RESET (eNB → MME).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reset {
    /// Cause
    pub cause: Cause,
    /// Full or partial reset
    pub reset_type: ResetType,
}

/// RESET ACKNOWLEDGE (MME → eNB).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResetAcknowledge {
    /// Acknowledged connections, present for a partial reset
    pub ue_associated_logical_s1_connections: Option<Vec<UeAssociatedLogicalS1ConnectionItem>>,
}
