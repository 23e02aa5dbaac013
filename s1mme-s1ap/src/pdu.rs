//! S1AP PDU
//!
//! The top-level CHOICE of 3GPP TS 36.413: an initiating message, a successful
//! outcome or an unsuccessful outcome. Each carries the raw procedure code as
//! received so that out-of-range codes survive decoding and can be rejected by
//! the receiver.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::procedures::*;

/// Number of procedure codes covered by the dispatch table.
pub const PROCEDURE_CODE_COUNT: usize = 63;

/// S1AP elementary procedure codes (3GPP TS 36.413 Section 9.3.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProcedureCode {
    HandoverPreparation = 0,
    HandoverResourceAllocation = 1,
    HandoverNotification = 2,
    PathSwitchRequest = 3,
    HandoverCancel = 4,
    ErabSetup = 5,
    ErabModify = 6,
    ErabRelease = 7,
    ErabReleaseIndication = 8,
    InitialContextSetup = 9,
    Paging = 10,
    DownlinkNasTransport = 11,
    InitialUeMessage = 12,
    UplinkNasTransport = 13,
    Reset = 14,
    ErrorIndication = 15,
    NasNonDeliveryIndication = 16,
    S1Setup = 17,
    UeContextReleaseRequest = 18,
    UeContextModification = 21,
    UeCapabilityInfoIndication = 22,
    UeContextRelease = 23,
    EnbStatusTransfer = 24,
    MmeStatusTransfer = 25,
    EnbConfigurationTransfer = 40,
    MmeConfigurationTransfer = 41,
    ErabModificationIndication = 50,
}

impl ProcedureCode {
    /// Returns the wire value.
    pub const fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.value())
    }
}

/// Criticality of a PDU or IE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    #[default]
    Reject,
    Ignore,
    Notify,
}

/// Direction of an S1AP PDU, one of the three top-level CHOICE arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageDirection {
    InitiatingMessage,
    SuccessfulOutcome,
    UnsuccessfulOutcome,
}

impl MessageDirection {
    /// Index into a per-procedure handler row.
    pub const fn index(self) -> usize {
        match self {
            MessageDirection::InitiatingMessage => 0,
            MessageDirection::SuccessfulOutcome => 1,
            MessageDirection::UnsuccessfulOutcome => 2,
        }
    }
}

impl fmt::Display for MessageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageDirection::InitiatingMessage => "initiatingMessage",
            MessageDirection::SuccessfulOutcome => "successfulOutcome",
            MessageDirection::UnsuccessfulOutcome => "unsuccessfulOutcome",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// Message values
// ============================================================================

/// Body of an initiating message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatingMessageValue {
    HandoverRequired(HandoverRequired),
    HandoverRequest(HandoverRequest),
    HandoverNotify(HandoverNotify),
    PathSwitchRequest(PathSwitchRequest),
    HandoverCancel(HandoverCancel),
    ErabSetupRequest(ErabSetupRequest),
    ErabReleaseCommand(ErabReleaseCommand),
    InitialContextSetupRequest(InitialContextSetupRequest),
    Paging(Paging),
    DownlinkNasTransport(DownlinkNasTransport),
    InitialUeMessage(InitialUeMessage),
    UplinkNasTransport(UplinkNasTransport),
    Reset(Reset),
    ErrorIndication(ErrorIndication),
    NasNonDeliveryIndication(NasNonDeliveryIndication),
    S1SetupRequest(S1SetupRequest),
    UeContextReleaseRequest(UeContextReleaseRequest),
    UeContextModificationRequest(UeContextModificationRequest),
    UeCapabilityInfoIndication(UeCapabilityInfoIndication),
    UeContextReleaseCommand(UeContextReleaseCommand),
    EnbStatusTransfer(StatusTransfer),
    MmeStatusTransfer(StatusTransfer),
    EnbConfigurationTransfer(ConfigurationTransfer),
    MmeConfigurationTransfer(ConfigurationTransfer),
    ErabModificationIndication(ErabModificationIndication),
}

impl InitiatingMessageValue {
    /// Procedure this body belongs to.
    pub fn procedure_code(&self) -> ProcedureCode {
        use InitiatingMessageValue::*;
        match self {
            HandoverRequired(_) => ProcedureCode::HandoverPreparation,
            HandoverRequest(_) => ProcedureCode::HandoverResourceAllocation,
            HandoverNotify(_) => ProcedureCode::HandoverNotification,
            PathSwitchRequest(_) => ProcedureCode::PathSwitchRequest,
            HandoverCancel(_) => ProcedureCode::HandoverCancel,
            ErabSetupRequest(_) => ProcedureCode::ErabSetup,
            ErabReleaseCommand(_) => ProcedureCode::ErabRelease,
            InitialContextSetupRequest(_) => ProcedureCode::InitialContextSetup,
            Paging(_) => ProcedureCode::Paging,
            DownlinkNasTransport(_) => ProcedureCode::DownlinkNasTransport,
            InitialUeMessage(_) => ProcedureCode::InitialUeMessage,
            UplinkNasTransport(_) => ProcedureCode::UplinkNasTransport,
            Reset(_) => ProcedureCode::Reset,
            ErrorIndication(_) => ProcedureCode::ErrorIndication,
            NasNonDeliveryIndication(_) => ProcedureCode::NasNonDeliveryIndication,
            S1SetupRequest(_) => ProcedureCode::S1Setup,
            UeContextReleaseRequest(_) => ProcedureCode::UeContextReleaseRequest,
            UeContextModificationRequest(_) => ProcedureCode::UeContextModification,
            UeCapabilityInfoIndication(_) => ProcedureCode::UeCapabilityInfoIndication,
            UeContextReleaseCommand(_) => ProcedureCode::UeContextRelease,
            EnbStatusTransfer(_) => ProcedureCode::EnbStatusTransfer,
            MmeStatusTransfer(_) => ProcedureCode::MmeStatusTransfer,
            EnbConfigurationTransfer(_) => ProcedureCode::EnbConfigurationTransfer,
            MmeConfigurationTransfer(_) => ProcedureCode::MmeConfigurationTransfer,
            ErabModificationIndication(_) => ProcedureCode::ErabModificationIndication,
        }
    }

    /// Message name as used in logs.
    pub fn name(&self) -> &'static str {
        use InitiatingMessageValue::*;
        match self {
            HandoverRequired(_) => "HandoverRequired",
            HandoverRequest(_) => "HandoverRequest",
            HandoverNotify(_) => "HandoverNotify",
            PathSwitchRequest(_) => "PathSwitchRequest",
            HandoverCancel(_) => "HandoverCancel",
            ErabSetupRequest(_) => "E-RABSetupRequest",
            ErabReleaseCommand(_) => "E-RABReleaseCommand",
            InitialContextSetupRequest(_) => "InitialContextSetupRequest",
            Paging(_) => "Paging",
            DownlinkNasTransport(_) => "DownlinkNASTransport",
            InitialUeMessage(_) => "InitialUEMessage",
            UplinkNasTransport(_) => "UplinkNASTransport",
            Reset(_) => "Reset",
            ErrorIndication(_) => "ErrorIndication",
            NasNonDeliveryIndication(_) => "NASNonDeliveryIndication",
            S1SetupRequest(_) => "S1SetupRequest",
            UeContextReleaseRequest(_) => "UEContextReleaseRequest",
            UeContextModificationRequest(_) => "UEContextModificationRequest",
            UeCapabilityInfoIndication(_) => "UECapabilityInfoIndication",
            UeContextReleaseCommand(_) => "UEContextReleaseCommand",
            EnbStatusTransfer(_) => "ENBStatusTransfer",
            MmeStatusTransfer(_) => "MMEStatusTransfer",
            EnbConfigurationTransfer(_) => "ENBConfigurationTransfer",
            MmeConfigurationTransfer(_) => "MMEConfigurationTransfer",
            ErabModificationIndication(_) => "E-RABModificationIndication",
        }
    }
}

/// Body of a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessfulOutcomeValue {
    HandoverCommand(HandoverCommand),
    HandoverRequestAcknowledge(HandoverRequestAcknowledge),
    PathSwitchRequestAcknowledge(PathSwitchRequestAcknowledge),
    HandoverCancelAcknowledge(HandoverCancelAcknowledge),
    ErabSetupResponse(ErabSetupResponse),
    ErabReleaseResponse(ErabReleaseResponse),
    InitialContextSetupResponse(InitialContextSetupResponse),
    ResetAcknowledge(ResetAcknowledge),
    S1SetupResponse(S1SetupResponse),
    UeContextModificationResponse(UeContextModificationResponse),
    UeContextReleaseComplete(UeContextReleaseComplete),
    ErabModificationConfirm(ErabModificationConfirm),
}

impl SuccessfulOutcomeValue {
    /// Procedure this body belongs to.
    pub fn procedure_code(&self) -> ProcedureCode {
        use SuccessfulOutcomeValue::*;
        match self {
            HandoverCommand(_) => ProcedureCode::HandoverPreparation,
            HandoverRequestAcknowledge(_) => ProcedureCode::HandoverResourceAllocation,
            PathSwitchRequestAcknowledge(_) => ProcedureCode::PathSwitchRequest,
            HandoverCancelAcknowledge(_) => ProcedureCode::HandoverCancel,
            ErabSetupResponse(_) => ProcedureCode::ErabSetup,
            ErabReleaseResponse(_) => ProcedureCode::ErabRelease,
            InitialContextSetupResponse(_) => ProcedureCode::InitialContextSetup,
            ResetAcknowledge(_) => ProcedureCode::Reset,
            S1SetupResponse(_) => ProcedureCode::S1Setup,
            UeContextModificationResponse(_) => ProcedureCode::UeContextModification,
            UeContextReleaseComplete(_) => ProcedureCode::UeContextRelease,
            ErabModificationConfirm(_) => ProcedureCode::ErabModificationIndication,
        }
    }

    /// Message name as used in logs.
    pub fn name(&self) -> &'static str {
        use SuccessfulOutcomeValue::*;
        match self {
            HandoverCommand(_) => "HandoverCommand",
            HandoverRequestAcknowledge(_) => "HandoverRequestAcknowledge",
            PathSwitchRequestAcknowledge(_) => "PathSwitchRequestAcknowledge",
            HandoverCancelAcknowledge(_) => "HandoverCancelAcknowledge",
            ErabSetupResponse(_) => "E-RABSetupResponse",
            ErabReleaseResponse(_) => "E-RABReleaseResponse",
            InitialContextSetupResponse(_) => "InitialContextSetupResponse",
            ResetAcknowledge(_) => "ResetAcknowledge",
            S1SetupResponse(_) => "S1SetupResponse",
            UeContextModificationResponse(_) => "UEContextModificationResponse",
            UeContextReleaseComplete(_) => "UEContextReleaseComplete",
            ErabModificationConfirm(_) => "E-RABModificationConfirm",
        }
    }
}

/// Body of an unsuccessful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsuccessfulOutcomeValue {
    HandoverPreparationFailure(HandoverPreparationFailure),
    HandoverFailure(HandoverFailure),
    PathSwitchRequestFailure(PathSwitchRequestFailure),
    ErabSetupFailure(ErabSetupFailure),
    InitialContextSetupFailure(InitialContextSetupFailure),
    S1SetupFailure(S1SetupFailure),
    UeContextModificationFailure(UeContextModificationFailure),
}

impl UnsuccessfulOutcomeValue {
    /// Procedure this body belongs to.
    pub fn procedure_code(&self) -> ProcedureCode {
        use UnsuccessfulOutcomeValue::*;
        match self {
            HandoverPreparationFailure(_) => ProcedureCode::HandoverPreparation,
            HandoverFailure(_) => ProcedureCode::HandoverResourceAllocation,
            PathSwitchRequestFailure(_) => ProcedureCode::PathSwitchRequest,
            ErabSetupFailure(_) => ProcedureCode::ErabSetup,
            InitialContextSetupFailure(_) => ProcedureCode::InitialContextSetup,
            S1SetupFailure(_) => ProcedureCode::S1Setup,
            UeContextModificationFailure(_) => ProcedureCode::UeContextModification,
        }
    }

    /// Message name as used in logs.
    pub fn name(&self) -> &'static str {
        use UnsuccessfulOutcomeValue::*;
        match self {
            HandoverPreparationFailure(_) => "HandoverPreparationFailure",
            HandoverFailure(_) => "HandoverFailure",
            PathSwitchRequestFailure(_) => "PathSwitchRequestFailure",
            ErabSetupFailure(_) => "E-RABSetupFailure",
            InitialContextSetupFailure(_) => "InitialContextSetupFailure",
            S1SetupFailure(_) => "S1SetupFailure",
            UeContextModificationFailure(_) => "UEContextModificationFailure",
        }
    }
}

// ============================================================================
// PDU
// ============================================================================

/// Initiating message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiatingMessage {
    /// Procedure code as carried on the wire
    pub procedure_code: u8,
    /// Criticality
    pub criticality: Criticality,
    /// Message body
    pub value: InitiatingMessageValue,
}

/// Successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessfulOutcome {
    /// Procedure code as carried on the wire
    pub procedure_code: u8,
    /// Criticality
    pub criticality: Criticality,
    /// Message body
    pub value: SuccessfulOutcomeValue,
}

/// Unsuccessful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsuccessfulOutcome {
    /// Procedure code as carried on the wire
    pub procedure_code: u8,
    /// Criticality
    pub criticality: Criticality,
    /// Message body
    pub value: UnsuccessfulOutcomeValue,
}

/// S1AP-PDU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum S1apPdu {
    InitiatingMessage(InitiatingMessage),
    SuccessfulOutcome(SuccessfulOutcome),
    UnsuccessfulOutcome(UnsuccessfulOutcome),
}

impl S1apPdu {
    /// Wraps an initiating message body, deriving its procedure code.
    pub fn initiating(value: InitiatingMessageValue, criticality: Criticality) -> Self {
        S1apPdu::InitiatingMessage(InitiatingMessage {
            procedure_code: value.procedure_code().value(),
            criticality,
            value,
        })
    }

    /// Wraps a successful outcome body, deriving its procedure code.
    pub fn successful(value: SuccessfulOutcomeValue) -> Self {
        S1apPdu::SuccessfulOutcome(SuccessfulOutcome {
            procedure_code: value.procedure_code().value(),
            criticality: Criticality::Reject,
            value,
        })
    }

    /// Wraps an unsuccessful outcome body, deriving its procedure code.
    pub fn unsuccessful(value: UnsuccessfulOutcomeValue) -> Self {
        S1apPdu::UnsuccessfulOutcome(UnsuccessfulOutcome {
            procedure_code: value.procedure_code().value(),
            criticality: Criticality::Reject,
            value,
        })
    }

    /// Raw procedure code.
    pub fn procedure_code(&self) -> u8 {
        match self {
            S1apPdu::InitiatingMessage(m) => m.procedure_code,
            S1apPdu::SuccessfulOutcome(m) => m.procedure_code,
            S1apPdu::UnsuccessfulOutcome(m) => m.procedure_code,
        }
    }

    /// Top-level CHOICE arm.
    pub fn direction(&self) -> MessageDirection {
        match self {
            S1apPdu::InitiatingMessage(_) => MessageDirection::InitiatingMessage,
            S1apPdu::SuccessfulOutcome(_) => MessageDirection::SuccessfulOutcome,
            S1apPdu::UnsuccessfulOutcome(_) => MessageDirection::UnsuccessfulOutcome,
        }
    }

    /// Message name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            S1apPdu::InitiatingMessage(m) => m.value.name(),
            S1apPdu::SuccessfulOutcome(m) => m.value.name(),
            S1apPdu::UnsuccessfulOutcome(m) => m.value.name(),
        }
    }
}

impl From<InitiatingMessageValue> for S1apPdu {
    fn from(value: InitiatingMessageValue) -> Self {
        S1apPdu::initiating(value, Criticality::Ignore)
    }
}

impl From<SuccessfulOutcomeValue> for S1apPdu {
    fn from(value: SuccessfulOutcomeValue) -> Self {
        S1apPdu::successful(value)
    }
}

impl From<UnsuccessfulOutcomeValue> for S1apPdu {
    fn from(value: UnsuccessfulOutcomeValue) -> Self {
        S1apPdu::unsuccessful(value)
    }
}
