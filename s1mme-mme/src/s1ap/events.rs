//! Messages exchanged with the MME application layer
//!
//! [`AppRequest`] is what the application asks the S1AP core to do (one
//! generator per variant); [`S1apEvent`] is what the core reports upstream.
//! Both carry identifiers rather than context references: the core
//! re-resolves every context when a request arrives.

use std::fmt;
use std::net::IpAddr;

use bytes::Bytes;

use s1mme_common::{Ecgi, Gummei, Imsi, Tai};
use s1mme_s1ap::ies::{
    Cause, CauseMisc, CauseNas, CauseRadioNetwork, CnDomain, CsFallbackIndicator, EnbUeS1apId,
    ErabItem, ErabSetupItem, ErabToBeSetupItem, ErabToBeSetupItemHoReq, HandoverType, Lai,
    MmeUeS1apId, PagingDrx, RrcEstablishmentCause, STmsi, SecurityContext,
    UeAggregateMaximumBitrate, UeAssociatedLogicalS1ConnectionItem, UePagingIdentity,
    UeSecurityCapabilities,
};

// ============================================================================
// Release cause
// ============================================================================

/// Internal reason for releasing a UE context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseCause {
    /// No cause recorded
    Invalid,
    /// UE detached
    NasDetach,
    /// Normal NAS release
    NasNormalRelease,
    /// Released by the eNB for a radio reason
    RadioEutranGeneratedReason,
    /// Initial context setup failed
    InitialContextSetupFailed,
    /// CS fallback triggered
    CsfbTriggered,
    /// UE not available for PS service
    NasUeNotAvailableForPs,
    /// Duplicate E-RAB id instances
    RadioMultipleErabId,
    /// eNB referenced an MME UE id the MME does not know
    InvalidMmeUeS1apId,
    /// Load re-balancing
    NasMmeOffloading,
    /// Implicit detach, the eNB no longer knows the UE
    ImplicitContextRelease,
    /// The owning SCTP association went away
    SctpShutdownOrReset,
    /// The owning eNB is unknown
    InvalidEnbId,
}

impl ReleaseCause {
    /// Cause sent in the UE Context Release Command, `None` for causes that
    /// never reach the eNB.
    pub fn wire_cause(self) -> Option<Cause> {
        let cause = match self {
            ReleaseCause::NasDetach => Cause::Nas(CauseNas::Detach),
            ReleaseCause::NasNormalRelease => Cause::Nas(CauseNas::Unspecified),
            ReleaseCause::RadioEutranGeneratedReason => {
                Cause::RadioNetwork(CauseRadioNetwork::ReleaseDueToEutranGeneratedReason)
            }
            ReleaseCause::InitialContextSetupFailed => {
                Cause::RadioNetwork(CauseRadioNetwork::Unspecified)
            }
            ReleaseCause::CsfbTriggered => {
                Cause::RadioNetwork(CauseRadioNetwork::CsFallbackTriggered)
            }
            ReleaseCause::NasUeNotAvailableForPs => {
                Cause::RadioNetwork(CauseRadioNetwork::UeNotAvailableForPsService)
            }
            ReleaseCause::RadioMultipleErabId => {
                Cause::RadioNetwork(CauseRadioNetwork::MultipleERabIdInstances)
            }
            ReleaseCause::InvalidMmeUeS1apId => {
                Cause::RadioNetwork(CauseRadioNetwork::UnknownMmeUeS1apId)
            }
            ReleaseCause::NasMmeOffloading => {
                Cause::RadioNetwork(CauseRadioNetwork::LoadBalancingTauRequired)
            }
            ReleaseCause::Invalid
            | ReleaseCause::ImplicitContextRelease
            | ReleaseCause::SctpShutdownOrReset
            | ReleaseCause::InvalidEnbId => return None,
        };
        Some(cause)
    }

    /// Causes for which the context is deleted without signalling the eNB.
    pub fn is_direct_removal(self) -> bool {
        matches!(
            self,
            ReleaseCause::ImplicitContextRelease
                | ReleaseCause::SctpShutdownOrReset
                | ReleaseCause::InvalidEnbId
        )
    }

    /// Internal cause for an eNB-initiated release request.
    pub fn from_release_request(cause: &Cause) -> Self {
        match cause {
            Cause::RadioNetwork(CauseRadioNetwork::UeNotAvailableForPsService) => {
                ReleaseCause::NasUeNotAvailableForPs
            }
            Cause::RadioNetwork(CauseRadioNetwork::CsFallbackTriggered) => {
                ReleaseCause::CsfbTriggered
            }
            Cause::RadioNetwork(_)
            | Cause::Transport(_)
            | Cause::Nas(_)
            | Cause::Protocol(_)
            | Cause::Misc(_) => ReleaseCause::RadioEutranGeneratedReason,
        }
    }
}

impl fmt::Display for ReleaseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

// ============================================================================
// Requests from the application layer
// ============================================================================

/// Full or partial eNB reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Whole S1 interface
    Full,
    /// Listed UE-associated connections only
    Partial,
}

/// Connection establishment confirmation, answered with an Initial Context
/// Setup Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEstablishmentCnf {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: UeAggregateMaximumBitrate,
    /// Default and dedicated bearers to set up
    pub e_rabs: Vec<ErabToBeSetupItem>,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
    /// KeNB
    pub security_key: Bytes,
    /// UE radio capability, if the MME holds one
    pub ue_radio_capability: Option<Bytes>,
    /// CS fallback indicator
    pub cs_fallback_indicator: Option<CsFallbackIndicator>,
}

/// Downlink NAS delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkNasRequest {
    /// Association recorded for the UE by the application
    pub assoc_id: u32,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// MME UE id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// NAS PDU
    pub nas_pdu: Bytes,
    /// Subscriber, recorded for log correlation
    pub imsi: Option<Imsi>,
}

/// UE Context Modification Request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeContextModificationParams {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// CS fallback indicator
    pub cs_fallback_indicator: Option<CsFallbackIndicator>,
    /// Registered LAI
    pub registered_lai: Option<Lai>,
}

/// Reset Acknowledge to send for an eNB-initiated reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnbResetAck {
    /// Association the Reset arrived on
    pub assoc_id: u32,
    /// Stream the Reset arrived on
    pub stream: u16,
    /// Reset kind
    pub kind: ResetKind,
    /// Acknowledged connections (partial reset)
    pub ues: Vec<UeAssociatedLogicalS1ConnectionItem>,
}

/// Paging request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingRequest {
    /// Paged subscriber
    pub imsi: Imsi,
    /// Page by S-TMSI when present, by IMSI otherwise
    pub s_tmsi: Option<STmsi>,
    /// CN domain
    pub cn_domain: CnDomain,
    /// Paging DRX
    pub paging_drx: Option<PagingDrx>,
    /// Tracking areas to page in
    pub tai_list: Vec<Tai>,
}

impl PagingRequest {
    /// Paging identity carried on the wire.
    pub fn paging_identity(&self) -> UePagingIdentity {
        match self.s_tmsi {
            Some(s_tmsi) => UePagingIdentity::STmsi(s_tmsi),
            None => UePagingIdentity::Imsi(self.imsi.digits().to_string()),
        }
    }
}

/// Handover Request towards the target eNB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverResourceRequest {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Target association, as resolved from the Handover Required
    pub target_assoc_id: u32,
    /// Handover type
    pub handover_type: HandoverType,
    /// Cause received in the Handover Required
    pub cause: Cause,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: UeAggregateMaximumBitrate,
    /// Bearers to set up on the target
    pub e_rabs: Vec<ErabToBeSetupItemHoReq>,
    /// Source to target transparent container
    pub source_to_target_container: Bytes,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
    /// Security context
    pub security_context: SecurityContext,
}

/// Handover Command towards the source eNB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverCommandRequest {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source association
    pub source_assoc_id: u32,
    /// Source eNB id
    pub source_enb_id: u32,
    /// Target eNB id
    pub target_enb_id: u32,
    /// eNB UE id allocated by the target
    pub target_enb_ue_s1ap_id: EnbUeS1apId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Target to source transparent container
    pub target_to_source_container: Bytes,
}

/// E-RAB Setup Request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErabSetupParams {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Bearers to set up
    pub e_rabs: Vec<ErabToBeSetupItem>,
}

/// E-RAB Release Command parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErabReleaseParams {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Bearers to release
    pub e_rab_ids: Vec<u8>,
    /// NAS PDU (deactivate bearer request)
    pub nas_pdu: Option<Bytes>,
}

/// E-RAB Modification Confirm parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErabModificationConfirmParams {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Bearers actually modified
    pub modified: Vec<u8>,
    /// Bearers that could not be modified
    pub failed: Vec<ErabItem>,
}

/// Path Switch Request Acknowledge parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSwitchAckParams {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id on the target
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE-AMBR
    pub ue_aggregate_maximum_bitrate: Option<UeAggregateMaximumBitrate>,
    /// Next hop chaining count
    pub next_hop_chaining_count: u8,
    /// Next hop parameter, when the MME has one
    pub next_hop: Option<Bytes>,
}

/// Request from the application layer to the S1AP core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRequest {
    /// MME UE id allocated for a pending UE
    MmeUeIdNotification {
        /// Association of the UE
        assoc_id: u32,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Allocated MME UE id
        mme_ue_s1ap_id: MmeUeS1apId,
    },
    /// Downlink NAS Transport
    DownlinkNas(DownlinkNasRequest),
    /// Initial Context Setup Request
    ConnectionEstablishmentCnf(ConnectionEstablishmentCnf),
    /// UE Context Modification Request
    UeContextModification(UeContextModificationParams),
    /// Release a UE context
    UeContextReleaseCommand {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Reason
        cause: ReleaseCause,
    },
    /// Reset Acknowledge
    EnbResetAck(EnbResetAck),
    /// Paging
    Paging(PagingRequest),
    /// Handover Request
    HandoverRequest(HandoverResourceRequest),
    /// Handover Command
    HandoverCommand(HandoverCommandRequest),
    /// E-RAB Setup Request
    ErabSetup(ErabSetupParams),
    /// E-RAB Release Command
    ErabRelease(ErabReleaseParams),
    /// E-RAB Modification Confirm
    ErabModificationConfirm(ErabModificationConfirmParams),
    /// Path Switch Request Acknowledge
    PathSwitchRequestAck(PathSwitchAckParams),
    /// Path Switch Request Failure
    PathSwitchRequestFailure {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id on the target
        enb_ue_s1ap_id: EnbUeS1apId,
    },
}

impl AppRequest {
    /// Request name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AppRequest::MmeUeIdNotification { .. } => "MmeUeIdNotification",
            AppRequest::DownlinkNas(_) => "DownlinkNas",
            AppRequest::ConnectionEstablishmentCnf(_) => "ConnectionEstablishmentCnf",
            AppRequest::UeContextModification(_) => "UeContextModification",
            AppRequest::UeContextReleaseCommand { .. } => "UeContextReleaseCommand",
            AppRequest::EnbResetAck(_) => "EnbResetAck",
            AppRequest::Paging(_) => "Paging",
            AppRequest::HandoverRequest(_) => "HandoverRequest",
            AppRequest::HandoverCommand(_) => "HandoverCommand",
            AppRequest::ErabSetup(_) => "ErabSetup",
            AppRequest::ErabRelease(_) => "ErabRelease",
            AppRequest::ErabModificationConfirm(_) => "ErabModificationConfirm",
            AppRequest::PathSwitchRequestAck(_) => "PathSwitchRequestAck",
            AppRequest::PathSwitchRequestFailure { .. } => "PathSwitchRequestFailure",
        }
    }
}

// ============================================================================
// Events to the application layer
// ============================================================================

/// New UE-associated signalling connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishIndication {
    /// Association
    pub assoc_id: u32,
    /// eNB id
    pub enb_id: u32,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// Initial NAS PDU
    pub nas_pdu: Bytes,
    /// Serving TAI
    pub tai: Tai,
    /// Serving cell, eNB id stamped in
    pub ecgi: Ecgi,
    /// RRC establishment cause
    pub rrc_establishment_cause: RrcEstablishmentCause,
    /// S-TMSI
    pub s_tmsi: Option<STmsi>,
    /// CSG id
    pub csg_id: Option<u32>,
    /// GUMMEI
    pub gummei: Option<Gummei>,
}

/// UE id pair reported when an eNB goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeregisteredUe {
    /// MME UE id
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
}

/// Bearer endpoint of an E-RAB Modification Indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerEndpoint {
    /// E-RAB id
    pub e_rab_id: u8,
    /// eNB S1-U address
    pub address: IpAddr,
    /// Downlink TEID
    pub teid: u32,
}

/// Handover Required, resolved to a target association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverRequiredEvent {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source eNB id
    pub source_enb_id: u32,
    /// Source association
    pub source_assoc_id: u32,
    /// Target eNB id
    pub target_enb_id: u32,
    /// Target association
    pub target_assoc_id: u32,
    /// Handover type
    pub handover_type: HandoverType,
    /// Cause
    pub cause: Cause,
    /// Source to target transparent container
    pub source_to_target_container: Bytes,
}

/// Handover Request Acknowledge from the target eNB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverRequestAckEvent {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Source association
    pub source_assoc_id: u32,
    /// Source eNB id
    pub source_enb_id: u32,
    /// Source eNB UE id
    pub source_enb_ue_s1ap_id: EnbUeS1apId,
    /// Target association
    pub target_assoc_id: u32,
    /// Target eNB id
    pub target_enb_id: u32,
    /// Target eNB UE id
    pub target_enb_ue_s1ap_id: EnbUeS1apId,
    /// Handover type
    pub handover_type: HandoverType,
    /// Target to source transparent container
    pub target_to_source_container: Bytes,
}

/// Handover completed on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoverNotifyEvent {
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Target association
    pub target_assoc_id: u32,
    /// Target eNB UE id
    pub target_enb_ue_s1ap_id: EnbUeS1apId,
    /// Target cell
    pub ecgi: Ecgi,
    /// Target TAI
    pub tai: Tai,
    /// Bearers admitted by the target
    pub admitted: Vec<ErabSetupItem>,
}

/// Path Switch Request, after the context moved to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSwitchRequestEvent {
    /// Target association
    pub assoc_id: u32,
    /// Target eNB id
    pub enb_id: u32,
    /// Target eNB UE id
    pub enb_ue_s1ap_id: EnbUeS1apId,
    /// UE
    pub mme_ue_s1ap_id: MmeUeS1apId,
    /// Bearers to switch
    pub e_rabs: Vec<ErabSetupItem>,
    /// Target cell
    pub ecgi: Ecgi,
    /// Target TAI
    pub tai: Tai,
    /// UE security capabilities
    pub ue_security_capabilities: UeSecurityCapabilities,
}

/// eNB-initiated Reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnbResetRequest {
    /// Association
    pub assoc_id: u32,
    /// Stream the Reset arrived on
    pub stream: u16,
    /// eNB id
    pub enb_id: u32,
    /// Reset kind
    pub kind: ResetKind,
    /// Connections to reset, unknown ids as `None`
    pub ues: Vec<UeAssociatedLogicalS1ConnectionItem>,
}

/// Event reported by the S1AP core to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum S1apEvent {
    /// Initial UE Message
    EstablishIndication(EstablishIndication),
    /// Uplink NAS Transport
    UplinkNas {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// NAS PDU
        nas_pdu: Bytes,
        /// Serving TAI
        tai: Tai,
        /// Serving cell
        ecgi: Ecgi,
    },
    /// NAS Non Delivery Indication
    NasNonDelivery {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Undelivered NAS PDU
        nas_pdu: Bytes,
        /// Cause
        cause: Cause,
    },
    /// UE Capability Info Indication
    UeCapabilityIndication {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// UE radio capability
        ue_radio_capability: Bytes,
    },
    /// Initial Context Setup Response
    InitialContextSetupResponse {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Bearers set up
        e_rab_setup_list: Vec<ErabSetupItem>,
        /// Bearers that failed
        e_rab_failed_list: Vec<ErabItem>,
    },
    /// Initial Context Setup Failure
    InitialContextSetupFailure {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Cause
        cause: Cause,
    },
    /// eNB asked to release a UE context
    UeContextReleaseRequest {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// eNB id
        enb_id: u32,
        /// Mapped cause
        cause: ReleaseCause,
    },
    /// UE context removed
    UeContextReleaseComplete {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// eNB id
        enb_id: u32,
    },
    /// UE Context Modification Response
    UeContextModificationResponse {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
    },
    /// UE Context Modification Failure
    UeContextModificationFailure {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Cause
        cause: Cause,
    },
    /// E-RAB Setup Response (or Failure, with an empty setup list)
    ErabSetupResponse {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Bearers set up
        e_rab_setup_list: Vec<ErabSetupItem>,
        /// Bearers that failed
        e_rab_failed_list: Vec<ErabItem>,
    },
    /// E-RAB Release Response
    ErabReleaseResponse {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Released bearers
        released: Vec<u8>,
        /// Bearers that failed to release
        failed: Vec<ErabItem>,
    },
    /// E-RAB Modification Indication
    ErabModificationIndication {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// Bearers whose downlink endpoint changed
        to_be_modified: Vec<BearerEndpoint>,
        /// Bearers left unchanged
        not_to_be_modified: Vec<BearerEndpoint>,
    },
    /// One batch of UEs orphaned by an SCTP reset or shutdown
    EnbDeregistered {
        /// eNB id, `None` if the eNB never completed S1 Setup
        enb_id: Option<u32>,
        /// Association
        assoc_id: u32,
        /// UEs in this batch
        ues: Vec<DeregisteredUe>,
    },
    /// eNB-initiated Reset
    EnbResetRequest(EnbResetRequest),
    /// Handover Required
    HandoverRequired(HandoverRequiredEvent),
    /// Handover Request Acknowledge
    HandoverRequestAck(HandoverRequestAckEvent),
    /// Handover Notify
    HandoverNotify(HandoverNotifyEvent),
    /// Path Switch Request
    PathSwitchRequest(PathSwitchRequestEvent),
    /// Uplink NAS referenced an unknown MME UE id
    RemoveStaleUeContext {
        /// eNB UE id
        enb_ue_s1ap_id: EnbUeS1apId,
        /// eNB id
        enb_id: u32,
    },
    /// SCTP delivery report of a downlink NAS message
    NasDlDataConfirm {
        /// UE
        mme_ue_s1ap_id: MmeUeS1apId,
        /// Whether the payload reached the eNB
        delivered: bool,
    },
}

impl S1apEvent {
    /// Event name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            S1apEvent::EstablishIndication(_) => "EstablishIndication",
            S1apEvent::UplinkNas { .. } => "UplinkNas",
            S1apEvent::NasNonDelivery { .. } => "NasNonDelivery",
            S1apEvent::UeCapabilityIndication { .. } => "UeCapabilityIndication",
            S1apEvent::InitialContextSetupResponse { .. } => "InitialContextSetupResponse",
            S1apEvent::InitialContextSetupFailure { .. } => "InitialContextSetupFailure",
            S1apEvent::UeContextReleaseRequest { .. } => "UeContextReleaseRequest",
            S1apEvent::UeContextReleaseComplete { .. } => "UeContextReleaseComplete",
            S1apEvent::UeContextModificationResponse { .. } => "UeContextModificationResponse",
            S1apEvent::UeContextModificationFailure { .. } => "UeContextModificationFailure",
            S1apEvent::ErabSetupResponse { .. } => "ErabSetupResponse",
            S1apEvent::ErabReleaseResponse { .. } => "ErabReleaseResponse",
            S1apEvent::ErabModificationIndication { .. } => "ErabModificationIndication",
            S1apEvent::EnbDeregistered { .. } => "EnbDeregistered",
            S1apEvent::EnbResetRequest(_) => "EnbResetRequest",
            S1apEvent::HandoverRequired(_) => "HandoverRequired",
            S1apEvent::HandoverRequestAck(_) => "HandoverRequestAck",
            S1apEvent::HandoverNotify(_) => "HandoverNotify",
            S1apEvent::PathSwitchRequest(_) => "PathSwitchRequest",
            S1apEvent::RemoveStaleUeContext { .. } => "RemoveStaleUeContext",
            S1apEvent::NasDlDataConfirm { .. } => "NasDlDataConfirm",
        }
    }
}

/// Fixed cause of E-RAB Release Command items.
pub const ERAB_RELEASE_CAUSE: Cause = Cause::RadioNetwork(CauseRadioNetwork::Unspecified);

/// Cause of an S1 Setup rejected for lack of a subscriber-data interface.
pub const S1_SETUP_HSS_DOWN_CAUSE: Cause = Cause::Misc(CauseMisc::Unspecified);
