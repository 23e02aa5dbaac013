//! S1AP information elements
//!
//! Typed counterparts of the 3GPP TS 36.413 IEs exchanged by the MME. Bit
//! strings that carry packed identities (eNB id, cell id) keep their wire
//! form here and are unpacked through one decode function per encoding.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use s1mme_common::{Ecgi, Gummei, Plmn, Tai};

/// Errors raised while interpreting an IE value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IeError {
    /// Transport layer address is neither 4 (IPv4) nor 16 (IPv6) octets
    #[error("Unsupported transport layer address length: {0}")]
    InvalidTransportLayerAddress(usize),

    /// eNB id does not fit the width of its encoding
    #[error("eNB id {id:#x} exceeds {bits} bits")]
    EnbIdOutOfRange {
        /// Offending id
        id: u32,
        /// Allowed width
        bits: u8,
    },
}

// ============================================================================
// UE identifiers
// ============================================================================

/// Mask applied to every eNB UE S1AP id; the IE is 24 bits wide.
pub const ENB_UE_S1AP_ID_MASK: u32 = 0x00FF_FFFF;

/// eNB-assigned UE id (24 bits, TS 36.413 9.2.3.4).
///
/// Construction masks the value, so ids decoded from the wire are always in
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct EnbUeS1apId(u32);

impl EnbUeS1apId {
    /// Creates an id from a raw value, keeping the low 24 bits.
    pub const fn new(raw: u32) -> Self {
        Self(raw & ENB_UE_S1AP_ID_MASK)
    }

    /// Raw value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for EnbUeS1apId {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}

impl From<EnbUeS1apId> for u32 {
    fn from(id: EnbUeS1apId) -> Self {
        id.0
    }
}

impl fmt::Display for EnbUeS1apId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

/// MME-assigned UE id (32 bits, TS 36.413 9.2.3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MmeUeS1apId(pub u32);

impl MmeUeS1apId {
    /// Raw value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for MmeUeS1apId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MmeUeS1apId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// UE-S1AP-IDs CHOICE of the UE Context Release Command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UeS1apIds {
    /// Both ids known
    Pair {
        /// MME UE S1AP id
        mme_ue_s1ap_id: MmeUeS1apId,
        /// eNB UE S1AP id
        enb_ue_s1ap_id: EnbUeS1apId,
    },
    /// Only the MME id
    MmeUeS1apId(MmeUeS1apId),
}

impl UeS1apIds {
    /// MME id carried by either alternative.
    pub fn mme_ue_s1ap_id(&self) -> MmeUeS1apId {
        match self {
            UeS1apIds::Pair { mme_ue_s1ap_id, .. } => *mme_ue_s1ap_id,
            UeS1apIds::MmeUeS1apId(id) => *id,
        }
    }
}

// ============================================================================
// eNB identity
// ============================================================================

/// Largest macro eNB id (20 bits).
pub const MAX_MACRO_ENB_ID: u32 = 0x000F_FFFF;

/// Largest home eNB id (28 bits).
pub const MAX_HOME_ENB_ID: u32 = 0x0FFF_FFFF;

/// Decodes a 20-bit macro eNB id from its 3-octet bit string.
pub fn decode_macro_enb_id(bits: [u8; 3]) -> u32 {
    (u32::from(bits[0]) << 12) + (u32::from(bits[1]) << 4) + ((u32::from(bits[2]) & 0xf0) >> 4)
}

/// Decodes a 28-bit home eNB id from its 4-octet bit string.
pub fn decode_home_enb_id(bits: [u8; 4]) -> u32 {
    (u32::from(bits[0]) << 20)
        + (u32::from(bits[1]) << 12)
        + (u32::from(bits[2]) << 4)
        + ((u32::from(bits[3]) & 0xf0) >> 4)
}

/// ENB-ID CHOICE: macro (20-bit) or home (28-bit) bit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnbIdChoice {
    /// Macro eNB id, 20 bits left-aligned in 3 octets
    Macro([u8; 3]),
    /// Home eNB id, 28 bits left-aligned in 4 octets
    Home([u8; 4]),
}

impl EnbIdChoice {
    /// Encodes a macro eNB id.
    pub fn macro_enb(id: u32) -> Result<Self, IeError> {
        if id > MAX_MACRO_ENB_ID {
            return Err(IeError::EnbIdOutOfRange { id, bits: 20 });
        }
        let shifted = id << 4;
        Ok(EnbIdChoice::Macro([
            (shifted >> 16) as u8,
            (shifted >> 8) as u8,
            shifted as u8,
        ]))
    }

    /// Encodes a home eNB id.
    pub fn home_enb(id: u32) -> Result<Self, IeError> {
        if id > MAX_HOME_ENB_ID {
            return Err(IeError::EnbIdOutOfRange { id, bits: 28 });
        }
        Ok(EnbIdChoice::Home((id << 4).to_be_bytes()))
    }

    /// Numeric eNB id.
    pub fn enb_id(&self) -> u32 {
        match self {
            EnbIdChoice::Macro(bits) => decode_macro_enb_id(*bits),
            EnbIdChoice::Home(bits) => decode_home_enb_id(*bits),
        }
    }

    /// True for the 28-bit home encoding.
    pub fn is_home(&self) -> bool {
        matches!(self, EnbIdChoice::Home(_))
    }
}

/// PLMN identity as carried on the wire (3 TBCD octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlmnIdentity(pub [u8; 3]);

impl PlmnIdentity {
    /// Decoded PLMN.
    pub fn plmn(&self) -> Plmn {
        Plmn::decode(self.0)
    }
}

impl From<Plmn> for PlmnIdentity {
    fn from(plmn: Plmn) -> Self {
        Self(plmn.encode())
    }
}

/// Global eNB ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalEnbId {
    /// PLMN of the eNB
    pub plmn_identity: PlmnIdentity,
    /// Macro or home eNB id
    pub enb_id: EnbIdChoice,
}

// ============================================================================
// Location
// ============================================================================

/// TAI as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaiIe {
    /// PLMN identity
    pub plmn_identity: PlmnIdentity,
    /// Tracking area code
    pub tac: u16,
}

impl TaiIe {
    /// Decoded TAI.
    pub fn tai(&self) -> Tai {
        Tai::new(self.plmn_identity.plmn(), self.tac)
    }
}

impl From<Tai> for TaiIe {
    fn from(tai: Tai) -> Self {
        Self {
            plmn_identity: tai.plmn.into(),
            tac: tai.tac,
        }
    }
}

/// EUTRAN-CGI as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EutranCgi {
    /// PLMN identity
    pub plmn_identity: PlmnIdentity,
    /// 28-bit cell identity left-aligned in 4 octets
    pub cell_id: [u8; 4],
}

impl EutranCgi {
    /// Decoded ECGI.
    pub fn ecgi(&self) -> Ecgi {
        Ecgi {
            plmn: self.plmn_identity.plmn(),
            cell_identity: Ecgi::cell_identity_from_bits(self.cell_id),
        }
    }
}

impl From<Ecgi> for EutranCgi {
    fn from(ecgi: Ecgi) -> Self {
        Self {
            plmn_identity: ecgi.plmn.into(),
            cell_id: ecgi.cell_identity_bits(),
        }
    }
}

/// GUMMEI as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GummeiIe {
    /// PLMN identity
    pub plmn_identity: PlmnIdentity,
    /// MME group id
    pub mme_group_id: u16,
    /// MME code
    pub mme_code: u8,
}

impl GummeiIe {
    /// Decoded GUMMEI.
    pub fn gummei(&self) -> Gummei {
        Gummei::new(self.plmn_identity.plmn(), self.mme_group_id, self.mme_code)
    }
}

/// Location area identity (CS fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lai {
    /// PLMN identity
    pub plmn_identity: PlmnIdentity,
    /// Location area code
    pub lac: u16,
}

/// Supported TA item of the S1 Setup Request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedTaItem {
    /// Tracking area code
    pub tac: u16,
    /// PLMNs broadcast in this tracking area
    pub broadcast_plmns: Vec<PlmnIdentity>,
}

/// Served GUMMEI item of the S1 Setup Response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedGummeiItem {
    /// Served PLMNs
    pub served_plmns: Vec<PlmnIdentity>,
    /// Served MME group ids
    pub served_group_ids: Vec<u16>,
    /// Served MME codes
    pub served_mmecs: Vec<u8>,
}

/// Default paging DRX cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingDrx {
    /// 32 radio frames
    V32,
    /// 64 radio frames
    V64,
    /// 128 radio frames
    #[default]
    V128,
    /// 256 radio frames
    V256,
}

/// Wait hint for S1 Setup Failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeToWait {
    /// 1 second
    V1s,
    /// 2 seconds
    V2s,
    /// 5 seconds
    V5s,
    /// 10 seconds
    V10s,
    /// 20 seconds
    V20s,
    /// 60 seconds
    V60s,
}

// ============================================================================
// Cause
// ============================================================================

/// Cause IE (TS 36.413 9.2.1.3).
///
/// Every use site matches the group exhaustively; a cause group that does not
/// exist fails at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cause {
    /// Radio network layer cause
    RadioNetwork(CauseRadioNetwork),
    /// Transport layer cause
    Transport(CauseTransport),
    /// NAS cause
    Nas(CauseNas),
    /// Protocol cause
    Protocol(CauseProtocol),
    /// Miscellaneous cause
    Misc(CauseMisc),
}

impl Cause {
    /// Name of the cause group.
    pub fn group(&self) -> &'static str {
        match self {
            Cause::RadioNetwork(_) => "radio_network",
            Cause::Transport(_) => "transport",
            Cause::Nas(_) => "nas",
            Cause::Protocol(_) => "protocol",
            Cause::Misc(_) => "misc",
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::RadioNetwork(v) => write!(f, "radio_network/{v:?}"),
            Cause::Transport(v) => write!(f, "transport/{v:?}"),
            Cause::Nas(v) => write!(f, "nas/{v:?}"),
            Cause::Protocol(v) => write!(f, "protocol/{v:?}"),
            Cause::Misc(v) => write!(f, "misc/{v:?}"),
        }
    }
}

/// Radio network layer cause values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseRadioNetwork {
    Unspecified,
    Tx2RelocOverallExpiry,
    SuccessfulHandover,
    ReleaseDueToEutranGeneratedReason,
    HandoverCancelled,
    PartialHandover,
    HoFailureInTargetEpcEnbOrTargetSystem,
    HoTargetNotAllowed,
    Ts1RelocOverallExpiry,
    Ts1RelocPrepExpiry,
    CellNotAvailable,
    UnknownTargetId,
    NoRadioResourcesAvailableInTargetCell,
    UnknownMmeUeS1apId,
    UnknownEnbUeS1apId,
    UnknownPairUeS1apId,
    HandoverDesirableForRadioReason,
    TimeCriticalHandover,
    ResourceOptimisationHandover,
    ReduceLoadInServingCell,
    UserInactivity,
    RadioConnectionWithUeLost,
    LoadBalancingTauRequired,
    CsFallbackTriggered,
    UeNotAvailableForPsService,
    RadioResourcesNotAvailable,
    FailureInRadioInterfaceProcedure,
    InvalidQosCombination,
    InterRatRedirection,
    InteractionWithOtherProcedure,
    UnknownERabId,
    MultipleERabIdInstances,
    EncryptionAndOrIntegrityProtectionAlgorithmsNotSupported,
    S1IntraSystemHandoverTriggered,
    S1InterSystemHandoverTriggered,
    X2HandoverTriggered,
}

/// Transport layer cause values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseTransport {
    TransportResourceUnavailable,
    Unspecified,
}

/// NAS cause values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseNas {
    NormalRelease,
    AuthenticationFailure,
    Detach,
    Unspecified,
    CsgSubscriptionExpiry,
}

/// Protocol cause values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseProtocol {
    TransferSyntaxError,
    AbstractSyntaxErrorReject,
    AbstractSyntaxErrorIgnoreAndNotify,
    MessageNotCompatibleWithReceiverState,
    SemanticError,
    AbstractSyntaxErrorFalselyConstructedMessage,
    Unspecified,
}

/// Miscellaneous cause values.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CauseMisc {
    ControlProcessingOverload,
    NotEnoughUserPlaneProcessingResources,
    HardwareFailure,
    OmIntervention,
    Unspecified,
    UnknownPlmn,
}

// ============================================================================
// Bearers
// ============================================================================

/// Transport layer address bit string (IPv4 or IPv6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportLayerAddress(pub Bytes);

impl TransportLayerAddress {
    /// Interprets the address by length: 4 octets IPv4, 16 octets IPv6.
    pub fn ip_addr(&self) -> Result<IpAddr, IeError> {
        match self.0.len() {
            4 => {
                let mut octets = [0u8; 4];
                octets.copy_from_slice(&self.0);
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            16 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&self.0);
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            len => Err(IeError::InvalidTransportLayerAddress(len)),
        }
    }
}

impl From<IpAddr> for TransportLayerAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Self(Bytes::copy_from_slice(&v4.octets())),
            IpAddr::V6(v6) => Self(Bytes::copy_from_slice(&v6.octets())),
        }
    }
}

/// Pre-emption capability of an allocation/retention priority.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreEmptionCapability {
    ShallNotTriggerPreEmption,
    MayTriggerPreEmption,
}

/// Pre-emption vulnerability of an allocation/retention priority.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreEmptionVulnerability {
    NotPreEmptable,
    PreEmptable,
}

/// Allocation and retention priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRetentionPriority {
    /// Priority level (1-15)
    pub priority_level: u8,
    /// Pre-emption capability
    pub pre_emption_capability: PreEmptionCapability,
    /// Pre-emption vulnerability
    pub pre_emption_vulnerability: PreEmptionVulnerability,
}

/// GBR QoS information, bit rates in bit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GbrQosInformation {
    /// Maximum bit rate downlink
    pub e_rab_maximum_bitrate_dl: u64,
    /// Maximum bit rate uplink
    pub e_rab_maximum_bitrate_ul: u64,
    /// Guaranteed bit rate downlink
    pub e_rab_guaranteed_bitrate_dl: u64,
    /// Guaranteed bit rate uplink
    pub e_rab_guaranteed_bitrate_ul: u64,
}

impl GbrQosInformation {
    /// Returns `Some` only if at least one of the four rates is non-zero.
    pub fn if_present(self) -> Option<Self> {
        let any = self.e_rab_maximum_bitrate_dl != 0
            || self.e_rab_maximum_bitrate_ul != 0
            || self.e_rab_guaranteed_bitrate_dl != 0
            || self.e_rab_guaranteed_bitrate_ul != 0;
        any.then_some(self)
    }
}

/// E-RAB level QoS parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabLevelQosParameters {
    /// QoS class identifier
    pub qci: u8,
    /// Allocation and retention priority
    pub allocation_retention_priority: AllocationRetentionPriority,
    /// GBR QoS information
    pub gbr_qos_information: Option<GbrQosInformation>,
}

/// E-RAB to be set up (Initial Context Setup, E-RAB Setup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabToBeSetupItem {
    /// E-RAB id
    pub e_rab_id: u8,
    /// QoS parameters
    pub e_rab_level_qos_parameters: ErabLevelQosParameters,
    /// S-GW S1-U address
    pub transport_layer_address: TransportLayerAddress,
    /// S-GW S1-U TEID
    pub gtp_teid: u32,
    /// NAS PDU to deliver with the bearer
    pub nas_pdu: Option<Bytes>,
}

/// E-RAB to be set up in a Handover Request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabToBeSetupItemHoReq {
    /// E-RAB id
    pub e_rab_id: u8,
    /// S-GW S1-U address
    pub transport_layer_address: TransportLayerAddress,
    /// S-GW S1-U TEID
    pub gtp_teid: u32,
    /// QoS parameters
    pub e_rab_level_qos_parameters: ErabLevelQosParameters,
    /// Data-Forwarding-Not-Possible extension
    pub data_forwarding_not_possible: bool,
}

/// Bearer with its eNB tunnel endpoint (setup lists, admitted lists,
/// to-be-switched lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabSetupItem {
    /// E-RAB id
    pub e_rab_id: u8,
    /// eNB S1-U address
    pub transport_layer_address: TransportLayerAddress,
    /// eNB S1-U TEID
    pub gtp_teid: u32,
}

/// Bearer with a cause (failed lists, to-be-released lists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabItem {
    /// E-RAB id
    pub e_rab_id: u8,
    /// Cause
    pub cause: Cause,
}

/// Bearer id only (released list, modified list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabIdItem {
    /// E-RAB id
    pub e_rab_id: u8,
}

/// Bearer item of the E-RAB Modification Indication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErabModificationItem {
    /// E-RAB id
    pub e_rab_id: u8,
    /// eNB S1-U address
    pub transport_layer_address: TransportLayerAddress,
    /// Downlink TEID
    pub dl_gtp_teid: u32,
}

/// UE aggregate maximum bit rate, bit/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeAggregateMaximumBitrate {
    /// Downlink
    pub dl: u64,
    /// Uplink
    pub ul: u64,
}

// ============================================================================
// Security
// ============================================================================

/// UE security capabilities (16-bit algorithm bitmaps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UeSecurityCapabilities {
    /// EEA bitmap
    pub encryption_algorithms: u16,
    /// EIA bitmap
    pub integrity_protection_algorithms: u16,
}

/// Size of the next-hop parameter (NH) in octets.
pub const NEXT_HOP_SIZE: usize = 32;

/// Size of the KeNB security key in octets.
pub const SECURITY_KEY_SIZE: usize = 32;

/// Security context (NCC + NH).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    /// Next hop chaining count (0-7)
    pub next_hop_chaining_count: u8,
    /// Next hop parameter, empty when unavailable
    pub next_hop_parameter: Bytes,
}

// ============================================================================
// Misc
// ============================================================================

/// Handover type.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoverType {
    IntraLte,
    LteToUtran,
    LteToGeran,
    UtranToLte,
    GeranToLte,
}

/// Target eNB of a Handover Required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEnbId {
    /// Global eNB id of the target
    pub global_enb_id: GlobalEnbId,
    /// Selected TAI
    pub selected_tai: TaiIe,
}

/// Target ID CHOICE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetId {
    /// LTE target
    TargetEnbId(TargetEnbId),
    /// UTRAN target
    TargetRncId {
        /// Location area
        lai: Lai,
        /// RNC id
        rnc_id: u16,
    },
    /// GERAN target cell
    Cgi {
        /// Location area
        lai: Lai,
        /// Cell identity
        ci: u16,
    },
}

/// S-TMSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct STmsi {
    /// MME code
    pub mmec: u8,
    /// M-TMSI
    pub m_tmsi: u32,
}

/// RRC establishment cause.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RrcEstablishmentCause {
    Emergency,
    HighPriorityAccess,
    MtAccess,
    MoSignalling,
    MoData,
    DelayTolerantAccess,
    MoVoiceCall,
}

/// CS fallback indicator.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsFallbackIndicator {
    CsFallbackRequired,
    CsFallbackHighPriority,
}

/// UE paging identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UePagingIdentity {
    /// S-TMSI
    STmsi(STmsi),
    /// IMSI digits
    Imsi(String),
}

/// CN domain of a paging.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CnDomain {
    Ps,
    Cs,
}

/// UE-associated logical S1 connection item of a partial reset.
///
/// An absent id is the wire encoding of "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeAssociatedLogicalS1ConnectionItem {
    /// MME UE S1AP id
    pub mme_ue_s1ap_id: Option<MmeUeS1apId>,
    /// eNB UE S1AP id
    pub enb_ue_s1ap_id: Option<EnbUeS1apId>,
}
