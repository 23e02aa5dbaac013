//! Test fixtures and configuration helpers
//!
//! Provides pre-configured test scenarios and configuration builders.

use std::net::{IpAddr, Ipv4Addr};

use bytes::Bytes;

use s1mme_common::{Ecgi, Gummei, MmeConfig, Plmn, Tai};
use s1mme_s1ap::ies::{
    AllocationRetentionPriority, ErabLevelQosParameters, ErabSetupItem, ErabToBeSetupItem,
    ErabToBeSetupItemHoReq, EutranCgi, PreEmptionCapability, PreEmptionVulnerability, TaiIe,
    TransportLayerAddress, UeAggregateMaximumBitrate, UeSecurityCapabilities,
};

/// PLMN 001/01 used by every fixture
pub const TEST_PLMN: Plmn = Plmn::new(1, 1, false);

/// Tracking area code served by the test MME
pub const TEST_TAC: u16 = 1;

/// Test configuration container
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// MME configuration
    pub mme: TestMmeConfig,
    /// eNB configuration
    pub enb: TestEnbConfig,
    /// UE configuration
    pub ue: TestUeConfig,
}

/// Test MME configuration
#[derive(Debug, Clone)]
pub struct TestMmeConfig {
    /// MME name
    pub mme_name: String,
    /// Served tracking area codes (all in [`TEST_PLMN`])
    pub tacs: Vec<u16>,
    /// Release guard timer in milliseconds
    pub release_timer_ms: u64,
    /// UEs reported per deregistration event
    pub ue_per_deregister_message: usize,
    /// eNB clean-up timer in milliseconds
    pub enb_cleanup_timer_ms: Option<u64>,
}

impl Default for TestMmeConfig {
    fn default() -> Self {
        Self {
            mme_name: "Test-MME".to_string(),
            tacs: vec![TEST_TAC],
            release_timer_ms: 2_000,
            ue_per_deregister_message: 128,
            enb_cleanup_timer_ms: None,
        }
    }
}

impl TestMmeConfig {
    /// Set the release guard timer
    pub fn with_release_timer_ms(mut self, ms: u64) -> Self {
        self.release_timer_ms = ms;
        self
    }

    /// Set the deregistration batch size
    pub fn with_deregister_batch(mut self, ues: usize) -> Self {
        self.ue_per_deregister_message = ues;
        self
    }

    /// Arm the eNB clean-up timer on SCTP shutdown
    pub fn with_enb_cleanup_timer_ms(mut self, ms: u64) -> Self {
        self.enb_cleanup_timer_ms = Some(ms);
        self
    }

    /// Builds the core configuration.
    pub fn build(&self) -> MmeConfig {
        let mut config = MmeConfig::new(
            vec![Gummei::new(TEST_PLMN, 1, 1)],
            self.tacs.iter().map(|&tac| Tai::new(TEST_PLMN, tac)).collect(),
        );
        config.mme_name = Some(self.mme_name.clone());
        config.s1ap.release_timer_ms = self.release_timer_ms;
        config.s1ap.ue_per_deregister_message = self.ue_per_deregister_message;
        config.s1ap.enb_cleanup_timer_ms = self.enb_cleanup_timer_ms;
        config
    }
}

/// Test eNB configuration
#[derive(Debug, Clone)]
pub struct TestEnbConfig {
    /// SCTP association id
    pub assoc_id: u32,
    /// Macro eNB id
    pub enb_id: u32,
    /// Broadcast TAC
    pub tac: u16,
    /// Inbound streams
    pub in_streams: u16,
    /// Outbound streams
    pub out_streams: u16,
    /// Cell identity of the serving cell (low 8 bits)
    pub cell_id: u8,
}

impl Default for TestEnbConfig {
    fn default() -> Self {
        Self {
            assoc_id: 1,
            enb_id: 0x101,
            tac: TEST_TAC,
            in_streams: 4,
            out_streams: 4,
            cell_id: 1,
        }
    }
}

impl TestEnbConfig {
    /// Create an eNB config with the given association and eNB ids
    pub fn with_ids(assoc_id: u32, enb_id: u32) -> Self {
        Self {
            assoc_id,
            enb_id,
            ..Self::default()
        }
    }

    /// Set the broadcast TAC
    pub fn with_tac(mut self, tac: u16) -> Self {
        self.tac = tac;
        self
    }

    /// Serving TAI
    pub fn tai(&self) -> Tai {
        Tai::new(TEST_PLMN, self.tac)
    }

    /// Serving cell: 28-bit cell identity built from the eNB id and cell id
    pub fn eutran_cgi(&self) -> EutranCgi {
        let cell_identity = ((self.enb_id & 0x000F_FFFF) << 8) | u32::from(self.cell_id);
        match Ecgi::new(TEST_PLMN, cell_identity) {
            Ok(ecgi) => EutranCgi::from(ecgi),
            Err(e) => panic!("invalid test cell identity {cell_identity:#x}: {e}"),
        }
    }

    /// Serving TAI as carried on the wire
    pub fn tai_ie(&self) -> TaiIe {
        TaiIe::from(self.tai())
    }
}

/// Test UE configuration
#[derive(Debug, Clone)]
pub struct TestUeConfig {
    /// IMSI digits
    pub imsi: String,
    /// eNB UE id
    pub enb_ue_s1ap_id: u32,
    /// MME UE id the application allocates
    pub mme_ue_s1ap_id: u32,
    /// Initial NAS PDU (attach request)
    pub nas_pdu: Bytes,
}

impl Default for TestUeConfig {
    fn default() -> Self {
        Self {
            imsi: "001010000000001".to_string(),
            enb_ue_s1ap_id: 1,
            mme_ue_s1ap_id: 100,
            nas_pdu: Bytes::from_static(&[0x07, 0x41, 0x71, 0x08]),
        }
    }
}

impl TestUeConfig {
    /// Create a new test UE config with custom ids
    pub fn with_ids(enb_ue_s1ap_id: u32, mme_ue_s1ap_id: u32) -> Self {
        Self {
            enb_ue_s1ap_id,
            mme_ue_s1ap_id,
            ..Self::default()
        }
    }

    /// Create a new test UE config with custom IMSI
    pub fn with_imsi(mut self, imsi: &str) -> Self {
        self.imsi = imsi.to_string();
        self
    }
}

/// S-GW / eNB user-plane address in the 10.0.0.0/24 test range
pub fn test_address(last: u8) -> TransportLayerAddress {
    TransportLayerAddress::from(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)))
}

/// Non-GBR QCI 9 bearer parameters
pub fn default_qos() -> ErabLevelQosParameters {
    ErabLevelQosParameters {
        qci: 9,
        allocation_retention_priority: AllocationRetentionPriority {
            priority_level: 15,
            pre_emption_capability: PreEmptionCapability::ShallNotTriggerPreEmption,
            pre_emption_vulnerability: PreEmptionVulnerability::PreEmptable,
        },
        gbr_qos_information: None,
    }
}

/// Default bearer for an Initial Context Setup Request
pub fn default_bearer(e_rab_id: u8) -> ErabToBeSetupItem {
    ErabToBeSetupItem {
        e_rab_id,
        e_rab_level_qos_parameters: default_qos(),
        transport_layer_address: test_address(1),
        gtp_teid: 0x1000 + u32::from(e_rab_id),
        nas_pdu: None,
    }
}

/// Bearer for a Handover Request
pub fn handover_bearer(e_rab_id: u8) -> ErabToBeSetupItemHoReq {
    ErabToBeSetupItemHoReq {
        e_rab_id,
        transport_layer_address: test_address(1),
        gtp_teid: 0x1000 + u32::from(e_rab_id),
        e_rab_level_qos_parameters: default_qos(),
        data_forwarding_not_possible: false,
    }
}

/// Bearer set up by an eNB
pub fn enb_bearer(e_rab_id: u8, last: u8) -> ErabSetupItem {
    ErabSetupItem {
        e_rab_id,
        transport_layer_address: test_address(last),
        gtp_teid: 0x2000 + u32::from(e_rab_id),
    }
}

/// UE-AMBR of 100 Mbit/s in both directions
pub fn default_ambr() -> UeAggregateMaximumBitrate {
    UeAggregateMaximumBitrate {
        dl: 100_000_000,
        ul: 100_000_000,
    }
}

/// EEA1/EEA2 and EIA1/EIA2
pub fn default_security_capabilities() -> UeSecurityCapabilities {
    UeSecurityCapabilities {
        encryption_algorithms: 0xC000,
        integrity_protection_algorithms: 0xC000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_builds_valid_mme_config() {
        let config = TestConfig::default().mme.build();
        assert!(s1mme_mme::validate_mme_config(&config).is_ok());
        assert_eq!(config.served_tais, vec![Tai::new(TEST_PLMN, TEST_TAC)]);
    }

    #[test]
    fn test_enb_cell_identity() {
        let enb = TestEnbConfig::with_ids(3, 0x102);
        assert_eq!(enb.eutran_cgi().ecgi().enb_id(), 0x102);
        assert_eq!(enb.with_tac(7).tai().tac, 7);
    }
}
