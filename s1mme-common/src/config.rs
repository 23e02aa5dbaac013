//! Configuration structures for the MME S1AP core
//!
//! The MME configuration is a single YAML document. Everything below the
//! `s1ap` key tunes the protocol core; the top level describes what the MME
//! advertises to eNBs during S1 Setup.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Gummei, Plmn, Tac, Tai};

/// Default UE context-release guard timer.
pub const DEFAULT_RELEASE_TIMER_MS: u64 = 1000;

/// Default number of UE ids carried by one eNB-deregistered indication.
pub const DEFAULT_UE_PER_DEREGISTER_MESSAGE: usize = 128;

/// What to do with an Error Indication carrying a radio-network cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorIndicationPolicy {
    /// Treat it like an eNB-initiated UE Context Release Request.
    #[default]
    ReleaseOnRadioNetwork,
    /// Log the cause and do nothing else.
    LogOnly,
}

impl fmt::Display for ErrorIndicationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorIndicationPolicy::ReleaseOnRadioNetwork => write!(f, "release_on_radio_network"),
            ErrorIndicationPolicy::LogOnly => write!(f, "log_only"),
        }
    }
}

/// What to do with a Handover Required whose type is not intra-LTE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedHandoverPolicy {
    /// Drop without answering the eNB.
    #[default]
    Drop,
    /// Answer with a Handover Preparation Failure.
    SendPreparationFailure,
}

impl fmt::Display for UnsupportedHandoverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedHandoverPolicy::Drop => write!(f, "drop"),
            UnsupportedHandoverPolicy::SendPreparationFailure => {
                write!(f, "send_preparation_failure")
            }
        }
    }
}

/// S1AP protocol-core tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S1apConfig {
    /// UE context-release guard timer in milliseconds
    pub release_timer_ms: u64,
    /// eNB clean-up timer armed on SCTP shutdown (disabled when `None`)
    pub enb_cleanup_timer_ms: Option<u64>,
    /// Initial UE Messages are shed while the measured downstream latency
    /// exceeds this many microseconds
    pub max_latency_us: Option<u64>,
    /// Replace eNB-signalled S1-U addresses with the SCTP peer address
    pub enable_gtpu_private_ip_correction: bool,
    /// Maximum UE ids per eNB-deregistered indication
    pub ue_per_deregister_message: usize,
    /// Error Indication handling
    pub error_indication_policy: ErrorIndicationPolicy,
    /// Handover Required with an unsupported handover type
    pub unsupported_handover_policy: UnsupportedHandoverPolicy,
    /// Serialize a directory snapshot on every check-in
    pub persist_state: bool,
}

impl Default for S1apConfig {
    fn default() -> Self {
        Self {
            release_timer_ms: DEFAULT_RELEASE_TIMER_MS,
            enb_cleanup_timer_ms: None,
            max_latency_us: None,
            enable_gtpu_private_ip_correction: false,
            ue_per_deregister_message: DEFAULT_UE_PER_DEREGISTER_MESSAGE,
            error_indication_policy: ErrorIndicationPolicy::default(),
            unsupported_handover_policy: UnsupportedHandoverPolicy::default(),
            persist_state: false,
        }
    }
}

/// MME configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmeConfig {
    /// MME name sent in the S1 Setup Response
    #[serde(default)]
    pub mme_name: Option<String>,
    /// Relative MME capacity (0-255)
    #[serde(default = "default_relative_capacity")]
    pub relative_capacity: u8,
    /// GUMMEIs served by this MME
    pub served_gummeis: Vec<Gummei>,
    /// Tracking areas served by this MME
    pub served_tais: Vec<Tai>,
    /// Whether the subscriber-data (S6a) interface is up
    #[serde(default = "default_true")]
    pub hss_associated: bool,
    /// Protocol-core tuning
    #[serde(default)]
    pub s1ap: S1apConfig,
}

fn default_relative_capacity() -> u8 {
    10
}

fn default_true() -> bool {
    true
}

impl MmeConfig {
    /// Creates a configuration with the given served GUMMEI and TAI lists and
    /// default tuning.
    pub fn new(served_gummeis: Vec<Gummei>, served_tais: Vec<Tai>) -> Self {
        Self {
            mme_name: None,
            relative_capacity: default_relative_capacity(),
            served_gummeis,
            served_tais,
            hss_associated: true,
            s1ap: S1apConfig::default(),
        }
    }

    /// Distinct PLMNs of the served TAI list, in configuration order.
    pub fn served_plmns(&self) -> Vec<Plmn> {
        let mut plmns: Vec<Plmn> = Vec::new();
        for tai in &self.served_tais {
            if !plmns.contains(&tai.plmn) {
                plmns.push(tai.plmn);
            }
        }
        plmns
    }

    /// Served TACs, in configuration order.
    pub fn served_tacs(&self) -> Vec<Tac> {
        self.served_tais.iter().map(|tai| tai.tac).collect()
    }

    /// Parses an MME configuration from a YAML string.
    ///
    /// # Example
    /// ```
    /// use s1mme_common::MmeConfig;
    ///
    /// let yaml = r#"
    /// relative_capacity: 20
    /// served_gummeis:
    ///   - plmn: { mcc: 1, mnc: 1 }
    ///     mme_gid: 1
    ///     mme_code: 1
    /// served_tais:
    ///   - plmn: { mcc: 1, mnc: 1 }
    ///     tac: 1
    /// "#;
    ///
    /// let config = MmeConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.relative_capacity, 20);
    /// assert_eq!(config.s1ap.release_timer_ms, 1000);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads an MME configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}
