//! Configuration Loading for the MME
//!
//! This module provides configuration loading and validation for the S1AP
//! core. It wraps the `MmeConfig` from `s1mme-common` with the checks the
//! core relies on at run time.
//!
//! # Example
//!
//! ```rust,ignore
//! use s1mme_mme::app::{load_mme_config, validate_mme_config};
//!
//! let config = load_mme_config("config/mme.yaml")?;
//! validate_mme_config(&config)?;
//! ```

use std::path::Path;

use s1mme_common::{MmeConfig, Plmn};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// No GUMMEI configured
    #[error("No GUMMEI configured: at least one served GUMMEI must be specified")]
    NoGummeiConfigured,

    /// No tracking area configured
    #[error("No TAI configured: at least one served TAI must be specified")]
    NoTaiConfigured,

    /// Invalid TAC value
    #[error("Invalid TAC: {0}")]
    InvalidTac(String),

    /// Invalid PLMN
    #[error("Invalid PLMN: {0}")]
    InvalidPlmn(String),

    /// Invalid S1AP tuning
    #[error("Invalid S1AP setting: {0}")]
    InvalidS1apConfig(String),
}

/// Loads an MME configuration from a YAML file.
///
/// Only parsing happens here; call [`validate_mme_config`] (or use
/// [`load_and_validate_mme_config`]) before handing the result to the core.
pub fn load_mme_config<P: AsRef<Path>>(path: P) -> Result<MmeConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_mme_config_from_str(&contents)
}

/// Loads an MME configuration from a YAML string.
pub fn load_mme_config_from_str(yaml: &str) -> Result<MmeConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Validates an MME configuration.
///
/// # Validation Rules
///
/// - At least one served GUMMEI and one served TAI
/// - PLMN MCC between 001 and 999, MNC at most 999
/// - TAC 0 is reserved
/// - Release timer and deregistration batch size must be non-zero
pub fn validate_mme_config(config: &MmeConfig) -> Result<(), ConfigValidationError> {
    if config.served_gummeis.is_empty() {
        return Err(ConfigValidationError::NoGummeiConfigured);
    }
    if config.served_tais.is_empty() {
        return Err(ConfigValidationError::NoTaiConfigured);
    }

    for gummei in &config.served_gummeis {
        validate_plmn(&gummei.plmn)?;
    }
    for tai in &config.served_tais {
        validate_plmn(&tai.plmn)?;
        if tai.tac == 0 {
            return Err(ConfigValidationError::InvalidTac(format!(
                "TAC 0 is reserved (served TAI {tai})"
            )));
        }
    }

    if config.s1ap.release_timer_ms == 0 {
        return Err(ConfigValidationError::InvalidS1apConfig(
            "release_timer_ms must be greater than 0".to_string(),
        ));
    }
    if config.s1ap.ue_per_deregister_message == 0 {
        return Err(ConfigValidationError::InvalidS1apConfig(
            "ue_per_deregister_message must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_plmn(plmn: &Plmn) -> Result<(), ConfigValidationError> {
    if plmn.mcc == 0 || plmn.mcc > 999 {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "MCC {} must be between 001 and 999",
            plmn.mcc
        )));
    }
    if plmn.mnc > 999 {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "MNC {} must be between 00 and 999",
            plmn.mnc
        )));
    }
    Ok(())
}

/// Loads and validates an MME configuration in one step.
pub fn load_and_validate_mme_config<P: AsRef<Path>>(path: P) -> Result<MmeConfig, ConfigError> {
    let config = load_mme_config(path)?;
    validate_mme_config(&config)?;
    Ok(config)
}
