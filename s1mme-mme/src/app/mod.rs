//! MME Application Module
//!
//! Start-up support for the `s1ap-mme` binary: loading and validating the
//! YAML configuration before the S1AP task is spawned.

mod config_loader;

pub use config_loader::{
    load_and_validate_mme_config, load_mme_config, load_mme_config_from_str, validate_mme_config,
    ConfigError, ConfigValidationError,
};
