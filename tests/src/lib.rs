//! Integration test framework for the S1AP MME core
#![allow(missing_docs)]
//!
//! This crate provides test utilities and mock components for integration
//! testing of the `s1mme-mme` S1AP task.
//!
//! # Components
//!
//! - [`mock_enb`] - Mock eNB and a harness running the S1AP task
//! - [`test_fixtures`] - Common test fixtures and configuration helpers
//! - [`test_utils`] - Utility functions for test setup and assertions
//!
//! # Test Categories
//!
//! 1. **eNB Lifecycle Tests** - S1 Setup, Reset, SCTP reset/shutdown, paging
//! 2. **UE Attach Tests** - NAS transport, Initial Context Setup, release
//! 3. **Handover Tests** - S1 handover, cancellation, path switch
//! 4. **Release Timer Tests** - UE context release guard timer

pub mod mock_enb;
pub mod test_fixtures;
pub mod test_utils;

pub use mock_enb::{release_command_ids, MmeHarness, MockEnb, MockEnbError, SentPdu};
pub use test_fixtures::{
    default_ambr, default_bearer, default_qos, default_security_capabilities, enb_bearer,
    handover_bearer, test_address, TestConfig, TestEnbConfig, TestMmeConfig, TestUeConfig,
    TEST_PLMN, TEST_TAC,
};
pub use test_utils::{
    init_test_logging, DEFAULT_TEST_TIMEOUT, FAST_RELEASE_TIMER_MS, QUIET_PERIOD,
};
