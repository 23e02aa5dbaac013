//! S1AP (S1 Application Protocol) library
//!
//! Typed model of the S1AP messages exchanged between eNB and MME
//! (3GPP TS 36.413).
//!
//! # Modules
//!
//! - `codec` - PDU encoding/decoding behind the [`S1apCodec`] trait
//! - `ies` - Information elements shared across procedures
//! - `pdu` - The top-level S1AP-PDU and procedure code table
//! - `procedures` - Message bodies, one module per elementary procedure

pub mod codec;
pub mod ies;
pub mod pdu;
pub mod procedures;

pub use codec::{decode_s1ap_pdu, encode_s1ap_pdu, JsonCodec, S1apCodec, S1apCodecError};
pub use pdu::{
    Criticality, InitiatingMessage, InitiatingMessageValue, MessageDirection, ProcedureCode,
    S1apPdu, SuccessfulOutcome, SuccessfulOutcomeValue, UnsuccessfulOutcome,
    UnsuccessfulOutcomeValue, PROCEDURE_CODE_COUNT,
};
