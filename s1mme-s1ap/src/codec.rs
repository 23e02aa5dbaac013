//! S1AP PDU codec
//!
//! The transport exchanges opaque byte buffers; the core only ever sees typed
//! [`S1apPdu`] values. [`S1apCodec`] is the seam between the two so that the
//! wire encoding can be swapped without touching the state machine.
//! [`JsonCodec`] is the serde_json-backed implementation used by the binary
//! and the test harness.

use bytes::Bytes;
use thiserror::Error;

use crate::pdu::S1apPdu;

/// S1AP codec error types
#[derive(Debug, Error)]
pub enum S1apCodecError {
    /// Error during encoding
    #[error("S1AP encoding error: {0}")]
    EncodeError(String),

    /// Error during decoding, including a missing mandatory IE
    #[error("S1AP decoding error: {0}")]
    DecodeError(String),
}

/// Encoder/decoder for S1AP PDUs.
pub trait S1apCodec: Send {
    /// Encodes a PDU into a byte buffer ready for the SCTP layer.
    fn encode(&self, pdu: &S1apPdu) -> Result<Bytes, S1apCodecError>;

    /// Decodes a byte buffer received from the SCTP layer.
    fn decode(&self, bytes: &[u8]) -> Result<S1apPdu, S1apCodecError>;
}

/// serde_json-backed codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl S1apCodec for JsonCodec {
    fn encode(&self, pdu: &S1apPdu) -> Result<Bytes, S1apCodecError> {
        encode_s1ap_pdu(pdu)
    }

    fn decode(&self, bytes: &[u8]) -> Result<S1apPdu, S1apCodecError> {
        decode_s1ap_pdu(bytes)
    }
}

/// Encode an S1AP PDU to bytes
///
/// # Arguments
/// * `pdu` - The S1AP PDU to encode
///
/// # Returns
/// * `Ok(Bytes)` - The encoded bytes
/// * `Err(S1apCodecError)` - If encoding fails
pub fn encode_s1ap_pdu(pdu: &S1apPdu) -> Result<Bytes, S1apCodecError> {
    serde_json::to_vec(pdu)
        .map(Bytes::from)
        .map_err(|e| S1apCodecError::EncodeError(e.to_string()))
}

/// Decode an S1AP PDU from bytes
///
/// # Arguments
/// * `bytes` - The bytes to decode
///
/// # Returns
/// * `Ok(S1apPdu)` - The decoded PDU
/// * `Err(S1apCodecError)` - If the bytes are malformed or a mandatory IE is absent
pub fn decode_s1ap_pdu(bytes: &[u8]) -> Result<S1apPdu, S1apCodecError> {
    serde_json::from_slice(bytes).map_err(|e| S1apCodecError::DecodeError(e.to_string()))
}
