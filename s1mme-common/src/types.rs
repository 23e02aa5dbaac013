//! Core EPS identity types: PLMN, TAI, ECGI, GUMMEI, IMSI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Public Land Mobile Network identifier.
///
/// A PLMN consists of:
/// - MCC (Mobile Country Code): 3 decimal digits (001-999)
/// - MNC (Mobile Network Code): 2 or 3 decimal digits
///
/// The `long_mnc` field indicates whether the MNC uses 3 digits (true) or 2 digits (false).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (3 digits, range 0-999)
    pub mcc: u16,
    /// Mobile Network Code (2-3 digits, range 0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits, false if 2 digits
    #[serde(default)]
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN with the given MCC and MNC.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Returns true if this PLMN has valid values set.
    pub fn has_value(&self) -> bool {
        self.mcc > 0 || self.mnc > 0
    }

    /// Encodes the PLMN as the 3-octet TBCD string carried in S1AP
    /// `PLMNidentity` (3GPP TS 24.008 10.5.1.13).
    pub fn encode(&self) -> [u8; 3] {
        let mcc1 = ((self.mcc % 1000) / 100) as u8;
        let mcc2 = ((self.mcc % 100) / 10) as u8;
        let mcc3 = (self.mcc % 10) as u8;

        let (mnc1, mnc2, mnc3) = if self.long_mnc {
            (
                ((self.mnc % 1000) / 100) as u8,
                ((self.mnc % 100) / 10) as u8,
                (self.mnc % 10) as u8,
            )
        } else {
            (((self.mnc % 100) / 10) as u8, (self.mnc % 10) as u8, 0x0F)
        };

        [(mcc2 << 4) | mcc1, (mnc3 << 4) | mcc3, (mnc2 << 4) | mnc1]
    }

    /// Decodes a PLMN from its 3-octet TBCD form.
    pub fn decode(bytes: [u8; 3]) -> Self {
        let [o1, o2, o3] = bytes;

        let mcc = 100 * (o1 & 0x0F) as u16 + 10 * (o1 >> 4) as u16 + (o2 & 0x0F) as u16;

        let mnc3 = o2 >> 4;
        let mnc1 = (o3 & 0x0F) as u16;
        let mnc2 = (o3 >> 4) as u16;

        if mnc3 != 0x0F {
            Self::new(mcc, 100 * mnc1 + 10 * mnc2 + mnc3 as u16, true)
        } else {
            Self::new(mcc, 10 * mnc1 + mnc2, false)
        }
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "Plmn({:03}-{:03})", self.mcc, self.mnc)
        } else {
            write!(f, "Plmn({:03}-{:02})", self.mcc, self.mnc)
        }
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "{:03}{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}{:02}", self.mcc, self.mnc)
        }
    }
}

impl Default for Plmn {
    fn default() -> Self {
        Self::new(0, 0, false)
    }
}

/// Tracking Area Code. LTE uses 16 bits (TS 36.413 9.2.3.7).
pub type Tac = u16;

/// Tracking Area Identity.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tai {
    /// Public Land Mobile Network identifier
    pub plmn: Plmn,
    /// Tracking Area Code
    pub tac: Tac,
}

impl Tai {
    /// Creates a new TAI with the given PLMN and TAC.
    pub const fn new(plmn: Plmn, tac: Tac) -> Self {
        Self { plmn, tac }
    }

    /// Creates a new TAI from individual MCC, MNC, and TAC values.
    pub const fn from_parts(mcc: u16, mnc: u16, long_mnc: bool, tac: Tac) -> Self {
        Self {
            plmn: Plmn::new(mcc, mnc, long_mnc),
            tac,
        }
    }

    /// Encodes the TAI as PLMN (3 octets) followed by a big-endian TAC (2 octets).
    pub fn encode(&self) -> [u8; 5] {
        let p = self.plmn.encode();
        let t = self.tac.to_be_bytes();
        [p[0], p[1], p[2], t[0], t[1]]
    }

    /// Decodes a TAI from its 5-octet form.
    pub fn decode(bytes: [u8; 5]) -> Self {
        Self {
            plmn: Plmn::decode([bytes[0], bytes[1], bytes[2]]),
            tac: u16::from_be_bytes([bytes[3], bytes[4]]),
        }
    }
}

impl fmt::Debug for Tai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tai({:?}, tac={})", self.plmn, self.tac)
    }
}

impl fmt::Display for Tai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.plmn, self.tac)
    }
}

/// Largest E-UTRAN cell identity (28 bits).
pub const MAX_CELL_IDENTITY: u32 = 0x0FFF_FFFF;

/// E-UTRAN Cell Global Identity.
///
/// The 28-bit cell identity is the eNB id (upper 20 bits for macro eNBs)
/// followed by an 8-bit cell id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ecgi {
    /// PLMN the cell belongs to
    pub plmn: Plmn,
    /// 28-bit cell identity
    pub cell_identity: u32,
}

impl Ecgi {
    /// Builds an ECGI, rejecting cell identities wider than 28 bits.
    pub fn new(plmn: Plmn, cell_identity: u32) -> Result<Self, Error> {
        if cell_identity > MAX_CELL_IDENTITY {
            return Err(Error::OutOfRange(format!(
                "cell identity {cell_identity:#x} exceeds 28 bits"
            )));
        }
        Ok(Self { plmn, cell_identity })
    }

    /// Decodes the 28-bit cell identity from its 4-octet bit-string form
    /// (the low nibble of the last octet is padding).
    pub fn cell_identity_from_bits(bits: [u8; 4]) -> u32 {
        u32::from_be_bytes(bits) >> 4
    }

    /// Encodes the cell identity as a left-aligned 28-bit string in 4 octets.
    pub fn cell_identity_bits(&self) -> [u8; 4] {
        (self.cell_identity << 4).to_be_bytes()
    }

    /// eNB id part of the cell identity (macro eNB, 20 bits).
    pub fn enb_id(&self) -> u32 {
        self.cell_identity >> 8
    }

    /// Cell id part of the cell identity (8 bits).
    pub fn cell_id(&self) -> u8 {
        (self.cell_identity & 0xFF) as u8
    }

    /// Returns a copy whose eNB id part is replaced by `enb_id` (low 20 bits).
    pub fn with_enb_id(self, enb_id: u32) -> Self {
        Self {
            plmn: self.plmn,
            cell_identity: ((enb_id & 0x000F_FFFF) << 8) | u32::from(self.cell_id()),
        }
    }
}

impl fmt::Display for Ecgi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:07x}", self.plmn, self.cell_identity)
    }
}

/// Globally Unique MME Identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gummei {
    /// PLMN of the MME pool
    pub plmn: Plmn,
    /// MME group id (16 bits)
    pub mme_gid: u16,
    /// MME code (8 bits)
    pub mme_code: u8,
}

impl Gummei {
    /// Creates a GUMMEI.
    pub const fn new(plmn: Plmn, mme_gid: u16, mme_code: u8) -> Self {
        Self {
            plmn,
            mme_gid,
            mme_code,
        }
    }
}

impl fmt::Display for Gummei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04x}-{:02x}", self.plmn, self.mme_gid, self.mme_code)
    }
}

/// International Mobile Subscriber Identity as a digit string.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Imsi(String);

impl Imsi {
    /// Parses an IMSI of 6 to 15 decimal digits.
    pub fn parse(digits: &str) -> Result<Self, Error> {
        if !(6..=15).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidEncoding(format!("invalid IMSI: {digits:?}")));
        }
        Ok(Self(digits.to_string()))
    }

    /// The digit string.
    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Numeric form used as a correlation key in logs.
    pub fn to_imsi64(&self) -> u64 {
        self.0
            .bytes()
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'))
    }
}

impl TryFrom<String> for Imsi {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Imsi::parse(&value)
    }
}

impl From<Imsi> for String {
    fn from(imsi: Imsi) -> Self {
        imsi.0
    }
}

impl fmt::Debug for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imsi({})", self.0)
    }
}

impl fmt::Display for Imsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
