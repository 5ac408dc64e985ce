//! APDU wire primitives for the THORChain Ledger app

use crate::error::{Error, Result};

/// Class byte of the THORChain app.
pub const CLA: u8 = 0x55;

/// Maximum message bytes carried by a single signing chunk.
pub const CHUNK_SIZE: usize = 250;

/// Instruction codes understood by the app.
pub mod ins {
    /// Get app version and device lock state
    pub const GET_VERSION: u8 = 0x00;
    /// Sign with secp256k1; payload arrives in chunks
    pub const SIGN_SECP256K1: u8 = 0x02;
    /// Get compressed public key and bech32 address
    pub const GET_ADDR_SECP256K1: u8 = 0x04;
}

/// Commands answered by the device firmware rather than the app.
pub mod dashboard {
    /// Class byte for the app info query
    pub const CLA_APP_INFO: u8 = 0xb0;
    /// Class byte for the device info query
    pub const CLA_DEVICE_INFO: u8 = 0xe0;
    /// Instruction byte shared by both queries
    pub const INS_INFO: u8 = 0x01;
}

/// P1 values for GET_ADDR_SECP256K1.
pub mod p1 {
    /// Return the address without user interaction
    pub const ONLY_RETRIEVE: u8 = 0x00;
    /// Show the address on the device and wait for confirmation
    pub const SHOW_ADDRESS: u8 = 0x01;
}

/// Status words returned by the device.
pub mod sw {
    pub const NO_ERRORS: u16 = 0x9000;
    pub const DEVICE_BUSY: u16 = 0x9001;
    pub const APP_VERSION_NOT_SUPPORTED: u16 = 0x6400;
    pub const WRONG_LENGTH: u16 = 0x6700;
    pub const KEY_DERIVATION_ERROR: u16 = 0x6802;
    pub const EMPTY_BUFFER: u16 = 0x6982;
    pub const OUTPUT_BUFFER_TOO_SMALL: u16 = 0x6983;
    pub const DATA_INVALID: u16 = 0x6984;
    pub const CONDITIONS_NOT_SATISFIED: u16 = 0x6985;
    pub const TRANSACTION_REJECTED: u16 = 0x6986;
    pub const BAD_KEY_HANDLE: u16 = 0x6a80;
    pub const INVALID_P1P2: u16 = 0x6b00;
    pub const INS_NOT_SUPPORTED: u16 = 0x6d00;
    pub const CLA_NOT_SUPPORTED: u16 = 0x6e00;
    pub const UNKNOWN_ERROR: u16 = 0x6f00;
    pub const SIGN_VERIFY_ERROR: u16 = 0x6f01;
}

/// Human-readable description of a status word.
pub fn error_message(code: u16) -> String {
    match code {
        1 => "U2F: Unknown".to_string(),
        2 => "U2F: Bad request".to_string(),
        3 => "U2F: Configuration unsupported".to_string(),
        4 => "U2F: Device Ineligible".to_string(),
        5 => "U2F: Timeout".to_string(),
        14 => "Timeout".to_string(),
        sw::NO_ERRORS => "No errors".to_string(),
        sw::DEVICE_BUSY => "Device is busy".to_string(),
        sw::APP_VERSION_NOT_SUPPORTED => "App Version is not supported".to_string(),
        sw::WRONG_LENGTH => "Wrong Length".to_string(),
        sw::KEY_DERIVATION_ERROR => "Error deriving keys".to_string(),
        sw::EMPTY_BUFFER => "Empty Buffer".to_string(),
        sw::OUTPUT_BUFFER_TOO_SMALL => "Output buffer too small".to_string(),
        sw::DATA_INVALID => "Data is invalid".to_string(),
        sw::CONDITIONS_NOT_SATISFIED => "Conditions not satisfied".to_string(),
        sw::TRANSACTION_REJECTED => "Transaction rejected".to_string(),
        sw::BAD_KEY_HANDLE => "Bad key handle".to_string(),
        sw::INVALID_P1P2 => "Invalid P1/P2".to_string(),
        sw::INS_NOT_SUPPORTED => "Instruction not supported".to_string(),
        sw::CLA_NOT_SUPPORTED => "App does not seem to be open".to_string(),
        sw::UNKNOWN_ERROR => "Unknown error".to_string(),
        sw::SIGN_VERIFY_ERROR => "Sign/verify error".to_string(),
        _ => format!("Unknown error code: {code:#x}"),
    }
}

/// One APDU request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl ApduCommand {
    /// Serialize to the short-form wire encoding
    /// `[cla, ins, p1, p2, len, data..]`. Payloads never exceed one chunk
    /// plus a serialized path, so the single-byte length always fits.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = vec![self.cla, self.ins, self.p1, self.p2, self.data.len() as u8];
        out.extend_from_slice(&self.data);
        out
    }
}

/// One raw APDU response: payload bytes followed by a big-endian status
/// word in the last two positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduAnswer {
    raw: Vec<u8>,
}

impl ApduAnswer {
    /// Wrap a raw response buffer. The device terminates every response
    /// with a two-byte status word; shorter buffers are malformed.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        if raw.len() < 2 {
            return Err(Error::TruncatedResponse {
                expected: 2,
                actual: raw.len(),
            });
        }
        Ok(Self { raw })
    }

    /// Status word from the last two bytes.
    pub fn return_code(&self) -> u16 {
        let n = self.raw.len();
        u16::from(self.raw[n - 2]) << 8 | u16::from(self.raw[n - 1])
    }

    /// Response bytes preceding the status word.
    pub fn payload(&self) -> &[u8] {
        &self.raw[..self.raw.len() - 2]
    }
}
