//! Error types for ledger-thorchain

use thiserror::Error;

use crate::apdu::{error_message, sw};

#[derive(Error, Debug)]
pub enum Error {
    /// Device returned a non-success status word with no dedicated variant.
    #[error("device error {code:#06x}: {message}")]
    Device { code: u16, message: String },

    #[error("transaction rejected by user on the device")]
    UserRejected,

    #[error("App Version is not supported")]
    UnsupportedAppVersion,

    #[error("this command is only available in the Dashboard")]
    OnlyInDashboard,

    #[error("response format ID not recognized")]
    UnrecognizedFormat,

    #[error("invalid human-readable prefix: {0}")]
    InvalidHrp(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("invalid compressed public key length: {0}")]
    InvalidPublicKey(usize),

    #[error("response too short: expected at least {expected} bytes, got {actual}")]
    TruncatedResponse { expected: usize, actual: usize },

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Build the error for a non-success status word. `detail` overrides
    /// the table message when the device appended one to the response.
    pub(crate) fn from_status(code: u16, detail: Option<String>) -> Self {
        match code {
            sw::TRANSACTION_REJECTED => Error::UserRejected,
            _ => Error::Device {
                code,
                message: detail.unwrap_or_else(|| error_message(code)),
            },
        }
    }

    /// Numeric return code for this error, uniform across device-reported
    /// and local failures. Local failures map to [`sw::UNKNOWN_ERROR`].
    pub fn return_code(&self) -> u16 {
        match self {
            Error::Device { code, .. } => *code,
            Error::UserRejected => sw::TRANSACTION_REJECTED,
            Error::UnsupportedAppVersion => sw::APP_VERSION_NOT_SUPPORTED,
            Error::OnlyInDashboard => sw::CLA_NOT_SUPPORTED,
            Error::UnrecognizedFormat => sw::DEVICE_BUSY,
            Error::InvalidHrp(_)
            | Error::InvalidPath(_)
            | Error::InvalidPublicKey(_)
            | Error::TruncatedResponse { .. }
            | Error::Transport(_) => sw::UNKNOWN_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
