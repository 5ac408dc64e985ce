//! Derivation paths and the human-readable prefix encoding

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hardened derivation flag.
pub const HARDENED: u32 = 0x8000_0000;

/// THORChain SLIP-44 coin type.
pub const COIN_TYPE: u32 = 931;

/// Protocol bounds on the byte length of a human-readable prefix.
const HRP_MIN_LEN: usize = 3;
const HRP_MAX_LEN: usize = 83;

/// A 5-level BIP32 derivation path with hardening bits already applied.
///
/// The app derives keys at exactly five levels
/// (`m/purpose'/coin_type'/account'/change/index`); shorter or longer
/// paths are rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip32Path([u32; 5]);

impl Bip32Path {
    pub fn new(components: [u32; 5]) -> Self {
        Self(components)
    }

    /// Standard THORChain path `m/44'/931'/account'/0/index`.
    pub fn thorchain(account: u32, index: u32) -> Self {
        Self([
            44 | HARDENED,
            COIN_TYPE | HARDENED,
            account | HARDENED,
            0,
            index,
        ])
    }

    pub fn components(&self) -> &[u32; 5] {
        &self.0
    }
}

impl FromStr for Bip32Path {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| Error::InvalidPath(path.to_string()))?;

        let mut components = Vec::new();
        for component in rest.split('/') {
            if component.is_empty() {
                continue;
            }

            let (number_str, hardened) = match component.strip_suffix('\'') {
                Some(stripped) => (stripped, true),
                None => (component, false),
            };

            let number: u32 = number_str
                .parse()
                .map_err(|_| Error::InvalidPath(path.to_string()))?;

            components.push(if hardened { number | HARDENED } else { number });
        }

        let components: [u32; 5] = components
            .try_into()
            .map_err(|_| Error::InvalidPath(path.to_string()))?;
        Ok(Self(components))
    }
}

/// Encode a human-readable prefix as `[len][ascii bytes]`.
///
/// The device mandates an ASCII prefix of 3 to 83 bytes.
pub fn serialize_hrp(hrp: &str) -> Result<Vec<u8>> {
    if !hrp.is_ascii() || hrp.len() < HRP_MIN_LEN || hrp.len() > HRP_MAX_LEN {
        return Err(Error::InvalidHrp(hrp.to_string()));
    }
    let mut out = Vec::with_capacity(1 + hrp.len());
    out.push(hrp.len() as u8);
    out.extend_from_slice(hrp.as_bytes());
    Ok(out)
}
