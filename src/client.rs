//! High-level client for the THORChain Ledger app

use log::debug;

use crate::apdu::{ApduCommand, CLA, dashboard, ins, p1};
use crate::error::{Error, Result};
use crate::path::{Bip32Path, serialize_hrp};
use crate::protocol::{ProtocolVersion, exchange, sign_chunks};
use crate::responses::{
    AddressResponse, AppInfo, COMPRESSED_PK_LEN, DeviceInfo, VersionInfo,
};
use crate::transport::Transport;

/// Default human-readable prefix for mainnet addresses.
pub const DEFAULT_HRP: &str = "thor";

/// High-level client for the THORChain Ledger app.
///
/// Drives exactly one exchange at a time over the injected transport;
/// discovery, connection management and timeouts stay with the transport.
pub struct ThorchainApp<T: Transport> {
    transport: T,
}

impl<T: Transport> ThorchainApp<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Release the underlying transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Query app version and device lock state.
    pub async fn get_version(&mut self) -> Result<VersionInfo> {
        debug!("Getting app version");
        let answer = exchange(
            &mut self.transport,
            &ApduCommand {
                cla: CLA,
                ins: ins::GET_VERSION,
                p1: 0,
                p2: 0,
                data: Vec::new(),
            },
        )
        .await?;
        VersionInfo::decode(&answer)
    }

    /// Query name, version and flags of the currently open app.
    pub async fn get_app_info(&mut self) -> Result<AppInfo> {
        debug!("Getting app info");
        let answer = exchange(
            &mut self.transport,
            &ApduCommand {
                cla: dashboard::CLA_APP_INFO,
                ins: dashboard::INS_INFO,
                p1: 0,
                p2: 0,
                data: Vec::new(),
            },
        )
        .await?;
        AppInfo::decode(&answer)
    }

    /// Query firmware details; only answered from the Dashboard.
    pub async fn get_device_info(&mut self) -> Result<DeviceInfo> {
        debug!("Getting device info");
        let answer = exchange(
            &mut self.transport,
            &ApduCommand {
                cla: dashboard::CLA_DEVICE_INFO,
                ins: dashboard::INS_INFO,
                p1: 0,
                p2: 0,
                data: Vec::new(),
            },
        )
        .await?;
        DeviceInfo::decode(&answer)
    }

    /// Fetch the compressed public key for `path` without user
    /// interaction, using the app's default prefix.
    pub async fn get_public_key(&mut self, path: &Bip32Path) -> Result<Vec<u8>> {
        let address = self.address(path, DEFAULT_HRP, p1::ONLY_RETRIEVE).await?;
        Ok(address.compressed_pk)
    }

    /// Fetch public key and bech32 address without user interaction.
    pub async fn get_address(&mut self, path: &Bip32Path, hrp: &str) -> Result<AddressResponse> {
        self.address(path, hrp, p1::ONLY_RETRIEVE).await
    }

    /// Show the address on the device and wait for the user to confirm it.
    ///
    /// Suspends for as long as the user takes; any timeout policy belongs
    /// to the transport.
    pub async fn show_address(&mut self, path: &Bip32Path, hrp: &str) -> Result<AddressResponse> {
        self.address(path, hrp, p1::SHOW_ADDRESS).await
    }

    async fn address(
        &mut self,
        path: &Bip32Path,
        hrp: &str,
        display: u8,
    ) -> Result<AddressResponse> {
        debug!("Getting address for hrp {hrp} (display={display})");
        let mut data = serialize_hrp(hrp)?;
        let protocol = self.negotiate().await?;
        data.extend_from_slice(&protocol.serialize_path(path));

        let answer = exchange(
            &mut self.transport,
            &ApduCommand {
                cla: CLA,
                ins: ins::GET_ADDR_SECP256K1,
                p1: display,
                p2: 0,
                data,
            },
        )
        .await?;
        AddressResponse::decode(&answer)
    }

    /// Sign `message` with the key at `path`, returning the DER-encoded
    /// signature produced by the final chunk.
    ///
    /// Chunks are submitted strictly one at a time; the first non-success
    /// response ends the exchange and the remaining chunks are never sent.
    pub async fn sign(&mut self, path: &Bip32Path, message: &[u8]) -> Result<Vec<u8>> {
        let protocol = self.negotiate().await?;
        let chunks = sign_chunks(protocol.serialize_path(path), message);
        let total = chunks.len();
        debug!("Signing {} bytes in {total} chunks", message.len());

        let mut signature = Vec::new();
        for (index, chunk) in chunks.iter().enumerate() {
            signature = protocol
                .send_sign_chunk(&mut self.transport, index + 1, total, chunk)
                .await?;
        }
        Ok(signature)
    }

    /// Query the version and pick the protocol generation for this call.
    /// Negotiation is per-operation; nothing is cached across calls.
    async fn negotiate(&mut self) -> Result<ProtocolVersion> {
        let version = self.get_version().await?;
        ProtocolVersion::negotiate(&version)
    }
}

/// Derive the bech32 account address for a compressed secp256k1 key:
/// `bech32(hrp, ripemd160(sha256(pk)))`.
pub fn bech32_from_pubkey(hrp: &str, compressed_pk: &[u8]) -> Result<String> {
    use bech32::ToBase32;
    use bitcoin::hashes::{Hash, ripemd160, sha256};

    if compressed_pk.len() != COMPRESSED_PK_LEN {
        return Err(Error::InvalidPublicKey(compressed_pk.len()));
    }

    let sha = sha256::Hash::hash(compressed_pk);
    let hash160 = ripemd160::Hash::hash(sha.as_byte_array());
    bech32::encode(hrp, hash160.as_byte_array().to_base32(), bech32::Variant::Bech32)
        .map_err(|_| Error::InvalidHrp(hrp.to_string()))
}
