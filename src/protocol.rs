//! Version-gated serialization and the chunked signing exchange

use log::debug;

use crate::apdu::{ApduAnswer, ApduCommand, CHUNK_SIZE, CLA, ins, sw};
use crate::error::{Error, Result};
use crate::path::Bip32Path;
use crate::responses::VersionInfo;
use crate::transport::Transport;

/// Byte length of a serialized 5-level path.
const PATH_BYTES: usize = 20;

/// Negotiated protocol major version.
///
/// Each variant bundles the path serialization and chunk-submission
/// encoding of one firmware generation; negotiation fails with
/// [`Error::UnsupportedAppVersion`] for anything this crate does not
/// speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolVersion {
    V2,
}

impl ProtocolVersion {
    /// Select the protocol for the major version reported by the device.
    pub(crate) fn negotiate(version: &VersionInfo) -> Result<Self> {
        match version.major {
            2 => Ok(ProtocolVersion::V2),
            _ => Err(Error::UnsupportedAppVersion),
        }
    }

    /// Serialize a derivation path for this protocol version: four bytes
    /// per level, in path order. Byte order within a level is part of the
    /// firmware contract.
    pub(crate) fn serialize_path(self, path: &Bip32Path) -> Vec<u8> {
        match self {
            ProtocolVersion::V2 => {
                let mut buf = Vec::with_capacity(PATH_BYTES);
                for level in path.components() {
                    buf.extend_from_slice(&level.to_le_bytes());
                }
                buf
            }
        }
    }

    /// Submit one signing chunk, 1-indexed, and return its payload (the
    /// signature for the final chunk, empty otherwise).
    pub(crate) async fn send_sign_chunk<T: Transport>(
        self,
        transport: &mut T,
        chunk_index: usize,
        chunk_count: usize,
        chunk: &[u8],
    ) -> Result<Vec<u8>> {
        match self {
            ProtocolVersion::V2 => {
                let command = ApduCommand {
                    cla: CLA,
                    ins: ins::SIGN_SECP256K1,
                    p1: chunk_index as u8,
                    p2: chunk_count as u8,
                    data: chunk.to_vec(),
                };
                let answer = exchange(transport, &command).await?;
                match answer.return_code() {
                    sw::NO_ERRORS => Ok(answer.payload().to_vec()),
                    code @ (sw::DATA_INVALID | sw::BAD_KEY_HANDLE) => {
                        // The app appends a human-readable reason after
                        // these status words.
                        let detail = (!answer.payload().is_empty())
                            .then(|| String::from_utf8_lossy(answer.payload()).into_owned());
                        Err(Error::from_status(code, detail))
                    }
                    code => Err(Error::from_status(code, None)),
                }
            }
        }
    }
}

/// Run one transport exchange, folding the collaborator's error into the
/// crate's error type.
pub(crate) async fn exchange<T: Transport>(
    transport: &mut T,
    command: &ApduCommand,
) -> Result<ApduAnswer> {
    debug!(
        "=> cla={:#04x} ins={:#04x} p1={:#04x} p2={:#04x} data={}",
        command.cla,
        command.ins,
        command.p1,
        command.p2,
        hex::encode(&command.data)
    );
    let answer = transport
        .exchange(command)
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    debug!(
        "<= sw={:#06x} payload={}",
        answer.return_code(),
        hex::encode(answer.payload())
    );
    Ok(answer)
}

/// Split a signing request into its ordered frames: the serialized path
/// first, then the message in windows of at most [`CHUNK_SIZE`] bytes.
pub fn sign_chunks(path_bytes: Vec<u8>, message: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::with_capacity(1 + message.len().div_ceil(CHUNK_SIZE));
    chunks.push(path_bytes);
    chunks.extend(message.chunks(CHUNK_SIZE).map(<[u8]>::to_vec));
    chunks
}
