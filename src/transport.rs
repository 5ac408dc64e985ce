//! Transport abstraction over the physical device connection

use std::fmt::Display;

use async_trait::async_trait;

use crate::apdu::{ApduAnswer, ApduCommand};

/// Generic trait to abstract the communication layer between the host and
/// the Ledger device.
///
/// Implementations perform exactly one physical exchange per call and
/// return the raw response including the trailing status word; connection
/// management, discovery and timeout policy all live behind this trait.
/// The `&mut self` receiver keeps the protocol single-outstanding within
/// one client; serializing access across clients sharing a device is the
/// host's responsibility.
#[async_trait]
pub trait Transport: Send {
    type Error: Display + Send + Sync;

    async fn exchange(&mut self, command: &ApduCommand) -> Result<ApduAnswer, Self::Error>;
}
