//! Rust client for the THORChain app on Ledger hardware wallets
//!
//! This crate implements the app's APDU command/response protocol:
//! version negotiation, chunked payload transmission, and structured
//! decoding of the device's fixed-layout binary responses. The physical
//! connection is injected behind the [`Transport`] trait; USB/HID/TCP
//! handling lives in the host application.
//!
//! # Examples
//!
//! ```no_run
//! use ledger_thorchain::{ApduAnswer, ApduCommand, Bip32Path, ThorchainApp, Transport};
//!
//! struct MyTransport;
//!
//! #[async_trait::async_trait]
//! impl Transport for MyTransport {
//!     type Error = std::io::Error;
//!
//!     async fn exchange(&mut self, command: &ApduCommand) -> Result<ApduAnswer, Self::Error> {
//!         // hand `command.serialize()` to the device and wrap the reply
//!         # let _ = command;
//!         # unimplemented!()
//!     }
//! }
//!
//! # async fn run() -> ledger_thorchain::Result<()> {
//! let mut app = ThorchainApp::new(MyTransport);
//!
//! let version = app.get_version().await?;
//! println!("app {}.{}.{}", version.major, version.minor, version.patch);
//!
//! let path = Bip32Path::thorchain(0, 0);
//! let address = app.get_address(&path, "thor").await?;
//! println!("address: {}", address.bech32_address);
//!
//! let signature = app.sign(&path, b"signed bytes").await?;
//! println!("signature: {}", hex::encode(signature));
//! # Ok(())
//! # }
//! ```

pub mod apdu;
mod client;
mod error;
mod path;
mod protocol;
mod responses;
mod transport;

pub use apdu::{ApduAnswer, ApduCommand};
pub use client::{DEFAULT_HRP, ThorchainApp, bech32_from_pubkey};
pub use error::{Error, Result};
pub use path::{Bip32Path, COIN_TYPE, HARDENED, serialize_hrp};
pub use protocol::sign_chunks;
pub use responses::{AddressResponse, AppInfo, DeviceInfo, VersionInfo};
pub use transport::Transport;
