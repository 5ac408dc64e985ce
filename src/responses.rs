//! Typed decoders for the app's fixed-layout binary responses

use serde::{Deserialize, Serialize};

use crate::apdu::{ApduAnswer, sw};
use crate::error::{Error, Result};

/// Length of a compressed secp256k1 public key.
pub const COMPRESSED_PK_LEN: usize = 33;

/// App version and device lock state reported by GET_VERSION.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub test_mode: bool,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub device_locked: bool,
    /// Target id bytes, when the firmware appends them.
    pub target_id: Option<[u8; 4]>,
}

impl VersionInfo {
    pub fn decode(answer: &ApduAnswer) -> Result<Self> {
        check_status(answer)?;
        let payload = answer.payload();
        if payload.len() < 5 {
            return Err(Error::TruncatedResponse {
                expected: 5,
                actual: payload.len(),
            });
        }

        let target_id = if payload.len() >= 9 {
            let mut id = [0u8; 4];
            id.copy_from_slice(&payload[5..9]);
            Some(id)
        } else {
            None
        };

        Ok(Self {
            test_mode: payload[0] != 0,
            major: payload[1],
            minor: payload[2],
            patch: payload[3],
            device_locked: payload[4] == 1,
            target_id,
        })
    }
}

/// Metadata of the currently open app, from the dashboard query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfo {
    pub app_name: String,
    pub app_version: String,
    pub flag_len: u8,
    pub flags_value: u8,
    pub flag_recovery: bool,
    pub flag_signed_mcu_code: bool,
    pub flag_onboarded: bool,
    pub flag_pin_validated: bool,
}

impl AppInfo {
    pub fn decode(answer: &ApduAnswer) -> Result<Self> {
        check_status(answer)?;
        let mut cursor = Cursor::new(answer.payload());

        if cursor.take_u8()? != 1 {
            return Err(Error::UnrecognizedFormat);
        }

        let app_name = String::from_utf8_lossy(cursor.take_prefixed()?).into_owned();
        let app_version = String::from_utf8_lossy(cursor.take_prefixed()?).into_owned();
        let flags = cursor.take_prefixed()?;
        let flags_value = *flags.first().ok_or(Error::TruncatedResponse {
            expected: 1,
            actual: 0,
        })?;

        Ok(Self {
            app_name,
            app_version,
            flag_len: flags.len() as u8,
            flags_value,
            flag_recovery: flags_value & 0x01 != 0,
            flag_signed_mcu_code: flags_value & 0x02 != 0,
            flag_onboarded: flags_value & 0x04 != 0,
            flag_pin_validated: flags_value & 0x80 != 0,
        })
    }
}

/// Firmware details, from the dashboard-only device info query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub target_id: String,
    pub se_version: String,
    pub flag: String,
    pub mcu_version: String,
}

impl DeviceInfo {
    pub fn decode(answer: &ApduAnswer) -> Result<Self> {
        if answer.return_code() == sw::CLA_NOT_SUPPORTED {
            return Err(Error::OnlyInDashboard);
        }
        check_status(answer)?;

        let mut cursor = Cursor::new(answer.payload());
        let target_id = hex::encode(cursor.take(4)?);
        let se_version = String::from_utf8_lossy(cursor.take_prefixed()?).into_owned();
        let flag = hex::encode(cursor.take_prefixed()?);

        // The MCU firmware NUL-terminates its version string.
        let mcu_field = cursor.take_prefixed()?;
        let mcu_field = match mcu_field.split_last() {
            Some((&0, rest)) => rest,
            _ => mcu_field,
        };
        let mcu_version = String::from_utf8_lossy(mcu_field).into_owned();

        Ok(Self {
            target_id,
            se_version,
            flag,
            mcu_version,
        })
    }
}

/// Compressed public key and bech32 address from GET_ADDR_SECP256K1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub compressed_pk: Vec<u8>,
    pub bech32_address: String,
}

impl AddressResponse {
    pub fn decode(answer: &ApduAnswer) -> Result<Self> {
        check_status(answer)?;
        let payload = answer.payload();
        if payload.len() < COMPRESSED_PK_LEN {
            return Err(Error::TruncatedResponse {
                expected: COMPRESSED_PK_LEN,
                actual: payload.len(),
            });
        }

        Ok(Self {
            compressed_pk: payload[..COMPRESSED_PK_LEN].to_vec(),
            bech32_address: String::from_utf8_lossy(&payload[COMPRESSED_PK_LEN..]).into_owned(),
        })
    }
}

/// Reject any non-success status word; decoders never assume success.
fn check_status(answer: &ApduAnswer) -> Result<()> {
    match answer.return_code() {
        sw::NO_ERRORS => Ok(()),
        code => Err(Error::from_status(code, None)),
    }
}

/// Left-to-right cursor over a response payload. Every read is
/// bounds-checked so a truncated buffer surfaces as a protocol error
/// instead of a panic.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.saturating_add(len);
        if end > self.buf.len() {
            return Err(Error::TruncatedResponse {
                expected: end,
                actual: self.buf.len(),
            });
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn take_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// One `[len][bytes]` field.
    fn take_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.take_u8()? as usize;
        self.take(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(mut payload: Vec<u8>, code: u16) -> ApduAnswer {
        payload.extend_from_slice(&code.to_be_bytes());
        ApduAnswer::from_bytes(payload).unwrap()
    }

    #[test]
    fn version_decode_full_record() -> Result<()> {
        let info = VersionInfo::decode(&answer(
            vec![0, 2, 3, 4, 1, 0x31, 0x10, 0x00, 0x04],
            0x9000,
        ))?;
        assert!(!info.test_mode);
        assert_eq!((info.major, info.minor, info.patch), (2, 3, 4));
        assert!(info.device_locked);
        assert_eq!(info.target_id, Some([0x31, 0x10, 0x00, 0x04]));
        Ok(())
    }

    #[test]
    fn version_decode_without_target_id() -> Result<()> {
        let info = VersionInfo::decode(&answer(vec![1, 2, 0, 1, 0], 0x9000))?;
        assert!(info.test_mode);
        assert!(!info.device_locked);
        assert_eq!(info.target_id, None);
        Ok(())
    }

    #[test]
    fn version_decode_propagates_status() {
        let err = VersionInfo::decode(&answer(Vec::new(), 0x6986)).unwrap_err();
        assert!(matches!(err, Error::UserRejected));
    }

    #[test]
    fn version_decode_truncated() {
        assert!(matches!(
            VersionInfo::decode(&answer(vec![0, 2], 0x9000)),
            Err(Error::TruncatedResponse { .. })
        ));
    }

    #[test]
    fn app_info_decode_flags() -> Result<()> {
        let mut payload = vec![1];
        payload.push(3);
        payload.extend_from_slice(b"abc");
        payload.push(3);
        payload.extend_from_slice(b"1.0");
        payload.push(1);
        payload.push(0x85);

        let info = AppInfo::decode(&answer(payload, 0x9000))?;
        assert_eq!(info.app_name, "abc");
        assert_eq!(info.app_version, "1.0");
        assert_eq!(info.flag_len, 1);
        assert_eq!(info.flags_value, 0x85);
        assert!(info.flag_recovery);
        assert!(!info.flag_signed_mcu_code);
        assert!(!info.flag_onboarded);
        assert!(info.flag_pin_validated);
        Ok(())
    }

    #[test]
    fn app_info_rejects_unknown_format() {
        let err = AppInfo::decode(&answer(vec![2, 0], 0x9000)).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat));
        assert_eq!(err.return_code(), 0x9001);
    }

    #[test]
    fn app_info_truncated_name_field() {
        assert!(matches!(
            AppInfo::decode(&answer(vec![1, 10, b'a'], 0x9000)),
            Err(Error::TruncatedResponse { .. })
        ));
    }

    fn device_info_payload(mcu: &[u8]) -> Vec<u8> {
        let mut payload = vec![0x31, 0x10, 0x00, 0x04];
        payload.push(5);
        payload.extend_from_slice(b"1.6.0");
        payload.push(1);
        payload.push(0xa6);
        payload.push(mcu.len() as u8);
        payload.extend_from_slice(mcu);
        payload
    }

    #[test]
    fn device_info_strips_trailing_nul_from_mcu_version() -> Result<()> {
        let info = DeviceInfo::decode(&answer(device_info_payload(b"1.5.5\0"), 0x9000))?;
        assert_eq!(info.mcu_version, "1.5.5");
        Ok(())
    }

    #[test]
    fn device_info_keeps_mcu_version_without_nul() -> Result<()> {
        let info = DeviceInfo::decode(&answer(device_info_payload(b"1.5.5"), 0x9000))?;
        assert_eq!(info.mcu_version, "1.5.5");
        assert_eq!(info.target_id, "31100004");
        assert_eq!(info.se_version, "1.6.0");
        assert_eq!(info.flag, "a6");
        Ok(())
    }

    #[test]
    fn device_info_dashboard_only() {
        let err = DeviceInfo::decode(&answer(Vec::new(), 0x6e00)).unwrap_err();
        assert!(matches!(err, Error::OnlyInDashboard));
        assert_eq!(err.return_code(), 0x6e00);
    }

    #[test]
    fn address_decode_splits_key_and_address() -> Result<()> {
        let mut payload = vec![0xaa; COMPRESSED_PK_LEN];
        payload.extend_from_slice(b"tthor1xyz");

        let address = AddressResponse::decode(&answer(payload, 0x9000))?;
        assert_eq!(address.compressed_pk, vec![0xaa; COMPRESSED_PK_LEN]);
        assert_eq!(address.bech32_address, "tthor1xyz");
        Ok(())
    }

    #[test]
    fn address_decode_truncated() {
        assert!(matches!(
            AddressResponse::decode(&answer(vec![0xaa; 10], 0x9000)),
            Err(Error::TruncatedResponse { .. })
        ));
    }
}
