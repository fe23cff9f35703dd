use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;

pub const HEADER_LEN: usize = 8;

const FLAG_UNCOMPRESSED: u32 = 0;
const FLAG_COMPRESSED: u32 = 1;

/// The fixed save header: `version: u32`, `is_compressed: u32`, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHeader {
    pub version: u32,
    pub is_compressed: bool,
}

impl FileHeader {
    pub fn parse(bytes: [u8; HEADER_LEN]) -> Result<Self, CoreError> {
        let version = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let flag = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let is_compressed = match flag {
            FLAG_UNCOMPRESSED => false,
            FLAG_COMPRESSED => true,
            other => {
                return Err(CoreError::decode(format!(
                    "invalid compression flag {other} in save header (expected 0 or 1)"
                )));
            }
        };
        Ok(Self {
            version,
            is_compressed,
        })
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, CoreError> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf).map_err(|e| {
            let err = CoreError::from(e);
            CoreError::new(err.code, format!("reading save header: {}", err.message))
        })?;
        Self::parse(buf)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let flag = if self.is_compressed {
            FLAG_COMPRESSED
        } else {
            FLAG_UNCOMPRESSED
        };
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..].copy_from_slice(&flag.to_le_bytes());
        out
    }

    /// The header as it appears at the front of a decompressed stream.
    pub fn decompressed(&self) -> Self {
        Self {
            is_compressed: false,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::core_api::CoreErrorCode;

    #[test]
    fn parse_reads_little_endian_fields() {
        let header = FileHeader::parse([0xa6, 0x05, 0, 0, 1, 0, 0, 0]).unwrap();
        assert_eq!(header.version, 1446);
        assert!(header.is_compressed);
        assert_eq!(header.to_bytes(), [0xa6, 0x05, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn decompressed_clears_only_the_flag() {
        let header = FileHeader {
            version: 1446,
            is_compressed: true,
        };
        let bytes = header.decompressed().to_bytes();
        assert_eq!(&bytes[..4], &header.to_bytes()[..4]);
        assert_eq!(&bytes[4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn flag_other_than_zero_or_one_is_a_decode_error() {
        let err = FileHeader::parse([0xa6, 0x05, 0, 0, 2, 0, 0, 0]).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Decode);
    }

    #[test]
    fn short_header_is_a_framing_error() {
        let err = FileHeader::read_from(&mut Cursor::new(vec![0xa6, 0x05, 0])).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::Framing);
    }
}
