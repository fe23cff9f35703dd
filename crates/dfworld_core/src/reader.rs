use std::io::{self, Read};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::encoding::{Cp437Encoding, Encoding};

/// Forward-only little-endian field reader over any byte stream.
///
/// Nothing here seeks: a decompressed save can only be walked front to back.
pub struct LittleEndianReader<R> {
    inner: R,
}

impl<R: Read> LittleEndianReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_u32(&mut self) -> Result<u32, CoreError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, "u32")?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Discards exactly `n` bytes.
    pub fn skip(&mut self, n: u64) -> Result<(), CoreError> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        if skipped < n {
            return Err(CoreError::framing(format!(
                "premature end of file: skipped {skipped} of {n} bytes"
            )));
        }
        Ok(())
    }

    /// Reads a string with a u16 little-endian length prefix and decodes it
    /// with `encoding`.
    ///
    /// At most the declared number of bytes is consumed, even when the
    /// stream turns out to be shorter.
    pub fn read_legacy_string<E: Encoding>(&mut self, encoding: &E) -> Result<String, CoreError> {
        let mut prefix = [0u8; 2];
        let got = read_up_to(&mut self.inner, &mut prefix)?;
        if got < prefix.len() {
            return Err(CoreError::new(
                CoreErrorCode::TruncatedString,
                format!("string length prefix truncated: got {got} of 2 bytes"),
            ));
        }
        let len = u16::from_le_bytes(prefix);

        let mut raw = Vec::with_capacity(usize::from(len));
        (&mut self.inner).take(u64::from(len)).read_to_end(&mut raw)?;
        if raw.len() < usize::from(len) {
            return Err(CoreError::new(
                CoreErrorCode::TruncatedString,
                format!("string declares {len} bytes but only {} remain", raw.len()),
            ));
        }

        Ok(encoding.decode(&raw).into_owned())
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn fill(&mut self, buf: &mut [u8], what: &str) -> Result<(), CoreError> {
        self.inner.read_exact(buf).map_err(|e| {
            let err = CoreError::from(e);
            CoreError::new(err.code, format!("reading {what}: {}", err.message))
        })
    }
}

/// Reads a CP437 string with a u16 little-endian length prefix.
pub fn read_string<R: Read>(reader: &mut R) -> Result<String, CoreError> {
    LittleEndianReader::new(reader).read_legacy_string(&Cp437Encoding)
}

fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prefixed(raw: &[u8]) -> Vec<u8> {
        let mut out = (raw.len() as u16).to_le_bytes().to_vec();
        out.extend_from_slice(raw);
        out
    }

    #[test]
    fn reads_prefixed_cp437_string() {
        let mut cursor = Cursor::new(prefixed(&[0xad, b'x', b'!']));
        assert_eq!(read_string(&mut cursor).unwrap(), "¡x!");
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn zero_length_string_is_empty() {
        let mut bytes = prefixed(b"");
        bytes.extend(prefixed(b"next"));
        let mut cursor = Cursor::new(bytes);
        assert_eq!(read_string(&mut cursor).unwrap(), "");
        assert_eq!(read_string(&mut cursor).unwrap(), "next");
    }

    #[test]
    fn overlong_length_is_truncated_string_error() {
        let mut bytes = 10u16.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"abc");
        let mut cursor = Cursor::new(bytes);

        let err = read_string(&mut cursor).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::TruncatedString);
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn length_is_bounded_by_prefix() {
        let mut bytes = prefixed(b"Thur");
        bytes.extend_from_slice(b" Minbaz");
        let mut cursor = Cursor::new(bytes);
        assert_eq!(read_string(&mut cursor).unwrap(), "Thur");
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn missing_prefix_is_truncated_string_error() {
        let err = read_string(&mut Cursor::new(vec![0x04])).unwrap_err();
        assert_eq!(err.code, CoreErrorCode::TruncatedString);
    }

    #[test]
    fn integers_are_little_endian() {
        let mut r = LittleEndianReader::new(Cursor::new(vec![
            0x05, 0x00, 0x00, 0x00, 0xa6, 0x05, 0x00, 0x00, 0x01, 0x02,
        ]));
        assert_eq!(r.read_u32().unwrap(), 5);
        assert_eq!(r.read_u32().unwrap(), 1446);
        assert_eq!(r.read_u32().unwrap_err().code, CoreErrorCode::Framing);
    }

    #[test]
    fn skip_past_end_is_framing_error() {
        let mut r = LittleEndianReader::new(Cursor::new(vec![0u8; 10]));
        r.skip(4).unwrap();
        assert_eq!(r.read_u32().unwrap(), 0);
        assert_eq!(r.skip(8).unwrap_err().code, CoreErrorCode::Framing);
    }
}
