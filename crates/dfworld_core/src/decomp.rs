use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::header::{FileHeader, HEADER_LEN};
use crate::zchunk::{ChunkRead, ChunkReader};

/// A compressed save seen as its decompressed equivalent: the save header
/// with the compression flag cleared, followed by every chunk inflated and
/// concatenated.
///
/// The view mutably borrows the source for its whole lifetime, so the source
/// cannot be touched, and no second view opened, until it is dropped.
pub struct DecompressedReader<'a, R> {
    header: [u8; HEADER_LEN],
    header_pos: usize,
    chunks: ChunkReader<&'a mut R>,
}

impl<'a, R: Read + Seek> DecompressedReader<'a, R> {
    /// Rewinds `source` to the start of the file.
    ///
    /// Fails without touching `source` when `header` says the file is not
    /// compressed.
    pub fn new(source: &'a mut R, header: &FileHeader) -> Result<Self, CoreError> {
        if !header.is_compressed {
            return Err(CoreError::new(
                CoreErrorCode::AlreadyDecompressed,
                "save file is already decompressed",
            ));
        }
        source.seek(SeekFrom::Start(0))?;
        debug!(version = header.version, "opened decompressed view");

        Ok(Self {
            header: header.decompressed().to_bytes(),
            header_pos: 0,
            chunks: ChunkReader::new(source),
        })
    }
}

impl<R: Read> DecompressedReader<'_, R> {
    /// Like [`Read::read`] but keeps the error typed.
    pub fn read_decompressed(&mut self, buf: &mut [u8]) -> Result<usize, CoreError> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.header_pos < HEADER_LEN {
            let n = buf.len().min(HEADER_LEN - self.header_pos);
            buf[..n].copy_from_slice(&self.header[self.header_pos..self.header_pos + n]);
            // The on-disk header is raw and occupies the same span; drop it in step.
            let mut discard = [0u8; HEADER_LEN];
            self.chunks
                .get_mut()
                .read_exact(&mut discard[..n])
                .map_err(|e| {
                    let err = CoreError::from(e);
                    CoreError::new(err.code, format!("save header: {}", err.message))
                })?;
            self.header_pos += n;
            return Ok(n);
        }

        loop {
            match self.chunks.read_chunk_data(buf)? {
                ChunkRead::Data(n) => return Ok(n),
                ChunkRead::EndOfChunk(span) => {
                    trace!(index = span.index, "continuing with next chunk");
                }
                ChunkRead::EndOfStream => return Ok(0),
            }
        }
    }

    /// Number of chunks entered so far.
    pub fn chunks_started(&self) -> u64 {
        self.chunks.chunks_started()
    }

    /// Releases the in-flight chunk state. The borrowed source stays open.
    pub fn close(self) {}
}

impl<R: Read> Read for DecompressedReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_decompressed(buf).map_err(io::Error::from)
    }
}
