//! Streams of concatenated zlib blocks, each prefixed by a 32-bit
//! little-endian length.
//!
//! [`ChunkReader`] inflates one block at a time and reports block boundaries
//! to the caller instead of hiding them, so that a truncated length prefix can
//! be told apart from the sequence simply running out.

use std::io::{self, Read};

use flate2::{Decompress, FlushDecompress, Status};
use tracing::{debug, trace};

use crate::core_api::{ChunkSpan, CoreError};

const LENGTH_PREFIX_LEN: usize = 4;
const INPUT_BUFFER_LEN: usize = 32 * 1024;

/// Outcome of a single [`ChunkReader::read_chunk_data`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRead {
    /// `n` decompressed bytes were written to the front of the buffer.
    Data(usize),
    /// The current chunk is exhausted; the next read starts a new one.
    EndOfChunk(ChunkSpan),
    /// No further chunks. Repeated reads keep returning this.
    EndOfStream,
}

struct ActiveChunk {
    span: ChunkSpan,
    /// Compressed bytes of this chunk still unread from the source.
    remaining: u64,
    inflater: Decompress,
    stream_ended: bool,
}

enum State {
    Boundary,
    Chunk(ActiveChunk),
    Finished,
}

/// Compressed input already pulled from the source. Never holds bytes past
/// the end of the current chunk.
struct InputBuffer {
    bytes: Box<[u8]>,
    pos: usize,
    end: usize,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            bytes: vec![0u8; INPUT_BUFFER_LEN].into_boxed_slice(),
            pos: 0,
            end: 0,
        }
    }

    fn pending(&self) -> &[u8] {
        &self.bytes[self.pos..self.end]
    }

    fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.end);
    }

    fn clear(&mut self) {
        self.pos = 0;
        self.end = 0;
    }

    fn fill<R: Read>(&mut self, inner: &mut R, limit: usize) -> io::Result<usize> {
        self.clear();
        let limit = limit.min(self.bytes.len());
        loop {
            match inner.read(&mut self.bytes[..limit]) {
                Ok(n) => {
                    self.end = n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

pub struct ChunkReader<R> {
    inner: R,
    state: State,
    input: InputBuffer,
    consumed: u64,
    chunks_started: u64,
}

impl<R: Read> ChunkReader<R> {
    /// `inner` must be positioned at a length prefix (or at end of file).
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: State::Boundary,
            input: InputBuffer::new(),
            consumed: 0,
            chunks_started: 0,
        }
    }

    /// Reads decompressed bytes of the current chunk into `buf`, starting a
    /// new chunk first if the previous one has been exhausted.
    pub fn read_chunk_data(&mut self, buf: &mut [u8]) -> Result<ChunkRead, CoreError> {
        loop {
            let chunk = match &mut self.state {
                State::Finished => return Ok(ChunkRead::EndOfStream),
                State::Boundary => {
                    self.state = match self.begin_chunk()? {
                        Some(chunk) => State::Chunk(chunk),
                        None => {
                            debug!(chunks = self.chunks_started, "chunk stream finished");
                            State::Finished
                        }
                    };
                    continue;
                }
                State::Chunk(chunk) => chunk,
            };

            if chunk.stream_ended {
                let span = chunk.span;
                let leftover = chunk.remaining;
                self.input.clear();
                self.state = State::Boundary;
                if leftover > 0 {
                    trace!(index = span.index, leftover, "discarding padding after zlib stream");
                    self.skip_source(leftover, span.index)?;
                }
                trace!(
                    index = span.index,
                    compressed_len = span.compressed_len,
                    decompressed_len = span.decompressed_len,
                    "end of chunk"
                );
                return Ok(ChunkRead::EndOfChunk(span));
            }

            if buf.is_empty() {
                return Ok(ChunkRead::Data(0));
            }

            if self.input.is_empty() && chunk.remaining > 0 {
                let want = chunk.remaining.min(INPUT_BUFFER_LEN as u64) as usize;
                let n = self.input.fill(&mut self.inner, want)?;
                if n == 0 {
                    return Err(CoreError::framing(format!(
                        "chunk {} truncated: {} of {} compressed bytes missing",
                        chunk.span.index, chunk.remaining, chunk.span.compressed_len
                    )));
                }
                chunk.remaining -= n as u64;
                self.consumed += n as u64;
            }

            let before_in = chunk.inflater.total_in();
            let before_out = chunk.inflater.total_out();
            let status = chunk
                .inflater
                .decompress(self.input.pending(), buf, FlushDecompress::None)
                .map_err(|e| {
                    CoreError::decode(format!("chunk {}: corrupt zlib data: {e}", chunk.span.index))
                })?;
            let consumed = (chunk.inflater.total_in() - before_in) as usize;
            let produced = (chunk.inflater.total_out() - before_out) as usize;
            self.input.consume(consumed);
            chunk.span.decompressed_len += produced as u64;
            if status == Status::StreamEnd {
                chunk.stream_ended = true;
            }

            if produced > 0 {
                return Ok(ChunkRead::Data(produced));
            }
            if chunk.stream_ended || consumed > 0 {
                continue;
            }
            if self.input.is_empty() && chunk.remaining == 0 {
                return Err(CoreError::decode(format!(
                    "chunk {}: zlib stream incomplete after {} compressed bytes",
                    chunk.span.index, chunk.span.compressed_len
                )));
            }
            if !self.input.is_empty() {
                return Err(CoreError::decode(format!(
                    "chunk {}: zlib stream made no progress",
                    chunk.span.index
                )));
            }
        }
    }

    /// Number of chunks whose length prefix has been read so far.
    pub fn chunks_started(&self) -> u64 {
        self.chunks_started
    }

    /// Source bytes consumed since this reader was created.
    pub fn position(&self) -> u64 {
        self.consumed
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn begin_chunk(&mut self) -> Result<Option<ActiveChunk>, CoreError> {
        let offset = self.consumed;
        let Some(length) = self.read_length_prefix()? else {
            return Ok(None);
        };

        let index = self.chunks_started;
        self.chunks_started += 1;
        trace!(index, offset, length, "start of chunk");

        Ok(Some(ActiveChunk {
            span: ChunkSpan {
                index,
                offset,
                compressed_len: length,
                decompressed_len: 0,
            },
            remaining: u64::from(length),
            inflater: Decompress::new(true),
            // An empty chunk carries no zlib stream at all.
            stream_ended: length == 0,
        }))
    }

    fn read_length_prefix(&mut self) -> Result<Option<u32>, CoreError> {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        let mut filled = 0;
        while filled < LENGTH_PREFIX_LEN {
            match self.inner.read(&mut prefix[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.consumed += filled as u64;

        match filled {
            0 => Ok(None),
            LENGTH_PREFIX_LEN => Ok(Some(u32::from_le_bytes(prefix))),
            // Nothing has been delivered yet, so the sequence is simply empty.
            n if self.chunks_started == 0 => {
                debug!(bytes = n, "partial length prefix before first chunk");
                Ok(None)
            }
            n => Err(CoreError::framing(format!(
                "chunk length prefix truncated: got {n} of {LENGTH_PREFIX_LEN} bytes"
            ))),
        }
    }

    fn skip_source(&mut self, n: u64, index: u64) -> Result<(), CoreError> {
        let skipped = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.consumed += skipped;
        if skipped < n {
            return Err(CoreError::framing(format!(
                "chunk {index} truncated: {} compressed bytes missing",
                n - skipped
            )));
        }
        Ok(())
    }
}
