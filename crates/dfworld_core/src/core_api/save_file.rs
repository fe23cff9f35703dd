use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::decomp::DecompressedReader;
use crate::encoding::Cp437Encoding;
use crate::header::{FileHeader, HEADER_LEN};
use crate::offsets::offset_for;
use crate::reader::LittleEndianReader;
use crate::versions::version_label;
use crate::zchunk::{ChunkRead, ChunkReader};

use super::error::{CoreError, CoreErrorCode};
use super::types::{ChunkSpan, FileSummary, FortressSummary, SaveKind};

const SCRATCH_LEN: usize = 64 * 1024;

/// An open save file: the byte source, its header (read once at open), and
/// the save kind.
#[derive(Debug)]
pub struct SaveFile<R> {
    source: R,
    header: FileHeader,
    kind: SaveKind,
}

impl SaveFile<BufReader<File>> {
    /// Opens `path`, taking the save kind from `hint` or else from the file
    /// extension (`.sav` or `.dat`).
    pub fn open_path(path: impl AsRef<Path>, hint: Option<SaveKind>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let kind = match hint {
            Some(kind) => kind,
            None => SaveKind::from_path(path)?,
        };
        let file = File::open(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to open {}: {e}", path.display()),
            )
        })?;
        Self::open(BufReader::new(file), kind)
    }
}

impl<R: Read + Seek> SaveFile<R> {
    pub fn open(mut source: R, kind: SaveKind) -> Result<Self, CoreError> {
        source.seek(SeekFrom::Start(0))?;
        let header = FileHeader::read_from(&mut source)?;
        source.seek(SeekFrom::Start(0))?;
        debug!(
            version = header.version,
            compressed = header.is_compressed,
            %kind,
            "opened save file"
        );
        Ok(Self {
            source,
            header,
            kind,
        })
    }

    pub fn header(&self) -> FileHeader {
        self.header
    }

    pub fn kind(&self) -> SaveKind {
        self.kind
    }

    /// The whole file as its decompressed equivalent. Only compressed saves
    /// can be opened this way; read an uncompressed one through
    /// [`SaveFile::get_mut`].
    pub fn decompressed_reader(&mut self) -> Result<DecompressedReader<'_, R>, CoreError> {
        DecompressedReader::new(&mut self.source, &self.header)
    }

    /// Streams the decompressed file into `out`, returning the bytes written.
    pub fn decompress_to<W: Write>(&mut self, out: &mut W) -> Result<u64, CoreError> {
        let mut view = self.decompressed_reader()?;
        let written = io::copy(&mut view, out)?;
        debug!(written, chunks = view.chunks_started(), "decompressed save file");
        view.close();
        Ok(written)
    }

    pub fn summary(&mut self) -> Result<FileSummary, CoreError> {
        let version = self.header.version;
        let kind = self.kind;
        let summary = if self.header.is_compressed {
            let mut view = self.decompressed_reader()?;
            let summary = read_summary(&mut view, kind, version)?;
            view.close();
            summary
        } else {
            self.source.seek(SeekFrom::Start(0))?;
            read_summary(&mut self.source, kind, version)?
        };
        debug!(
            world = %summary.world_name,
            fortress = ?summary.fortress.as_ref().map(|f| f.name.as_str()),
            "read save summary"
        );
        Ok(summary)
    }

    /// Walks the compressed body once and describes every chunk. Offsets are
    /// absolute within the file.
    pub fn chunks(&mut self) -> Result<Vec<ChunkSpan>, CoreError> {
        if !self.header.is_compressed {
            return Err(CoreError::new(
                CoreErrorCode::AlreadyDecompressed,
                "save file is not compressed and has no chunks",
            ));
        }
        self.source.seek(SeekFrom::Start(HEADER_LEN as u64))?;

        let mut reader = ChunkReader::new(&mut self.source);
        let mut scratch = vec![0u8; SCRATCH_LEN];
        let mut spans = Vec::new();
        loop {
            match reader.read_chunk_data(&mut scratch)? {
                ChunkRead::Data(_) => {}
                ChunkRead::EndOfChunk(span) => spans.push(ChunkSpan {
                    offset: span.offset + HEADER_LEN as u64,
                    ..span
                }),
                ChunkRead::EndOfStream => break,
            }
        }
        Ok(spans)
    }
}

impl<R> SaveFile<R> {
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Releases the underlying source.
    pub fn close(self) {}
}

/// Reads the summary fields from a stream positioned at the start of a
/// decompressed save (header included).
fn read_summary<S: Read>(stream: S, kind: SaveKind, version: u32) -> Result<FileSummary, CoreError> {
    let mut r = LittleEndianReader::new(stream);
    let _decompressed_header = FileHeader::read_from(r.get_mut())?;
    r.skip(u64::from(offset_for(kind, version)))?;

    let encoding = Cp437Encoding::new();
    let fortress_name = if kind.has_fortress() {
        Some(r.read_legacy_string(&encoding)?)
    } else {
        None
    };
    let world_name = r.read_legacy_string(&encoding)?;
    let fortress = match fortress_name {
        Some(name) => Some(FortressSummary {
            name,
            year: r.read_u32()?,
        }),
        None => None,
    };

    Ok(FileSummary {
        version,
        version_string: version_label(version),
        world_name,
        fortress,
    })
}
