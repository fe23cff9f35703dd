use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{CoreError, CoreErrorCode};

/// Whether a save carries an active fortress (`world.sav`) or only the
/// world (`world.dat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveKind {
    WorldOnly,
    FortressActive,
}

impl SaveKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("sav") {
            Some(Self::FortressActive)
        } else if extension.eq_ignore_ascii_case("dat") {
            Some(Self::WorldOnly)
        } else {
            None
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        Self::from_extension(extension).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnsupportedKind,
                format!(
                    "cannot determine save kind of {}: extension {:?} is not .sav or .dat",
                    path.display(),
                    extension
                ),
            )
        })
    }

    pub fn has_fortress(&self) -> bool {
        matches!(self, Self::FortressActive)
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::WorldOnly => "world",
            Self::FortressActive => "fortress",
        }
    }
}

impl fmt::Display for SaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortressSummary {
    pub name: String,
    pub year: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub version: u32,
    pub version_string: String,
    pub world_name: String,
    pub fortress: Option<FortressSummary>,
}

/// One chunk of a compressed body, as observed while streaming through it.
///
/// `offset` points at the chunk's length prefix. It is relative to wherever
/// the chunk reader started unless the caller rebases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub index: u64,
    pub offset: u64,
    pub compressed_len: u32,
    pub decompressed_len: u64,
}
