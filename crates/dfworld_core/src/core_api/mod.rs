mod error;
mod save_file;
mod types;

pub use error::{CoreError, CoreErrorCode};
pub use save_file::SaveFile;
pub use types::{ChunkSpan, FileSummary, FortressSummary, SaveKind};
