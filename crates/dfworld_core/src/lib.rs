//! Reading Dwarf Fortress `world.sav` / `world.dat` files.
//!
//! A save starts with an 8-byte header (`version`, `is_compressed`). The
//! body is either raw or a run of zlib chunks, each behind a 32-bit length.
//! [`core_api::SaveFile`] is the entry point; the lower-level readers are
//! public for callers who want to stream the body themselves.

pub mod core_api;
pub mod decomp;
pub mod encoding;
pub mod header;
pub mod offsets;
pub mod reader;
pub mod versions;
pub mod zchunk;
