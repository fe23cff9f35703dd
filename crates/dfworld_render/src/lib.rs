use std::fmt::Write as _;

use dfworld_core::core_api::{ChunkSpan, FileSummary, SaveKind};
use dfworld_core::header::FileHeader;
use serde_json::{Map as JsonMap, Value as JsonValue};

const CHUNK_COL_INDEX: usize = 6;
const CHUNK_COL_OFFSET: usize = 12;
const CHUNK_COL_COMPRESSED: usize = 12;
const CHUNK_COL_DECOMPRESSED: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

pub fn render_summary_json(summary: &FileSummary, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(summary_json(summary)),
    }
}

pub fn render_chunks_json(spans: &[ChunkSpan], style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(chunks_json(spans)),
    }
}

pub fn render_header_json(header: &FileHeader, kind: SaveKind, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert("version".to_string(), JsonValue::from(header.version));
            out.insert(
                "compressed".to_string(),
                JsonValue::Bool(header.is_compressed),
            );
            out.insert("kind".to_string(), JsonValue::from(kind.as_str()));
            JsonValue::Object(out)
        }
    }
}

/// The world description shown by `dfworld info`.
pub fn render_summary_text(summary: &FileSummary) -> String {
    let mut out = String::new();
    writeln!(&mut out, "World {}:", summary.world_name).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Created with Dwarf Fortress version {}",
        summary.version_string
    )
    .expect("writing to String cannot fail");
    match &summary.fortress {
        Some(fortress) => {
            writeln!(&mut out, "Current year: {}", fortress.year)
                .expect("writing to String cannot fail");
            writeln!(&mut out, "Fortress name: {}", fortress.name)
                .expect("writing to String cannot fail");
        }
        None => {
            writeln!(&mut out, "No active fortress").expect("writing to String cannot fail");
        }
    }
    out
}

pub fn render_chunks_text(spans: &[ChunkSpan]) -> String {
    let mut out = String::new();
    writeln!(
        &mut out,
        "{:>w0$}{:>w1$}{:>w2$}{:>w3$}",
        "#",
        "Offset",
        "Compressed",
        "Decompressed",
        w0 = CHUNK_COL_INDEX,
        w1 = CHUNK_COL_OFFSET,
        w2 = CHUNK_COL_COMPRESSED,
        w3 = CHUNK_COL_DECOMPRESSED,
    )
    .expect("writing to String cannot fail");
    for span in spans {
        writeln!(
            &mut out,
            "{:>w0$}{:>w1$}{:>w2$}{:>w3$}",
            span.index,
            span.offset,
            span.compressed_len,
            span.decompressed_len,
            w0 = CHUNK_COL_INDEX,
            w1 = CHUNK_COL_OFFSET,
            w2 = CHUNK_COL_COMPRESSED,
            w3 = CHUNK_COL_DECOMPRESSED,
        )
        .expect("writing to String cannot fail");
    }
    let (compressed, decompressed) = totals(spans);
    writeln!(
        &mut out,
        "{} chunks, {} bytes compressed, {} bytes decompressed",
        spans.len(),
        compressed,
        decompressed
    )
    .expect("writing to String cannot fail");
    out
}

pub fn render_header_text(header: &FileHeader, kind: SaveKind) -> String {
    format!(
        "version={} compressed={} kind={}\n",
        header.version, header.is_compressed, kind
    )
}

fn summary_json(summary: &FileSummary) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("version".to_string(), JsonValue::from(summary.version));
    out.insert(
        "version_string".to_string(),
        JsonValue::String(summary.version_string.clone()),
    );
    out.insert(
        "world_name".to_string(),
        JsonValue::String(summary.world_name.clone()),
    );
    out.insert(
        "fortress".to_string(),
        match &summary.fortress {
            Some(fortress) => {
                let mut map = JsonMap::new();
                map.insert("name".to_string(), JsonValue::String(fortress.name.clone()));
                map.insert("year".to_string(), JsonValue::from(fortress.year));
                JsonValue::Object(map)
            }
            None => JsonValue::Null,
        },
    );
    out
}

fn chunks_json(spans: &[ChunkSpan]) -> JsonMap<String, JsonValue> {
    let (compressed, decompressed) = totals(spans);
    let mut out = JsonMap::new();
    out.insert("count".to_string(), JsonValue::from(spans.len()));
    out.insert("compressed_bytes".to_string(), JsonValue::from(compressed));
    out.insert(
        "decompressed_bytes".to_string(),
        JsonValue::from(decompressed),
    );
    out.insert(
        "chunks".to_string(),
        JsonValue::Array(
            spans
                .iter()
                .map(|span| {
                    let mut map = JsonMap::new();
                    map.insert("index".to_string(), JsonValue::from(span.index));
                    map.insert("offset".to_string(), JsonValue::from(span.offset));
                    map.insert(
                        "compressed_len".to_string(),
                        JsonValue::from(span.compressed_len),
                    );
                    map.insert(
                        "decompressed_len".to_string(),
                        JsonValue::from(span.decompressed_len),
                    );
                    JsonValue::Object(map)
                })
                .collect(),
        ),
    );
    out
}

fn totals(spans: &[ChunkSpan]) -> (u64, u64) {
    spans.iter().fold((0, 0), |(c, d), span| {
        (c + u64::from(span.compressed_len), d + span.decompressed_len)
    })
}
