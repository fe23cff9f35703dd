use std::io::{Cursor, Write};

use dfworld_core::zchunk::{ChunkRead, ChunkReader};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use quickcheck_macros::quickcheck;

fn chunk(plain: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(plain).unwrap();
    let packed = encoder.finish().unwrap();
    let mut out = (packed.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(&packed);
    out
}

fn inflate_all(bytes: Vec<u8>, buf_len: usize) -> Vec<u8> {
    let mut reader = ChunkReader::new(Cursor::new(bytes));
    let mut buf = vec![0u8; buf_len];
    let mut out = Vec::new();
    loop {
        match reader.read_chunk_data(&mut buf).unwrap() {
            ChunkRead::Data(n) => out.extend_from_slice(&buf[..n]),
            ChunkRead::EndOfChunk(_) => {}
            ChunkRead::EndOfStream => return out,
        }
    }
}

#[quickcheck]
fn single_chunk_round_trips(data: Vec<u8>, buf_len: u8) -> bool {
    let buf_len = usize::from(buf_len).max(1);
    inflate_all(chunk(&data), buf_len) == data
}

#[quickcheck]
fn concatenated_chunks_round_trip(blocks: Vec<Vec<u8>>, buf_len: u8) -> bool {
    let buf_len = usize::from(buf_len).max(1);
    let stream: Vec<u8> = blocks.iter().flat_map(|b| chunk(b)).collect();
    inflate_all(stream, buf_len) == blocks.concat()
}
