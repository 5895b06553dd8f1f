//! Packer driver: reads a source file and writes a phyzip archive.
//!
//! Sequences `open input, write magic, emit chunks` per the specification.
//! All human-readable reporting happens here (via the `log` facade); the
//! codec and container layers never print.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use crate::codec::compress;
use crate::container::{self, CHUNK_DATA, CHUNK_METADATA};
use crate::error::ArchiveError;
use crate::BLOCK_SIZE;

/// Packs `input_path` into a new archive at `output_path`.
///
/// Refuses to run if `output_path` already exists, or if `input_path`
/// already begins with the archive magic (packing an archive again would
/// silently double-wrap it).
pub fn run(input_path: &Path, output_path: &Path) -> Result<(), ArchiveError> {
    if output_path.exists() {
        return Err(ArchiveError::OutputAlreadyExists(output_path.to_path_buf()));
    }

    let metadata = fs::metadata(input_path).map_err(|_| ArchiveError::InvalidInput)?;
    if !metadata.is_file() {
        return Err(ArchiveError::InvalidInput);
    }
    let original_size = metadata.len();

    let mut input = File::open(input_path)?;
    if container::detect_magic(&mut input)? {
        return Err(ArchiveError::SourceAlreadyCompressed);
    }

    let name = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let output = File::create(output_path)?;
    let mut sink = BufWriter::new(output);

    let result = write_archive(&mut input, &mut sink, &name, original_size);
    if result.is_err() {
        drop(sink);
        let _ = fs::remove_file(output_path);
    }
    result
}

fn write_archive<R: Read + Seek, W: Write>(
    input: &mut R,
    sink: &mut W,
    name: &str,
    original_size: u64,
) -> Result<(), ArchiveError> {
    container::write_magic(sink)?;

    let metadata_payload = encode_metadata_payload(original_size, name);
    container::write_chunk(sink, CHUNK_METADATA, 0, &metadata_payload, 0)?;
    log::debug!("wrote metadata chunk: name={name:?} original_size={original_size}");

    let mut block = vec![0u8; BLOCK_SIZE];
    let mut compressed = vec![0u8; BLOCK_SIZE + BLOCK_SIZE / 32 + 64];
    let mut chunks_written = 0usize;

    loop {
        let read = read_block(input, &mut block)?;
        if read == 0 {
            break;
        }

        let written = compress(&block[..read], &mut compressed);
        container::write_chunk(sink, CHUNK_DATA, 0, &compressed[..written], read as u32)?;
        chunks_written += 1;
        log::debug!("wrote data chunk #{chunks_written}: {read} -> {written} bytes");
    }

    sink.flush()?;
    log::info!("packed {original_size} bytes into {chunks_written} data chunk(s)");
    Ok(())
}

/// Reads up to `buf.len()` bytes, looping on short reads, stopping only at
/// EOF. Mirrors `Read::read_exact` but tolerates a final partial block.
fn read_block<R: Read>(input: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Builds the metadata chunk payload: `u64 original_size || u16 name_len ||
/// name || 0x00`, where `name_len == name.len() + 1`.
fn encode_metadata_payload(original_size: u64, name: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(10 + name.len() + 1);
    payload.extend_from_slice(&original_size.to_le_bytes());
    let name_len = (name.len() + 1) as u16;
    payload.extend_from_slice(&name_len.to_le_bytes());
    payload.extend_from_slice(name.as_bytes());
    payload.push(0);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn metadata_payload_layout() {
        let payload = encode_metadata_payload(12345, "a.txt");
        assert_eq!(payload.len(), 10 + 6);
        assert_eq!(u64::from_le_bytes(payload[0..8].try_into().unwrap()), 12345);
        assert_eq!(u16::from_le_bytes(payload[8..10].try_into().unwrap()), 6);
        assert_eq!(&payload[10..15], b"a.txt");
        assert_eq!(payload[15], 0);
    }

    #[test]
    fn write_archive_emits_magic_metadata_and_data_chunks() {
        let mut input = Cursor::new(b"some file contents to compress".to_vec());
        let mut out = Vec::new();
        write_archive(&mut input, &mut out, "file.txt", 31).unwrap();

        assert_eq!(&out[..8], &container::MAGIC);
        let mut cursor = Cursor::new(&out[8..]);
        let meta_header = container::read_chunk_header(&mut cursor).unwrap();
        assert_eq!(meta_header.id, CHUNK_METADATA);
        let _ = container::read_chunk_payload(&mut cursor, &meta_header).unwrap();

        let data_header = container::read_chunk_header(&mut cursor).unwrap();
        assert_eq!(data_header.id, CHUNK_DATA);
        assert_eq!(data_header.extra, 31);
    }

    #[test]
    fn empty_input_produces_no_data_chunks() {
        let mut input = Cursor::new(Vec::<u8>::new());
        let mut out = Vec::new();
        write_archive(&mut input, &mut out, "empty.bin", 0).unwrap();

        let mut cursor = Cursor::new(&out[8..]);
        let meta_header = container::read_chunk_header(&mut cursor).unwrap();
        let _ = container::read_chunk_payload(&mut cursor, &meta_header).unwrap();

        // Nothing left to read: no data chunks were emitted.
        assert_eq!(cursor.position() as usize, out.len() - 8);
    }
}
