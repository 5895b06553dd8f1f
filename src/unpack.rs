//! Unpacker driver: validates and iterates a phyzip archive's chunks,
//! reconstructing the original file.
//!
//! All human-readable reporting happens here; the codec and container
//! layers never print. Unknown chunk ids are tolerated and skipped, per
//! the container's forward-compatibility contract.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::codec::decompress;
use crate::container::{self, CHUNK_DATA, CHUNK_METADATA};
use crate::error::ArchiveError;

/// Smallest valid metadata chunk payload size: the 10-byte header fields
/// plus at least a 1-byte NUL-terminated name. A payload of exactly 10
/// bytes has no name byte at all and must be rejected.
const MIN_METADATA_PAYLOAD: usize = 11;

/// Largest metadata chunk payload this unpacker will allocate for.
const MAX_METADATA_PAYLOAD: usize = 65536;

/// Unpacks the archive at `archive_path` into the current working
/// directory, under its stored name.
///
/// Refuses to run if `archive_path` does not start with the archive magic,
/// or if a file already exists at the stored name.
pub fn run(archive_path: &Path) -> Result<PathBuf, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut source = BufReader::new(file);

    if !container::detect_magic(&mut source)? {
        return Err(ArchiveError::NotAnArchive);
    }
    source.seek(SeekFrom::Start(8))?;

    let archive_len = fs::metadata(archive_path)?.len();
    let outcome = extract(&mut source, archive_len - 8);
    outcome
}

struct Metadata {
    original_size: u64,
    name: String,
}

fn extract<R: Read + Seek>(source: &mut R, payload_len: u64) -> Result<PathBuf, ArchiveError> {
    let mut metadata: Option<Metadata> = None;
    let mut sink: Option<BufWriter<File>> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut total_extracted: u64 = 0;
    let mut consumed: u64 = 0;

    while consumed < payload_len {
        let header = container::read_chunk_header(source)?;
        let chunk_start = consumed;
        consumed += 16 + u64::from(header.size);

        match header.id {
            CHUNK_METADATA => {
                let size = header.size as usize;
                if !(MIN_METADATA_PAYLOAD..MAX_METADATA_PAYLOAD).contains(&size) {
                    return Err(ArchiveError::MetadataPayloadOutOfRange(size));
                }
                let payload = container::read_chunk_payload(source, &header)?;
                let parsed = parse_metadata_payload(&payload);

                if Path::new(&parsed.name).exists() {
                    return Err(ArchiveError::OutputAlreadyExists(PathBuf::from(&parsed.name)));
                }
                let path = PathBuf::from(&parsed.name);
                let file = File::create(&path)?;
                log::info!(
                    "unpacking {:?} ({} bytes original size)",
                    parsed.name,
                    parsed.original_size
                );
                sink = Some(BufWriter::new(file));
                output_path = Some(path);
                metadata = Some(parsed);
            }
            CHUNK_DATA => {
                if metadata.is_none() {
                    return Err(ArchiveError::MissingMetadata);
                }
                let writer = sink.as_mut().expect("metadata chunk always creates a sink");

                let payload = container::read_chunk_payload(source, &header)?;
                let mut decoded = vec![0u8; header.extra as usize];
                let decoded_len = decompress(&payload, &mut decoded);
                if decoded_len == 0 && header.extra != 0 {
                    return Err(ArchiveError::DecodeFailed);
                }
                if decoded_len as u32 != header.extra {
                    return Err(ArchiveError::DecodedLengthMismatch {
                        expected: header.extra,
                        actual: decoded_len,
                    });
                }

                writer.write_all(&decoded[..decoded_len])?;
                total_extracted += u64::from(header.extra);
                log::debug!("extracted data chunk at offset {chunk_start}: {decoded_len} bytes");
            }
            other => {
                log::warn!("skipping unknown chunk id {other} at offset {chunk_start}");
                source.seek(SeekFrom::Current(i64::from(header.size)))?;
            }
        }
    }

    let path = output_path.ok_or(ArchiveError::MissingMetadata)?;
    if let Some(mut writer) = sink {
        writer.flush()?;
    }
    log::info!("unpacked {total_extracted} bytes to {path:?}");
    Ok(path)
}

fn parse_metadata_payload(payload: &[u8]) -> Metadata {
    let original_size = u64::from_le_bytes(payload[0..8].try_into().unwrap());
    let declared_len = u16::from_le_bytes(payload[8..10].try_into().unwrap()) as usize;
    let name_len = declared_len.min(payload.len() - 10);
    let name_bytes = &payload[10..10 + name_len];
    // Stored name is NUL-terminated; drop the terminator if present.
    let name_bytes = match name_bytes.last() {
        Some(0) => &name_bytes[..name_bytes.len() - 1],
        _ => name_bytes,
    };
    let name = String::from_utf8_lossy(name_bytes).into_owned();
    Metadata { original_size, name }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::compress;
    use crate::container::{CHUNK_DATA, CHUNK_METADATA};
    use std::io::Cursor;

    fn build_archive(name: &str, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut payload = Vec::new();
        payload.extend_from_slice(&(data.len() as u64).to_le_bytes());
        let name_len = (name.len() + 1) as u16;
        payload.extend_from_slice(&name_len.to_le_bytes());
        payload.extend_from_slice(name.as_bytes());
        payload.push(0);
        container::write_chunk(&mut out, CHUNK_METADATA, 0, &payload, 0).unwrap();

        let mut compressed = vec![0u8; data.len() + data.len() / 32 + 64];
        let n = compress(data, &mut compressed);
        container::write_chunk(&mut out, CHUNK_DATA, 0, &compressed[..n], data.len() as u32)
            .unwrap();
        out
    }

    #[test]
    fn parses_metadata_payload_with_nul_terminator() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&42u64.to_le_bytes());
        payload.extend_from_slice(&6u16.to_le_bytes());
        payload.extend_from_slice(b"a.txt");
        payload.push(0);

        let meta = parse_metadata_payload(&payload);
        assert_eq!(meta.original_size, 42);
        assert_eq!(meta.name, "a.txt");
    }

    #[test]
    fn extract_reconstructs_known_archive_bytes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile_dir();
        let cwd_guard = ChangeDir::new(&dir);

        let archive = build_archive("out.bin", b"hello hello hello world");
        let mut cursor = Cursor::new(&archive[8..]);
        let path = extract(&mut cursor, (archive.len() - 8) as u64).unwrap();

        let written = fs::read(&path).unwrap();
        assert_eq!(written, b"hello hello hello world");
        drop(cwd_guard);
    }

    #[test]
    fn unknown_chunk_id_is_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile_dir();
        let cwd_guard = ChangeDir::new(&dir);

        let mut archive = Vec::new();
        let mut meta_payload = Vec::new();
        meta_payload.extend_from_slice(&5u64.to_le_bytes());
        meta_payload.extend_from_slice(&4u16.to_le_bytes());
        meta_payload.extend_from_slice(b"x.b");
        meta_payload.push(0);
        container::write_chunk(&mut archive, CHUNK_METADATA, 0, &meta_payload, 0).unwrap();
        container::write_chunk(&mut archive, 999, 0, b"ignored payload data", 0).unwrap();
        let mut compressed = vec![0u8; 32];
        let n = compress(b"hello", &mut compressed);
        container::write_chunk(&mut archive, CHUNK_DATA, 0, &compressed[..n], 5).unwrap();

        let mut cursor = Cursor::new(&archive[..]);
        let path = extract(&mut cursor, archive.len() as u64).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        drop(cwd_guard);
    }

    // --- test-only helpers for running in an isolated current directory ---

    struct ChangeDir {
        previous: PathBuf,
        _keep: tempfile::TempDir,
    }

    impl ChangeDir {
        fn new(dir: &tempfile::TempDir) -> Self {
            let previous = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir.path()).unwrap();
            // The TempDir passed in is owned by the caller; we just borrow
            // its path, so keep a dummy one here to satisfy the field.
            ChangeDir {
                previous,
                _keep: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl Drop for ChangeDir {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.previous);
        }
    }

    fn tempfile_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }
}
