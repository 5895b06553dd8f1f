//! Archive container: magic header, chunked records, Adler-32 checksums.
//!
//! Layout: an 8-byte magic, then a sequence of 16-byte chunk headers each
//! immediately followed by `header.size` payload bytes. All multi-byte
//! header fields are little-endian. Byte-for-byte grounded on
//! `phyunzip.c`'s `read_chunk_header`, reimplemented with bounds checks and
//! a save/restore around magic detection instead of the original's
//! seek-to-8 (see Design Notes in the specification).

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::checksum::adler32;
use crate::error::ContainerError;

/// Fixed 8-byte prefix identifying a phyzip archive.
pub const MAGIC: [u8; 8] = *b"$phyzip$";

/// Chunk id for the metadata chunk (original size + stored filename).
pub const CHUNK_METADATA: u16 = 1;

/// Chunk id for an LZ77-compressed block of the source file.
pub const CHUNK_DATA: u16 = 17;

/// A parsed 16-byte chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: u16,
    pub options: u16,
    pub size: u32,
    pub checksum: u32,
    pub extra: u32,
}

/// Writes the 8-byte archive magic.
pub fn write_magic<W: Write>(sink: &mut W) -> io::Result<()> {
    sink.write_all(&MAGIC)
}

/// Returns whether `source`'s next 8 bytes are the archive magic, restoring
/// the stream position regardless of the outcome.
pub fn detect_magic<R: Read + Seek>(source: &mut R) -> io::Result<bool> {
    let original_pos = source.stream_position()?;

    let mut buffer = [0u8; 8];
    let restore = |source: &mut R| source.seek(SeekFrom::Start(original_pos)).map(|_| ());

    let read_result = source.read_exact(&mut buffer);
    restore(source)?;

    match read_result {
        Ok(()) => Ok(buffer == MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Writes a 16-byte chunk header followed by `payload`. The checksum is
/// computed over `payload` with Adler-32's standard initial state.
pub fn write_chunk<W: Write>(
    sink: &mut W,
    id: u16,
    options: u16,
    payload: &[u8],
    extra: u32,
) -> io::Result<()> {
    let checksum = adler32(payload);

    sink.write_u16::<LittleEndian>(id)?;
    sink.write_u16::<LittleEndian>(options)?;
    sink.write_u32::<LittleEndian>(payload.len() as u32)?;
    sink.write_u32::<LittleEndian>(checksum)?;
    sink.write_u32::<LittleEndian>(extra)?;
    sink.write_all(payload)
}

/// Reads and parses a 16-byte chunk header. Returns
/// `ContainerError::TruncatedHeader` if fewer than 16 bytes remain.
pub fn read_chunk_header<R: Read>(source: &mut R) -> Result<ChunkHeader, ContainerError> {
    let mut buf = [0u8; 16];
    match source.read_exact(&mut buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ContainerError::TruncatedHeader)
        }
        Err(e) => return Err(e.into()),
    }

    let mut cursor = &buf[..];
    Ok(ChunkHeader {
        id: cursor.read_u16::<LittleEndian>().unwrap(),
        options: cursor.read_u16::<LittleEndian>().unwrap(),
        size: cursor.read_u32::<LittleEndian>().unwrap(),
        checksum: cursor.read_u32::<LittleEndian>().unwrap(),
        extra: cursor.read_u32::<LittleEndian>().unwrap(),
    })
}

/// Reads `header.size` payload bytes and verifies the checksum.
pub fn read_chunk_payload<R: Read>(
    source: &mut R,
    header: &ChunkHeader,
) -> Result<Vec<u8>, ContainerError> {
    let mut payload = vec![0u8; header.size as usize];
    match source.read_exact(&mut payload) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ContainerError::TruncatedHeader)
        }
        Err(e) => return Err(e.into()),
    }

    let actual = adler32(&payload);
    if actual != header.checksum {
        return Err(ContainerError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    Ok(payload)
}
