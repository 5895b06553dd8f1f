//! Error types for the container and archive drivers.
//!
//! The codec itself (`codec::compress`/`codec::decompress`) stays
//! infallible-by-return-value, exactly as specified: it returns a decoded
//! length or `0`, never one of these types. Everything layered above it —
//! container framing, packer, unpacker — reports failures through these
//! `thiserror`-derived enums.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the chunked container format itself.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated chunk header")]
    TruncatedHeader,

    #[error("checksum mismatch: expected {expected:08X}, got {actual:08X}")]
    ChecksumMismatch { expected: u32, actual: u32 },
}

/// Failures specific to packing or unpacking a whole archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("input file does not exist or is not a regular file")]
    InvalidInput,

    #[error("input file already begins with the archive magic")]
    SourceAlreadyCompressed,

    #[error("refusing to overwrite existing output file: {0}")]
    OutputAlreadyExists(PathBuf),

    #[error("file is not a phyzip archive")]
    NotAnArchive,

    #[error("metadata chunk payload size {0} is out of range (10, 65536)")]
    MetadataPayloadOutOfRange(usize),

    #[error("decompression failed for a data chunk")]
    DecodeFailed,

    #[error("decoded length {actual} does not match declared length {expected}")]
    DecodedLengthMismatch { expected: u32, actual: usize },

    #[error("archive has no metadata chunk before its first data chunk")]
    MissingMetadata,
}
