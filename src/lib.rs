//! # phyzip
//!
//! `phyzip` is a safe, pure-Rust implementation of a byte-aligned LZ77
//! file compressor and its self-describing chunked archive container.
//!
//! The crate is organised around a small core — [`codec`] (the compressor
//! and decompressor) and [`container`] (chunk framing and checksums) — with
//! [`pack`] and [`unpack`] as thin drivers that sequence file I/O around
//! that core. The `pack` and `unpack` binaries are thinner still: parse
//! arguments, initialise logging, and delegate here.
//!
//! ## Example
//!
//! ```rust
//! use phyzip::codec::{compress, decompress};
//!
//! let original = b"Hello world repeated Hello world repeated Hello world repeated";
//! let mut compressed = vec![0u8; original.len() + original.len() / 32 + 16];
//! let n = compress(original, &mut compressed);
//!
//! let mut decoded = vec![0u8; original.len()];
//! let m = decompress(&compressed[..n], &mut decoded);
//! assert_eq!(&decoded[..m], original);
//! ```

#![forbid(unsafe_code)]

pub mod checksum;
pub mod codec;
pub mod container;
pub mod error;
pub mod pack;
pub mod unpack;

pub use codec::{compress, decompress};

/// Block size the packer reads the source file in (spec §4.5: "block size
/// ≤ 64 KiB").
pub const BLOCK_SIZE: usize = 64 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_through_public_api() {
        let original = b"Hello world repeated Hello world repeated Hello world repeated";
        let mut compressed = vec![0u8; original.len() + original.len() / 32 + 16];
        let n = compress(original, &mut compressed);

        let mut decoded = vec![0u8; original.len()];
        let m = decompress(&compressed[..n], &mut decoded);

        assert_eq!(&decoded[..m], original);
    }
}
