#![no_main]

use libfuzzer_sys::fuzz_target;
use phyzip::{compress, decompress};
use phyzip::container;

/// The decoder never panics on arbitrary bytes, and either returns a length
/// within `output`'s capacity or `0`.
fn verify_decompression_robustness(data: &[u8]) {
    let mut output = vec![0u8; data.len().max(64)];
    let n = decompress(data, &mut output);
    assert!(n <= output.len());
}

/// `decompress(compress(data)) == data` for arbitrary bytes.
fn verify_round_trip(data: &[u8]) {
    let mut compressed = vec![0u8; data.len() + data.len().div_ceil(32) + 64];
    let written = compress(data, &mut compressed);

    let mut decompressed = vec![0u8; data.len()];
    let n = decompress(&compressed[..written], &mut decompressed);

    assert_eq!(n, data.len(), "round-trip length mismatch");
    assert_eq!(&decompressed[..n], data, "round-trip output mismatch");
}

/// The chunk header parser never panics on arbitrary bytes, regardless of
/// whether they form a valid header.
fn verify_chunk_header_parsing(data: &[u8]) {
    let mut cursor = std::io::Cursor::new(data);
    let _ = container::read_chunk_header(&mut cursor);
}

fuzz_target!(|data: &[u8]| {
    verify_decompression_robustness(data);
    verify_round_trip(data);
    verify_chunk_header_parsing(data);
});
