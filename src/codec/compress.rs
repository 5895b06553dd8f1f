//! Compressor half of the byte-aligned LZ77 codec.
//!
//! Single-level, greedy, hash-indexed match search. The hash table records
//! only the most recent occurrence of any given 3-byte sequence — there is
//! no chaining, no lazy matching, no multi-candidate search. This loses
//! some ratio relative to a hash-chain compressor but keeps the inner loop
//! branch-light.

use super::{hash_u24, read_u24, MAX_DISTANCE, MAX_LITERAL_RUN, MAX_TOKEN_LEN, MIN_MATCH};
use super::HASH_SIZE;

/// Compresses `input` into `output`, returning the number of bytes written.
///
/// `output` is caller-allocated; this function never grows it. A buffer
/// `output.len() >= input.len() + input.len().div_ceil(32) + 1` is always
/// sufficient, covering the worst case of fully incompressible input (one
/// length byte per run of up to 32 literal bytes).
///
/// Inputs shorter than 13 bytes are emitted as a single literal run without
/// running the match search.
#[must_use]
pub fn compress(input: &[u8], output: &mut [u8]) -> usize {
    let length = input.len();
    let mut out_pos = 0usize;

    if length < 13 {
        emit_literal_run(input, output, &mut out_pos);
        return out_pos;
    }

    let mut htab = vec![0u32; HASH_SIZE].into_boxed_slice();
    let mut anchor = 0usize;
    let mut ip = 2usize;
    let limit = length - 13;

    'outer: while ip < limit {
        // Find a match, advancing `ip` past non-matching candidates.
        let ref_pos = loop {
            if ip >= limit {
                break 'outer;
            }

            let seq = read_u24(input, ip);
            let h = hash_u24(seq);
            let candidate = htab[h] as usize;
            htab[h] = ip as u32;

            let distance = ip - candidate;
            if distance < MAX_DISTANCE && read_u24(input, candidate) == seq {
                break candidate;
            }
            ip += 1;
        };

        if anchor < ip {
            emit_literal_run(&input[anchor..ip], output, &mut out_pos);
        }

        // Extend the verified 3-byte match as far as it goes.
        let mut extra = 0usize;
        while ip + 3 + extra < length
            && ref_pos + 3 + extra < length
            && input[ref_pos + 3 + extra] == input[ip + 3 + extra]
        {
            extra += 1;
        }

        let consumed = extra + 3;
        let distance = ip - ref_pos;

        // Split matches longer than one token can encode, always leaving
        // at least MIN_MATCH bytes for the final token.
        let mut remaining = consumed;
        while remaining > MAX_TOKEN_LEN {
            let chunk = if remaining - MAX_TOKEN_LEN < MIN_MATCH {
                remaining - MIN_MATCH
            } else {
                MAX_TOKEN_LEN
            };
            emit_back_reference(chunk, distance, output, &mut out_pos);
            remaining -= chunk;
        }
        emit_back_reference(remaining, distance, output, &mut out_pos);

        // Post-match hashing: insert two more positions so future matches
        // can still find the tail of what we just consumed, without paying
        // the cost of hashing every byte of a long match.
        ip += consumed;
        if ip + 3 <= length {
            let seq = read_u24(input, ip);
            htab[hash_u24(seq)] = ip as u32;
        }
        ip += 1;
        if ip + 3 <= length {
            let seq = read_u24(input, ip);
            htab[hash_u24(seq)] = ip as u32;
        }
        ip += 1;

        anchor = ip;
    }

    if anchor < length {
        emit_literal_run(&input[anchor..], output, &mut out_pos);
    }

    out_pos
}

/// Emits a literal run of arbitrary length as one or more tokens of at most
/// 32 bytes each.
fn emit_literal_run(bytes: &[u8], output: &mut [u8], out_pos: &mut usize) {
    let mut rest = bytes;
    while rest.len() >= MAX_LITERAL_RUN {
        output[*out_pos] = (MAX_LITERAL_RUN - 1) as u8;
        *out_pos += 1;
        output[*out_pos..*out_pos + MAX_LITERAL_RUN].copy_from_slice(&rest[..MAX_LITERAL_RUN]);
        *out_pos += MAX_LITERAL_RUN;
        rest = &rest[MAX_LITERAL_RUN..];
    }
    if !rest.is_empty() {
        output[*out_pos] = (rest.len() - 1) as u8;
        *out_pos += 1;
        output[*out_pos..*out_pos + rest.len()].copy_from_slice(rest);
        *out_pos += rest.len();
    }
}

/// Emits a single back-reference token for `len` bytes (`3..=262`) at
/// `distance` (`1..=8192`).
fn emit_back_reference(len: usize, distance: usize, output: &mut [u8], out_pos: &mut usize) {
    debug_assert!((MIN_MATCH..=MAX_TOKEN_LEN).contains(&len));
    debug_assert!((1..=MAX_DISTANCE).contains(&distance));

    let d = distance - 1;
    if len < 9 {
        output[*out_pos] = (((len - 2) << 5) | (d >> 8)) as u8;
        output[*out_pos + 1] = (d & 0xFF) as u8;
        *out_pos += 2;
    } else {
        output[*out_pos] = ((7 << 5) | (d >> 8)) as u8;
        output[*out_pos + 1] = (len - 9) as u8;
        output[*out_pos + 2] = (d & 0xFF) as u8;
        *out_pos += 3;
    }
}
