/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A DEFLATE and zlib compressor.
//!
//! Level 0 emits stored blocks, levels 1 to 3 pair the LZ77 parse with
//! the fixed Huffman trees, levels 4 and up build per-stream dynamic
//! trees. Output is always a valid stream any inflate implementation
//! accepts.

use crate::bitstream::BitStreamWriter;
use crate::constants::{
    dist_to_symbol, fixed_dist_lengths, fixed_litlen_lengths, length_to_symbol, DIST_SYMBOLS,
    END_OF_BLOCK, MAX_CODE_LENGTH, MAX_PRECODE_LENGTH, PRECODE_ORDER, PRECODE_SYMBOLS
};
use crate::huffman::{build_code_lengths, lengths_to_codes, HuffmanCode};
use crate::lz77::{tokenize, Token};
use crate::utils::calc_adler_hash;

/// zlib compression method, the only one defined.
const ZLIB_CM_DEFLATE: u8 = 8;
/// log2(window size) - 8, 7 advertises the full 32 KiB window.
const ZLIB_CINFO: u8 = 7;

/// Largest payload of a single stored block.
const MAX_STORED_LEN: usize = u16::MAX as usize;

/// Symbols the dynamic litlen tree may describe, 256 literals, end of
/// block, 29 lengths.
const DYN_LITLEN_SYMBOLS: usize = 286;

/// Options controlling the compressor.
#[derive(Debug, Copy, Clone)]
pub struct DeflateEncodeOptions {
    level: u8
}

impl Default for DeflateEncodeOptions {
    fn default() -> Self {
        DeflateEncodeOptions { level: 6 }
    }
}

impl DeflateEncodeOptions {
    pub const fn get_level(&self) -> u8 {
        self.level
    }

    /// Effort level 0 to 9. Zero stores the input uncompressed, one is
    /// fastest, nine searches hardest. Values above 9 clamp to 9.
    #[must_use]
    pub fn set_level(mut self, level: u8) -> Self {
        self.level = level.min(9);
        self
    }
}

/// How deep the hash chain search goes per level.
const fn chain_depth(level: u8) -> usize {
    match level {
        0 => 0,
        1 => 4,
        2 => 8,
        3 => 16,
        4 => 32,
        5 => 64,
        6 => 128,
        7 => 256,
        8 => 1024,
        _ => 4096
    }
}

/// Compress `data` into a bare DEFLATE stream.
pub fn deflate_compress(data: &[u8], options: DeflateEncodeOptions) -> Vec<u8> {
    let mut writer = BitStreamWriter::new();

    if options.level == 0 {
        write_stored(&mut writer, data);
        return writer.finish();
    }
    let tokens = tokenize(data, chain_depth(options.level));

    if options.level <= 3 {
        write_fixed_block(&mut writer, &tokens);
    } else {
        write_dynamic_block(&mut writer, &tokens);
    }
    writer.finish()
}

/// Compress `data` into a zlib stream (RFC 1950) with header and
/// Adler-32 trailer.
pub fn zlib_compress(data: &[u8], options: DeflateEncodeOptions) -> Vec<u8> {
    let deflate = deflate_compress(data, options);
    let mut out = Vec::with_capacity(deflate.len() + 6);

    let cmf = ZLIB_CM_DEFLATE | (ZLIB_CINFO << 4);
    // FLEVEL advertisement only, decoders ignore it
    let flevel: u8 = match options.level {
        0..=1 => 0,
        2..=5 => 1,
        6 => 2,
        _ => 3
    };
    let mut flg = flevel << 6;
    let rem = ((u16::from(cmf) * 256 + u16::from(flg)) % 31) as u8;
    if rem != 0 {
        flg += 31 - rem;
    }
    out.push(cmf);
    out.push(flg);
    out.extend_from_slice(&deflate);
    out.extend_from_slice(&calc_adler_hash(data).to_be_bytes());
    out
}

/// Emit the input as one or more stored blocks.
fn write_stored(writer: &mut BitStreamWriter, data: &[u8]) {
    let mut chunks = data.chunks(MAX_STORED_LEN).peekable();

    // an empty input still needs one final empty block
    if chunks.peek().is_none() {
        writer.put_bits(1, 1);
        writer.put_bits(0, 2);
        writer.align_to_byte();
        writer.put_aligned_bytes(&0_u16.to_le_bytes());
        writer.put_aligned_bytes(&u16::MAX.to_le_bytes());
        return;
    }
    while let Some(chunk) = chunks.next() {
        let is_final = u32::from(chunks.peek().is_none());
        let len = chunk.len() as u16;

        writer.put_bits(is_final, 1);
        writer.put_bits(0, 2);
        writer.align_to_byte();
        writer.put_aligned_bytes(&len.to_le_bytes());
        writer.put_aligned_bytes(&(!len).to_le_bytes());
        writer.put_aligned_bytes(chunk);
    }
}

/// Emit one final block coded with the fixed trees.
fn write_fixed_block(writer: &mut BitStreamWriter, tokens: &[Token]) {
    let litlen = lengths_to_codes(&fixed_litlen_lengths());
    let dist = lengths_to_codes(&fixed_dist_lengths());

    writer.put_bits(1, 1);
    writer.put_bits(1, 2);
    write_tokens(writer, tokens, &litlen, &dist);
}

/// Emit one final block with trees tailored to the token stream.
fn write_dynamic_block(writer: &mut BitStreamWriter, tokens: &[Token]) {
    let mut litlen_freq = [0_u32; DYN_LITLEN_SYMBOLS];
    let mut dist_freq = [0_u32; DIST_SYMBOLS];

    for token in tokens {
        match *token {
            Token::Literal(b) => litlen_freq[usize::from(b)] += 1,
            Token::Match { length, dist } => {
                let (symbol, _, _) = length_to_symbol(usize::from(length));
                litlen_freq[usize::from(symbol)] += 1;
                let (symbol, _, _) = dist_to_symbol(usize::from(dist));
                dist_freq[usize::from(symbol)] += 1;
            }
        }
    }
    litlen_freq[usize::from(END_OF_BLOCK)] = 1;

    let litlen_lengths = build_code_lengths(&litlen_freq, MAX_CODE_LENGTH);
    let mut dist_lengths = build_code_lengths(&dist_freq, MAX_CODE_LENGTH);

    // a block with no matches still must describe at least one distance
    // code, give symbol zero a dummy one-bit length
    if dist_lengths.iter().all(|&l| l == 0) {
        dist_lengths[0] = 1;
    }
    let hlit = trailing_trim(&litlen_lengths, 257);
    let hdist = trailing_trim(&dist_lengths, 1);

    // run-length code the concatenated length lists
    let mut combined = Vec::with_capacity(hlit + hdist);
    combined.extend_from_slice(&litlen_lengths[..hlit]);
    combined.extend_from_slice(&dist_lengths[..hdist]);
    let rle = run_length_encode(&combined);

    let mut precode_freq = [0_u32; PRECODE_SYMBOLS];
    for item in &rle {
        precode_freq[usize::from(item.symbol)] += 1;
    }
    let precode_lengths = build_code_lengths(&precode_freq, MAX_PRECODE_LENGTH);
    let precode = lengths_to_codes(&precode_lengths);

    // the precode length list is stored in the fixed permutation order,
    // trailing zeros in that order can be dropped down to four entries
    let mut hclen = PRECODE_SYMBOLS;
    while hclen > 4 && precode_lengths[PRECODE_ORDER[hclen - 1]] == 0 {
        hclen -= 1;
    }

    writer.put_bits(1, 1);
    writer.put_bits(2, 2);
    writer.put_bits((hlit - 257) as u32, 5);
    writer.put_bits((hdist - 1) as u32, 5);
    writer.put_bits((hclen - 4) as u32, 4);

    for i in 0..hclen {
        writer.put_bits(u32::from(precode_lengths[PRECODE_ORDER[i]]), 3);
    }
    for item in &rle {
        let code = precode[usize::from(item.symbol)];
        writer.put_bits(u32::from(code.code), code.length);
        if item.extra_bits > 0 {
            writer.put_bits(item.extra, item.extra_bits);
        }
    }
    let litlen = lengths_to_codes(&litlen_lengths);
    let dist = lengths_to_codes(&dist_lengths);
    write_tokens(writer, tokens, &litlen, &dist);
}

/// Number of leading entries that must be transmitted, trailing zero
/// lengths past `min` are implicit.
fn trailing_trim(lengths: &[u8], min: usize) -> usize {
    let mut count = lengths.len();
    while count > min && lengths[count - 1] == 0 {
        count -= 1;
    }
    count
}

struct RleItem {
    symbol:    u16,
    extra:     u32,
    extra_bits: u8
}

/// Compress a code length list with the 16/17/18 repeat symbols.
fn run_length_encode(lengths: &[u8]) -> Vec<RleItem> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut left = run;
            while left >= 11 {
                let take = left.min(138);
                out.push(RleItem {
                    symbol:     18,
                    extra:      (take - 11) as u32,
                    extra_bits: 7
                });
                left -= take;
            }
            while left >= 3 {
                let take = left.min(10);
                out.push(RleItem {
                    symbol:     17,
                    extra:      (take - 3) as u32,
                    extra_bits: 3
                });
                left -= take;
            }
            for _ in 0..left {
                out.push(RleItem {
                    symbol:     0,
                    extra:      0,
                    extra_bits: 0
                });
            }
        } else {
            out.push(RleItem {
                symbol:     u16::from(value),
                extra:      0,
                extra_bits: 0
            });
            let mut left = run - 1;
            while left >= 3 {
                let take = left.min(6);
                out.push(RleItem {
                    symbol:     16,
                    extra:      (take - 3) as u32,
                    extra_bits: 2
                });
                left -= take;
            }
            for _ in 0..left {
                out.push(RleItem {
                    symbol:     u16::from(value),
                    extra:      0,
                    extra_bits: 0
                });
            }
        }
        i += run;
    }
    out
}

/// Emit the entropy coded token stream followed by end of block.
fn write_tokens(
    writer: &mut BitStreamWriter, tokens: &[Token], litlen: &[HuffmanCode], dist: &[HuffmanCode]
) {
    for token in tokens {
        match *token {
            Token::Literal(b) => {
                let code = litlen[usize::from(b)];
                writer.put_bits(u32::from(code.code), code.length);
            }
            Token::Match { length, dist: d } => {
                let (symbol, base, extra_bits) = length_to_symbol(usize::from(length));
                let code = litlen[usize::from(symbol)];
                writer.put_bits(u32::from(code.code), code.length);
                if extra_bits > 0 {
                    writer.put_bits(u32::from(length - base), extra_bits);
                }
                let (symbol, base, extra_bits) = dist_to_symbol(usize::from(d));
                let code = dist[usize::from(symbol)];
                writer.put_bits(u32::from(code.code), code.length);
                if extra_bits > 0 {
                    writer.put_bits(u32::from(d - base), extra_bits);
                }
            }
        }
    }
    let eob = litlen[usize::from(END_OF_BLOCK)];
    writer.put_bits(u32::from(eob.code), eob.length);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DeflateDecoder;

    fn round_trip(data: &[u8], level: u8) {
        let options = DeflateEncodeOptions::default().set_level(level);
        let compressed = zlib_compress(data, options);
        let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
        assert_eq!(decoded, data, "level {level} round trip failed");
    }

    #[test]
    fn empty_input_every_level() {
        for level in 0..=9 {
            round_trip(b"", level);
        }
    }

    #[test]
    fn text_every_level() {
        let data = b"the quick brown fox jumps over the lazy dog, \
                     the quick brown fox jumps over the lazy dog"
            .repeat(20);
        for level in 0..=9 {
            round_trip(&data, level);
        }
    }

    #[test]
    fn incompressible_bytes() {
        let data: Vec<u8> = (0_u32..4096)
            .map(|i| (i.wrapping_mul(2654435761) >> 7) as u8)
            .collect();
        for level in [0, 1, 6, 9] {
            round_trip(&data, level);
        }
    }

    #[test]
    fn single_byte_run() {
        round_trip(&[0_u8; 100_000], 6);
    }

    #[test]
    fn dynamic_beats_stored_on_text() {
        let data = b"abababababababababab".repeat(100);
        let stored = zlib_compress(&data, DeflateEncodeOptions::default().set_level(0));
        let dynamic = zlib_compress(&data, DeflateEncodeOptions::default().set_level(9));
        assert!(dynamic.len() < stored.len());
    }

    #[test]
    fn flate2_accepts_our_streams() {
        use std::io::Read;

        let data = b"cross validation payload ".repeat(64);
        for level in [0, 2, 6, 9] {
            let compressed =
                zlib_compress(&data, DeflateEncodeOptions::default().set_level(level));
            let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out).unwrap();
            assert_eq!(out, data);
        }
    }

    #[test]
    fn we_accept_flate2_streams() {
        use std::io::Write;

        let data: Vec<u8> = (0_u32..10_000).map(|i| (i % 251) as u8).collect();
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();

        let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn random_data_round_trips() {
        use nanorand::Rng;

        let mut rng = nanorand::WyRand::new_seed(0x1234_5678);
        let mut data = vec![0_u8; 64 * 1024];
        // mix of random and runs to hit both literals and matches
        rng.fill_bytes(&mut data[..32 * 1024]);

        for level in [1, 4, 7] {
            round_trip(&data, level);
        }
    }
}
