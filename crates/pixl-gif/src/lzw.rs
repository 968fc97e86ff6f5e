/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The GIF variant of LZW.
//!
//! Codes start one bit wider than the root alphabet and grow up to 12
//! bits as the dictionary fills. Two control codes sit just above the
//! roots: clear (reset the dictionary) and end-of-information. The
//! encoder emits a clear whenever the table hits 4096 entries, the
//! decoder mirrors that reset.

use std::collections::HashMap;

use crate::errors::GifDecodeErrors;

/// Hard table ceiling from the GIF specification.
const MAX_TABLE: usize = 4096;
const MAX_CODE_WIDTH: u8 = 12;

/// Compress `indices` with root codes of `min_code_size` bits.
///
/// `min_code_size` must be 2..=8 and every index below
/// `1 << min_code_size`.
pub fn lzw_compress(indices: &[u8], min_code_size: u8) -> Vec<u8> {
    debug_assert!((2..=8).contains(&min_code_size));

    let clear: u16 = 1 << min_code_size;
    let eoi: u16 = clear + 1;

    let mut out = BitPacker::new();
    let mut dict: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next_code: u16 = eoi + 1;
    let mut code_width: u8 = min_code_size + 1;

    out.push(clear, code_width);

    let mut iter = indices.iter();
    let Some(&first) = iter.next() else {
        out.push(eoi, code_width);
        return out.finish();
    };
    let mut current: u16 = u16::from(first);

    for &k in iter {
        if let Some(&code) = dict.get(&(current, k)) {
            current = code;
            continue;
        }
        out.push(current, code_width);
        dict.insert((current, k), next_code);
        next_code += 1;

        if usize::from(next_code) > (1 << code_width) && code_width < MAX_CODE_WIDTH {
            code_width += 1;
        }
        if usize::from(next_code) == MAX_TABLE {
            out.push(clear, code_width);
            dict.clear();
            next_code = eoi + 1;
            code_width = min_code_size + 1;
        }
        current = u16::from(k);
    }
    out.push(current, code_width);
    out.push(eoi, code_width);
    out.finish()
}

/// Decompress an LZW stream, expecting exactly `expected` indices.
pub fn lzw_decompress(
    data: &[u8], min_code_size: u8, expected: usize
) -> Result<Vec<u8>, GifDecodeErrors> {
    if !(2..=8).contains(&min_code_size) {
        return Err(GifDecodeErrors::BadLzw("minimum code size out of range"));
    }
    let clear: u16 = 1 << min_code_size;
    let eoi: u16 = clear + 1;

    let mut reader = BitUnpacker::new(data);
    let mut out: Vec<u8> = Vec::with_capacity(expected);

    // dictionary as flat prefix/suffix arrays, an entry's expansion is
    // the prefix entry's expansion plus one suffix byte
    let mut prefix = vec![0_u16; MAX_TABLE];
    let mut suffix = vec![0_u8; MAX_TABLE];
    for root in 0..clear {
        suffix[usize::from(root)] = root as u8;
    }
    let mut next_code: u16 = eoi + 1;
    let mut code_width: u8 = min_code_size + 1;
    let mut previous: Option<u16> = None;
    let mut scratch = Vec::with_capacity(MAX_CODE_WIDTH as usize * 256);

    while out.len() < expected {
        let code = reader
            .pull(code_width)
            .ok_or(GifDecodeErrors::BadLzw("truncated code stream"))?;

        if code == clear {
            next_code = eoi + 1;
            code_width = min_code_size + 1;
            previous = None;
            continue;
        }
        if code == eoi {
            break;
        }
        if code >= next_code && !(code == next_code && previous.is_some()) {
            return Err(GifDecodeErrors::BadLzw("code refers past the dictionary"));
        }

        scratch.clear();
        if code == next_code {
            // the KwKwK case, the entry being defined right now
            let prev = previous.ok_or(GifDecodeErrors::BadLzw(
                "first code after clear is not a root"
            ))?;
            expand(&prefix, &suffix, prev, clear, &mut scratch);
            let head = scratch[0];
            scratch.push(head);
        } else {
            expand(&prefix, &suffix, code, clear, &mut scratch);
        }
        out.extend_from_slice(&scratch);

        if let Some(prev) = previous {
            if usize::from(next_code) < MAX_TABLE {
                prefix[usize::from(next_code)] = prev;
                suffix[usize::from(next_code)] = scratch[0];
                next_code += 1;

                // the decoder's table lags the encoder's by one entry,
                // so the width bump comes one entry earlier here
                if usize::from(next_code) >= (1 << code_width) && code_width < MAX_CODE_WIDTH {
                    code_width += 1;
                }
            }
        }
        previous = Some(code);
    }
    if out.len() != expected {
        return Err(GifDecodeErrors::BadLzw("pixel data ended early"));
    }
    Ok(out)
}

/// Walk an entry's prefix chain, writing its expansion front to back.
fn expand(prefix: &[u16], suffix: &[u8], code: u16, clear: u16, out: &mut Vec<u8>) {
    let start = out.len();
    let mut current = code;
    loop {
        out.push(suffix[usize::from(current)]);
        if current < clear {
            break;
        }
        current = prefix[usize::from(current)];
    }
    out[start..].reverse();
}

/// Packs variable-width codes LSB first.
struct BitPacker {
    out:    Vec<u8>,
    buffer: u32,
    bits:   u8
}

impl BitPacker {
    fn new() -> BitPacker {
        BitPacker {
            out:    Vec::new(),
            buffer: 0,
            bits:   0
        }
    }

    fn push(&mut self, code: u16, width: u8) {
        self.buffer |= u32::from(code) << self.bits;
        self.bits += width;
        while self.bits >= 8 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push((self.buffer & 0xFF) as u8);
        }
        self.out
    }
}

/// Pulls variable-width codes LSB first.
struct BitUnpacker<'a> {
    data:     &'a [u8],
    position: usize,
    buffer:   u32,
    bits:     u8
}

impl<'a> BitUnpacker<'a> {
    fn new(data: &'a [u8]) -> BitUnpacker<'a> {
        BitUnpacker {
            data,
            position: 0,
            buffer: 0,
            bits: 0
        }
    }

    fn pull(&mut self, width: u8) -> Option<u16> {
        while self.bits < width {
            let byte = *self.data.get(self.position)?;
            self.position += 1;
            self.buffer |= u32::from(byte) << self.bits;
            self.bits += 8;
        }
        let code = (self.buffer & ((1 << width) - 1)) as u16;
        self.buffer >>= width;
        self.bits -= width;
        Some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(indices: &[u8], min_code_size: u8) {
        let compressed = lzw_compress(indices, min_code_size);
        let decoded = lzw_decompress(&compressed, min_code_size, indices.len()).unwrap();
        assert_eq!(decoded, indices);
    }

    #[test]
    fn short_sequences() {
        round_trip(&[], 2);
        round_trip(&[0], 2);
        round_trip(&[1, 1, 1, 1], 2);
        round_trip(&[0, 1, 2, 3, 0, 1, 2, 3], 2);
    }

    #[test]
    fn kwkwk_pattern() {
        // classic aaa.. stream exercises the code == next_code branch
        round_trip(&[0; 1000], 2);
        round_trip(b"aaaaaaaaaabbbbbbbbbb", 8);
    }

    #[test]
    fn dictionary_overflow_resets() {
        use nanorand::Rng;

        let mut rng = nanorand::WyRand::new_seed(5);
        let mut indices = vec![0_u8; 100_000];
        rng.fill_bytes(&mut indices);
        // random bytes fill the 12-bit table repeatedly
        round_trip(&indices, 8);
    }

    #[test]
    fn full_width_roots() {
        let indices: Vec<u8> = (0..=255).cycle().take(5000).collect();
        round_trip(&indices, 8);
    }

    #[test]
    fn truncated_stream_errors() {
        let compressed = lzw_compress(&[0, 1, 2, 3, 2, 1, 0], 2);
        let cut = &compressed[..compressed.len() - 1];
        assert!(lzw_decompress(cut, 2, 100).is_err());
    }
}
