/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Canonical Huffman coding, both directions.
//!
//! The decode side walks the code one bit at a time over a
//! counts-per-length table, which is slow compared to a flat lookup table
//! but cannot be driven out of bounds by a hostile stream. The encode
//! side builds optimal code lengths from symbol frequencies and then
//! clamps them to the format's limits while keeping the Kraft sum exact.

use crate::bitstream::{reverse_bits, BitStreamReader};
use crate::constants::MAX_CODE_LENGTH;

/// A canonical Huffman decoding table.
///
/// `counts[n]` is how many symbols have code length `n`, `symbols` lists
/// the symbols sorted by (length, symbol value).
pub struct HuffmanTable {
    counts:  [u16; MAX_CODE_LENGTH + 1],
    symbols: Vec<u16>
}

impl HuffmanTable {
    /// Build a table from per-symbol code lengths, zero meaning unused.
    ///
    /// Rejects oversubscribed length sets. Incomplete sets are accepted
    /// (a single-symbol distance tree is legal in the format) but any
    /// code that walks off the table errors at decode time.
    pub fn from_lengths(lengths: &[u8]) -> Result<HuffmanTable, &'static str> {
        let mut counts = [0_u16; MAX_CODE_LENGTH + 1];

        for length in lengths {
            if usize::from(*length) > MAX_CODE_LENGTH {
                return Err("huffman code length exceeds 15");
            }
            counts[usize::from(*length)] += 1;
        }
        // kraft check, left > 0 means incomplete, < 0 oversubscribed
        let mut left: i32 = 1;
        for count in counts.iter().skip(1) {
            left <<= 1;
            left -= i32::from(*count);
            if left < 0 {
                return Err("oversubscribed huffman code lengths");
            }
        }
        // offsets into the symbol table per length
        let mut offsets = [0_usize; MAX_CODE_LENGTH + 2];
        for len in 1..=MAX_CODE_LENGTH {
            offsets[len + 1] = offsets[len] + usize::from(counts[len]);
        }
        let used = offsets[MAX_CODE_LENGTH + 1];
        let mut symbols = vec![0_u16; used];

        for (symbol, length) in lengths.iter().enumerate() {
            if *length != 0 {
                symbols[offsets[usize::from(*length)]] = symbol as u16;
                offsets[usize::from(*length)] += 1;
            }
        }
        Ok(HuffmanTable { counts, symbols })
    }

    /// Decode one symbol from the bit stream.
    #[inline]
    pub fn decode(&self, stream: &mut BitStreamReader<'_>) -> Result<u16, &'static str> {
        let mut code: u32 = 0;
        let mut first: u32 = 0;
        let mut index: u32 = 0;

        for length in 1..=MAX_CODE_LENGTH {
            code |= stream.get_bit()?;
            let count = u32::from(self.counts[length]);

            if code < first + count {
                return Ok(self.symbols[(index + (code - first)) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err("invalid huffman code in stream")
    }
}

/// A single encoder-side code, bits already reversed for LSB-first
/// emission.
#[derive(Copy, Clone, Default)]
pub struct HuffmanCode {
    pub code:   u16,
    pub length: u8
}

/// Assign canonical codes to a set of code lengths.
///
/// Returns one [`HuffmanCode`] per input symbol, unused symbols get a
/// zero length.
pub fn lengths_to_codes(lengths: &[u8]) -> Vec<HuffmanCode> {
    let mut counts = [0_u16; MAX_CODE_LENGTH + 1];
    for length in lengths {
        counts[usize::from(*length)] += 1;
    }
    let mut next_code = [0_u16; MAX_CODE_LENGTH + 1];
    let mut code = 0_u16;
    counts[0] = 0;

    for length in 1..=MAX_CODE_LENGTH {
        code = (code + counts[length - 1]) << 1;
        next_code[length] = code;
    }
    lengths
        .iter()
        .map(|&length| {
            if length == 0 {
                return HuffmanCode::default();
            }
            let assigned = next_code[usize::from(length)];
            next_code[usize::from(length)] += 1;
            HuffmanCode {
                code:   reverse_bits(assigned, length),
                length
            }
        })
        .collect()
}

/// Compute length-limited Huffman code lengths from symbol frequencies.
///
/// Lengths are first derived from an exact Huffman tree, then any code
/// exceeding `max_length` is clamped and the Kraft sum repaired by
/// deepening shorter codes, the standard tree-flattening fix. Symbols
/// with zero frequency get length zero.
pub fn build_code_lengths(frequencies: &[u32], max_length: usize) -> Vec<u8> {
    assert!(max_length <= MAX_CODE_LENGTH);

    let used: Vec<usize> = (0..frequencies.len())
        .filter(|&i| frequencies[i] > 0)
        .collect();
    let mut lengths = vec![0_u8; frequencies.len()];

    match used.len() {
        0 => return lengths,
        1 => {
            // a lone symbol still needs a one-bit code
            lengths[used[0]] = 1;
            return lengths;
        }
        _ => {}
    }

    // pairwise tree merge over indices, parent[] records the merge
    // structure so depths can be read back without pointers
    let n = used.len();
    let mut weight = vec![0_u64; 2 * n - 1];
    let mut parent = vec![usize::MAX; 2 * n - 1];

    for (slot, &symbol) in used.iter().enumerate() {
        weight[slot] = u64::from(frequencies[symbol]);
    }

    let mut heap: Vec<usize> = (0..n).collect();
    // deterministic ordering, lowest weight first with slot index as
    // the tie break
    heap.sort_by(|&a, &b| (weight[a], a).cmp(&(weight[b], b)));

    let mut next = n;
    while heap.len() > 1 {
        let a = heap[0];
        let b = heap[1];
        heap.drain(0..2);

        weight[next] = weight[a] + weight[b];
        parent[a] = next;
        parent[b] = next;

        let pos = heap
            .binary_search_by(|&probe| (weight[probe], probe).cmp(&(weight[next], next)))
            .unwrap_or_else(|e| e);
        heap.insert(pos, next);
        next += 1;
    }

    // depth of each leaf is the number of parent hops to the root
    for (slot, &symbol) in used.iter().enumerate() {
        let mut depth = 0_u8;
        let mut node = slot;
        while parent[node] != usize::MAX {
            node = parent[node];
            depth += 1;
        }
        lengths[symbol] = depth;
    }

    enforce_max_length(&mut lengths, frequencies, max_length);
    lengths
}

/// Clamp lengths to `max_length` and restore the Kraft equality by
/// moving codes to deeper levels, least frequent symbols first.
fn enforce_max_length(lengths: &mut [u8], frequencies: &[u32], max_length: usize) {
    if lengths.iter().all(|&l| usize::from(l) <= max_length) {
        return;
    }
    let mut num_codes = [0_u32; MAX_CODE_LENGTH + 1];
    for length in lengths.iter() {
        if *length > 0 {
            num_codes[usize::from(*length).min(max_length)] += 1;
        }
    }
    let mut total: u64 = 0;
    for len in 1..=max_length {
        total += u64::from(num_codes[len]) << (max_length - len);
    }
    while total > (1_u64 << max_length) {
        // shrink the population at max depth by pushing one shorter
        // code down a level, which frees exactly one unit
        num_codes[max_length] -= 1;
        for len in (1..max_length).rev() {
            if num_codes[len] > 0 {
                num_codes[len] -= 1;
                num_codes[len + 1] += 2;
                break;
            }
        }
        total -= 1;
    }
    // reassign lengths, least frequent symbols take the deepest codes
    let mut order: Vec<usize> = (0..lengths.len()).filter(|&i| lengths[i] > 0).collect();
    order.sort_by(|&a, &b| (frequencies[a], a).cmp(&(frequencies[b], b)));

    let mut it = order.into_iter();
    for len in (1..=max_length).rev() {
        for _ in 0..num_codes[len] {
            if let Some(symbol) = it.next() {
                lengths[symbol] = len as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitStreamWriter;

    fn kraft_sum(lengths: &[u8]) -> f64 {
        lengths
            .iter()
            .filter(|&&l| l > 0)
            .map(|&l| 1.0 / f64::from(1_u32 << l))
            .sum()
    }

    #[test]
    fn decode_rejects_oversubscribed() {
        assert!(HuffmanTable::from_lengths(&[1, 1, 1]).is_err());
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let lens = build_code_lengths(&[0, 42, 0], 15);
        assert_eq!(lens, vec![0, 1, 0]);
    }

    #[test]
    fn lengths_respect_limit_and_kraft() {
        // highly skewed frequencies force deep codes
        let freqs: Vec<u32> = (0..40).map(|i| 1_u32 << (i / 3)).collect();
        let lens = build_code_lengths(&freqs, 7);

        assert!(lens.iter().all(|&l| l <= 7 && l > 0));
        assert!((kraft_sum(&lens) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn optimal_lengths_are_complete() {
        let freqs = [10, 10, 20, 40, 80];
        let lens = build_code_lengths(&freqs, 15);
        assert!((kraft_sum(&lens) - 1.0).abs() < 1e-9);
        // the most frequent symbol has the shortest code
        assert!(lens[4] <= lens[0]);
    }

    #[test]
    fn encode_decode_agree() {
        let freqs = [5, 1, 1, 8, 3, 0, 2];
        let lens = build_code_lengths(&freqs, 15);
        let codes = lengths_to_codes(&lens);
        let table = HuffmanTable::from_lengths(&lens).unwrap();

        let symbols = [0_u16, 3, 3, 6, 4, 1, 0, 2];
        let mut writer = BitStreamWriter::new();
        for &s in &symbols {
            let c = codes[usize::from(s)];
            writer.put_bits(u32::from(c.code), c.length);
        }
        let bytes = writer.finish();
        let mut reader = BitStreamReader::new(&bytes);

        for &s in &symbols {
            assert_eq!(table.decode(&mut reader).unwrap(), s);
        }
    }
}
