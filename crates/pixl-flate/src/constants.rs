/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Fixed tables from RFC 1951.

/// Number of literal/length symbols, 256 literals + end of block + 29
/// length codes (286 by the RFC, 288 slots in the fixed tree).
pub const LITLEN_SYMBOLS: usize = 288;
/// Number of distance symbols.
pub const DIST_SYMBOLS: usize = 30;
/// Symbols in the code-length (precode) alphabet.
pub const PRECODE_SYMBOLS: usize = 19;

/// End of block marker in the literal/length alphabet.
pub const END_OF_BLOCK: u16 = 256;

/// Longest allowed literal/length or distance code.
pub const MAX_CODE_LENGTH: usize = 15;
/// Longest allowed precode code.
pub const MAX_PRECODE_LENGTH: usize = 7;

/// Shortest and longest match the format can express.
pub const MIN_MATCH: usize = 3;
pub const MAX_MATCH: usize = 258;

/// LZ77 window size.
pub const WINDOW_SIZE: usize = 32 * 1024;

/// Base match length for literal/length symbols 257..=285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258
];

/// Extra bits carried by literal/length symbols 257..=285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0
];

/// Base distance for distance symbols 0..=29.
pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577
];

/// Extra bits carried by distance symbols 0..=29.
pub const DIST_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13
];

/// The order precode lengths are stored in a dynamic block header.
pub const PRECODE_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15
];

/// Code lengths of the fixed literal/length tree.
pub fn fixed_litlen_lengths() -> [u8; LITLEN_SYMBOLS] {
    let mut lengths = [0; LITLEN_SYMBOLS];
    let mut i = 0;
    while i < 144 {
        lengths[i] = 8;
        i += 1;
    }
    while i < 256 {
        lengths[i] = 9;
        i += 1;
    }
    while i < 280 {
        lengths[i] = 7;
        i += 1;
    }
    while i < 288 {
        lengths[i] = 8;
        i += 1;
    }
    lengths
}

/// Code lengths of the fixed distance tree, all five bits.
pub fn fixed_dist_lengths() -> [u8; DIST_SYMBOLS] {
    [5; DIST_SYMBOLS]
}

/// Map a match length (3..=258) to its literal/length symbol,
/// base length and extra-bit count.
#[inline]
pub fn length_to_symbol(length: usize) -> (u16, u16, u8) {
    debug_assert!((MIN_MATCH..=MAX_MATCH).contains(&length));

    let mut symbol = LENGTH_BASE.len() - 1;
    for (i, base) in LENGTH_BASE.iter().enumerate() {
        if usize::from(*base) > length {
            symbol = i - 1;
            break;
        }
    }
    // length 258 uses the last entry which has no extra bits
    if length == MAX_MATCH {
        symbol = LENGTH_BASE.len() - 1;
    }
    (
        257 + symbol as u16,
        LENGTH_BASE[symbol],
        LENGTH_EXTRA_BITS[symbol]
    )
}

/// Map a match distance (1..=32768) to its distance symbol, base
/// distance and extra-bit count.
#[inline]
pub fn dist_to_symbol(dist: usize) -> (u16, u16, u8) {
    debug_assert!((1..=WINDOW_SIZE).contains(&dist));

    let mut symbol = DIST_BASE.len() - 1;
    for (i, base) in DIST_BASE.iter().enumerate() {
        if usize::from(*base) > dist {
            symbol = i - 1;
            break;
        }
    }
    (symbol as u16, DIST_BASE[symbol], DIST_EXTRA_BITS[symbol])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_symbol_boundaries() {
        assert_eq!(length_to_symbol(3), (257, 3, 0));
        assert_eq!(length_to_symbol(10), (264, 10, 0));
        assert_eq!(length_to_symbol(11), (265, 11, 1));
        assert_eq!(length_to_symbol(12), (265, 11, 1));
        assert_eq!(length_to_symbol(257), (284, 227, 5));
        assert_eq!(length_to_symbol(258), (285, 258, 0));
    }

    #[test]
    fn dist_symbol_boundaries() {
        assert_eq!(dist_to_symbol(1), (0, 1, 0));
        assert_eq!(dist_to_symbol(4), (3, 4, 0));
        assert_eq!(dist_to_symbol(5), (4, 5, 1));
        assert_eq!(dist_to_symbol(24577), (29, 24577, 13));
        assert_eq!(dist_to_symbol(32768), (29, 24577, 13));
    }
}
