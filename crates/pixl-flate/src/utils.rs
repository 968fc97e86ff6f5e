/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Checksums used by the zlib wrapper.

const MOD_ADLER: u32 = 65521;
// largest n such that 255*n*(n+1)/2 + (n+1)*(MOD_ADLER-1) fits in u32
const ADLER_CHUNK: usize = 5552;

/// Adler-32 over `data`, as defined in RFC 1950.
pub fn calc_adler_hash(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for chunk in data.chunks(ADLER_CHUNK) {
        for byte in chunk {
            a += u32::from(*byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }
    (b << 16) | a
}
