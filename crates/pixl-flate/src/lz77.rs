/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Greedy hash-chain LZ77 match finder.

use crate::constants::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};

const HASH_BITS: usize = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;

/// One element of the token stream handed to the entropy coder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Token {
    Literal(u8),
    /// A back reference, `length` in 3..=258 and `dist` in 1..=32768.
    Match { length: u16, dist: u16 }
}

/// Hash the three bytes starting at `pos`.
#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    let v = u32::from(data[pos])
        | (u32::from(data[pos + 1]) << 8)
        | (u32::from(data[pos + 2]) << 16);
    (v.wrapping_mul(0x9E37_79B1) >> (32 - HASH_BITS)) as usize
}

/// Longest common prefix of the window at `a` and the lookahead at `b`,
/// capped at [`MAX_MATCH`].
#[inline]
fn match_length(data: &[u8], a: usize, b: usize) -> usize {
    let limit = MAX_MATCH.min(data.len() - b);
    let mut len = 0;
    while len < limit && data[a + len] == data[b + len] {
        len += 1;
    }
    len
}

/// Tokenize `data` with a greedy parse.
///
/// `max_chain` bounds how many previous hash-chain positions are probed
/// per lookup, trading ratio for speed.
pub fn tokenize(data: &[u8], max_chain: usize) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(data.len() / 2);

    if data.len() < MIN_MATCH + 1 {
        tokens.extend(data.iter().map(|&b| Token::Literal(b)));
        return tokens;
    }

    // head[h] is the most recent position with hash h, prev[p % WINDOW]
    // chains back to the previous one
    let mut head = vec![usize::MAX; HASH_SIZE];
    let mut prev = vec![usize::MAX; WINDOW_SIZE];

    let mut pos = 0;
    while pos < data.len() {
        if pos + MIN_MATCH > data.len() {
            tokens.push(Token::Literal(data[pos]));
            pos += 1;
            continue;
        }
        let hash = hash3(data, pos);
        let mut candidate = head[hash];
        let mut best_len = 0;
        let mut best_dist = 0;
        let mut chain = max_chain;

        while candidate != usize::MAX && chain > 0 {
            let dist = pos - candidate;
            if dist > WINDOW_SIZE {
                break;
            }
            // cheap reject before the full compare
            if best_len == 0
                || (pos + best_len < data.len()
                    && data[candidate + best_len] == data[pos + best_len])
            {
                let len = match_length(data, candidate, pos);
                if len > best_len {
                    best_len = len;
                    best_dist = dist;
                    if len >= MAX_MATCH {
                        break;
                    }
                }
            }
            candidate = prev[candidate % WINDOW_SIZE];
            chain -= 1;
        }

        if best_len >= MIN_MATCH {
            tokens.push(Token::Match {
                length: best_len as u16,
                dist:   best_dist as u16
            });
            // insert every covered position so later matches can reach
            // into this run
            let end = (pos + best_len).min(data.len().saturating_sub(MIN_MATCH - 1));
            for p in pos..end {
                let h = hash3(data, p);
                prev[p % WINDOW_SIZE] = head[h];
                head[h] = p;
            }
            pos += best_len;
        } else {
            tokens.push(Token::Literal(data[pos]));
            prev[pos % WINDOW_SIZE] = head[hash];
            head[hash] = pos;
            pos += 1;
        }
    }
    tokens
}

/// Expand a token stream back to bytes. Used by the tests to check the
/// parse is lossless independently of the entropy coder.
#[cfg(test)]
pub fn detokenize(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match *token {
            Token::Literal(b) => out.push(b),
            Token::Match { length, dist } => {
                let start = out.len() - usize::from(dist);
                for i in 0..usize::from(length) {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_data_produces_matches() {
        let data = b"abcabcabcabcabcabc";
        let tokens = tokenize(data, 32);

        assert!(tokens
            .iter()
            .any(|t| matches!(t, Token::Match { dist: 3, .. })));
        assert_eq!(detokenize(&tokens), data);
    }

    #[test]
    fn incompressible_data_is_all_literals() {
        let data: Vec<u8> = (0_u32..96).map(|i| (i * 37 % 251) as u8).collect();
        let tokens = tokenize(&data, 32);
        assert_eq!(detokenize(&tokens), data);
    }

    #[test]
    fn overlapping_match_round_trips() {
        // run-length style reference where dist < length
        let data = vec![7_u8; 300];
        let tokens = tokenize(&data, 32);
        assert_eq!(detokenize(&tokens), data);
        assert!(tokens.len() < 10);
    }

    #[test]
    fn tiny_inputs_pass_through() {
        assert_eq!(tokenize(b"ab", 32), vec![
            Token::Literal(b'a'),
            Token::Literal(b'b')
        ]);
    }
}
