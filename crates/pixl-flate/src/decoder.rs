/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A DEFLATE and zlib decompressor.
//!
//! The decoder favours robustness over raw speed, Huffman codes are
//! resolved bit by bit over canonical count tables so a hostile stream
//! can never index out of bounds.

use crate::bitstream::BitStreamReader;
use crate::constants::{
    DIST_BASE, DIST_EXTRA_BITS, DIST_SYMBOLS, END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA_BITS,
    LITLEN_SYMBOLS, PRECODE_ORDER, PRECODE_SYMBOLS, WINDOW_SIZE
};
use crate::constants::{fixed_dist_lengths, fixed_litlen_lengths};
use crate::errors::InflateDecodeErrors;
use crate::huffman::HuffmanTable;
use crate::utils::calc_adler_hash;

/// Options the decompressor respects.
#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions {
    limit:             usize,
    confirm_checksums: bool,
    size_hint:         usize
}

impl Default for DeflateOptions {
    fn default() -> Self {
        DeflateOptions {
            limit:             1 << 30,
            confirm_checksums: true,
            size_hint:         37 * 1024
        }
    }
}

impl DeflateOptions {
    pub const fn get_limit(&self) -> usize {
        self.limit
    }

    pub const fn get_confirm_checksums(&self) -> bool {
        self.confirm_checksums
    }

    /// Hard ceiling on decompressed output, exceeded means an error.
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether to verify the Adler-32 checksum of a zlib stream.
    #[must_use]
    pub fn set_confirm_checksums(mut self, yes: bool) -> Self {
        self.confirm_checksums = yes;
        self
    }

    /// Expected output size, used to pre-size the output vector.
    #[must_use]
    pub fn set_size_hint(mut self, hint: usize) -> Self {
        self.size_hint = hint;
        self
    }
}

/// A DEFLATE/zlib streams decoder.
pub struct DeflateDecoder<'a> {
    data:    &'a [u8],
    options: DeflateOptions
}

impl<'a> DeflateDecoder<'a> {
    /// Create a decoder with default options.
    pub fn new(data: &'a [u8]) -> DeflateDecoder<'a> {
        Self::new_with_options(data, DeflateOptions::default())
    }

    /// Create a decoder with the given options.
    pub fn new_with_options(data: &'a [u8], options: DeflateOptions) -> DeflateDecoder<'a> {
        DeflateDecoder { data, options }
    }

    /// Decode a zlib-wrapped stream (RFC 1950), verifying the header and
    /// optionally the Adler-32 trailer.
    pub fn decode_zlib(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        if self.data.len() < 6 {
            return Err(InflateDecodeErrors::InsufficientData);
        }
        let cmf = self.data[0];
        let flg = self.data[1];

        if cmf & 0x0F != 8 {
            return Err(InflateDecodeErrors::BadZlibHeader(
                "compression method is not deflate"
            ));
        }
        if cmf >> 4 > 7 {
            return Err(InflateDecodeErrors::BadZlibHeader(
                "window size above 32 KiB"
            ));
        }
        if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
            return Err(InflateDecodeErrors::BadZlibHeader("FCHECK failed"));
        }
        if flg & 0x20 != 0 {
            return Err(InflateDecodeErrors::BadZlibHeader(
                "preset dictionaries are not supported"
            ));
        }
        let mut stream = BitStreamReader::new(&self.data[2..]);
        let out = self.inflate(&mut stream)?;

        if self.options.confirm_checksums {
            stream.align_to_byte();
            let trailer = stream.get_aligned_bytes(4).map(|b| {
                u32::from_be_bytes([b[0], b[1], b[2], b[3]])
            });
            match trailer {
                Ok(expected) => {
                    let found = calc_adler_hash(&out);
                    if expected != found {
                        return Err(InflateDecodeErrors::MismatchedAdler(expected, found));
                    }
                }
                Err(_) => return Err(InflateDecodeErrors::InsufficientData)
            }
        }
        Ok(out)
    }

    /// Decode a bare DEFLATE stream (RFC 1951).
    pub fn decode_deflate(&mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        let mut stream = BitStreamReader::new(self.data);
        self.inflate(&mut stream)
    }

    fn inflate(
        &self, stream: &mut BitStreamReader<'_>
    ) -> Result<Vec<u8>, InflateDecodeErrors> {
        let mut out: Vec<u8> =
            Vec::with_capacity(self.options.size_hint.min(self.options.limit));

        loop {
            let is_final = stream.get_bit()? == 1;
            let block_type = stream.get_bits(2)?;

            match block_type {
                0 => self.copy_stored_block(stream, &mut out)?,
                1 => {
                    let litlen = HuffmanTable::from_lengths(&fixed_litlen_lengths())?;
                    let dist = HuffmanTable::from_lengths(&fixed_dist_lengths())?;
                    self.decode_block(stream, &litlen, &dist, &mut out)?;
                }
                2 => {
                    let (litlen, dist) = read_dynamic_tables(stream)?;
                    self.decode_block(stream, &litlen, &dist, &mut out)?;
                }
                _ => {
                    return Err(InflateDecodeErrors::CorruptData(
                        "reserved block type 3 encountered"
                    ))
                }
            }
            if is_final {
                break;
            }
        }
        Ok(out)
    }

    fn copy_stored_block(
        &self, stream: &mut BitStreamReader<'_>, out: &mut Vec<u8>
    ) -> Result<(), InflateDecodeErrors> {
        stream.align_to_byte();

        let header = stream.get_aligned_bytes(4)?;
        let len = u16::from_le_bytes([header[0], header[1]]);
        let nlen = u16::from_le_bytes([header[2], header[3]]);

        if len != !nlen {
            return Err(InflateDecodeErrors::CorruptData(
                "stored block length does not match its complement"
            ));
        }
        self.check_limit(out.len() + usize::from(len))?;

        let bytes = stream.get_aligned_bytes(usize::from(len))?;
        out.extend_from_slice(bytes);
        Ok(())
    }

    fn decode_block(
        &self, stream: &mut BitStreamReader<'_>, litlen: &HuffmanTable, dist: &HuffmanTable,
        out: &mut Vec<u8>
    ) -> Result<(), InflateDecodeErrors> {
        loop {
            let symbol = litlen.decode(stream)?;

            if symbol < END_OF_BLOCK {
                self.check_limit(out.len() + 1)?;
                out.push(symbol as u8);
                continue;
            }
            if symbol == END_OF_BLOCK {
                return Ok(());
            }
            let len_idx = usize::from(symbol - 257);
            if len_idx >= LENGTH_BASE.len() {
                return Err(InflateDecodeErrors::CorruptData(
                    "invalid literal/length symbol"
                ));
            }
            let extra = stream.get_bits(LENGTH_EXTRA_BITS[len_idx])?;
            let length = usize::from(LENGTH_BASE[len_idx]) + extra as usize;

            let dist_symbol = usize::from(dist.decode(stream)?);
            if dist_symbol >= DIST_BASE.len() {
                return Err(InflateDecodeErrors::CorruptData("invalid distance symbol"));
            }
            let extra = stream.get_bits(DIST_EXTRA_BITS[dist_symbol])?;
            let distance = usize::from(DIST_BASE[dist_symbol]) + extra as usize;

            if distance > out.len() || distance > WINDOW_SIZE {
                return Err(InflateDecodeErrors::CorruptData(
                    "back reference before start of output"
                ));
            }
            self.check_limit(out.len() + length)?;

            // byte at a time, references may overlap their own output
            let start = out.len() - distance;
            for i in 0..length {
                let byte = out[start + i];
                out.push(byte);
            }
        }
    }

    fn check_limit(&self, size: usize) -> Result<(), InflateDecodeErrors> {
        if size > self.options.limit {
            return Err(InflateDecodeErrors::OutputLimitExceeded(
                self.options.limit,
                size
            ));
        }
        Ok(())
    }
}

/// Read the Huffman table definitions of a dynamic block.
fn read_dynamic_tables(
    stream: &mut BitStreamReader<'_>
) -> Result<(HuffmanTable, HuffmanTable), InflateDecodeErrors> {
    let hlit = stream.get_bits(5)? as usize + 257;
    let hdist = stream.get_bits(5)? as usize + 1;
    let hclen = stream.get_bits(4)? as usize + 4;

    if hlit > LITLEN_SYMBOLS - 2 || hdist > DIST_SYMBOLS {
        return Err(InflateDecodeErrors::CorruptData(
            "dynamic block declares too many symbols"
        ));
    }
    let mut precode_lengths = [0_u8; PRECODE_SYMBOLS];
    for i in 0..hclen {
        precode_lengths[PRECODE_ORDER[i]] = stream.get_bits(3)? as u8;
    }
    let precode = HuffmanTable::from_lengths(&precode_lengths)?;

    // literal/length and distance lengths share one run-length coded list
    let mut lengths = vec![0_u8; hlit + hdist];
    let mut index = 0;

    while index < lengths.len() {
        let symbol = precode.decode(stream)?;

        match symbol {
            0..=15 => {
                lengths[index] = symbol as u8;
                index += 1;
            }
            16 => {
                if index == 0 {
                    return Err(InflateDecodeErrors::CorruptData(
                        "repeat code with no previous length"
                    ));
                }
                let previous = lengths[index - 1];
                let repeat = stream.get_bits(2)? as usize + 3;
                if index + repeat > lengths.len() {
                    return Err(InflateDecodeErrors::CorruptData(
                        "repeat code overflows length list"
                    ));
                }
                lengths[index..index + repeat].fill(previous);
                index += repeat;
            }
            17 => {
                let repeat = stream.get_bits(3)? as usize + 3;
                if index + repeat > lengths.len() {
                    return Err(InflateDecodeErrors::CorruptData(
                        "repeat code overflows length list"
                    ));
                }
                index += repeat;
            }
            18 => {
                let repeat = stream.get_bits(7)? as usize + 11;
                if index + repeat > lengths.len() {
                    return Err(InflateDecodeErrors::CorruptData(
                        "repeat code overflows length list"
                    ));
                }
                index += repeat;
            }
            _ => {
                return Err(InflateDecodeErrors::CorruptData(
                    "invalid precode symbol"
                ))
            }
        }
    }
    if lengths[256] == 0 {
        return Err(InflateDecodeErrors::CorruptData(
            "end of block symbol has no code"
        ));
    }
    let litlen = HuffmanTable::from_lengths(&lengths[..hlit])?;
    let dist = HuffmanTable::from_lengths(&lengths[hlit..])?;

    Ok((litlen, dist))
}
