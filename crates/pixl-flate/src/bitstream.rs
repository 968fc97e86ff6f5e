/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! LSB-first bit level readers and writers.
//!
//! DEFLATE packs data starting at the least significant bit of each byte.
//! Huffman codes are stored with their own most significant bit first
//! inside that stream, which is why the encoder pre-reverses its codes,
//! the readers and writers here never reorder anything themselves.

/// An LSB-first bit reader over a borrowed byte slice.
///
/// Every read is bounds checked, consuming past the end of the input
/// yields an error rather than garbage.
pub struct BitStreamReader<'src> {
    src:       &'src [u8],
    position:  usize,
    buffer:    u64,
    bits_left: u8
}

impl<'src> BitStreamReader<'src> {
    pub const fn new(src: &'src [u8]) -> BitStreamReader<'src> {
        BitStreamReader {
            src,
            position: 0,
            buffer: 0,
            bits_left: 0
        }
    }

    /// Pull the next `count` bits (at most 32) from the stream.
    #[inline]
    pub fn get_bits(&mut self, count: u8) -> Result<u32, &'static str> {
        debug_assert!(count <= 32);

        while self.bits_left < count {
            let byte = *self
                .src
                .get(self.position)
                .ok_or("unexpected end of bit stream")?;
            self.position += 1;
            self.buffer |= u64::from(byte) << self.bits_left;
            self.bits_left += 8;
        }
        let mask = if count == 32 {
            u64::from(u32::MAX)
        } else {
            (1_u64 << count) - 1
        };
        let value = (self.buffer & mask) as u32;

        self.buffer >>= count;
        self.bits_left -= count;

        Ok(value)
    }

    /// Read a single bit.
    #[inline]
    pub fn get_bit(&mut self) -> Result<u32, &'static str> {
        self.get_bits(1)
    }

    /// Drop buffered bits so the next read starts on a byte boundary.
    /// Stored blocks require this.
    pub fn align_to_byte(&mut self) {
        self.buffer = 0;
        self.bits_left = 0;
    }

    /// Byte offset of the next unread byte. Only meaningful after
    /// [`Self::align_to_byte`].
    pub const fn byte_position(&self) -> usize {
        self.position
    }

    /// Borrow `count` whole bytes after aligning, advancing past them.
    pub fn get_aligned_bytes(&mut self, count: usize) -> Result<&'src [u8], &'static str> {
        debug_assert!(self.bits_left == 0);

        match self.src.get(self.position..self.position + count) {
            Some(bytes) => {
                self.position += count;
                Ok(bytes)
            }
            None => Err("unexpected end of bit stream")
        }
    }
}

/// An LSB-first bit writer backed by a growable byte vector.
#[derive(Default)]
pub struct BitStreamWriter {
    out:    Vec<u8>,
    buffer: u64,
    bits:   u8
}

impl BitStreamWriter {
    pub fn new() -> BitStreamWriter {
        BitStreamWriter::default()
    }

    /// Append the low `count` bits of `value`, LSB first.
    #[inline]
    pub fn put_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        debug_assert!(count == 32 || u64::from(value) < (1_u64 << count));

        self.buffer |= u64::from(value) << self.bits;
        self.bits += count;

        while self.bits >= 8 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer >>= 8;
            self.bits -= 8;
        }
    }

    /// Pad with zero bits to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        if self.bits > 0 {
            self.out.push((self.buffer & 0xFF) as u8);
            self.buffer = 0;
            self.bits = 0;
        }
    }

    /// Append whole bytes. The writer must be byte aligned.
    pub fn put_aligned_bytes(&mut self, bytes: &[u8]) {
        debug_assert!(self.bits == 0);
        self.out.extend_from_slice(bytes);
    }

    /// Flush any partial byte and return the written stream.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.out
    }
}

/// Reverse the low `count` bits of `code`.
///
/// Canonical Huffman assignment produces codes MSB first, the stream
/// wants them emitted starting from the MSB, so with an LSB-first writer
/// the bits must be flipped once at table build time.
#[inline]
pub fn reverse_bits(code: u16, count: u8) -> u16 {
    code.reverse_bits() >> (16 - count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let mut writer = BitStreamWriter::new();
        writer.put_bits(0b101, 3);
        writer.put_bits(0b11001, 5);
        writer.put_bits(0xABCD, 16);

        let bytes = writer.finish();
        let mut reader = BitStreamReader::new(&bytes);

        assert_eq!(reader.get_bits(3).unwrap(), 0b101);
        assert_eq!(reader.get_bits(5).unwrap(), 0b11001);
        assert_eq!(reader.get_bits(16).unwrap(), 0xABCD);
    }

    #[test]
    fn read_past_end_errors() {
        let mut reader = BitStreamReader::new(&[0xFF]);
        assert!(reader.get_bits(8).is_ok());
        assert!(reader.get_bit().is_err());
    }

    #[test]
    fn align_discards_partial_byte() {
        let mut reader = BitStreamReader::new(&[0b0000_0001, 0xAA]);
        assert_eq!(reader.get_bit().unwrap(), 1);
        reader.align_to_byte();
        assert_eq!(reader.get_aligned_bytes(1).unwrap(), &[0xAA]);
    }

    #[test]
    fn reverse_matches_hand_computed() {
        assert_eq!(reverse_bits(0b110, 3), 0b011);
        assert_eq!(reverse_bits(0b1, 1), 0b1);
        assert_eq!(reverse_bits(0b10000000, 8), 0b00000001);
    }
}
