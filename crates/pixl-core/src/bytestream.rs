/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Checked cursor readers and writers over byte slices.
//!
//! Decoders in this workspace never index raw slices directly, they go
//! through [`ByteReader`] which bounds-checks every access and keeps a
//! running position. [`ByteWriter`] is the encoding counterpart backed by
//! a growable `Vec<u8>`.

/// Generate the paired `get_uN_be/le` and `get_uN_be/le_err` accessors.
///
/// The non-`_err` forms return zero past the end of the buffer which suits
/// formats where truncation is detected later by checksum, the `_err`
/// forms surface truncation immediately.
macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$int_type:tt) => {
        impl<'a> ByteReader<'a> {
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, &'static str> {
                const SIZE: usize = core::mem::size_of::<$int_type>();

                match self.stream.get(self.position..self.position + SIZE) {
                    Some(bytes) => {
                        let value = $int_type::from_le_bytes(bytes.try_into().unwrap());
                        self.position += SIZE;
                        Ok(value)
                    }
                    None => Err("cannot read enough bytes from stream")
                }
            }

            #[inline]
            pub fn $name2(&mut self) -> Result<$int_type, &'static str> {
                const SIZE: usize = core::mem::size_of::<$int_type>();

                match self.stream.get(self.position..self.position + SIZE) {
                    Some(bytes) => {
                        let value = $int_type::from_be_bytes(bytes.try_into().unwrap());
                        self.position += SIZE;
                        Ok(value)
                    }
                    None => Err("cannot read enough bytes from stream")
                }
            }

            /// Little endian read, returns zero on truncation.
            #[inline(always)]
            pub fn $name3(&mut self) -> $int_type {
                self.$name().unwrap_or(0)
            }

            /// Big endian read, returns zero on truncation.
            #[inline(always)]
            pub fn $name4(&mut self) -> $int_type {
                self.$name2().unwrap_or(0)
            }
        }
    };
}

/// A position-tracking reader over a borrowed byte slice.
///
/// All reads are bounds checked, reads past the end either error or
/// return zero depending on the accessor chosen.
pub struct ByteReader<'a> {
    stream:   &'a [u8],
    position: usize
}

get_single_type!(get_u16_le_err, get_u16_be_err, get_u16_le, get_u16_be, u16);
get_single_type!(get_u32_le_err, get_u32_be_err, get_u32_le, get_u32_be, u32);

impl<'a> ByteReader<'a> {
    pub const fn new(stream: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            stream,
            position: 0
        }
    }

    #[inline]
    pub fn get_u8(&mut self) -> u8 {
        let byte = self.stream.get(self.position).copied().unwrap_or(0);
        self.position += 1;
        byte
    }

    #[inline]
    pub fn get_u8_err(&mut self) -> Result<u8, &'static str> {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(*byte)
            }
            None => Err("cannot read enough bytes from stream")
        }
    }

    /// Read `N` bytes without advancing on failure.
    #[inline]
    pub fn get_fixed_bytes_or_err<const N: usize>(&mut self) -> Result<[u8; N], &'static str> {
        match self.stream.get(self.position..self.position + N) {
            Some(bytes) => {
                self.position += N;
                // try_into cannot fail, the slice is exactly N bytes long
                Ok(bytes.try_into().unwrap())
            }
            None => Err("cannot read enough bytes from stream")
        }
    }

    /// Borrow the next `num` bytes, advancing past them.
    #[inline]
    pub fn get_bytes(&mut self, num: usize) -> Result<&'a [u8], &'static str> {
        match self.stream.get(self.position..self.position + num) {
            Some(bytes) => {
                self.position += num;
                Ok(bytes)
            }
            None => Err("cannot read enough bytes from stream")
        }
    }

    /// Look at a byte ahead of the cursor without consuming it.
    #[inline]
    pub fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.stream.get(self.position + ahead).copied()
    }

    #[inline]
    pub fn skip(&mut self, num: usize) {
        self.position = self.position.saturating_add(num).min(self.stream.len());
    }

    #[inline]
    pub fn rewind(&mut self, num: usize) {
        self.position = self.position.saturating_sub(num);
    }

    #[inline]
    pub const fn get_position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.stream.len());
    }

    /// True if at least `num` bytes remain to be read.
    #[inline]
    pub const fn has(&self, num: usize) -> bool {
        self.position.saturating_add(num) <= self.stream.len()
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.stream.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn eof(&self) -> bool {
        self.position >= self.stream.len()
    }

    /// The untouched slice from the cursor to the end of the stream.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.stream[self.position.min(self.stream.len())..]
    }
}

/// A growable little/big endian byte sink used by the encoders.
#[derive(Default)]
pub struct ByteWriter {
    data: Vec<u8>
}

impl ByteWriter {
    pub fn new() -> ByteWriter {
        ByteWriter { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> ByteWriter {
        ByteWriter {
            data: Vec::with_capacity(capacity)
        }
    }

    #[inline]
    pub fn write_u8(&mut self, byte: u8) {
        self.data.push(byte);
    }

    #[inline]
    pub fn write_u16_le(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u16_be(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_u32_le(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u32_be(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.data.len()
    }

    /// Overwrite previously written bytes, used to patch lengths
    /// known only after a payload is emitted.
    pub fn overwrite_at(&mut self, position: usize, bytes: &[u8]) {
        self.data[position..position + bytes.len()].copy_from_slice(bytes);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_pairs_round_trip() {
        let mut writer = ByteWriter::new();
        writer.write_u16_le(0xABCD);
        writer.write_u32_be(0xDEADBEEF);

        let data = writer.into_inner();
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.get_u16_le(), 0xABCD);
        assert_eq!(reader.get_u32_be(), 0xDEADBEEF);
        assert!(reader.eof());
    }

    #[test]
    fn truncated_read_errors() {
        let mut reader = ByteReader::new(&[1, 2]);
        assert!(reader.get_u32_le_err().is_err());
        // position must not move on failure
        assert_eq!(reader.get_position(), 0);
    }

    #[test]
    fn zero_on_eof_variant() {
        let mut reader = ByteReader::new(&[]);
        assert_eq!(reader.get_u16_be(), 0);
    }
}
