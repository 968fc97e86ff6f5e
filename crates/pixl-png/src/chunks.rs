/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The chunk layer shared by the still and animated codecs.
//!
//! A file is the 8-byte signature followed by chunks, each a big endian
//! length, a 4-byte type tag, the payload and a CRC-32 over tag plus
//! payload. The reader yields chunks lazily and fails on the first
//! structural violation.

use pixl_core::bytestream::{ByteReader, ByteWriter};

use crate::crc::{crc32, crc_update};
use crate::errors::PngDecodeErrors;

/// The fixed file signature.
pub const PNG_SIGNATURE: [u8; 8] = [137, b'P', b'N', b'G', b'\r', b'\n', 26, b'\n'];

/// One decoded chunk, payload borrowed from the input.
pub struct PngChunk<'a> {
    pub name: [u8; 4],
    pub data: &'a [u8]
}

impl PngChunk<'_> {
    pub fn is(&self, name: &[u8; 4]) -> bool {
        self.name == *name
    }
}

/// Lazy chunk iterator over an in-memory file.
pub struct ChunkReader<'a> {
    stream:      ByteReader<'a>,
    confirm_crc: bool
}

impl<'a> ChunkReader<'a> {
    /// Validate the signature and position the reader at the first chunk.
    pub fn new(data: &'a [u8], confirm_crc: bool) -> Result<ChunkReader<'a>, PngDecodeErrors> {
        let mut stream = ByteReader::new(data);
        let signature = stream
            .get_fixed_bytes_or_err::<8>()
            .map_err(|_| PngDecodeErrors::BadSignature)?;

        if signature != PNG_SIGNATURE {
            return Err(PngDecodeErrors::BadSignature);
        }
        Ok(ChunkReader {
            stream,
            confirm_crc
        })
    }

    /// The next chunk, or `None` once the stream is exhausted.
    pub fn next_chunk(&mut self) -> Result<Option<PngChunk<'a>>, PngDecodeErrors> {
        if self.stream.remaining() == 0 {
            return Ok(None);
        }
        let length = self
            .stream
            .get_u32_be_err()
            .map_err(|_| PngDecodeErrors::CorruptChunk("truncated chunk length"))? as usize;
        let name = self
            .stream
            .get_fixed_bytes_or_err::<4>()
            .map_err(|_| PngDecodeErrors::CorruptChunk("truncated chunk type"))?;

        if length > self.stream.remaining() {
            return Err(PngDecodeErrors::CorruptChunk(
                "chunk length exceeds remaining stream"
            ));
        }
        let data = self
            .stream
            .get_bytes(length)
            .map_err(|_| PngDecodeErrors::CorruptChunk("truncated chunk payload"))?;
        let expected = self
            .stream
            .get_u32_be_err()
            .map_err(|_| PngDecodeErrors::CorruptChunk("truncated chunk CRC"))?;

        if self.confirm_crc {
            let found = !crc_update(crc_update(u32::MAX, &name), data);
            if expected != found {
                return Err(PngDecodeErrors::BadCrc(expected, found));
            }
        }
        Ok(Some(PngChunk { name, data }))
    }

    /// Bytes left after the cursor, used to detect trailing garbage.
    pub fn remaining(&self) -> usize {
        self.stream.remaining()
    }
}

/// Chunk emitter, writes the signature on construction.
pub struct ChunkWriter {
    out: ByteWriter
}

impl Default for ChunkWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkWriter {
    pub fn new() -> ChunkWriter {
        let mut out = ByteWriter::new();
        out.write_bytes(&PNG_SIGNATURE);
        ChunkWriter { out }
    }

    /// Append one chunk, computing its CRC.
    pub fn write_chunk(&mut self, name: &[u8; 4], data: &[u8]) {
        self.out.write_u32_be(data.len() as u32);
        self.out.write_bytes(name);
        self.out.write_bytes(data);

        let crc = !crc_update(crc_update(u32::MAX, name), data);
        self.out.write_u32_be(crc);
    }

    pub fn finish(self) -> Vec<u8> {
        self.out.into_inner()
    }
}

/// CRC of a tag plus payload, convenience for tests.
pub fn chunk_crc(name: &[u8; 4], data: &[u8]) -> u32 {
    let mut buf = Vec::with_capacity(4 + data.len());
    buf.extend_from_slice(name);
    buf.extend_from_slice(data);
    crc32(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_reader_round_trip() {
        let mut writer = ChunkWriter::new();
        writer.write_chunk(b"tEsT", &[1, 2, 3]);
        writer.write_chunk(b"IEND", &[]);
        let file = writer.finish();

        let mut reader = ChunkReader::new(&file, true).unwrap();
        let chunk = reader.next_chunk().unwrap().unwrap();
        assert!(chunk.is(b"tEsT"));
        assert_eq!(chunk.data, &[1, 2, 3]);

        let chunk = reader.next_chunk().unwrap().unwrap();
        assert!(chunk.is(b"IEND"));
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn flipped_bit_fails_crc() {
        let mut writer = ChunkWriter::new();
        writer.write_chunk(b"tEsT", &[1, 2, 3]);
        let mut file = writer.finish();
        file[8 + 8] ^= 0x40;

        let mut reader = ChunkReader::new(&file, true).unwrap();
        assert!(matches!(
            reader.next_chunk(),
            Err(PngDecodeErrors::BadCrc(..))
        ));
    }

    #[test]
    fn lying_length_is_rejected() {
        let mut writer = ChunkWriter::new();
        writer.write_chunk(b"tEsT", &[1, 2, 3]);
        let mut file = writer.finish();
        // inflate the declared length past the end of the stream
        file[8 + 3] = 0xFF;

        let mut reader = ChunkReader::new(&file, true).unwrap();
        assert!(reader.next_chunk().is_err());
    }

    #[test]
    fn wrong_signature_is_rejected() {
        assert!(matches!(
            ChunkReader::new(b"not a png file!!", true),
            Err(PngDecodeErrors::BadSignature)
        ));
    }
}
