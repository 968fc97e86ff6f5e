/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PNG encoder, truecolor-with-alpha and indexed paths.

use pixl_core::bytestream::ByteWriter;
use pixl_core::{Palette, PixelBuffer};
use pixl_flate::{zlib_compress, DeflateEncodeOptions};

use crate::chunks::ChunkWriter;
use crate::enums::PngColorType;
use crate::errors::PngEncodeErrors;
use crate::filters::{choose_filter, filter_scanline};

/// Payload bytes per emitted IDAT chunk.
pub(crate) const IDAT_CHUNK_SIZE: usize = 8 * 1024;

/// PNG forbids dimensions above 2^31 - 1, and zero.
const MAX_DIMENSION: usize = i32::MAX as usize;

/// Knobs for the still-image encoder.
#[derive(Debug, Copy, Clone)]
pub struct PngEncodeOptions {
    level: u8
}

impl Default for PngEncodeOptions {
    fn default() -> Self {
        PngEncodeOptions { level: 6 }
    }
}

impl PngEncodeOptions {
    pub const fn get_level(&self) -> u8 {
        self.level
    }

    /// Deflate effort for the pixel stream, 0 to 9.
    #[must_use]
    pub fn set_level(mut self, level: u8) -> Self {
        self.level = level.min(9);
        self
    }
}

pub(crate) fn check_dimensions(width: usize, height: usize) -> Result<(), PngEncodeErrors> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PngEncodeErrors::BadDimensions(width, height));
    }
    Ok(())
}

pub(crate) fn write_ihdr(
    writer: &mut ChunkWriter, width: usize, height: usize, color_type: PngColorType
) {
    let mut payload = ByteWriter::with_capacity(13);
    payload.write_u32_be(width as u32);
    payload.write_u32_be(height as u32);
    payload.write_u8(8);
    payload.write_u8(color_type.to_u8());
    payload.write_u8(0);
    payload.write_u8(0);
    payload.write_u8(0);
    writer.write_chunk(b"IHDR", payload.bytes());
}

/// Filter every scanline with the minimum-sum heuristic and compress
/// the result.
pub(crate) fn compress_scanlines(
    rows: &[u8], width: usize, height: usize, channels: usize, level: u8
) -> Vec<u8> {
    let stride = width * channels;
    let mut filtered = Vec::with_capacity(height * (1 + stride));
    let mut previous: &[u8] = &[];

    for y in 0..height {
        let row = &rows[y * stride..(y + 1) * stride];
        let filter = choose_filter(row, previous, channels);

        filtered.push(filter.to_u8());
        filter_scanline(filter, row, previous, channels, &mut filtered);
        previous = row;
    }
    zlib_compress(&filtered, DeflateEncodeOptions::default().set_level(level))
}

pub(crate) fn write_idat_chunks(writer: &mut ChunkWriter, compressed: &[u8]) {
    for chunk in compressed.chunks(IDAT_CHUNK_SIZE) {
        writer.write_chunk(b"IDAT", chunk);
    }
}

/// Encode an RGBA buffer as a truecolor-with-alpha PNG.
pub fn encode_rgba(
    buffer: &PixelBuffer, options: PngEncodeOptions
) -> Result<Vec<u8>, PngEncodeErrors> {
    check_dimensions(buffer.width(), buffer.height())?;

    let mut writer = ChunkWriter::new();
    write_ihdr(&mut writer, buffer.width(), buffer.height(), PngColorType::Rgba);

    let compressed = compress_scanlines(
        buffer.data(),
        buffer.width(),
        buffer.height(),
        4,
        options.get_level()
    );
    write_idat_chunks(&mut writer, &compressed);
    writer.write_chunk(b"IEND", &[]);
    Ok(writer.finish())
}

/// Encode palette indices as an indexed PNG.
///
/// Writes a `tRNS` chunk when any palette entry is not fully opaque.
/// The caller provides one index per pixel, row major.
pub fn encode_indexed(
    indices: &[u8], width: usize, height: usize, palette: &Palette, options: PngEncodeOptions
) -> Result<Vec<u8>, PngEncodeErrors> {
    check_dimensions(width, height)?;

    if palette.is_empty() {
        return Err(PngEncodeErrors::BadPalette("palette is empty"));
    }
    if indices.len() != width * height {
        return Err(PngEncodeErrors::WrongIndexCount(width * height, indices.len()));
    }
    if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= palette.len()) {
        return Err(PngEncodeErrors::IndexOutOfRange(bad, palette.len()));
    }
    let mut writer = ChunkWriter::new();
    write_ihdr(&mut writer, width, height, PngColorType::Indexed);

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for color in palette.colors() {
        plte.extend_from_slice(&color[..3]);
    }
    writer.write_chunk(b"PLTE", &plte);

    // alpha entries past the last translucent one are implicit
    let last_translucent = palette
        .colors()
        .iter()
        .rposition(|c| c[3] != 255);
    if let Some(last) = last_translucent {
        let alphas: Vec<u8> = palette.colors()[..=last].iter().map(|c| c[3]).collect();
        writer.write_chunk(b"tRNS", &alphas);
    }
    let compressed = compress_scanlines(indices, width, height, 1, options.get_level());
    write_idat_chunks(&mut writer, &compressed);
    writer.write_chunk(b"IEND", &[]);
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::PngDecoder;

    #[test]
    fn checkerboard_round_trips() {
        let mut buffer = PixelBuffer::new(4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let color = if (x + y) % 2 == 0 {
                    [255, 255, 255, 255]
                } else {
                    [0, 0, 0, 255]
                };
                buffer.set_pixel(x, y, color);
            }
        }
        let bytes = encode_rgba(&buffer, PngEncodeOptions::default()).unwrap();
        let decoded = PngDecoder::new(&bytes).decode().unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn translucent_pixels_survive() {
        let buffer = PixelBuffer::filled(7, 3, [10, 200, 30, 128]);
        let bytes = encode_rgba(&buffer, PngEncodeOptions::default()).unwrap();
        let decoded = PngDecoder::new(&bytes).decode().unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn indexed_round_trips_with_trns() {
        let palette = Palette::new(vec![
            [255, 0, 0, 255],
            [0, 255, 0, 128],
            [0, 0, 255, 255],
        ]);
        let indices: Vec<u8> = (0..12).map(|i| (i % 3) as u8).collect();

        let bytes =
            encode_indexed(&indices, 4, 3, &palette, PngEncodeOptions::default()).unwrap();
        let decoded = PngDecoder::new(&bytes).decode().unwrap();

        for (i, &index) in indices.iter().enumerate() {
            let expected = palette.get(usize::from(index)).unwrap();
            assert_eq!(decoded.pixel(i % 4, i / 4), expected);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let palette = Palette::new(vec![[0, 0, 0, 255]]);
        let err = encode_indexed(&[0, 1, 0, 0], 2, 2, &palette, PngEncodeOptions::default());
        assert!(matches!(err, Err(PngEncodeErrors::IndexOutOfRange(1, 1))));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let buffer = PixelBuffer::new(0, 4);
        assert!(encode_rgba(&buffer, PngEncodeOptions::default()).is_err());
    }

    #[test]
    fn large_image_spans_multiple_idat_chunks() {
        use nanorand::Rng;

        let mut rng = nanorand::WyRand::new_seed(77);
        let mut data = vec![0_u8; 128 * 128 * 4];
        rng.fill_bytes(&mut data);

        let buffer = PixelBuffer::from_rgba(128, 128, data).unwrap();
        let bytes = encode_rgba(&buffer, PngEncodeOptions::default().set_level(1)).unwrap();
        let decoded = PngDecoder::new(&bytes).decode().unwrap();
        assert_eq!(decoded, buffer);
    }
}
