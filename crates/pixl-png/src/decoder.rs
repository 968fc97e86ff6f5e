/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The PNG decoder.
//!
//! Handles 8-bit RGB, RGBA and indexed images, the modes the rest of the
//! toolkit produces. Output is always an RGBA [`PixelBuffer`]. Ancillary
//! chunks it does not know, including the animated extension's control
//! chunks, are skipped.

use log::{trace, warn};
use pixl_core::bytestream::ByteReader;
use pixl_core::{DecoderOptions, PixelBuffer};
use pixl_flate::{DeflateDecoder, DeflateOptions};

use crate::chunks::ChunkReader;
use crate::enums::{FilterMethod, PngColorType};
use crate::errors::PngDecodeErrors;
use crate::filters::unfilter_scanline;

struct PngHeader {
    width:      usize,
    height:     usize,
    color_type: PngColorType
}

/// A single-image PNG decoder.
pub struct PngDecoder<'a> {
    data:    &'a [u8],
    options: DecoderOptions
}

impl<'a> PngDecoder<'a> {
    pub fn new(data: &'a [u8]) -> PngDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a> {
        PngDecoder { data, options }
    }

    /// Decode the image into a freshly allocated RGBA buffer.
    pub fn decode(&mut self) -> Result<PixelBuffer, PngDecodeErrors> {
        let mut chunks = ChunkReader::new(self.data, self.options.get_confirm_checksums())?;

        let mut header: Option<PngHeader> = None;
        let mut palette: Vec<[u8; 4]> = Vec::new();
        let mut idat: Vec<u8> = Vec::new();
        let mut seen_iend = false;

        while let Some(chunk) = chunks.next_chunk()? {
            match &chunk.name {
                b"IHDR" => {
                    if header.is_some() {
                        return Err(PngDecodeErrors::CorruptChunk("duplicate IHDR"));
                    }
                    header = Some(self.parse_ihdr(chunk.data)?);
                }
                b"PLTE" => {
                    if chunk.data.len() % 3 != 0 || chunk.data.is_empty() {
                        return Err(PngDecodeErrors::CorruptChunk(
                            "PLTE length is not a multiple of three"
                        ));
                    }
                    palette = chunk
                        .data
                        .chunks_exact(3)
                        .map(|c| [c[0], c[1], c[2], 255])
                        .collect();
                }
                b"tRNS" => {
                    if palette.is_empty() {
                        warn!("tRNS chunk before PLTE, ignoring");
                        continue;
                    }
                    for (entry, alpha) in palette.iter_mut().zip(chunk.data) {
                        entry[3] = *alpha;
                    }
                }
                b"IDAT" => idat.extend_from_slice(chunk.data),
                b"IEND" => {
                    seen_iend = true;
                    break;
                }
                name => {
                    trace!(
                        "skipping chunk {:?}",
                        core::str::from_utf8(name).unwrap_or("????")
                    );
                }
            }
        }
        if !seen_iend {
            if self.options.get_strict_mode() {
                return Err(PngDecodeErrors::CorruptChunk("missing IEND chunk"));
            }
            warn!("stream ended without an IEND chunk");
        }
        if seen_iend && chunks.remaining() > 0 {
            if self.options.get_strict_mode() {
                return Err(PngDecodeErrors::CorruptChunk("trailing bytes after IEND"));
            }
            warn!("{} trailing bytes after IEND", chunks.remaining());
        }
        let header = header.ok_or(PngDecodeErrors::CorruptChunk("missing IHDR chunk"))?;

        if header.color_type == PngColorType::Indexed && palette.is_empty() {
            return Err(PngDecodeErrors::CorruptChunk(
                "indexed image without a PLTE chunk"
            ));
        }
        if idat.is_empty() {
            return Err(PngDecodeErrors::CorruptChunk("no IDAT data"));
        }
        let channels = header.color_type.channels();
        let expected = header.height * (1 + header.width * channels);

        let inflate_options = DeflateOptions::default()
            .set_confirm_checksums(self.options.get_confirm_checksums())
            .set_limit(expected)
            .set_size_hint(expected);
        let mut raw = DeflateDecoder::new_with_options(&idat, inflate_options).decode_zlib()?;

        if raw.len() != expected {
            return Err(PngDecodeErrors::Generic(format!(
                "pixel stream is {} bytes, expected {expected}",
                raw.len()
            )));
        }
        self.unfilter_and_expand(&header, &palette, &mut raw)
    }

    fn parse_ihdr(&self, data: &[u8]) -> Result<PngHeader, PngDecodeErrors> {
        if data.len() != 13 {
            return Err(PngDecodeErrors::CorruptChunk("IHDR must be 13 bytes"));
        }
        let mut stream = ByteReader::new(data);
        let width = stream.get_u32_be() as usize;
        let height = stream.get_u32_be() as usize;
        let bit_depth = stream.get_u8();
        let color_type_raw = stream.get_u8();
        let compression = stream.get_u8();
        let filter_method = stream.get_u8();
        let interlace = stream.get_u8();

        trace!("image {width}x{height}, depth {bit_depth}, color type {color_type_raw}");

        if width == 0 || height == 0 {
            return Err(PngDecodeErrors::CorruptChunk("zero image dimension"));
        }
        if width > self.options.get_max_width() {
            return Err(PngDecodeErrors::TooLargeDimensions("width", width));
        }
        if height > self.options.get_max_height() {
            return Err(PngDecodeErrors::TooLargeDimensions("height", height));
        }
        if bit_depth != 8 {
            return Err(PngDecodeErrors::UnsupportedFeature(format!(
                "bit depth {bit_depth}, only 8 is supported"
            )));
        }
        let color_type = PngColorType::from_u8(color_type_raw).ok_or_else(|| {
            PngDecodeErrors::UnsupportedFeature(format!("color type {color_type_raw}"))
        })?;
        if compression != 0 || filter_method != 0 {
            return Err(PngDecodeErrors::CorruptChunk(
                "unknown compression or filter method"
            ));
        }
        if interlace != 0 {
            return Err(PngDecodeErrors::UnsupportedFeature(
                "interlaced images".to_string()
            ));
        }
        Ok(PngHeader {
            width,
            height,
            color_type
        })
    }

    /// Reverse the per-row filters and widen every mode to RGBA.
    fn unfilter_and_expand(
        &self, header: &PngHeader, palette: &[[u8; 4]], raw: &mut [u8]
    ) -> Result<PixelBuffer, PngDecodeErrors> {
        let channels = header.color_type.channels();
        let stride = header.width * channels;
        let mut out = Vec::with_capacity(header.width * header.height * 4);
        let mut previous: Vec<u8> = Vec::new();

        for row in raw.chunks_exact_mut(1 + stride) {
            let (tag, pixels) = row.split_at_mut(1);
            let filter = FilterMethod::from_u8(tag[0])
                .ok_or(PngDecodeErrors::CorruptChunk("invalid scanline filter tag"))?;

            unfilter_scanline(filter, pixels, &previous, channels);

            match header.color_type {
                PngColorType::Rgba => out.extend_from_slice(pixels),
                PngColorType::Rgb => {
                    for pixel in pixels.chunks_exact(3) {
                        out.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
                    }
                }
                PngColorType::Indexed => {
                    for &index in pixels.iter() {
                        let color = palette.get(usize::from(index)).ok_or(
                            PngDecodeErrors::CorruptChunk("palette index out of range")
                        )?;
                        out.extend_from_slice(color);
                    }
                }
            }
            previous.clear();
            previous.extend_from_slice(pixels);
        }
        PixelBuffer::from_rgba(header.width, header.height, out)
            .map_err(|_| PngDecodeErrors::GenericStatic("internal size mismatch"))
    }
}
