/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The GIF89a encoder.
//!
//! Palette handling follows one deterministic rule: if the union of all
//! opaque frame colors (plus a transparency slot when needed) fits 256
//! entries, one shared global table is written, otherwise every frame
//! carries its own local table, popularity-quantized when a single
//! frame alone overflows. Pixels with alpha below 128 map to a reserved
//! transparent index.

use std::collections::{BTreeSet, HashMap};

use log::trace;
use pixl_core::bytestream::ByteWriter;
use pixl_core::{ColorMetric, Palette, PixelBuffer};
use pixl_quant::{extract_palette, QuantAlgorithm};

use crate::enums::DisposalMethod;
use crate::errors::GifEncodeErrors;
use crate::lzw::lzw_compress;

/// Alpha below this threshold renders as fully transparent.
pub const ALPHA_THRESHOLD: u8 = 128;

/// One input frame.
pub struct GifFrame {
    pub buffer:   PixelBuffer,
    /// Delay in hundredths of a second.
    pub delay_cs: u16,
    pub disposal: DisposalMethod
}

impl GifFrame {
    pub fn new(buffer: PixelBuffer, delay_cs: u16) -> GifFrame {
        GifFrame {
            buffer,
            delay_cs,
            disposal: DisposalMethod::None
        }
    }
}

/// Knobs for the encoder.
#[derive(Debug, Copy, Clone)]
pub struct GifEncodeOptions {
    /// NETSCAPE loop count, zero plays forever.
    loop_count: u16
}

impl Default for GifEncodeOptions {
    fn default() -> Self {
        GifEncodeOptions { loop_count: 0 }
    }
}

impl GifEncodeOptions {
    pub const fn get_loop_count(&self) -> u16 {
        self.loop_count
    }

    #[must_use]
    pub fn set_loop_count(mut self, count: u16) -> Self {
        self.loop_count = count;
        self
    }
}

/// A color table ready for the wire plus the index mapping into it.
struct FrameTable {
    /// RGB entries padded to a power of two.
    entries:           Vec<[u8; 3]>,
    lookup:            HashMap<[u8; 3], u8>,
    /// Fallback palette for colors dropped during quantization.
    palette:           Palette,
    transparent_index: Option<u8>
}

impl FrameTable {
    /// Bits-per-entry field as stored in packed table flags.
    fn size_bits(&self) -> u8 {
        (self.entries.len().trailing_zeros() as u8).saturating_sub(1)
    }

    fn min_code_size(&self) -> u8 {
        (self.entries.len().trailing_zeros() as u8).max(2)
    }

    fn map_pixel(&self, pixel: [u8; 4]) -> u8 {
        if pixel[3] < ALPHA_THRESHOLD {
            if let Some(index) = self.transparent_index {
                return index;
            }
        }
        let rgb = [pixel[0], pixel[1], pixel[2]];
        match self.lookup.get(&rgb) {
            Some(&index) => index,
            None => self.palette.nearest(pixel, ColorMetric::Rgb) as u8
        }
    }
}

/// Build a wire table from unique opaque colors, quantizing when they
/// exceed the available slots.
fn build_table(colors: &BTreeSet<[u8; 3]>, needs_transparency: bool) -> FrameTable {
    let capacity = 256 - usize::from(needs_transparency);

    let chosen: Vec<[u8; 3]> = if colors.len() <= capacity {
        colors.iter().copied().collect()
    } else {
        trace!("{} colors exceed {capacity} slots, quantizing", colors.len());
        // popularity over the unique color set, every color weighing
        // the same keeps the choice deterministic
        let mut data = Vec::with_capacity(colors.len() * 4);
        for rgb in colors {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        let flat = PixelBuffer::from_rgba(colors.len(), 1, data)
            .unwrap_or_else(|_| PixelBuffer::new(1, 1));
        match extract_palette(&flat, capacity, QuantAlgorithm::Popularity) {
            Ok(palette) => palette
                .colors()
                .iter()
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
            Err(_) => vec![[0, 0, 0]]
        }
    };

    let mut entries = chosen.clone();
    let transparent_index = needs_transparency.then(|| {
        entries.push([0, 0, 0]);
        (entries.len() - 1) as u8
    });

    // color table lengths must be powers of two, at least two entries
    let padded = entries.len().next_power_of_two().max(2);
    entries.resize(padded, [0, 0, 0]);

    let lookup = chosen
        .iter()
        .enumerate()
        .map(|(i, &rgb)| (rgb, i as u8))
        .collect();
    let palette = Palette::new(chosen.iter().map(|c| [c[0], c[1], c[2], 255]).collect());

    FrameTable {
        entries,
        lookup,
        palette,
        transparent_index
    }
}

fn opaque_colors(buffer: &PixelBuffer) -> BTreeSet<[u8; 3]> {
    let mut colors = BTreeSet::new();
    for pixel in buffer.data().chunks_exact(4) {
        if pixel[3] >= ALPHA_THRESHOLD {
            colors.insert([pixel[0], pixel[1], pixel[2]]);
        }
    }
    colors
}

fn has_transparency(buffer: &PixelBuffer) -> bool {
    buffer.data().chunks_exact(4).any(|p| p[3] < ALPHA_THRESHOLD)
}

/// Encode frames as an animated GIF89a file.
pub fn encode_gif(
    frames: &[GifFrame], options: GifEncodeOptions
) -> Result<Vec<u8>, GifEncodeErrors> {
    let first = frames.first().ok_or(GifEncodeErrors::EmptyFrameList)?;
    let width = first.buffer.width();
    let height = first.buffer.height();

    if width == 0 || height == 0 || width > 0xFFFF || height > 0xFFFF {
        return Err(GifEncodeErrors::BadDimensions(width, height));
    }
    for (i, frame) in frames.iter().enumerate() {
        if frame.buffer.width() != width || frame.buffer.height() != height {
            return Err(GifEncodeErrors::InconsistentDimensions(i));
        }
    }

    let any_transparency = frames.iter().any(|f| has_transparency(&f.buffer));
    let mut union: BTreeSet<[u8; 3]> = BTreeSet::new();
    for frame in frames {
        union.extend(opaque_colors(&frame.buffer));
    }
    let capacity = 256 - usize::from(any_transparency);
    let shared = if union.len() <= capacity {
        Some(build_table(&union, any_transparency))
    } else {
        trace!("color union of {} does not fit, using local tables", union.len());
        None
    };

    let mut out = ByteWriter::with_capacity(1024);
    out.write_bytes(b"GIF89a");
    out.write_u16_le(width as u16);
    out.write_u16_le(height as u16);

    match &shared {
        Some(table) => {
            // global color table flag, 8-bit color resolution, size
            out.write_u8(0x80 | 0x70 | table.size_bits());
            out.write_u8(0);
            out.write_u8(0);
            for rgb in &table.entries {
                out.write_bytes(rgb);
            }
        }
        None => {
            out.write_u8(0x70);
            out.write_u8(0);
            out.write_u8(0);
        }
    }

    // NETSCAPE2.0 loop extension
    out.write_u8(0x21);
    out.write_u8(0xFF);
    out.write_u8(11);
    out.write_bytes(b"NETSCAPE2.0");
    out.write_u8(3);
    out.write_u8(1);
    out.write_u16_le(options.loop_count);
    out.write_u8(0);

    for frame in frames {
        let local;
        let table = match &shared {
            Some(table) => table,
            None => {
                local = build_table(
                    &opaque_colors(&frame.buffer),
                    has_transparency(&frame.buffer)
                );
                &local
            }
        };
        write_frame(&mut out, frame, table, shared.is_none());
    }
    out.write_u8(0x3B);
    Ok(out.into_inner())
}

fn write_frame(out: &mut ByteWriter, frame: &GifFrame, table: &FrameTable, local: bool) {
    // graphic control extension
    out.write_u8(0x21);
    out.write_u8(0xF9);
    out.write_u8(4);
    let transparent_flag = u8::from(table.transparent_index.is_some());
    out.write_u8((frame.disposal.to_u8() << 2) | transparent_flag);
    out.write_u16_le(frame.delay_cs);
    out.write_u8(table.transparent_index.unwrap_or(0));
    out.write_u8(0);

    // image descriptor, always the full canvas
    out.write_u8(0x2C);
    out.write_u16_le(0);
    out.write_u16_le(0);
    out.write_u16_le(frame.buffer.width() as u16);
    out.write_u16_le(frame.buffer.height() as u16);
    if local {
        out.write_u8(0x80 | table.size_bits());
        for rgb in &table.entries {
            out.write_bytes(rgb);
        }
    } else {
        out.write_u8(0);
    }

    let indices: Vec<u8> = frame
        .buffer
        .data()
        .chunks_exact(4)
        .map(|p| table.map_pixel([p[0], p[1], p[2], p[3]]))
        .collect();

    let min_code_size = table.min_code_size();
    out.write_u8(min_code_size);
    let compressed = lzw_compress(&indices, min_code_size);
    for block in compressed.chunks(255) {
        out.write_u8(block.len() as u8);
        out.write_bytes(block);
    }
    out.write_u8(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::GifDecoder;

    #[test]
    fn red_blue_scenario_round_trips() {
        let frames = [
            GifFrame::new(PixelBuffer::filled(10, 10, [255, 0, 0, 255]), 10),
            GifFrame::new(PixelBuffer::filled(10, 10, [0, 0, 255, 255]), 10),
        ];
        let bytes = encode_gif(&frames, GifEncodeOptions::default()).unwrap();
        let animation = GifDecoder::new(&bytes).decode().unwrap();

        assert_eq!(animation.frames.len(), 2);
        assert_eq!(animation.loop_count, Some(0));
        for (frame, color) in animation.frames.iter().zip([[255, 0, 0, 255], [0, 0, 255, 255]]) {
            assert_eq!(frame.delay_cs, 10);
            assert_eq!(frame.composite, PixelBuffer::filled(10, 10, color));
        }
    }

    #[test]
    fn shared_palette_when_colors_fit() {
        let frames = [
            GifFrame::new(PixelBuffer::filled(4, 4, [1, 2, 3, 255]), 5),
            GifFrame::new(PixelBuffer::filled(4, 4, [9, 8, 7, 255]), 5),
        ];
        let bytes = encode_gif(&frames, GifEncodeOptions::default()).unwrap();
        // global color table flag set in the logical screen descriptor
        assert_ne!(bytes[10] & 0x80, 0);
    }

    #[test]
    fn local_palettes_when_union_overflows() {
        // each frame fits 256 colors, the union does not
        let mut a = PixelBuffer::new(20, 10);
        let mut b = PixelBuffer::new(20, 10);
        for i in 0..200 {
            a.set_pixel(i % 20, i / 20, [i as u8, 0, 0, 255]);
            b.set_pixel(i % 20, i / 20, [0, 0, i as u8, 255]);
        }
        let frames = [GifFrame::new(a.clone(), 4), GifFrame::new(b.clone(), 4)];
        let bytes = encode_gif(&frames, GifEncodeOptions::default()).unwrap();
        assert_eq!(bytes[10] & 0x80, 0);

        // both frames keep their exact colors through local tables
        let animation = GifDecoder::new(&bytes).decode().unwrap();
        assert_eq!(animation.frames[0].composite, a);
        assert_eq!(animation.frames[1].composite, b);
    }

    #[test]
    fn transparency_threshold_is_honoured() {
        let mut buffer = PixelBuffer::filled(4, 4, [50, 60, 70, 255]);
        buffer.set_pixel(0, 0, [50, 60, 70, 127]);
        buffer.set_pixel(1, 0, [50, 60, 70, 128]);

        let frames = [GifFrame::new(buffer, 5)];
        let bytes = encode_gif(&frames, GifEncodeOptions::default()).unwrap();
        let animation = GifDecoder::new(&bytes).decode().unwrap();

        let delta = &animation.frames[0].delta;
        assert_eq!(delta.pixel(0, 0)[3], 0);
        assert_eq!(delta.pixel(1, 0), [50, 60, 70, 255]);
    }

    #[test]
    fn background_disposal_clears_region() {
        let mut first = GifFrame::new(PixelBuffer::filled(4, 4, [255, 0, 0, 255]), 5);
        first.disposal = DisposalMethod::Background;
        // second frame fully transparent, the cleared canvas shows
        let second = GifFrame::new(PixelBuffer::filled(4, 4, [0, 0, 0, 0]), 5);

        let bytes = encode_gif(&[first, second], GifEncodeOptions::default()).unwrap();
        let animation = GifDecoder::new(&bytes).decode().unwrap();

        assert_eq!(
            animation.frames[0].composite,
            PixelBuffer::filled(4, 4, [255, 0, 0, 255])
        );
        assert_eq!(animation.frames[1].composite, PixelBuffer::new(4, 4));
    }

    #[test]
    fn empty_frame_list_is_rejected() {
        assert!(matches!(
            encode_gif(&[], GifEncodeOptions::default()),
            Err(GifEncodeErrors::EmptyFrameList)
        ));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let frames = [
            GifFrame::new(PixelBuffer::new(4, 4), 5),
            GifFrame::new(PixelBuffer::new(5, 4), 5),
        ];
        assert!(matches!(
            encode_gif(&frames, GifEncodeOptions::default()),
            Err(GifEncodeErrors::InconsistentDimensions(1))
        ));
    }
}
