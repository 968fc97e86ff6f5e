/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The sprite file parser.
//!
//! Everything in the container is little endian. A file is a 128 byte
//! header followed by frames, each frame a chunk list. Chunk kinds we
//! do not recognize are skipped so newer files still open.

use log::{trace, warn};
use pixl_core::bytestream::ByteReader;
use pixl_core::{DecoderOptions, Palette, PixelBuffer};
use pixl_flate::{DeflateDecoder, DeflateOptions};

use crate::errors::AseDecodeErrors;
use crate::file::{AseFile, AseFrame, BlendMode, Cel, Layer, LoopDirection, Tag};

const HEADER_MAGIC: u16 = 0xA5E0;
const FRAME_MAGIC: u16 = 0xF1FA;
const HEADER_SIZE: usize = 128;

const CHUNK_OLD_PALETTE_8: u16 = 0x0004;
const CHUNK_OLD_PALETTE_6: u16 = 0x0011;
const CHUNK_LAYER: u16 = 0x2004;
const CHUNK_CEL: u16 = 0x2005;
const CHUNK_TAGS: u16 = 0x2018;
const CHUNK_PALETTE: u16 = 0x2019;

/// Pixel format of the file, from the header's color depth field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum ColorDepth {
    Rgba,
    Grayscale,
    Indexed
}

impl ColorDepth {
    fn from_bits(bits: u16) -> Result<ColorDepth, AseDecodeErrors> {
        match bits {
            32 => Ok(ColorDepth::Rgba),
            16 => Ok(ColorDepth::Grayscale),
            8 => Ok(ColorDepth::Indexed),
            other => Err(AseDecodeErrors::UnsupportedDepth(other))
        }
    }

    const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorDepth::Rgba => 4,
            ColorDepth::Grayscale => 2,
            ColorDepth::Indexed => 1
        }
    }
}

/// A sprite file decoder.
///
/// ```no_run
/// use pixl_ase::AseDecoder;
///
/// let data = std::fs::read("hero.aseprite").unwrap();
/// let file = AseDecoder::new(&data).decode().unwrap();
/// let first = file.get_frame(0).unwrap();
/// ```
pub struct AseDecoder<'a> {
    stream:            ByteReader<'a>,
    options:           DecoderOptions,
    depth:             ColorDepth,
    transparent_index: u8,
    /// Header flag bit 1, when unset layer opacity bytes are garbage.
    layer_opacity_valid: bool,
    palette:           Vec<[u8; 4]>,
    /// Set once a new-style palette chunk is seen, old-style packets
    /// in the same file are then ignored.
    saw_new_palette:   bool
}

impl<'a> AseDecoder<'a> {
    pub fn new(data: &'a [u8]) -> AseDecoder<'a> {
        AseDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> AseDecoder<'a> {
        AseDecoder {
            stream: ByteReader::new(data),
            options,
            depth: ColorDepth::Rgba,
            transparent_index: 0,
            layer_opacity_valid: true,
            palette: Vec::new(),
            saw_new_palette: false
        }
    }

    /// Parse the whole file into an [`AseFile`].
    pub fn decode(&mut self) -> Result<AseFile, AseDecodeErrors> {
        let (frame_count, width, height) = self.decode_header()?;

        let mut layers = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();
        let mut frames: Vec<AseFrame> = Vec::with_capacity(frame_count);
        let mut images: Vec<PixelBuffer> = Vec::new();

        for frame_index in 0..frame_count {
            let frame_size = self.stream.get_u32_le_err()? as usize;
            let frame_start = self.stream.get_position().saturating_sub(4);
            let frame_end = frame_start + frame_size;

            if self.stream.get_u16_le_err()? != FRAME_MAGIC {
                return Err(AseDecodeErrors::CorruptData("bad frame magic"));
            }
            let old_chunk_count = usize::from(self.stream.get_u16_le_err()?);
            let duration_ms = self.stream.get_u16_le_err()?;
            self.stream.skip(2);
            let new_chunk_count = self.stream.get_u32_le_err()? as usize;
            let chunk_count = if new_chunk_count != 0 {
                new_chunk_count
            } else {
                old_chunk_count
            };
            trace!("frame {frame_index}: {chunk_count} chunks, {duration_ms} ms");

            let mut cels = Vec::new();
            for _ in 0..chunk_count {
                self.decode_chunk(
                    width,
                    height,
                    &mut layers,
                    &mut tags,
                    &mut cels,
                    &frames,
                    &mut images
                )?;
            }

            if self.stream.get_position() > frame_end {
                return Err(AseDecodeErrors::CorruptData("chunks overran frame size"));
            }
            // declared frame size wins over where the chunk walk ended
            self.stream.set_position(frame_end);
            frames.push(AseFrame { duration_ms, cels });
        }

        if !self.stream.eof() {
            if self.options.get_strict_mode() {
                return Err(AseDecodeErrors::CorruptData("trailing bytes after last frame"));
            }
            warn!("{} trailing bytes after last frame", self.stream.remaining());
        }

        Ok(AseFile {
            width,
            height,
            layers,
            frames,
            tags,
            palette: Palette::new(self.palette.clone()),
            images
        })
    }

    /// Returns `(frame_count, width, height)`.
    fn decode_header(&mut self) -> Result<(usize, usize, usize), AseDecodeErrors> {
        let declared_size = self.stream.get_u32_le_err()? as usize;
        if self.stream.get_u16_le_err()? != HEADER_MAGIC {
            return Err(AseDecodeErrors::NotAseprite);
        }
        if declared_size != self.stream.remaining() + 6 {
            warn!("header file size does not match actual length");
        }

        let frame_count = usize::from(self.stream.get_u16_le_err()?);
        let width = usize::from(self.stream.get_u16_le_err()?);
        let height = usize::from(self.stream.get_u16_le_err()?);
        if width == 0 || height == 0 {
            return Err(AseDecodeErrors::CorruptData("zero canvas dimension"));
        }
        if width > self.options.get_max_width() {
            return Err(AseDecodeErrors::TooLargeDimensions("width", width));
        }
        if height > self.options.get_max_height() {
            return Err(AseDecodeErrors::TooLargeDimensions("height", height));
        }

        self.depth = ColorDepth::from_bits(self.stream.get_u16_le_err()?)?;
        let flags = self.stream.get_u32_le_err()?;
        self.layer_opacity_valid = flags & 1 != 0;
        // deprecated global speed word plus two reserved dwords
        self.stream.skip(10);
        self.transparent_index = self.stream.get_u8_err()?;
        self.stream.skip(3);
        let color_count = match self.stream.get_u16_le_err()? {
            0 => 256,
            n => usize::from(n)
        };
        self.palette = vec![[0, 0, 0, 255]; color_count.min(256)];
        // pixel ratio, grid and reserved bytes
        self.stream.set_position(HEADER_SIZE);

        trace!(
            "sprite {width}x{height}, {frame_count} frames, depth {:?}, {color_count} colors",
            self.depth
        );
        Ok((frame_count, width, height))
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_chunk(
        &mut self, width: usize, height: usize, layers: &mut Vec<Layer>,
        tags: &mut Vec<Tag>, cels: &mut Vec<Cel>, frames: &[AseFrame],
        images: &mut Vec<PixelBuffer>
    ) -> Result<(), AseDecodeErrors> {
        let chunk_size = self.stream.get_u32_le_err()? as usize;
        if chunk_size < 6 {
            return Err(AseDecodeErrors::CorruptData("chunk shorter than its own header"));
        }
        let chunk_type = self.stream.get_u16_le_err()?;
        let data_len = chunk_size - 6;
        if !self.stream.has(data_len) {
            return Err(AseDecodeErrors::CorruptData("chunk overruns file"));
        }
        let chunk_end = self.stream.get_position() + data_len;

        match chunk_type {
            CHUNK_LAYER => layers.push(self.decode_layer_chunk()?),
            CHUNK_CEL => {
                let cel = self.decode_cel_chunk(width, height, data_len, frames, images)?;
                cels.push(cel);
            }
            CHUNK_TAGS => self.decode_tags_chunk(tags)?,
            CHUNK_PALETTE => self.decode_palette_chunk()?,
            CHUNK_OLD_PALETTE_8 => self.decode_old_palette_chunk(false)?,
            CHUNK_OLD_PALETTE_6 => self.decode_old_palette_chunk(true)?,
            other => trace!("skipping unknown chunk type {other:#06x}")
        }

        if self.stream.get_position() > chunk_end {
            return Err(AseDecodeErrors::CorruptData("chunk body overran its size"));
        }
        self.stream.set_position(chunk_end);
        Ok(())
    }

    fn decode_layer_chunk(&mut self) -> Result<Layer, AseDecodeErrors> {
        let flags = self.stream.get_u16_le_err()?;
        let layer_type = self.stream.get_u16_le_err()?;
        // child level, default width/height, all unused here
        self.stream.skip(6);
        let blend_mode = BlendMode::from_u16(self.stream.get_u16_le_err()?);
        let raw_opacity = self.stream.get_u8_err()?;
        let opacity = if self.layer_opacity_valid {
            raw_opacity
        } else {
            255
        };
        self.stream.skip(3);
        let name = self.read_string()?;

        trace!("layer {name:?}, type {layer_type}, opacity {opacity}");
        Ok(Layer {
            name,
            visible: flags & 1 != 0,
            is_group: layer_type == 1,
            opacity,
            blend_mode
        })
    }

    fn decode_cel_chunk(
        &mut self, canvas_w: usize, canvas_h: usize, data_len: usize,
        frames: &[AseFrame], images: &mut Vec<PixelBuffer>
    ) -> Result<Cel, AseDecodeErrors> {
        let body_start = self.stream.get_position();
        let layer = usize::from(self.stream.get_u16_le_err()?);
        let x = i32::from(self.stream.get_u16_le_err()? as i16);
        let y = i32::from(self.stream.get_u16_le_err()? as i16);
        let opacity = self.stream.get_u8_err()?;
        let cel_type = self.stream.get_u16_le_err()?;
        self.stream.skip(7);

        let image = match cel_type {
            // raw pixels
            0 => {
                let (w, h) = self.read_cel_dimensions(canvas_w, canvas_h)?;
                let raw_len = w * h * self.depth.bytes_per_pixel();
                let raw = self.stream.get_bytes(raw_len)?;
                images.push(self.pixels_to_buffer(raw, w, h)?);
                images.len() - 1
            }
            // linked, shares pixels with the same layer's cel in an
            // earlier frame
            1 => {
                let link_frame = usize::from(self.stream.get_u16_le_err()?);
                let linked = frames
                    .get(link_frame)
                    .and_then(|f| f.cels.iter().find(|c| c.layer == layer))
                    .ok_or(AseDecodeErrors::CorruptData("linked cel target missing"))?;
                linked.image
            }
            // zlib compressed pixels
            2 => {
                let (w, h) = self.read_cel_dimensions(canvas_w, canvas_h)?;
                let consumed = self.stream.get_position() - body_start;
                let compressed = self.stream.get_bytes(data_len - consumed)?;
                let raw_len = w * h * self.depth.bytes_per_pixel();
                let inflate_options = DeflateOptions::default().set_size_hint(raw_len);
                let raw = DeflateDecoder::new_with_options(compressed, inflate_options)
                    .decode_zlib()?;
                if raw.len() != raw_len {
                    return Err(AseDecodeErrors::CorruptData(
                        "compressed cel decompressed to wrong size"
                    ));
                }
                images.push(self.pixels_to_buffer(&raw, w, h)?);
                images.len() - 1
            }
            _ => {
                return Err(AseDecodeErrors::CorruptData("unsupported cel type"));
            }
        };

        Ok(Cel { layer, x, y, opacity, image })
    }

    fn read_cel_dimensions(
        &mut self, canvas_w: usize, canvas_h: usize
    ) -> Result<(usize, usize), AseDecodeErrors> {
        let w = usize::from(self.stream.get_u16_le_err()?);
        let h = usize::from(self.stream.get_u16_le_err()?);
        if w == 0 || h == 0 {
            return Err(AseDecodeErrors::CorruptData("zero sized cel"));
        }
        // a cel can hang off the canvas but never exceed it in size
        if w > canvas_w.max(self.options.get_max_width())
            || h > canvas_h.max(self.options.get_max_height())
        {
            return Err(AseDecodeErrors::TooLargeDimensions("cel width", w));
        }
        Ok((w, h))
    }

    /// Expand raw cel bytes into RGBA per the file's color depth.
    fn pixels_to_buffer(
        &self, raw: &[u8], w: usize, h: usize
    ) -> Result<PixelBuffer, AseDecodeErrors> {
        let mut buffer = PixelBuffer::new(w, h);
        match self.depth {
            ColorDepth::Rgba => {
                buffer.data_mut().copy_from_slice(raw);
            }
            ColorDepth::Grayscale => {
                for (dst, src) in buffer.data_mut().chunks_exact_mut(4).zip(raw.chunks_exact(2)) {
                    dst[0] = src[0];
                    dst[1] = src[0];
                    dst[2] = src[0];
                    dst[3] = src[1];
                }
            }
            ColorDepth::Indexed => {
                for (dst, &index) in buffer.data_mut().chunks_exact_mut(4).zip(raw.iter()) {
                    if index == self.transparent_index {
                        dst.copy_from_slice(&[0, 0, 0, 0]);
                        continue;
                    }
                    let color = self
                        .palette
                        .get(usize::from(index))
                        .ok_or(AseDecodeErrors::CorruptData("pixel index outside palette"))?;
                    dst.copy_from_slice(color);
                }
            }
        }
        Ok(buffer)
    }

    fn decode_tags_chunk(&mut self, tags: &mut Vec<Tag>) -> Result<(), AseDecodeErrors> {
        let count = usize::from(self.stream.get_u16_le_err()?);
        self.stream.skip(8);
        for _ in 0..count {
            let from = usize::from(self.stream.get_u16_le_err()?);
            let to = usize::from(self.stream.get_u16_le_err()?);
            let direction = LoopDirection::from_u8(self.stream.get_u8_err()?);
            // repeat count, reserved bytes, tag color, one extra byte
            self.stream.skip(12);
            let name = self.read_string()?;

            if from > to {
                return Err(AseDecodeErrors::CorruptData("tag range is inverted"));
            }
            // the tag table lives in frame 0, before later frames are
            // parsed, so the range is validated at lookup time instead
            trace!("tag {name:?}: frames {from}..={to}, {direction:?}");
            tags.push(Tag { name, from, to, direction });
        }
        Ok(())
    }

    fn decode_palette_chunk(&mut self) -> Result<(), AseDecodeErrors> {
        let new_size = self.stream.get_u32_le_err()? as usize;
        let first = self.stream.get_u32_le_err()? as usize;
        let last = self.stream.get_u32_le_err()? as usize;
        self.stream.skip(8);

        if last < first || last >= new_size {
            return Err(AseDecodeErrors::CorruptData("palette range is invalid"));
        }
        if self.palette.len() < new_size.min(256) {
            self.palette.resize(new_size.min(256), [0, 0, 0, 255]);
        }
        for index in first..=last {
            let flags = self.stream.get_u16_le_err()?;
            let color = self.stream.get_fixed_bytes_or_err::<4>()?;
            if flags & 1 != 0 {
                // named entry, the name is not kept
                let _ = self.read_string()?;
            }
            if let Some(slot) = self.palette.get_mut(index) {
                *slot = color;
            }
        }
        self.saw_new_palette = true;
        Ok(())
    }

    /// Old style palette packets, kept for files written by ancient
    /// versions. `six_bit` scales 0..=63 channel values up to 8 bits.
    fn decode_old_palette_chunk(&mut self, six_bit: bool) -> Result<(), AseDecodeErrors> {
        let packets = usize::from(self.stream.get_u16_le_err()?);
        let mut index = 0_usize;
        for _ in 0..packets {
            index += usize::from(self.stream.get_u8_err()?);
            let colors = match self.stream.get_u8_err()? {
                0 => 256,
                n => usize::from(n)
            };
            for _ in 0..colors {
                let [r, g, b] = self.stream.get_fixed_bytes_or_err::<3>()?;
                if !self.saw_new_palette {
                    let scale = |v: u8| if six_bit { (v << 2) | (v >> 4) } else { v };
                    if self.palette.len() <= index {
                        self.palette.resize((index + 1).min(256), [0, 0, 0, 255]);
                    }
                    if let Some(slot) = self.palette.get_mut(index) {
                        *slot = [scale(r), scale(g), scale(b), 255];
                    }
                }
                index += 1;
            }
        }
        Ok(())
    }

    /// A length-prefixed UTF-8 string.
    fn read_string(&mut self) -> Result<String, AseDecodeErrors> {
        let len = usize::from(self.stream.get_u16_le_err()?);
        let bytes = self.stream.get_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| AseDecodeErrors::CorruptData("string is not valid utf-8"))
    }
}
