/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The animated extension (APNG) encoder.
//!
//! The first frame is the base image and goes out as plain `IDAT`, so a
//! decoder unaware of the extension still shows something sensible.
//! Later frames travel in `fdAT` chunks. Every `fcTL` and `fdAT` chunk
//! carries a sequence number that must be strictly increasing across
//! both kinds, the encoder owns the counter so callers cannot get the
//! ordering wrong.

use pixl_core::bytestream::ByteWriter;
use pixl_core::PixelBuffer;

use crate::chunks::ChunkWriter;
use crate::encoder::{check_dimensions, compress_scanlines, write_idat_chunks, IDAT_CHUNK_SIZE};
use crate::enums::{BlendOp, DisposeOp, PngColorType};
use crate::errors::PngEncodeErrors;

/// One animation frame and its control data.
pub struct ApngFrame {
    pub buffer:    PixelBuffer,
    /// Placement within the canvas, pixels.
    pub x_offset:  u32,
    pub y_offset:  u32,
    /// Delay as `delay_num / delay_den` seconds, a zero denominator
    /// means hundredths per the format.
    pub delay_num: u16,
    pub delay_den: u16,
    pub dispose:   DisposeOp,
    pub blend:     BlendOp
}

impl ApngFrame {
    /// A full-canvas frame with a delay in milliseconds.
    pub fn from_millis(buffer: PixelBuffer, millis: u16) -> ApngFrame {
        ApngFrame {
            buffer,
            x_offset: 0,
            y_offset: 0,
            delay_num: millis,
            delay_den: 1000,
            dispose: DisposeOp::None,
            blend: BlendOp::Source
        }
    }
}

/// Knobs for the animation encoder.
#[derive(Debug, Copy, Clone)]
pub struct ApngEncodeOptions {
    level:     u8,
    /// Times the animation plays, zero means forever.
    num_plays: u32
}

impl Default for ApngEncodeOptions {
    fn default() -> Self {
        ApngEncodeOptions {
            level:     6,
            num_plays: 0
        }
    }
}

impl ApngEncodeOptions {
    pub const fn get_level(&self) -> u8 {
        self.level
    }

    pub const fn get_num_plays(&self) -> u32 {
        self.num_plays
    }

    #[must_use]
    pub fn set_level(mut self, level: u8) -> Self {
        self.level = level.min(9);
        self
    }

    #[must_use]
    pub fn set_num_plays(mut self, plays: u32) -> Self {
        self.num_plays = plays;
        self
    }
}

/// Builder-style animation encoder.
pub struct ApngEncoder {
    width:   usize,
    height:  usize,
    frames:  Vec<ApngFrame>,
    options: ApngEncodeOptions
}

impl ApngEncoder {
    pub fn new(width: usize, height: usize) -> ApngEncoder {
        Self::new_with_options(width, height, ApngEncodeOptions::default())
    }

    pub fn new_with_options(
        width: usize, height: usize, options: ApngEncodeOptions
    ) -> ApngEncoder {
        ApngEncoder {
            width,
            height,
            frames: Vec::new(),
            options
        }
    }

    pub fn add_frame(&mut self, frame: ApngFrame) -> &mut Self {
        self.frames.push(frame);
        self
    }

    /// Validate all frames and produce the encoded file.
    pub fn encode(&self) -> Result<Vec<u8>, PngEncodeErrors> {
        check_dimensions(self.width, self.height)?;

        if self.frames.is_empty() {
            return Err(PngEncodeErrors::EmptyFrameList);
        }
        for (i, frame) in self.frames.iter().enumerate() {
            let right = frame.x_offset as usize + frame.buffer.width();
            let bottom = frame.y_offset as usize + frame.buffer.height();
            if right > self.width || bottom > self.height {
                return Err(PngEncodeErrors::FrameOutOfBounds(i));
            }
        }
        // the base image must cover the whole canvas
        let first = &self.frames[0];
        if first.buffer.width() != self.width
            || first.buffer.height() != self.height
            || first.x_offset != 0
            || first.y_offset != 0
        {
            return Err(PngEncodeErrors::FrameOutOfBounds(0));
        }

        let mut writer = ChunkWriter::new();
        crate::encoder::write_ihdr(&mut writer, self.width, self.height, PngColorType::Rgba);

        let mut actl = ByteWriter::with_capacity(8);
        actl.write_u32_be(self.frames.len() as u32);
        actl.write_u32_be(self.options.num_plays);
        writer.write_chunk(b"acTL", actl.bytes());

        let mut sequence = SequenceCounter::new();

        for (i, frame) in self.frames.iter().enumerate() {
            self.write_fctl(&mut writer, &mut sequence, frame);

            let compressed = compress_scanlines(
                frame.buffer.data(),
                frame.buffer.width(),
                frame.buffer.height(),
                4,
                self.options.level
            );
            if i == 0 {
                write_idat_chunks(&mut writer, &compressed);
            } else {
                for chunk in compressed.chunks(IDAT_CHUNK_SIZE) {
                    let mut fdat = ByteWriter::with_capacity(4 + chunk.len());
                    fdat.write_u32_be(sequence.next());
                    fdat.write_bytes(chunk);
                    writer.write_chunk(b"fdAT", fdat.bytes());
                }
            }
        }
        writer.write_chunk(b"IEND", &[]);
        Ok(writer.finish())
    }

    fn write_fctl(
        &self, writer: &mut ChunkWriter, sequence: &mut SequenceCounter, frame: &ApngFrame
    ) {
        let mut fctl = ByteWriter::with_capacity(26);
        fctl.write_u32_be(sequence.next());
        fctl.write_u32_be(frame.buffer.width() as u32);
        fctl.write_u32_be(frame.buffer.height() as u32);
        fctl.write_u32_be(frame.x_offset);
        fctl.write_u32_be(frame.y_offset);
        fctl.write_u16_be(frame.delay_num);
        fctl.write_u16_be(frame.delay_den);
        fctl.write_u8(frame.dispose.to_u8());
        fctl.write_u8(frame.blend.to_u8());
        writer.write_chunk(b"fcTL", fctl.bytes());
    }
}

/// Hands out strictly increasing sequence numbers.
struct SequenceCounter {
    next: u32
}

impl SequenceCounter {
    fn new() -> SequenceCounter {
        SequenceCounter { next: 0 }
    }

    fn next(&mut self) -> u32 {
        let value = self.next;
        self.next += 1;
        debug_assert!(self.next > value);
        value
    }
}
