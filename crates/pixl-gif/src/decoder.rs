/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The GIF decoder.
//!
//! Frames come back two ways at once, as the raw delta each image
//! descriptor carried and as the full composite after the disposal
//! state machine ran, so callers can pick whichever view they need.

use log::{trace, warn};
use pixl_core::bytestream::ByteReader;
use pixl_core::{DecoderOptions, PixelBuffer};

use crate::enums::DisposalMethod;
use crate::errors::GifDecodeErrors;
use crate::lzw::lzw_decompress;

/// One decoded frame.
pub struct DecodedFrame {
    /// The region this frame actually carried, transparent pixels have
    /// zero alpha.
    pub delta:     PixelBuffer,
    /// Canvas-sized composite after this frame was drawn.
    pub composite: PixelBuffer,
    /// Placement of `delta` within the canvas.
    pub left:      usize,
    pub top:       usize,
    /// Delay in hundredths of a second.
    pub delay_cs:  u16,
    pub disposal:  DisposalMethod
}

/// A fully decoded animation.
pub struct GifAnimation {
    pub width:      usize,
    pub height:     usize,
    /// Loop count from the NETSCAPE extension, zero means forever,
    /// `None` when the extension was absent.
    pub loop_count: Option<u16>,
    pub frames:     Vec<DecodedFrame>
}

/// Pending graphic control state, applies to the next image.
#[derive(Default, Copy, Clone)]
struct GraphicControl {
    delay_cs:          u16,
    disposal:          DisposalMethod,
    transparent_index: Option<u8>
}

pub struct GifDecoder<'a> {
    data:    &'a [u8],
    options: DecoderOptions
}

impl<'a> GifDecoder<'a> {
    pub fn new(data: &'a [u8]) -> GifDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> GifDecoder<'a> {
        GifDecoder { data, options }
    }

    pub fn decode(&mut self) -> Result<GifAnimation, GifDecodeErrors> {
        let mut stream = ByteReader::new(self.data);

        let magic = stream
            .get_bytes(6)
            .map_err(|_| GifDecodeErrors::NotAGif)?;
        if magic != b"GIF89a" && magic != b"GIF87a" {
            return Err(GifDecodeErrors::NotAGif);
        }
        let width = stream.get_u16_le_err()? as usize;
        let height = stream.get_u16_le_err()? as usize;
        let packed = stream.get_u8_err()?;
        let _background = stream.get_u8_err()?;
        let _aspect = stream.get_u8_err()?;

        trace!("logical screen {width}x{height}, packed {packed:#04x}");

        if width == 0 || height == 0 {
            return Err(GifDecodeErrors::CorruptData("zero logical screen size"));
        }
        if width > self.options.get_max_width() {
            return Err(GifDecodeErrors::TooLargeDimensions("width", width));
        }
        if height > self.options.get_max_height() {
            return Err(GifDecodeErrors::TooLargeDimensions("height", height));
        }
        let global_table = if packed & 0x80 != 0 {
            read_color_table(&mut stream, 2 << (packed & 0x07))?
        } else {
            Vec::new()
        };

        let mut canvas = PixelBuffer::new(width, height);
        let mut frames: Vec<DecodedFrame> = Vec::new();
        let mut loop_count: Option<u16> = None;
        let mut control = GraphicControl::default();
        let mut saw_trailer = false;

        loop {
            let Ok(block) = stream.get_u8_err() else {
                break;
            };
            match block {
                0x2C => {
                    let frame = self.read_image(
                        &mut stream,
                        &global_table,
                        &mut canvas,
                        width,
                        height,
                        control
                    )?;
                    frames.push(frame);
                    control = GraphicControl::default();
                }
                0x21 => {
                    let label = stream.get_u8_err()?;
                    match label {
                        0xF9 => control = read_graphic_control(&mut stream)?,
                        0xFF => {
                            if let Some(count) = read_application_extension(&mut stream)? {
                                loop_count = Some(count);
                            }
                        }
                        _ => {
                            trace!("skipping extension {label:#04x}");
                            skip_sub_blocks(&mut stream)?;
                        }
                    }
                }
                0x3B => {
                    saw_trailer = true;
                    break;
                }
                _ => return Err(GifDecodeErrors::CorruptData("unknown block introducer"))
            }
        }
        if !saw_trailer {
            if self.options.get_strict_mode() {
                return Err(GifDecodeErrors::CorruptData("missing trailer byte"));
            }
            warn!("stream ended without a trailer byte");
        }
        if frames.is_empty() {
            return Err(GifDecodeErrors::CorruptData("file contains no images"));
        }
        Ok(GifAnimation {
            width,
            height,
            loop_count,
            frames
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn read_image(
        &self, stream: &mut ByteReader<'a>, global_table: &[[u8; 3]],
        canvas: &mut PixelBuffer, canvas_w: usize, canvas_h: usize, control: GraphicControl
    ) -> Result<DecodedFrame, GifDecodeErrors> {
        let left = stream.get_u16_le_err()? as usize;
        let top = stream.get_u16_le_err()? as usize;
        let width = stream.get_u16_le_err()? as usize;
        let height = stream.get_u16_le_err()? as usize;
        let packed = stream.get_u8_err()?;

        if width == 0 || height == 0 {
            return Err(GifDecodeErrors::CorruptData("zero frame size"));
        }
        if left + width > canvas_w || top + height > canvas_h {
            return Err(GifDecodeErrors::CorruptData(
                "frame extends past the logical screen"
            ));
        }
        let local_table;
        let table: &[[u8; 3]] = if packed & 0x80 != 0 {
            local_table = read_color_table(stream, 2 << (packed & 0x07))?;
            &local_table
        } else {
            global_table
        };
        if table.is_empty() {
            return Err(GifDecodeErrors::CorruptData(
                "frame has neither local nor global color table"
            ));
        }
        let interlaced = packed & 0x40 != 0;

        let min_code_size = stream.get_u8_err()?;
        let lzw_data = read_sub_blocks(stream)?;
        let mut indices = lzw_decompress(&lzw_data, min_code_size, width * height)?;

        if interlaced {
            indices = deinterlace(&indices, width, height);
        }

        // expand indices to the frame-local delta image
        let mut delta = PixelBuffer::new(width, height);
        for (i, &index) in indices.iter().enumerate() {
            if control.transparent_index == Some(index) {
                continue;
            }
            let rgb = *table
                .get(usize::from(index))
                .ok_or(GifDecodeErrors::CorruptData("pixel index outside color table"))?;
            delta.set_pixel(i % width, i / width, [rgb[0], rgb[1], rgb[2], 255]);
        }

        // disposal needs the region as it was before this frame drew
        let saved = match control.disposal {
            DisposalMethod::Previous => Some(canvas.clone()),
            _ => None
        };

        // draw only carried pixels, transparent ones keep the canvas
        for y in 0..height {
            for x in 0..width {
                let pixel = delta.pixel(x, y);
                if pixel[3] != 0 {
                    canvas.set_pixel(left + x, top + y, pixel);
                }
            }
        }
        let composite = canvas.clone();

        match control.disposal {
            DisposalMethod::None => {}
            DisposalMethod::Background => {
                for y in top..top + height {
                    for x in left..left + width {
                        canvas.set_pixel(x, y, [0, 0, 0, 0]);
                    }
                }
            }
            DisposalMethod::Previous => {
                if let Some(saved) = saved {
                    *canvas = saved;
                }
            }
        }

        Ok(DecodedFrame {
            delta,
            composite,
            left,
            top,
            delay_cs: control.delay_cs,
            disposal: control.disposal
        })
    }
}

fn read_color_table(
    stream: &mut ByteReader<'_>, entries: usize
) -> Result<Vec<[u8; 3]>, GifDecodeErrors> {
    let bytes = stream
        .get_bytes(entries * 3)
        .map_err(|_| GifDecodeErrors::CorruptData("truncated color table"))?;
    Ok(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

fn read_graphic_control(
    stream: &mut ByteReader<'_>
) -> Result<GraphicControl, GifDecodeErrors> {
    let size = stream.get_u8_err()?;
    if size != 4 {
        return Err(GifDecodeErrors::CorruptData(
            "graphic control block is not 4 bytes"
        ));
    }
    let packed = stream.get_u8_err()?;
    let delay_cs = stream.get_u16_le_err()?;
    let transparent = stream.get_u8_err()?;
    let terminator = stream.get_u8_err()?;
    if terminator != 0 {
        return Err(GifDecodeErrors::CorruptData(
            "graphic control block not terminated"
        ));
    }
    Ok(GraphicControl {
        delay_cs,
        disposal: DisposalMethod::from_u8((packed >> 2) & 0x07),
        transparent_index: (packed & 1 != 0).then_some(transparent)
    })
}

/// Returns the loop count if this is a NETSCAPE2.0 looping block.
fn read_application_extension(
    stream: &mut ByteReader<'_>
) -> Result<Option<u16>, GifDecodeErrors> {
    let size = stream.get_u8_err()?;
    if size != 11 {
        return Err(GifDecodeErrors::CorruptData(
            "application extension header is not 11 bytes"
        ));
    }
    let identifier = stream
        .get_bytes(11)
        .map_err(|_| GifDecodeErrors::CorruptData("truncated application extension"))?;
    let payload = read_sub_blocks(stream)?;

    if identifier == b"NETSCAPE2.0" && payload.len() == 3 && payload[0] == 1 {
        return Ok(Some(u16::from_le_bytes([payload[1], payload[2]])));
    }
    Ok(None)
}

fn read_sub_blocks(stream: &mut ByteReader<'_>) -> Result<Vec<u8>, GifDecodeErrors> {
    let mut out = Vec::new();
    loop {
        let size = stream.get_u8_err()?;
        if size == 0 {
            return Ok(out);
        }
        let block = stream
            .get_bytes(usize::from(size))
            .map_err(|_| GifDecodeErrors::CorruptData("truncated data sub-block"))?;
        out.extend_from_slice(block);
    }
}

fn skip_sub_blocks(stream: &mut ByteReader<'_>) -> Result<(), GifDecodeErrors> {
    loop {
        let size = stream.get_u8_err()?;
        if size == 0 {
            return Ok(());
        }
        if stream.get_bytes(usize::from(size)).is_err() {
            return Err(GifDecodeErrors::CorruptData("truncated data sub-block"));
        }
    }
}

/// Reorder the four interlace passes into natural row order.
fn deinterlace(indices: &[u8], width: usize, height: usize) -> Vec<u8> {
    const PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

    let mut out = vec![0_u8; indices.len()];
    let mut source_row = 0;

    for (start, step) in PASSES {
        let mut y = start;
        while y < height {
            let src = &indices[source_row * width..(source_row + 1) * width];
            out[y * width..(y + 1) * width].copy_from_slice(src);
            source_row += 1;
            y += step;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_gif_data() {
        assert!(matches!(
            GifDecoder::new(b"PNG is not a gif").decode(),
            Err(GifDecodeErrors::NotAGif)
        ));
    }

    #[test]
    fn deinterlace_reorders_rows() {
        // 1x8 image, one index per row, passes order 0,4,2,6,1,3,5,7
        let stored = [0, 4, 2, 6, 1, 3, 5, 7];
        let natural = deinterlace(&stored, 1, 8);
        assert_eq!(natural, [0, 1, 2, 3, 4, 5, 6, 7]);
    }
}
