/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! An owned 8-bit RGBA raster with a top-left origin.

use core::fmt::{Debug, Formatter};

/// Errors raised when constructing a [`PixelBuffer`] from raw parts.
pub enum BufferErrors {
    /// Sample length does not match `width * height * 4`.
    /// Contains expected and found lengths.
    SizeMismatch(usize, usize),
    /// A dimension calculation overflowed `usize`.
    TooLargeDimensions(usize, usize)
}

impl Debug for BufferErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BufferErrors::SizeMismatch(expected, found) => {
                writeln!(
                    f,
                    "Sample length mismatch, expected {expected} bytes but found {found}"
                )
            }
            BufferErrors::TooLargeDimensions(width, height) => {
                writeln!(f, "Dimensions {width}x{height} overflow usize")
            }
        }
    }
}

/// An owned raster of non-premultiplied 8-bit RGBA samples,
/// stored row major with the origin at the top left.
///
/// Invariant: `data.len() == width * height * 4`, enforced by every
/// constructor. Decoders hand ownership of a freshly allocated buffer to
/// the caller; encoders only ever borrow one.
#[derive(Clone, Eq, PartialEq)]
pub struct PixelBuffer {
    width:  usize,
    height: usize,
    data:   Vec<u8>
}

impl Debug for PixelBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "PixelBuffer({}x{})", self.width, self.height)
    }
}

impl PixelBuffer {
    /// Create a fully transparent buffer of the given dimensions.
    pub fn new(width: usize, height: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            data: vec![0; width * height * 4]
        }
    }

    /// Create a buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: [u8; 4]) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 4);

        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        PixelBuffer {
            width,
            height,
            data
        }
    }

    /// Take ownership of raw RGBA samples, validating the size invariant.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<PixelBuffer, BufferErrors> {
        let expected = width
            .checked_mul(height)
            .and_then(|c| c.checked_mul(4))
            .ok_or(BufferErrors::TooLargeDimensions(width, height))?;

        if data.len() != expected {
            return Err(BufferErrors::SizeMismatch(expected, data.len()));
        }
        Ok(PixelBuffer {
            width,
            height,
            data
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA samples, row major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer returning its samples.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let pos = (y * self.width + x) * 4;
        [
            self.data[pos],
            self.data[pos + 1],
            self.data[pos + 2],
            self.data[pos + 3]
        ]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: [u8; 4]) {
        let pos = (y * self.width + x) * 4;
        self.data[pos..pos + 4].copy_from_slice(&color);
    }

    /// One scanline worth of RGBA bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.width * 4;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Copy `src` into this buffer at `(x, y)`, replacing pixels.
    ///
    /// Regions falling outside the destination are clipped.
    pub fn blit(&mut self, src: &PixelBuffer, x: usize, y: usize) {
        for sy in 0..src.height {
            let dy = y + sy;
            if dy >= self.height {
                break;
            }
            for sx in 0..src.width {
                let dx = x + sx;
                if dx >= self.width {
                    break;
                }
                self.set_pixel(dx, dy, src.pixel(sx, sy));
            }
        }
    }

    /// Alpha-composite `src` over this buffer at `(x, y)` using the
    /// source-over rule on non-premultiplied samples.
    ///
    /// `opacity` scales the source alpha, 255 means fully opaque.
    pub fn composite_over(&mut self, src: &PixelBuffer, x: i64, y: i64, opacity: u8) {
        for sy in 0..src.height {
            let dy = y + sy as i64;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for sx in 0..src.width {
                let dx = x + sx as i64;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let mut pixel = src.pixel(sx, sy);
                pixel[3] = ((u16::from(pixel[3]) * u16::from(opacity)) / 255) as u8;

                if pixel[3] == 0 {
                    continue;
                }
                let below = self.pixel(dx as usize, dy as usize);
                self.set_pixel(dx as usize, dy as usize, blend_over(pixel, below));
            }
        }
    }
}

/// Source-over blend of two non-premultiplied RGBA pixels,
/// `src` on top of `dst`.
#[inline]
pub fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    if src[3] == 255 || dst[3] == 0 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }
    let sa = u32::from(src[3]);
    let da = u32::from(dst[3]);
    // alpha values scaled by 255 to stay in integer math
    let out_a = sa * 255 + da * (255 - sa);

    let blend_channel = |s: u8, d: u8| -> u8 {
        let num = u32::from(s) * sa * 255 + u32::from(d) * da * (255 - sa);
        ((num + out_a / 2) / out_a) as u8
    };

    [
        blend_channel(src[0], dst[0]),
        blend_channel(src[1], dst[1]),
        blend_channel(src[2], dst[2]),
        ((out_a + 127) / 255) as u8
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_sample_vec() {
        let err = PixelBuffer::from_rgba(4, 4, vec![0; 63]);
        assert!(err.is_err());
    }

    #[test]
    fn blit_clips_at_edges() {
        let mut dst = PixelBuffer::new(4, 4);
        let src = PixelBuffer::filled(3, 3, [255, 0, 0, 255]);

        dst.blit(&src, 2, 2);

        assert_eq!(dst.pixel(2, 2), [255, 0, 0, 255]);
        assert_eq!(dst.pixel(3, 3), [255, 0, 0, 255]);
        assert_eq!(dst.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn opaque_over_wins() {
        assert_eq!(
            blend_over([10, 20, 30, 255], [1, 2, 3, 255]),
            [10, 20, 30, 255]
        );
    }

    #[test]
    fn transparent_over_keeps_below() {
        assert_eq!(blend_over([10, 20, 30, 0], [1, 2, 3, 200]), [1, 2, 3, 200]);
    }
}
