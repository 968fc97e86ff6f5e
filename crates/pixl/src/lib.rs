/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The pixel-art codec toolkit, one crate pulling the family together.
//!
//! Everything operates on [`PixelBuffer`], an owned 8-bit RGBA raster
//! with a top-left origin and non-premultiplied alpha. The member
//! crates are re-exported as modules for callers that want the precise
//! per-codec APIs; the flat functions here cover the common paths with
//! a single folded [`PixlError`].
//!
//! | concern | crate |
//! |---|---|
//! | shared primitives | [`pixl_core`] |
//! | deflate/zlib | [`pixl_flate`] |
//! | PNG + APNG | [`pixl_png`] |
//! | GIF89a | [`pixl_gif`] |
//! | Aseprite files | [`pixl_ase`] |
//! | quantization, dithering | [`pixl_quant`] |
//! | atlas packing | [`pixl_atlas`] |
//!
//! ```
//! use pixl::{decode_raster, encode_raster};
//! use pixl_core::PixelBuffer;
//!
//! let art = PixelBuffer::filled(4, 4, [255, 0, 255, 255]);
//! let png = encode_raster(&art).unwrap();
//! assert_eq!(decode_raster(&png).unwrap(), art);
//! ```

pub use pixl_ase;
pub use pixl_atlas;
pub use pixl_core;
pub use pixl_flate;
pub use pixl_gif;
pub use pixl_png;
pub use pixl_quant;

pub mod errors;
pub mod fs;

pub use crate::errors::PixlError;
pub use crate::fs::save_atomic;

use pixl_ase::{AseDecoder, AseFile};
use pixl_atlas::{AtlasEntry, AtlasOptions};
use pixl_core::{ColorMetric, Palette, PixelBuffer};
use pixl_gif::{GifAnimation, GifDecoder, GifEncodeOptions, GifFrame};
use pixl_png::{ApngEncoder, ApngFrame, PngDecoder, PngEncodeOptions};
use pixl_quant::{DitherMethod, QuantAlgorithm};

/// Encode a buffer as a truecolor-with-alpha PNG.
pub fn encode_raster(buffer: &PixelBuffer) -> Result<Vec<u8>, PixlError> {
    Ok(pixl_png::encode_rgba(buffer, PngEncodeOptions::default())?)
}

/// Decode a PNG into an RGBA buffer.
///
/// For an animated file this returns the base image; use
/// [`pixl_png::PngDecoder`] directly for frame-level access.
pub fn decode_raster(data: &[u8]) -> Result<PixelBuffer, PixlError> {
    Ok(PngDecoder::new(data).decode()?)
}

/// Encode frames as an animated GIF89a file.
pub fn encode_indexed_animation(
    frames: &[GifFrame], options: GifEncodeOptions
) -> Result<Vec<u8>, PixlError> {
    Ok(pixl_gif::encode_gif(frames, options)?)
}

/// Decode an animated GIF into per-frame deltas and full composites.
pub fn decode_indexed_animation(data: &[u8]) -> Result<GifAnimation, PixlError> {
    Ok(GifDecoder::new(data).decode()?)
}

/// Encode `(frame, delay in milliseconds)` pairs as an animated PNG.
///
/// Every frame must match the first frame's dimensions.
pub fn encode_animated_raster(frames: &[(PixelBuffer, u16)]) -> Result<Vec<u8>, PixlError> {
    let (first, _) = frames
        .first()
        .ok_or_else(|| PixlError::BadEncodeInput("no frames supplied".into()))?;

    let mut encoder = ApngEncoder::new(first.width(), first.height());
    for (buffer, millis) in frames {
        encoder.add_frame(ApngFrame::from_millis(buffer.clone(), *millis));
    }
    Ok(encoder.encode()?)
}

/// Parse an Aseprite sprite file.
pub fn decode_layered_sprite_file(data: &[u8]) -> Result<AseFile, PixlError> {
    Ok(AseDecoder::new(data).decode()?)
}

/// Reduce a buffer to at most `n` colors, returning the palette and
/// one palette index per pixel.
pub fn quantize(
    buffer: &PixelBuffer, n: usize, algorithm: QuantAlgorithm
) -> Result<(Palette, Vec<u8>), PixlError> {
    Ok(pixl_quant::quantize(buffer, n, algorithm)?)
}

/// Extract a representative palette of at most `n` colors.
pub fn extract_palette(
    buffer: &PixelBuffer, n: usize, algorithm: QuantAlgorithm
) -> Result<Palette, PixlError> {
    Ok(pixl_quant::extract_palette(buffer, n, algorithm)?)
}

/// Map a buffer onto a palette with the given dithering method.
pub fn dither(buffer: &PixelBuffer, palette: &Palette, method: DitherMethod) -> Vec<u8> {
    pixl_quant::dither(buffer, palette, method)
}

/// [`dither`] with a perceptual or RGB distance metric.
pub fn dither_with_metric(
    buffer: &PixelBuffer, palette: &Palette, method: DitherMethod, metric: ColorMetric
) -> Vec<u8> {
    pixl_quant::dither_with_metric(buffer, palette, method, metric)
}

/// Pack sprites onto atlas pages.
///
/// Returns the rendered pages and one placement entry per sprite, in
/// input order.
pub fn pack_atlas(
    sprites: &[PixelBuffer], options: AtlasOptions
) -> Result<(Vec<PixelBuffer>, Vec<AtlasEntry>), PixlError> {
    Ok(pixl_atlas::pack_atlas(sprites, options)?)
}
