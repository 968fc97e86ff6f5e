/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A self-contained PNG codec plus the APNG animated extension.
//!
//! Supports the modes a pixel-art pipeline needs: 8-bit truecolor with
//! alpha, 8-bit truecolor, and indexed color with optional per-entry
//! transparency. Compression comes from `pixl-flate`, no external codec
//! is involved.
//!
//! # Decoding
//! ```
//! use pixl_core::PixelBuffer;
//! use pixl_png::{encode_rgba, PngDecoder, PngEncodeOptions};
//!
//! let image = PixelBuffer::filled(2, 2, [255, 0, 255, 255]);
//! let bytes = encode_rgba(&image, PngEncodeOptions::default()).unwrap();
//! let back = PngDecoder::new(&bytes).decode().unwrap();
//! assert_eq!(back, image);
//! ```
pub mod apng;
pub mod chunks;
pub mod crc;
mod decoder;
mod encoder;
pub mod enums;
pub mod errors;
pub mod filters;

pub use crate::apng::{ApngEncodeOptions, ApngEncoder, ApngFrame};
pub use crate::decoder::PngDecoder;
pub use crate::encoder::{encode_indexed, encode_rgba, PngEncodeOptions};
pub use crate::enums::{BlendOp, DisposeOp, FilterMethod, PngColorType};
pub use crate::errors::{PngDecodeErrors, PngEncodeErrors};
