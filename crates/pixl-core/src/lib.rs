/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core primitives shared by the pixl codec crates.
//!
//! This crate carries no format knowledge of its own, it provides
//! the building blocks every codec in the family needs:
//!
//! - [`PixelBuffer`](buffer::PixelBuffer): an owned 8-bit RGBA raster
//! - [`Palette`](palette::Palette): an ordered list of at most 256 colors
//! - [`ByteReader`](bytestream::ByteReader)/[`ByteWriter`](bytestream::ByteWriter):
//!   endian-aware byte stream access over slices
//! - [`DecoderOptions`](options::DecoderOptions): shared decode guards
//! - colorspace math for perceptual color distances
pub mod buffer;
pub mod bytestream;
pub mod colorspace;
pub mod options;
pub mod palette;

pub use buffer::PixelBuffer;
pub use bytestream::{ByteReader, ByteWriter};
pub use options::DecoderOptions;
pub use palette::{ColorMetric, Palette};
