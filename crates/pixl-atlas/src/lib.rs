/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Deterministic texture atlas packing.
//!
//! Packs a list of [`PixelBuffer`] sprites onto fixed-size pages with
//! a guillotine free-rectangle strategy. The same input list and
//! options always produce the same layout, placements never overlap
//! and pixels are copied without resampling.
//!
//! ```
//! use pixl_atlas::{pack_atlas, AtlasOptions};
//! use pixl_core::PixelBuffer;
//!
//! let sprites = vec![
//!     PixelBuffer::filled(16, 16, [255, 0, 0, 255]),
//!     PixelBuffer::filled(8, 8, [0, 255, 0, 255]),
//! ];
//! let options = AtlasOptions::default().set_max_width(32).set_max_height(32);
//! let (pages, entries) = pack_atlas(&sprites, options).unwrap();
//! assert_eq!(pages.len(), 1);
//! assert_eq!(entries.len(), 2);
//! ```
//!
//! [`PixelBuffer`]: pixl_core::PixelBuffer

pub mod errors;
pub mod packer;

pub use crate::errors::AtlasErrors;
pub use crate::packer::{pack_atlas, AtlasEntry, AtlasOptions, AtlasPacker};
