/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A self-contained GIF89a codec.
//!
//! Encoding takes RGBA frames, picks shared or per-frame color tables,
//! maps low alpha to a transparent index and compresses with the
//! format's variable-width LZW. Decoding runs the disposal state
//! machine and returns both the per-frame deltas and the full
//! composites.
//!
//! ```
//! use pixl_core::PixelBuffer;
//! use pixl_gif::{encode_gif, GifDecoder, GifEncodeOptions, GifFrame};
//!
//! let frames = [GifFrame::new(PixelBuffer::filled(2, 2, [255, 0, 0, 255]), 10)];
//! let bytes = encode_gif(&frames, GifEncodeOptions::default()).unwrap();
//! let animation = GifDecoder::new(&bytes).decode().unwrap();
//! assert_eq!(animation.frames.len(), 1);
//! ```
mod decoder;
mod encoder;
pub mod enums;
pub mod errors;
pub mod lzw;

pub use crate::decoder::{DecodedFrame, GifAnimation, GifDecoder};
pub use crate::encoder::{encode_gif, GifEncodeOptions, GifFrame, ALPHA_THRESHOLD};
pub use crate::enums::DisposalMethod;
pub use crate::errors::{GifDecodeErrors, GifEncodeErrors};
