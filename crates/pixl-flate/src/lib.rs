/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A dependency-free DEFLATE (RFC 1951) and zlib (RFC 1950)
//! implementation.
//!
//! Both directions are provided. Decompression is hardened against
//! hostile streams, compression offers levels 0 (stored) through 9
//! (dynamic Huffman with a deep match search).
//!
//! # Usage
//! ```
//! use pixl_flate::{zlib_compress, DeflateDecoder, DeflateEncodeOptions};
//!
//! let data = b"hello hello hello hello";
//! let compressed = zlib_compress(data, DeflateEncodeOptions::default());
//! let decoded = DeflateDecoder::new(&compressed).decode_zlib().unwrap();
//! assert_eq!(&decoded, data);
//! ```
pub mod bitstream;
pub mod constants;
mod decoder;
mod encoder;
pub mod errors;
pub mod huffman;
pub mod lz77;
mod utils;

pub use crate::decoder::{DeflateDecoder, DeflateOptions};
pub use crate::encoder::{deflate_compress, zlib_compress, DeflateEncodeOptions};
pub use crate::errors::InflateDecodeErrors;
pub use crate::utils::calc_adler_hash;
