/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use pixl_flate::InflateDecodeErrors;

/// Errors possible when decoding a PNG stream.
pub enum PngDecodeErrors {
    /// The 8-byte file signature is wrong.
    BadSignature,
    /// A chunk failed structural validation.
    /// Contains a short reason.
    CorruptChunk(&'static str),
    /// Chunk CRC does not match its contents, expected and found.
    BadCrc(u32, u32),
    /// A valid file declaring a mode this decoder does not handle.
    UnsupportedFeature(String),
    /// Image dimensions exceed the configured limits.
    /// Contains the dimension name and the found value.
    TooLargeDimensions(&'static str, usize),
    /// The zlib payload could not be decompressed.
    Inflate(InflateDecodeErrors),
    /// Anything else, with a reason.
    Generic(String),
    GenericStatic(&'static str)
}

impl Debug for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "bad PNG signature"),
            Self::CorruptChunk(reason) => writeln!(f, "corrupt chunk: {reason}"),
            Self::BadCrc(expected, found) => {
                writeln!(f, "chunk CRC mismatch, expected {expected:08X} found {found:08X}")
            }
            Self::UnsupportedFeature(feature) => writeln!(f, "unsupported: {feature}"),
            Self::TooLargeDimensions(name, value) => {
                writeln!(f, "{name} of {value} exceeds configured limit")
            }
            Self::Inflate(err) => writeln!(f, "inflate error: {err:?}"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::GenericStatic(reason) => writeln!(f, "{reason}")
        }
    }
}

impl Display for PngDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PngDecodeErrors {}

impl From<InflateDecodeErrors> for PngDecodeErrors {
    fn from(err: InflateDecodeErrors) -> Self {
        PngDecodeErrors::Inflate(err)
    }
}

impl From<&'static str> for PngDecodeErrors {
    fn from(reason: &'static str) -> Self {
        PngDecodeErrors::GenericStatic(reason)
    }
}

/// Errors raised while validating encoder inputs.
pub enum PngEncodeErrors {
    /// No frames were supplied to an animation encoder.
    EmptyFrameList,
    /// A frame does not fit the canvas at its offset.
    /// Contains the frame index.
    FrameOutOfBounds(usize),
    /// Indexed encoding was asked for with an unusable palette.
    BadPalette(&'static str),
    /// Index data length disagrees with the declared dimensions.
    /// Contains expected and found.
    WrongIndexCount(usize, usize),
    /// An index refers past the end of the palette.
    IndexOutOfRange(u8, usize),
    /// A dimension is zero or too large for the format.
    BadDimensions(usize, usize)
}

impl Debug for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyFrameList => writeln!(f, "no frames supplied"),
            Self::FrameOutOfBounds(index) => {
                writeln!(f, "frame {index} does not fit the canvas at its offset")
            }
            Self::BadPalette(reason) => writeln!(f, "bad palette: {reason}"),
            Self::WrongIndexCount(expected, found) => {
                writeln!(f, "expected {expected} indices, found {found}")
            }
            Self::IndexOutOfRange(index, palette_len) => {
                writeln!(f, "index {index} out of range for palette of {palette_len}")
            }
            Self::BadDimensions(width, height) => {
                writeln!(f, "cannot encode a {width}x{height} image")
            }
        }
    }
}

impl Display for PngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PngEncodeErrors {}
