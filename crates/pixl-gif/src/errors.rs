/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

/// Errors possible when decoding a GIF stream.
pub enum GifDecodeErrors {
    /// The six-byte header is not GIF87a or GIF89a.
    NotAGif,
    /// The stream violates the format, with a short reason.
    CorruptData(&'static str),
    /// The LZW payload is malformed.
    BadLzw(&'static str),
    /// Dimensions exceed the configured limits.
    TooLargeDimensions(&'static str, usize),
    /// A valid file declaring something this decoder does not handle.
    UnsupportedFeature(String)
}

impl Debug for GifDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotAGif => writeln!(f, "not a GIF file"),
            Self::CorruptData(reason) => writeln!(f, "corrupt GIF stream: {reason}"),
            Self::BadLzw(reason) => writeln!(f, "bad LZW data: {reason}"),
            Self::TooLargeDimensions(name, value) => {
                writeln!(f, "{name} of {value} exceeds configured limit")
            }
            Self::UnsupportedFeature(feature) => writeln!(f, "unsupported: {feature}")
        }
    }
}

impl Display for GifDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for GifDecodeErrors {}

impl From<&'static str> for GifDecodeErrors {
    fn from(reason: &'static str) -> Self {
        GifDecodeErrors::CorruptData(reason)
    }
}

/// Errors raised while validating encoder inputs.
pub enum GifEncodeErrors {
    /// No frames supplied.
    EmptyFrameList,
    /// Frame dimensions differ from the first frame.
    /// Contains the offending frame index.
    InconsistentDimensions(usize),
    /// A dimension is zero or exceeds 65535.
    BadDimensions(usize, usize)
}

impl Debug for GifEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyFrameList => writeln!(f, "no frames supplied"),
            Self::InconsistentDimensions(index) => {
                writeln!(f, "frame {index} has different dimensions from frame 0")
            }
            Self::BadDimensions(width, height) => {
                writeln!(f, "cannot encode a {width}x{height} animation")
            }
        }
    }
}

impl Display for GifEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for GifEncodeErrors {}
