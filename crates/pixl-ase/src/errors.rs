/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use pixl_flate::InflateDecodeErrors;

/// Errors possible when reading a sprite file.
pub enum AseDecodeErrors {
    /// The file magic is not 0xA5E0.
    NotAseprite,
    /// The stream violates the format, with a short reason.
    CorruptData(&'static str),
    /// A color depth this reader does not handle.
    UnsupportedDepth(u16),
    /// Dimensions exceed the configured limits.
    TooLargeDimensions(&'static str, usize),
    /// A compressed cel failed to decompress.
    Inflate(InflateDecodeErrors),
    /// A referenced frame, layer or tag does not exist.
    OutOfRange(&'static str, usize)
}

impl Debug for AseDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotAseprite => writeln!(f, "not an aseprite file"),
            Self::CorruptData(reason) => writeln!(f, "corrupt sprite file: {reason}"),
            Self::UnsupportedDepth(depth) => {
                writeln!(f, "unsupported color depth {depth}, expected 8, 16 or 32")
            }
            Self::TooLargeDimensions(name, value) => {
                writeln!(f, "{name} of {value} exceeds configured limit")
            }
            Self::Inflate(err) => writeln!(f, "cel decompression failed: {err:?}"),
            Self::OutOfRange(what, index) => writeln!(f, "{what} {index} does not exist")
        }
    }
}

impl Display for AseDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for AseDecodeErrors {}

impl From<InflateDecodeErrors> for AseDecodeErrors {
    fn from(err: InflateDecodeErrors) -> Self {
        AseDecodeErrors::Inflate(err)
    }
}

impl From<&'static str> for AseDecodeErrors {
    fn from(reason: &'static str) -> Self {
        AseDecodeErrors::CorruptData(reason)
    }
}
