/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

use pixl_ase::AseDecodeErrors;
use pixl_atlas::AtlasErrors;
use pixl_gif::{GifDecodeErrors, GifEncodeErrors};
use pixl_png::{PngDecodeErrors, PngEncodeErrors};
use pixl_quant::QuantizeErrors;

/// The error taxonomy of the flat toolkit surface.
///
/// Each codec crate keeps its own precise error enum, this folds them
/// into four caller-facing categories plus I/O so a caller matching on
/// a toolkit result does not need to know which codec was involved.
pub enum PixlError {
    /// A decoder found a structural violation: a bad checksum, an
    /// invalid compressed stream, a truncated chunk.
    CorruptStream(String),
    /// The stream requires a feature this toolkit does not implement,
    /// such as an unusual bit depth.
    UnsupportedFormat(String),
    /// An encoder rejected its input before doing any work.
    BadEncodeInput(String),
    /// A sprite cannot fit any atlas page.
    Packing(AtlasErrors),
    /// An invalid quantization request.
    Quantization(QuantizeErrors),
    /// The filesystem said no.
    Io(std::io::Error)
}

impl Debug for PixlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CorruptStream(reason) => writeln!(f, "corrupt stream: {reason}"),
            Self::UnsupportedFormat(reason) => writeln!(f, "unsupported format: {reason}"),
            Self::BadEncodeInput(reason) => writeln!(f, "bad encode input: {reason}"),
            Self::Packing(err) => writeln!(f, "packing failed: {err}"),
            Self::Quantization(err) => writeln!(f, "quantization failed: {err}"),
            Self::Io(err) => writeln!(f, "i/o error: {err}")
        }
    }
}

impl Display for PixlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for PixlError {}

impl From<PngDecodeErrors> for PixlError {
    fn from(err: PngDecodeErrors) -> Self {
        match err {
            PngDecodeErrors::UnsupportedFeature(feature) => {
                PixlError::UnsupportedFormat(feature)
            }
            other => PixlError::CorruptStream(format!("{other}"))
        }
    }
}

impl From<PngEncodeErrors> for PixlError {
    fn from(err: PngEncodeErrors) -> Self {
        PixlError::BadEncodeInput(format!("{err}"))
    }
}

impl From<GifDecodeErrors> for PixlError {
    fn from(err: GifDecodeErrors) -> Self {
        match err {
            GifDecodeErrors::UnsupportedFeature(feature) => {
                PixlError::UnsupportedFormat(feature)
            }
            other => PixlError::CorruptStream(format!("{other}"))
        }
    }
}

impl From<GifEncodeErrors> for PixlError {
    fn from(err: GifEncodeErrors) -> Self {
        PixlError::BadEncodeInput(format!("{err}"))
    }
}

impl From<AseDecodeErrors> for PixlError {
    fn from(err: AseDecodeErrors) -> Self {
        match err {
            AseDecodeErrors::UnsupportedDepth(depth) => {
                PixlError::UnsupportedFormat(format!("color depth {depth}"))
            }
            other => PixlError::CorruptStream(format!("{other}"))
        }
    }
}

impl From<AtlasErrors> for PixlError {
    fn from(err: AtlasErrors) -> Self {
        PixlError::Packing(err)
    }
}

impl From<QuantizeErrors> for PixlError {
    fn from(err: QuantizeErrors) -> Self {
        PixlError::Quantization(err)
    }
}

impl From<std::io::Error> for PixlError {
    fn from(err: std::io::Error) -> Self {
        PixlError::Io(err)
    }
}
