/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// PNG color types this codec understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColorType {
    /// Truecolor without alpha, three samples per pixel.
    Rgb,
    /// Palette indices, one sample per pixel.
    Indexed,
    /// Truecolor with alpha, four samples per pixel.
    Rgba
}

impl PngColorType {
    pub fn from_u8(value: u8) -> Option<PngColorType> {
        match value {
            2 => Some(PngColorType::Rgb),
            3 => Some(PngColorType::Indexed),
            6 => Some(PngColorType::Rgba),
            _ => None
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            PngColorType::Rgb => 2,
            PngColorType::Indexed => 3,
            PngColorType::Rgba => 6
        }
    }

    /// Samples per pixel at 8-bit depth.
    pub const fn channels(self) -> usize {
        match self {
            PngColorType::Rgb => 3,
            PngColorType::Indexed => 1,
            PngColorType::Rgba => 4
        }
    }
}

/// Scanline filter tags, one per row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterMethod {
    pub fn from_u8(value: u8) -> Option<FilterMethod> {
        match value {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            FilterMethod::None => 0,
            FilterMethod::Sub => 1,
            FilterMethod::Up => 2,
            FilterMethod::Average => 3,
            FilterMethod::Paeth => 4
        }
    }
}

/// What happens to a frame's region before the next frame is drawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DisposeOp {
    #[default]
    None,
    Background,
    Previous
}

impl DisposeOp {
    pub const fn to_u8(self) -> u8 {
        match self {
            DisposeOp::None => 0,
            DisposeOp::Background => 1,
            DisposeOp::Previous => 2
        }
    }
}

/// How a frame's pixels combine with the canvas.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BlendOp {
    /// Frame pixels replace the region.
    #[default]
    Source,
    /// Frame pixels are alpha composited over the region.
    Over
}

impl BlendOp {
    pub const fn to_u8(self) -> u8 {
        match self {
            BlendOp::Source => 0,
            BlendOp::Over => 1
        }
    }
}
