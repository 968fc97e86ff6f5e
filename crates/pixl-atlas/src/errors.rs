/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

/// Errors possible when packing an atlas.
pub enum AtlasErrors {
    /// A single sprite, padding included, exceeds the page size even
    /// after considering rotation.
    SpriteTooLarge {
        width:  usize,
        height: usize
    },
    /// A sprite with a zero dimension cannot be placed.
    ZeroSizedSprite(usize),
    /// The configured page dimensions are zero.
    BadPageSize
}

impl Debug for AtlasErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpriteTooLarge { width, height } => {
                writeln!(f, "sprite of {width}x{height} cannot fit any page")
            }
            Self::ZeroSizedSprite(index) => {
                writeln!(f, "sprite {index} has a zero dimension")
            }
            Self::BadPageSize => writeln!(f, "page dimensions cannot be zero")
        }
    }
}

impl Display for AtlasErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for AtlasErrors {}
