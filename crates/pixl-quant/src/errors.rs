/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

/// Errors from the quantization routines.
pub enum QuantizeErrors {
    /// Target color count outside 1..=256.
    InvalidColorCount(usize),
    /// The input buffer holds no pixels.
    EmptyInput
}

impl Debug for QuantizeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidColorCount(n) => {
                writeln!(f, "target color count {n} is outside 1..=256")
            }
            Self::EmptyInput => writeln!(f, "cannot quantize an empty buffer")
        }
    }
}

impl Display for QuantizeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for QuantizeErrors {}
