/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// What happens to a frame's region once its delay elapses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DisposalMethod {
    /// Leave the frame in place, the next frame draws over it.
    #[default]
    None,
    /// Clear the frame's region to transparent.
    Background,
    /// Restore whatever the region held before this frame.
    Previous
}

impl DisposalMethod {
    /// From the three-bit field of a graphic control block.
    pub fn from_u8(value: u8) -> DisposalMethod {
        match value {
            2 => DisposalMethod::Background,
            3 => DisposalMethod::Previous,
            // 0 (unspecified) and anything reserved behave like keep
            _ => DisposalMethod::None
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            DisposalMethod::None => 1,
            DisposalMethod::Background => 2,
            DisposalMethod::Previous => 3
        }
    }
}
