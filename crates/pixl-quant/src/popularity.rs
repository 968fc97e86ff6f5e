/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Popularity quantization, keep the `n` most frequent colors.

use crate::histogram::ColorCount;

/// The top `n` colors by pixel count, color value as the tie break.
pub fn popularity(histogram: &[ColorCount], n: usize) -> Vec<[u8; 4]> {
    debug_assert!(n >= 1);

    let mut ordered: Vec<ColorCount> = histogram.to_vec();
    ordered.sort_by(|a, b| (b.count, a.color).cmp(&(a.count, b.color)));
    ordered.truncate(n);

    let mut colors: Vec<[u8; 4]> = ordered.into_iter().map(|e| e.color).collect();
    colors.sort();
    colors
}
