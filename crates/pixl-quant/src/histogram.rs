/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Color population counting.

use std::collections::HashMap;

use pixl_core::PixelBuffer;

/// One unique RGBA color and how many pixels carry it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ColorCount {
    pub color: [u8; 4],
    pub count: u32
}

/// Count unique colors in a buffer.
///
/// The result is sorted by the color's byte value, so two identical
/// buffers always produce identical histograms regardless of hash-map
/// iteration order.
pub fn build_histogram(buffer: &PixelBuffer) -> Vec<ColorCount> {
    let pixels: &[[u8; 4]] = bytemuck::cast_slice(buffer.data());
    let mut counts: HashMap<[u8; 4], u32> = HashMap::new();

    for pixel in pixels {
        *counts.entry(*pixel).or_insert(0) += 1;
    }
    let mut histogram: Vec<ColorCount> = counts
        .into_iter()
        .map(|(color, count)| ColorCount { color, count })
        .collect();
    histogram.sort_by_key(|entry| entry.color);
    histogram
}
