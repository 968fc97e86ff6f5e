/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Nearest-palette remapping of full buffers.

use std::collections::HashMap;

use pixl_core::{ColorMetric, Palette, PixelBuffer};

/// Map every pixel to its nearest palette index.
///
/// Lookups are cached per unique color, pixel art repeats colors
/// heavily so this collapses most of the work.
pub fn remap(buffer: &PixelBuffer, palette: &Palette, metric: ColorMetric) -> Vec<u8> {
    let pixels: &[[u8; 4]] = bytemuck::cast_slice(buffer.data());
    let mut cache: HashMap<[u8; 4], u8> = HashMap::new();
    let mut indices = Vec::with_capacity(pixels.len());

    for pixel in pixels {
        let index = *cache
            .entry(*pixel)
            .or_insert_with(|| palette.nearest(*pixel, metric) as u8);
        indices.push(index);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_colors_map_exactly() {
        let palette = Palette::new(vec![[255, 0, 0, 255], [0, 0, 255, 255]]);
        let mut buffer = PixelBuffer::filled(2, 1, [255, 0, 0, 255]);
        buffer.set_pixel(1, 0, [0, 0, 255, 255]);

        assert_eq!(remap(&buffer, &palette, ColorMetric::Rgb), vec![0, 1]);
    }

    #[test]
    fn metrics_agree_on_obvious_cases() {
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]]);
        let buffer = PixelBuffer::filled(3, 3, [10, 12, 8, 255]);

        assert_eq!(remap(&buffer, &palette, ColorMetric::Rgb), vec![0; 9]);
        assert_eq!(remap(&buffer, &palette, ColorMetric::Lab), vec![0; 9]);
    }
}
