/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Dithering to a fixed palette.
//!
//! Both methods are pure functions of their inputs, the same buffer,
//! palette and method always produce the same index array.

use pixl_core::{ColorMetric, Palette, PixelBuffer};

/// Available dithering methods.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DitherMethod {
    /// Floyd-Steinberg error diffusion, row major.
    FloydSteinberg,
    /// Error diffusion with alternating row direction, hides the
    /// directional worm artifacts of the plain scan.
    FloydSteinbergSerpentine,
    /// Ordered dithering with a 4x4 Bayer matrix.
    Ordered4x4,
    /// Ordered dithering with an 8x8 Bayer matrix.
    Ordered8x8
}

const BAYER_4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5]
];

const BAYER_8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21]
];

/// Dither a buffer against a palette, returning one index per pixel.
pub fn dither(buffer: &PixelBuffer, palette: &Palette, method: DitherMethod) -> Vec<u8> {
    dither_with_metric(buffer, palette, method, ColorMetric::Rgb)
}

/// [`dither`] with an explicit distance metric for the nearest-color
/// step.
pub fn dither_with_metric(
    buffer: &PixelBuffer, palette: &Palette, method: DitherMethod, metric: ColorMetric
) -> Vec<u8> {
    match method {
        DitherMethod::FloydSteinberg => error_diffusion(buffer, palette, metric, false),
        DitherMethod::FloydSteinbergSerpentine => error_diffusion(buffer, palette, metric, true),
        DitherMethod::Ordered4x4 => ordered(buffer, palette, metric, 4),
        DitherMethod::Ordered8x8 => ordered(buffer, palette, metric, 8)
    }
}

/// Floyd-Steinberg weights, 7/16 right, 3/16 below left, 5/16 below,
/// 1/16 below right.
fn error_diffusion(
    buffer: &PixelBuffer, palette: &Palette, metric: ColorMetric, serpentine: bool
) -> Vec<u8> {
    let width = buffer.width();
    let height = buffer.height();
    let mut indices = vec![0_u8; width * height];

    // working copy of the RGB channels with diffused error applied
    let mut work: Vec<[f32; 3]> = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let p = buffer.pixel(x, y);
            work.push([f32::from(p[0]), f32::from(p[1]), f32::from(p[2])]);
        }
    }

    for y in 0..height {
        let reverse = serpentine && y % 2 == 1;
        for step in 0..width {
            let x = if reverse { width - 1 - step } else { step };
            let pos = y * width + x;

            let alpha = buffer.pixel(x, y)[3];
            let current = [
                work[pos][0].round().clamp(0.0, 255.0) as u8,
                work[pos][1].round().clamp(0.0, 255.0) as u8,
                work[pos][2].round().clamp(0.0, 255.0) as u8,
                alpha
            ];
            let index = palette.nearest(current, metric);
            indices[pos] = index as u8;

            let chosen = palette.get(index).unwrap_or([0; 4]);
            let error = [
                work[pos][0] - f32::from(chosen[0]),
                work[pos][1] - f32::from(chosen[1]),
                work[pos][2] - f32::from(chosen[2])
            ];

            // neighbor offsets flip with the traversal direction
            let forward: i64 = if reverse { -1 } else { 1 };
            let targets: [(i64, i64, f32); 4] = [
                (forward, 0, 7.0 / 16.0),
                (-forward, 1, 3.0 / 16.0),
                (0, 1, 5.0 / 16.0),
                (forward, 1, 1.0 / 16.0)
            ];
            for (dx, dy, weight) in targets {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let npos = ny as usize * width + nx as usize;
                for c in 0..3 {
                    work[npos][c] += error[c] * weight;
                }
            }
        }
    }
    indices
}

fn ordered(
    buffer: &PixelBuffer, palette: &Palette, metric: ColorMetric, size: usize
) -> Vec<u8> {
    let width = buffer.width();
    let height = buffer.height();
    let mut indices = Vec::with_capacity(width * height);

    // threshold spread, same overall amplitude for both matrix sizes
    let cells = (size * size) as f32;

    for y in 0..height {
        for x in 0..width {
            let cell = match size {
                4 => f32::from(BAYER_4[y % 4][x % 4]),
                _ => f32::from(BAYER_8[y % 8][x % 8])
            };
            let offset = ((cell + 0.5) / cells - 0.5) * 32.0;

            let pixel = buffer.pixel(x, y);
            let adjusted = [
                (f32::from(pixel[0]) + offset).clamp(0.0, 255.0) as u8,
                (f32::from(pixel[1]) + offset).clamp(0.0, 255.0) as u8,
                (f32::from(pixel[2]) + offset).clamp(0.0, 255.0) as u8,
                pixel[3]
            ];
            indices.push(palette.nearest(adjusted, metric) as u8);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_ramp(width: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, 8);
        for y in 0..8 {
            for x in 0..width {
                let v = (x * 255 / (width - 1)) as u8;
                buffer.set_pixel(x, y, [v, v, v, 255]);
            }
        }
        buffer
    }

    #[test]
    fn deterministic_for_all_methods() {
        let buffer = gray_ramp(32);
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]]);
        for method in [
            DitherMethod::FloydSteinberg,
            DitherMethod::FloydSteinbergSerpentine,
            DitherMethod::Ordered4x4,
            DitherMethod::Ordered8x8,
        ] {
            assert_eq!(
                dither(&buffer, &palette, method),
                dither(&buffer, &palette, method),
                "{method:?}"
            );
        }
    }

    #[test]
    fn midtone_mixes_both_palette_entries() {
        let buffer = PixelBuffer::filled(16, 16, [128, 128, 128, 255]);
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]]);

        let indices = dither(&buffer, &palette, DitherMethod::FloydSteinberg);
        let whites = indices.iter().filter(|&&i| i == 1).count();
        // roughly half the pixels should land on each entry
        assert!(whites > 64 && whites < 192, "whites {whites}");
    }

    #[test]
    fn exact_palette_colors_are_untouched() {
        let buffer = PixelBuffer::filled(8, 8, [255, 0, 0, 255]);
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 0, 0, 255]]);

        let indices = dither(&buffer, &palette, DitherMethod::FloydSteinberg);
        assert!(indices.iter().all(|&i| i == 1));
    }

    #[test]
    fn serpentine_differs_from_plain_scan() {
        let buffer = gray_ramp(32);
        let palette = Palette::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]]);

        let plain = dither(&buffer, &palette, DitherMethod::FloydSteinberg);
        let serp = dither(&buffer, &palette, DitherMethod::FloydSteinbergSerpentine);
        assert_ne!(plain, serp);
    }
}
