/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! sRGB to CIE Lab conversion used for perceptual palette matching.

/// D65 reference white, 2 degree observer.
const WHITE_X: f32 = 95.047;
const WHITE_Y: f32 = 100.0;
const WHITE_Z: f32 = 108.883;

/// Convert an 8-bit sRGB triple to CIE Lab under D65.
pub fn srgb_to_lab(rgb: [u8; 3]) -> [f32; 3] {
    let linear = |c: u8| -> f32 {
        let c = f32::from(c) / 255.0;
        if c > 0.04045 {
            ((c + 0.055) / 1.055).powf(2.4)
        } else {
            c / 12.92
        }
    };

    let r = linear(rgb[0]) * 100.0;
    let g = linear(rgb[1]) * 100.0;
    let b = linear(rgb[2]) * 100.0;

    // sRGB D65 matrix
    let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
    let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
    let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

    let f = |t: f32| -> f32 {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    };

    let fx = f(x / WHITE_X);
    let fy = f(y / WHITE_Y);
    let fz = f(z / WHITE_Z);

    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Squared Euclidean distance between two Lab points.
#[inline]
pub fn lab_distance_squared(a: [f32; 3], b: [f32; 3]) -> f32 {
    let dl = a[0] - b[0];
    let da = a[1] - b[1];
    let db = a[2] - b[2];
    dl * dl + da * da + db * db
}

/// Squared Euclidean distance between two RGB triples.
#[inline]
pub fn rgb_distance_squared(a: [u8; 3], b: [u8; 3]) -> u32 {
    let dr = i32::from(a[0]) - i32::from(b[0]);
    let dg = i32::from(a[1]) - i32::from(b[1]);
    let db = i32::from(a[2]) - i32::from(b[2]);
    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_maps_to_l100() {
        let lab = srgb_to_lab([255, 255, 255]);
        assert!((lab[0] - 100.0).abs() < 0.1);
        assert!(lab[1].abs() < 0.1);
        assert!(lab[2].abs() < 0.1);
    }

    #[test]
    fn black_maps_to_l0() {
        let lab = srgb_to_lab([0, 0, 0]);
        assert!(lab[0].abs() < 0.1);
    }

    #[test]
    fn lab_separates_hues_more_than_lightness() {
        // mid red vs mid green should be far apart
        let red = srgb_to_lab([200, 0, 0]);
        let green = srgb_to_lab([0, 200, 0]);
        assert!(lab_distance_squared(red, green) > 1000.0);
    }
}
