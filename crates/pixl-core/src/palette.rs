/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Fixed color palettes and nearest-color lookup.

use crate::colorspace::{lab_distance_squared, rgb_distance_squared, srgb_to_lab};

/// The distance metric used when matching a color against a palette.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ColorMetric {
    /// Squared Euclidean distance in raw sRGB, fast and usually fine for
    /// pixel art.
    #[default]
    Rgb,
    /// Squared Euclidean distance in CIE Lab, perceptually uniform but
    /// slower.
    Lab
}

/// An ordered list of at most 256 RGBA colors.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct Palette {
    colors: Vec<[u8; 4]>
}

impl Palette {
    /// Build a palette, truncating anything past 256 entries.
    pub fn new(colors: Vec<[u8; 4]>) -> Palette {
        let mut colors = colors;
        if colors.len() > 256 {
            log::warn!("palette of {} colors truncated to 256", colors.len());
            colors.truncate(256);
        }
        Palette { colors }
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<[u8; 4]> {
        self.colors.get(index).copied()
    }

    /// Index of `color` if it is already present.
    pub fn position(&self, color: [u8; 4]) -> Option<usize> {
        self.colors.iter().position(|c| *c == color)
    }

    /// Append a color, returns `false` when the palette is full.
    pub fn push(&mut self, color: [u8; 4]) -> bool {
        if self.colors.len() >= 256 {
            return false;
        }
        self.colors.push(color);
        true
    }

    /// Index of the palette entry closest to `color` under `metric`.
    ///
    /// Alpha is ignored by the distance calculation. Ties resolve to the
    /// lowest index, which keeps remapping deterministic. Returns zero on
    /// an empty palette.
    pub fn nearest(&self, color: [u8; 4], metric: ColorMetric) -> usize {
        let rgb = [color[0], color[1], color[2]];

        match metric {
            ColorMetric::Rgb => {
                let mut best = 0;
                let mut best_dist = u32::MAX;

                for (i, entry) in self.colors.iter().enumerate() {
                    let dist = rgb_distance_squared(rgb, [entry[0], entry[1], entry[2]]);
                    if dist < best_dist {
                        best_dist = dist;
                        best = i;
                        if dist == 0 {
                            break;
                        }
                    }
                }
                best
            }
            ColorMetric::Lab => {
                let target = srgb_to_lab(rgb);
                let mut best = 0;
                let mut best_dist = f32::MAX;

                for (i, entry) in self.colors.iter().enumerate() {
                    let lab = srgb_to_lab([entry[0], entry[1], entry[2]]);
                    let dist = lab_distance_squared(target, lab);
                    if dist < best_dist {
                        best_dist = dist;
                        best = i;
                    }
                }
                best
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins() {
        let pal = Palette::new(vec![
            [0, 0, 0, 255],
            [255, 0, 0, 255],
            [0, 255, 0, 255],
        ]);
        assert_eq!(pal.nearest([255, 0, 0, 255], ColorMetric::Rgb), 1);
        assert_eq!(pal.nearest([255, 0, 0, 255], ColorMetric::Lab), 1);
    }

    #[test]
    fn ties_pick_lowest_index() {
        let pal = Palette::new(vec![[0, 0, 0, 255], [0, 0, 0, 255]]);
        assert_eq!(pal.nearest([10, 10, 10, 255], ColorMetric::Rgb), 0);
    }

    #[test]
    fn caps_at_256_entries() {
        let mut pal = Palette::new(vec![[0, 0, 0, 255]; 300]);
        assert_eq!(pal.len(), 256);
        assert!(!pal.push([1, 1, 1, 255]));
    }
}
