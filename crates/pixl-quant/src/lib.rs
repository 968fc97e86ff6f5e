/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Color quantization and dithering.
//!
//! Four palette-extraction algorithms plus error-diffusion and ordered
//! dithering, all deterministic. When the target size is at least the
//! number of unique colors the result is lossless, the palette is
//! exactly the sorted unique color list.
//!
//! ```
//! use pixl_core::PixelBuffer;
//! use pixl_quant::{quantize, QuantAlgorithm};
//!
//! let buffer = PixelBuffer::filled(4, 4, [200, 40, 40, 255]);
//! let (palette, indices) = quantize(&buffer, 16, QuantAlgorithm::MedianCut).unwrap();
//! assert_eq!(palette.len(), 1);
//! assert_eq!(indices, vec![0; 16]);
//! ```
pub mod dither;
pub mod errors;
pub mod histogram;
mod kmeans;
mod median_cut;
mod octree;
mod popularity;
pub mod remap;

use log::trace;
use pixl_core::{ColorMetric, Palette, PixelBuffer};

pub use crate::dither::{dither, dither_with_metric, DitherMethod};
pub use crate::errors::QuantizeErrors;
use crate::histogram::build_histogram;
pub use crate::remap::remap;

/// The palette extraction algorithms on offer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum QuantAlgorithm {
    /// Frequency-weighted box splitting, the usual default for pixel
    /// art.
    #[default]
    MedianCut,
    /// Bit-plane octree with least-populated folding.
    Octree,
    /// Keep the most frequent colors verbatim.
    Popularity,
    /// Centroid refinement with farthest-point seeding.
    KMeans
}

fn check_target(n: usize) -> Result<(), QuantizeErrors> {
    if n < 1 || n > 256 {
        return Err(QuantizeErrors::InvalidColorCount(n));
    }
    Ok(())
}

/// Reduce a buffer's colors to a palette of at most `n` entries.
///
/// If the buffer already has `n` or fewer unique colors the palette is
/// the sorted unique color list, unchanged.
pub fn extract_palette(
    buffer: &PixelBuffer, n: usize, algorithm: QuantAlgorithm
) -> Result<Palette, QuantizeErrors> {
    check_target(n)?;

    if buffer.data().is_empty() {
        return Err(QuantizeErrors::EmptyInput);
    }
    let histogram = build_histogram(buffer);
    trace!("{} unique colors, target {n}", histogram.len());

    if histogram.len() <= n {
        return Ok(Palette::new(histogram.iter().map(|e| e.color).collect()));
    }
    let colors = match algorithm {
        QuantAlgorithm::MedianCut => median_cut::median_cut(&histogram, n),
        QuantAlgorithm::Octree => octree::octree_quantize(&histogram, n),
        QuantAlgorithm::Popularity => popularity::popularity(&histogram, n),
        QuantAlgorithm::KMeans => kmeans::kmeans(&histogram, n)
    };
    Ok(Palette::new(colors))
}

/// Extract a palette and remap every pixel to it.
pub fn quantize(
    buffer: &PixelBuffer, n: usize, algorithm: QuantAlgorithm
) -> Result<(Palette, Vec<u8>), QuantizeErrors> {
    quantize_with_metric(buffer, n, algorithm, ColorMetric::Rgb)
}

/// [`quantize`] with an explicit remapping metric.
pub fn quantize_with_metric(
    buffer: &PixelBuffer, n: usize, algorithm: QuantAlgorithm, metric: ColorMetric
) -> Result<(Palette, Vec<u8>), QuantizeErrors> {
    let palette = extract_palette(buffer, n, algorithm)?;
    let indices = remap(buffer, &palette, metric);
    Ok((palette, indices))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_buffer() -> PixelBuffer {
        use nanorand::Rng;

        let mut rng = nanorand::WyRand::new_seed(99);
        let mut data = vec![0_u8; 24 * 24 * 4];
        rng.fill_bytes(&mut data);
        // opaque alpha keeps the color population realistic
        for pixel in data.chunks_exact_mut(4) {
            pixel[3] = 255;
        }
        PixelBuffer::from_rgba(24, 24, data).unwrap()
    }

    #[test]
    fn zero_colors_is_an_error() {
        let buffer = PixelBuffer::new(2, 2);
        assert!(matches!(
            extract_palette(&buffer, 0, QuantAlgorithm::MedianCut),
            Err(QuantizeErrors::InvalidColorCount(0))
        ));
    }

    #[test]
    fn lossless_when_palette_is_large_enough() {
        let mut buffer = PixelBuffer::filled(4, 4, [10, 20, 30, 255]);
        buffer.set_pixel(0, 0, [200, 20, 30, 255]);
        buffer.set_pixel(3, 3, [10, 200, 30, 255]);

        for algorithm in [
            QuantAlgorithm::MedianCut,
            QuantAlgorithm::Octree,
            QuantAlgorithm::Popularity,
            QuantAlgorithm::KMeans,
        ] {
            let (palette, indices) = quantize(&buffer, 16, algorithm).unwrap();
            assert_eq!(palette.len(), 3);
            // remapping through the palette must reproduce the image
            for (i, &index) in indices.iter().enumerate() {
                let expected = buffer.pixel(i % 4, i / 4);
                assert_eq!(palette.get(usize::from(index)).unwrap(), expected);
            }
        }
    }

    #[test]
    fn all_algorithms_respect_the_target() {
        let buffer = noisy_buffer();
        for algorithm in [
            QuantAlgorithm::MedianCut,
            QuantAlgorithm::Octree,
            QuantAlgorithm::Popularity,
            QuantAlgorithm::KMeans,
        ] {
            let palette = extract_palette(&buffer, 16, algorithm).unwrap();
            assert!(palette.len() <= 16, "{algorithm:?} gave {}", palette.len());
            assert!(!palette.is_empty());
        }
    }

    #[test]
    fn quantize_is_deterministic() {
        let buffer = noisy_buffer();
        for algorithm in [QuantAlgorithm::MedianCut, QuantAlgorithm::KMeans] {
            let a = quantize(&buffer, 8, algorithm).unwrap();
            let b = quantize(&buffer, 8, algorithm).unwrap();
            assert_eq!(a.0, b.0);
            assert_eq!(a.1, b.1);
        }
    }
}
