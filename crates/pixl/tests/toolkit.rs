/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pipeline scenarios combining quantization, dithering, atlas packing
//! and indexed encoding.

use nanorand::{Rng, WyRand};
use pixl::{decode_raster, dither, extract_palette, pack_atlas, quantize, save_atomic};
use pixl_atlas::AtlasOptions;
use pixl_core::PixelBuffer;
use pixl_png::{encode_indexed, PngEncodeOptions};
use pixl_quant::{DitherMethod, QuantAlgorithm};

fn noisy_buffer(width: usize, height: usize, seed: u64) -> PixelBuffer {
    let mut rng = WyRand::new_seed(seed);
    let mut buffer = PixelBuffer::new(width, height);
    for pixel in buffer.data_mut().chunks_exact_mut(4) {
        pixel[0] = rng.generate();
        pixel[1] = rng.generate();
        pixel[2] = rng.generate();
        pixel[3] = 255;
    }
    buffer
}

#[test]
fn quantize_then_indexed_png_is_lossless_when_palette_fits() {
    // 13 unique colors, well under the 16 color target
    let mut buffer = PixelBuffer::new(13, 4);
    for y in 0..4 {
        for x in 0..13 {
            buffer.set_pixel(x, y, [x as u8 * 19, 250 - x as u8 * 7, 33, 255]);
        }
    }

    let (palette, indices) = quantize(&buffer, 16, QuantAlgorithm::MedianCut).unwrap();
    let encoded =
        encode_indexed(&indices, 13, 4, &palette, PngEncodeOptions::default()).unwrap();
    assert_eq!(decode_raster(&encoded).unwrap(), buffer);
}

#[test]
fn every_algorithm_respects_the_color_target() {
    let buffer = noisy_buffer(32, 32, 77);
    for algorithm in [
        QuantAlgorithm::MedianCut,
        QuantAlgorithm::Octree,
        QuantAlgorithm::Popularity,
        QuantAlgorithm::KMeans,
    ] {
        let palette = extract_palette(&buffer, 16, algorithm).unwrap();
        assert!(palette.len() <= 16, "{algorithm:?} overflowed");
        assert!(!palette.is_empty(), "{algorithm:?} returned nothing");
    }
}

#[test]
fn dithering_is_deterministic() {
    let buffer = noisy_buffer(24, 24, 5);
    let palette = extract_palette(&buffer, 8, QuantAlgorithm::MedianCut).unwrap();

    for method in [
        DitherMethod::FloydSteinberg,
        DitherMethod::FloydSteinbergSerpentine,
        DitherMethod::Ordered4x4,
        DitherMethod::Ordered8x8,
    ] {
        let first = dither(&buffer, &palette, method);
        let second = dither(&buffer, &palette, method);
        assert_eq!(first, second, "{method:?} was not reproducible");
        assert!(first.iter().all(|&i| usize::from(i) < palette.len()));
    }
}

#[test]
fn atlas_scenario_three_sprites_on_one_page() {
    let sprites = vec![
        PixelBuffer::filled(8, 8, [255, 0, 0, 255]),
        PixelBuffer::filled(16, 16, [0, 255, 0, 255]),
        PixelBuffer::filled(4, 4, [0, 0, 255, 255]),
    ];
    let options = AtlasOptions::default().set_max_width(32).set_max_height(32);
    let (pages, entries) = pack_atlas(&sprites, options).unwrap();

    assert_eq!(pages.len(), 1);
    for (sprite, entry) in sprites.iter().zip(&entries) {
        for y in 0..sprite.height() {
            for x in 0..sprite.width() {
                assert_eq!(
                    pages[entry.page].pixel(entry.x + x, entry.y + y),
                    sprite.pixel(x, y)
                );
            }
        }
    }
}

#[test]
fn packed_page_survives_a_png_trip() {
    let sprites = vec![
        noisy_buffer(8, 8, 1),
        noisy_buffer(16, 16, 2),
        noisy_buffer(4, 4, 3),
    ];
    let options = AtlasOptions::default().set_max_width(32).set_max_height(32);
    let (pages, _) = pack_atlas(&sprites, options).unwrap();

    let encoded = pixl::encode_raster(&pages[0]).unwrap();
    assert_eq!(decode_raster(&encoded).unwrap(), pages[0]);
}

#[test]
fn save_atomic_roundtrips_an_encoded_file() {
    let buffer = noisy_buffer(10, 10, 9);
    let encoded = pixl::encode_raster(&buffer).unwrap();

    let mut path = std::env::temp_dir();
    path.push(format!("pixl-toolkit-test-{}.png", std::process::id()));
    save_atomic(&path, &encoded).unwrap();

    let read_back = std::fs::read(&path).unwrap();
    assert_eq!(decode_raster(&read_back).unwrap(), buffer);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn invalid_color_count_is_a_quantization_error() {
    let buffer = noisy_buffer(4, 4, 1);
    assert!(matches!(
        quantize(&buffer, 0, QuantAlgorithm::MedianCut),
        Err(pixl::PixlError::Quantization(_))
    ));
}
