/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! An Aseprite (`.ase`/`.aseprite`) sprite file reader.
//!
//! The format is a layered, frame-based container: a sprite is a stack
//! of named layers, each frame holds one cel (pixel patch) per layer,
//! and named tags slice the frame list into animations. This crate
//! parses the container and flattens it into [`PixelBuffer`]s.
//!
//! Supported color depths are 32 (RGBA), 16 (grayscale + alpha) and
//! 8 (indexed) bits per pixel. Cels may be raw, zlib compressed or
//! linked to an earlier frame's cel.
//!
//! ```no_run
//! use pixl_ase::AseDecoder;
//!
//! let data = std::fs::read("hero.aseprite")?;
//! let file = AseDecoder::new(&data).decode()?;
//!
//! for (frame, delay_ms) in file.get_animation("walk")? {
//!     // hand each composited frame to the renderer
//!     let _ = (frame, delay_ms);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`PixelBuffer`]: pixl_core::PixelBuffer

pub mod decoder;
pub mod errors;
pub mod file;

pub use crate::decoder::AseDecoder;
pub use crate::errors::AseDecodeErrors;
pub use crate::file::{AseFile, AseFrame, BlendMode, Cel, Layer, LoopDirection, Tag};

#[cfg(test)]
mod tests {
    use pixl_core::ByteWriter;

    use crate::{AseDecoder, AseDecodeErrors, LoopDirection};

    const HEADER_SIZE: usize = 128;

    fn write_string(writer: &mut ByteWriter, text: &str) {
        writer.write_u16_le(text.len() as u16);
        writer.write_bytes(text.as_bytes());
    }

    fn write_header(
        writer: &mut ByteWriter, frames: u16, width: u16, height: u16, depth: u16,
        transparent: u8
    ) {
        writer.write_u32_le(0); // file size, patched in finish()
        writer.write_u16_le(0xA5E0);
        writer.write_u16_le(frames);
        writer.write_u16_le(width);
        writer.write_u16_le(height);
        writer.write_u16_le(depth);
        writer.write_u32_le(1); // layer opacity is valid
        writer.write_u16_le(100); // deprecated speed
        writer.write_u32_le(0);
        writer.write_u32_le(0);
        writer.write_u8(transparent);
        writer.write_bytes(&[0; 3]);
        writer.write_u16_le(0); // 0 means 256 colors
        while writer.position() < HEADER_SIZE {
            writer.write_u8(0);
        }
    }

    fn write_frame(writer: &mut ByteWriter, duration_ms: u16, chunks: &[Vec<u8>]) {
        let body_len: usize = chunks.iter().map(Vec::len).sum();
        writer.write_u32_le((16 + body_len) as u32);
        writer.write_u16_le(0xF1FA);
        writer.write_u16_le(chunks.len() as u16);
        writer.write_u16_le(duration_ms);
        writer.write_bytes(&[0; 2]);
        writer.write_u32_le(chunks.len() as u32);
        for chunk in chunks {
            writer.write_bytes(chunk);
        }
    }

    fn chunk(chunk_type: u16, body: &[u8]) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_u32_le((6 + body.len()) as u32);
        writer.write_u16_le(chunk_type);
        writer.write_bytes(body);
        writer.into_inner()
    }

    fn layer_chunk(name: &str, visible: bool, opacity: u8) -> Vec<u8> {
        let mut body = ByteWriter::new();
        body.write_u16_le(u16::from(visible));
        body.write_u16_le(0); // normal layer
        body.write_u16_le(0); // child level
        body.write_u16_le(0);
        body.write_u16_le(0);
        body.write_u16_le(0); // normal blend
        body.write_u8(opacity);
        body.write_bytes(&[0; 3]);
        write_string(&mut body, name);
        chunk(0x2004, &body.into_inner())
    }

    fn raw_cel_chunk(layer: u16, x: i16, y: i16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
        let mut body = ByteWriter::new();
        body.write_u16_le(layer);
        body.write_u16_le(x as u16);
        body.write_u16_le(y as u16);
        body.write_u8(255);
        body.write_u16_le(0); // raw cel
        body.write_bytes(&[0; 7]);
        body.write_u16_le(w);
        body.write_u16_le(h);
        body.write_bytes(pixels);
        chunk(0x2005, &body.into_inner())
    }

    fn linked_cel_chunk(layer: u16, link_frame: u16) -> Vec<u8> {
        let mut body = ByteWriter::new();
        body.write_u16_le(layer);
        body.write_u16_le(0);
        body.write_u16_le(0);
        body.write_u8(255);
        body.write_u16_le(1); // linked cel
        body.write_bytes(&[0; 7]);
        body.write_u16_le(link_frame);
        chunk(0x2005, &body.into_inner())
    }

    fn compressed_cel_chunk(layer: u16, w: u16, h: u16, pixels: &[u8]) -> Vec<u8> {
        let compressed =
            pixl_flate::zlib_compress(pixels, pixl_flate::DeflateEncodeOptions::default());
        let mut body = ByteWriter::new();
        body.write_u16_le(layer);
        body.write_u16_le(0);
        body.write_u16_le(0);
        body.write_u8(255);
        body.write_u16_le(2); // zlib compressed cel
        body.write_bytes(&[0; 7]);
        body.write_u16_le(w);
        body.write_u16_le(h);
        body.write_bytes(&compressed);
        chunk(0x2005, &body.into_inner())
    }

    fn tags_chunk(tags: &[(&str, u16, u16, u8)]) -> Vec<u8> {
        let mut body = ByteWriter::new();
        body.write_u16_le(tags.len() as u16);
        body.write_bytes(&[0; 8]);
        for (name, from, to, direction) in tags {
            body.write_u16_le(*from);
            body.write_u16_le(*to);
            body.write_u8(*direction);
            body.write_bytes(&[0; 12]);
            write_string(&mut body, name);
        }
        chunk(0x2018, &body.into_inner())
    }

    fn palette_chunk(colors: &[[u8; 4]]) -> Vec<u8> {
        let mut body = ByteWriter::new();
        body.write_u32_le(colors.len() as u32);
        body.write_u32_le(0);
        body.write_u32_le((colors.len() - 1) as u32);
        body.write_bytes(&[0; 8]);
        for color in colors {
            body.write_u16_le(0);
            body.write_bytes(color);
        }
        chunk(0x2019, &body.into_inner())
    }

    fn finish(mut writer: ByteWriter) -> Vec<u8> {
        let size = (writer.position() as u32).to_le_bytes();
        writer.overwrite_at(0, &size);
        writer.into_inner()
    }

    #[test]
    fn raw_rgba_cel_decodes() {
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 2, 2, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[layer_chunk("paint", true, 255), raw_cel_chunk(0, 0, 0, 2, 2, &pixels)]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        assert_eq!(file.frames.len(), 1);
        assert_eq!(file.frames[0].duration_ms, 100);
        let frame = file.get_frame(0).unwrap();
        assert_eq!(frame.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(frame.pixel(1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn compressed_cel_matches_raw() {
        let pixels: Vec<u8> = (0..4 * 4 * 4).map(|i| (i * 7 % 256) as u8).collect();
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 4, 4, 32, 0);
        write_frame(
            &mut writer,
            50,
            &[
                layer_chunk("paint", true, 255),
                compressed_cel_chunk(0, 4, 4, &pixels),
            ]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        assert_eq!(file.images[0].data(), pixels.as_slice());
    }

    #[test]
    fn linked_cel_shares_the_image_arena_slot() {
        let pixels = [10, 20, 30, 255];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 2, 1, 1, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[layer_chunk("paint", true, 255), raw_cel_chunk(0, 0, 0, 1, 1, &pixels)]
        );
        write_frame(&mut writer, 100, &[linked_cel_chunk(0, 0)]);
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        assert_eq!(file.images.len(), 1);
        assert_eq!(file.frames[1].cels[0].image, file.frames[0].cels[0].image);
        assert_eq!(file.get_frame(1).unwrap().pixel(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn indexed_pixels_resolve_through_the_palette() {
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 2, 1, 8, 0);
        write_frame(
            &mut writer,
            100,
            &[
                palette_chunk(&[[0, 0, 0, 255], [200, 100, 50, 255]]),
                layer_chunk("paint", true, 255),
                // index 0 is the transparent index
                raw_cel_chunk(0, 0, 0, 2, 1, &[0, 1]),
            ]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        let frame = file.get_frame(0).unwrap();
        assert_eq!(frame.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(frame.pixel(1, 0), [200, 100, 50, 255]);
    }

    #[test]
    fn grayscale_expands_value_and_alpha() {
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 2, 1, 16, 0);
        write_frame(
            &mut writer,
            100,
            &[
                layer_chunk("paint", true, 255),
                raw_cel_chunk(0, 0, 0, 2, 1, &[128, 255, 40, 0]),
            ]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        let frame = file.get_frame(0).unwrap();
        assert_eq!(frame.pixel(0, 0), [128, 128, 128, 255]);
        assert_eq!(frame.pixel(1, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn tags_parse_with_direction() {
        let pixels = [1, 2, 3, 255];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 3, 1, 1, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[
                layer_chunk("paint", true, 255),
                tags_chunk(&[("walk", 0, 2, 2), ("idle", 0, 0, 0)]),
                raw_cel_chunk(0, 0, 0, 1, 1, &pixels),
            ]
        );
        write_frame(&mut writer, 200, &[raw_cel_chunk(0, 0, 0, 1, 1, &pixels)]);
        write_frame(&mut writer, 300, &[raw_cel_chunk(0, 0, 0, 1, 1, &pixels)]);
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        assert_eq!(file.tags.len(), 2);
        assert_eq!(file.tags[0].direction, LoopDirection::PingPong);
        assert_eq!(file.tags[1].direction, LoopDirection::Forward);

        let walk = file.get_animation("walk").unwrap();
        let durations: Vec<u16> = walk.iter().map(|(_, d)| *d).collect();
        assert_eq!(durations, vec![100, 200, 300, 200]);
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let pixels = [9, 9, 9, 255];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 1, 1, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[
                chunk(0x7777, &[1, 2, 3, 4]),
                layer_chunk("paint", true, 255),
                raw_cel_chunk(0, 0, 0, 1, 1, &pixels),
            ]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        assert_eq!(file.get_frame(0).unwrap().pixel(0, 0), [9, 9, 9, 255]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 1, 1, 32, 0);
        let mut data = finish(writer);
        data[4] = 0xFF;

        assert!(matches!(
            AseDecoder::new(&data).decode(),
            Err(AseDecodeErrors::NotAseprite)
        ));
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 1, 1, 24, 0);
        let data = finish(writer);

        assert!(matches!(
            AseDecoder::new(&data).decode(),
            Err(AseDecodeErrors::UnsupportedDepth(24))
        ));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let pixels = [1, 2, 3, 255];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 1, 1, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[layer_chunk("paint", true, 255), raw_cel_chunk(0, 0, 0, 1, 1, &pixels)]
        );
        let data = finish(writer);

        assert!(AseDecoder::new(&data[..data.len() - 10]).decode().is_err());
    }

    #[test]
    fn layer_opacity_scales_the_cel() {
        let pixels = [200, 0, 0, 255];
        let mut writer = ByteWriter::new();
        write_header(&mut writer, 1, 1, 1, 32, 0);
        write_frame(
            &mut writer,
            100,
            &[layer_chunk("ghost", true, 128), raw_cel_chunk(0, 0, 0, 1, 1, &pixels)]
        );
        let data = finish(writer);

        let file = AseDecoder::new(&data).decode().unwrap();
        let alpha = file.get_frame(0).unwrap().pixel(0, 0)[3];
        assert!(alpha < 255 && alpha > 120, "alpha {alpha} not scaled");
    }
}
