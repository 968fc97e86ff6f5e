/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The decoded sprite model and its flattening operations.

use pixl_core::{Palette, PixelBuffer};

use crate::errors::AseDecodeErrors;

/// Per-layer blend mode. Compositing treats everything but `Normal` as
/// normal, the value is preserved so callers can tell them apart.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Other(u16)
}

impl BlendMode {
    pub fn from_u16(value: u16) -> BlendMode {
        match value {
            0 => BlendMode::Normal,
            1 => BlendMode::Multiply,
            2 => BlendMode::Screen,
            3 => BlendMode::Overlay,
            other => BlendMode::Other(other)
        }
    }
}

/// One layer's metadata, order in the file is bottom to top.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name:       String,
    pub visible:    bool,
    /// Group layers carry no pixels and are skipped when flattening.
    pub is_group:   bool,
    pub opacity:    u8,
    pub blend_mode: BlendMode
}

/// How a tag's frame range plays back.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopDirection {
    Forward,
    Reverse,
    PingPong
}

impl LoopDirection {
    pub fn from_u8(value: u8) -> LoopDirection {
        match value {
            1 => LoopDirection::Reverse,
            // ping-pong and ping-pong-reverse collapse, the reverse
            // variant differs only in starting phase
            2 | 3 => LoopDirection::PingPong,
            _ => LoopDirection::Forward
        }
    }
}

/// A named animation over an inclusive frame range.
#[derive(Debug, Clone)]
pub struct Tag {
    pub name:      String,
    pub from:      usize,
    pub to:        usize,
    pub direction: LoopDirection
}

/// One cel, pixels for one layer in one frame.
///
/// `image` indexes the file's shared image arena, a linked cel holds
/// the same index as the cel it links to.
#[derive(Debug, Clone)]
pub struct Cel {
    pub layer:   usize,
    pub x:       i32,
    pub y:       i32,
    pub opacity: u8,
    pub image:   usize
}

/// One frame, its duration and the cels drawn in it.
#[derive(Debug, Clone)]
pub struct AseFrame {
    pub duration_ms: u16,
    pub cels:        Vec<Cel>
}

/// A decoded sprite file.
pub struct AseFile {
    pub width:   usize,
    pub height:  usize,
    pub layers:  Vec<Layer>,
    pub frames:  Vec<AseFrame>,
    pub tags:    Vec<Tag>,
    pub palette: Palette,
    /// Shared cel pixel storage, linked cels alias entries here.
    pub images:  Vec<PixelBuffer>
}

impl AseFile {
    /// Composite one frame, bottom layer first.
    ///
    /// Invisible and group layers are skipped, cel opacity multiplies
    /// with layer opacity. Callers wanting a single layer should use
    /// [`Self::get_layer`] instead.
    pub fn get_frame(&self, index: usize) -> Result<PixelBuffer, AseDecodeErrors> {
        let frame = self
            .frames
            .get(index)
            .ok_or(AseDecodeErrors::OutOfRange("frame", index))?;

        let mut canvas = PixelBuffer::new(self.width, self.height);
        // cels are stored in layer order, draw bottom to top
        let mut ordered: Vec<&Cel> = frame.cels.iter().collect();
        ordered.sort_by_key(|cel| cel.layer);

        for cel in ordered {
            let Some(layer) = self.layers.get(cel.layer) else {
                continue;
            };
            if !layer.visible || layer.is_group {
                continue;
            }
            let image = self
                .images
                .get(cel.image)
                .ok_or(AseDecodeErrors::CorruptData("cel references missing image"))?;
            let opacity =
                ((u16::from(layer.opacity) * u16::from(cel.opacity)) / 255) as u8;
            canvas.composite_over(image, i64::from(cel.x), i64::from(cel.y), opacity);
        }
        Ok(canvas)
    }

    /// Composite only the named layer across one frame.
    pub fn get_layer(
        &self, name: &str, frame_index: usize
    ) -> Result<PixelBuffer, AseDecodeErrors> {
        let layer_index = self
            .layers
            .iter()
            .position(|l| l.name == name)
            .ok_or(AseDecodeErrors::CorruptData("no layer with that name"))?;
        let frame = self
            .frames
            .get(frame_index)
            .ok_or(AseDecodeErrors::OutOfRange("frame", frame_index))?;

        let mut canvas = PixelBuffer::new(self.width, self.height);
        for cel in frame.cels.iter().filter(|c| c.layer == layer_index) {
            let image = self
                .images
                .get(cel.image)
                .ok_or(AseDecodeErrors::CorruptData("cel references missing image"))?;
            canvas.composite_over(image, i64::from(cel.x), i64::from(cel.y), cel.opacity);
        }
        Ok(canvas)
    }

    /// Flatten a tag's frame range in playback order.
    ///
    /// Returns `(composite, duration_ms)` pairs. Ping-pong plays the
    /// range forward then back, without repeating either endpoint.
    pub fn get_animation(
        &self, tag_name: &str
    ) -> Result<Vec<(PixelBuffer, u16)>, AseDecodeErrors> {
        let tag = self
            .tags
            .iter()
            .find(|t| t.name == tag_name)
            .ok_or(AseDecodeErrors::CorruptData("no tag with that name"))?;

        if tag.from > tag.to || tag.to >= self.frames.len() {
            return Err(AseDecodeErrors::OutOfRange("frame", tag.to));
        }
        let forward: Vec<usize> = (tag.from..=tag.to).collect();
        let order: Vec<usize> = match tag.direction {
            LoopDirection::Forward => forward,
            LoopDirection::Reverse => forward.into_iter().rev().collect(),
            LoopDirection::PingPong => {
                let mut order = forward.clone();
                // back half excludes both endpoints
                order.extend(forward.iter().rev().skip(1).take(forward.len().saturating_sub(2)));
                order
            }
        };

        let mut out = Vec::with_capacity(order.len());
        for index in order {
            out.push((self.get_frame(index)?, self.frames[index].duration_ms));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> AseFile {
        let red = PixelBuffer::filled(2, 2, [255, 0, 0, 255]);
        let blue = PixelBuffer::filled(2, 2, [0, 0, 255, 255]);

        AseFile {
            width:   2,
            height:  2,
            layers:  vec![Layer {
                name:       "body".into(),
                visible:    true,
                is_group:   false,
                opacity:    255,
                blend_mode: BlendMode::Normal
            }],
            frames:  vec![
                AseFrame {
                    duration_ms: 100,
                    cels:        vec![Cel {
                        layer:   0,
                        x:       0,
                        y:       0,
                        opacity: 255,
                        image:   0
                    }]
                },
                AseFrame {
                    duration_ms: 200,
                    cels:        vec![Cel {
                        layer:   0,
                        x:       0,
                        y:       0,
                        opacity: 255,
                        image:   1
                    }]
                },
                // linked back to frame 0's image
                AseFrame {
                    duration_ms: 300,
                    cels:        vec![Cel {
                        layer:   0,
                        x:       0,
                        y:       0,
                        opacity: 255,
                        image:   0
                    }]
                },
            ],
            tags:    vec![
                Tag {
                    name:      "walk".into(),
                    from:      0,
                    to:        2,
                    direction: LoopDirection::PingPong
                },
                Tag {
                    name:      "back".into(),
                    from:      0,
                    to:        1,
                    direction: LoopDirection::Reverse
                },
            ],
            palette: Palette::default(),
            images:  vec![red, blue]
        }
    }

    #[test]
    fn linked_cel_shares_pixels() {
        let file = sample_file();
        assert_eq!(file.get_frame(0).unwrap(), file.get_frame(2).unwrap());
    }

    #[test]
    fn ping_pong_skips_endpoints_on_the_way_back() {
        let file = sample_file();
        let animation = file.get_animation("walk").unwrap();
        let durations: Vec<u16> = animation.iter().map(|(_, d)| *d).collect();
        assert_eq!(durations, vec![100, 200, 300, 200]);
    }

    #[test]
    fn reverse_plays_backwards() {
        let file = sample_file();
        let animation = file.get_animation("back").unwrap();
        let durations: Vec<u16> = animation.iter().map(|(_, d)| *d).collect();
        assert_eq!(durations, vec![200, 100]);
    }

    #[test]
    fn invisible_layer_is_skipped() {
        let mut file = sample_file();
        file.layers[0].visible = false;
        assert_eq!(file.get_frame(0).unwrap(), PixelBuffer::new(2, 2));
    }

    #[test]
    fn missing_frame_errors() {
        let file = sample_file();
        assert!(file.get_frame(9).is_err());
    }
}
