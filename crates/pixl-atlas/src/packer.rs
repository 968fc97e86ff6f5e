/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Guillotine free-rectangle packing.
//!
//! Sprites are sorted tallest first and each is placed into the free
//! rectangle that leaves the least spare area. A placement splits the
//! chosen rectangle into at most two new free rectangles, adjacent
//! rectangles are merged back afterwards to limit fragmentation. When
//! no free rectangle fits, a new page is opened.
//!
//! Everything here is deterministic: the sort has a total order and
//! score ties keep the earliest candidate, so the same input always
//! produces the same layout.

use log::trace;
use pixl_core::PixelBuffer;

use crate::errors::AtlasErrors;

/// Packing limits and toggles, builder style.
#[derive(Debug, Copy, Clone)]
pub struct AtlasOptions {
    max_width:      usize,
    max_height:     usize,
    allow_rotation: bool,
    padding:        usize
}

impl Default for AtlasOptions {
    fn default() -> AtlasOptions {
        AtlasOptions {
            max_width:      1024,
            max_height:     1024,
            allow_rotation: false,
            padding:        0
        }
    }
}

impl AtlasOptions {
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    pub fn set_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    pub fn set_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    pub const fn get_allow_rotation(&self) -> bool {
        self.allow_rotation
    }

    /// Allow placing a sprite rotated 90 degrees clockwise when that
    /// wastes less space.
    pub fn set_allow_rotation(mut self, yes: bool) -> Self {
        self.allow_rotation = yes;
        self
    }

    pub const fn get_padding(&self) -> usize {
        self.padding
    }

    /// Empty pixels reserved around every placed sprite, guards
    /// against bleeding when the atlas is sampled with filtering.
    pub fn set_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }
}

/// Where one source sprite ended up.
///
/// `width`/`height` are the placed dimensions, so a rotated entry has
/// them swapped relative to its source buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AtlasEntry {
    /// Index of the sprite in the input list.
    pub source:  usize,
    pub page:    usize,
    pub x:       usize,
    pub y:       usize,
    pub width:   usize,
    pub height:  usize,
    pub rotated: bool
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct FreeRect {
    x: usize,
    y: usize,
    w: usize,
    h: usize
}

/// A packer that owns its sprites so later [`add`](AtlasPacker::add)
/// calls can fall back to a full repack.
pub struct AtlasPacker {
    options: AtlasOptions,
    sprites: Vec<PixelBuffer>,
    /// Indexed by source sprite, parallel to `sprites`.
    entries: Vec<AtlasEntry>,
    /// Live free-rectangle list per page.
    free:    Vec<Vec<FreeRect>>
}

impl AtlasPacker {
    /// Pack every sprite, opening pages as needed.
    pub fn pack(
        sprites: Vec<PixelBuffer>, options: AtlasOptions
    ) -> Result<AtlasPacker, AtlasErrors> {
        if options.max_width == 0 || options.max_height == 0 {
            return Err(AtlasErrors::BadPageSize);
        }
        let mut packer = AtlasPacker {
            options,
            sprites,
            entries: Vec::new(),
            free: Vec::new()
        };
        packer.pack_all()?;
        Ok(packer)
    }

    pub fn entries(&self) -> &[AtlasEntry] {
        &self.entries
    }

    pub fn entry(&self, source: usize) -> Option<&AtlasEntry> {
        self.entries.get(source)
    }

    pub fn page_count(&self) -> usize {
        self.free.len()
    }

    /// Place one more sprite. The existing free lists are tried first,
    /// a full repack of everything only happens when no current page
    /// has room.
    pub fn add(&mut self, sprite: PixelBuffer) -> Result<AtlasEntry, AtlasErrors> {
        let source = self.sprites.len();
        self.check_fits(&sprite, source)?;
        let (w, h) = (sprite.width(), sprite.height());

        if let Some((page, rect_index, rotated)) = self.find_spot(w, h) {
            let entry = self.commit(source, page, rect_index, w, h, rotated);
            self.sprites.push(sprite);
            self.entries.push(entry);
            return Ok(entry);
        }

        trace!("no free rectangle fits sprite {source}, repacking {} sprites", source + 1);
        self.sprites.push(sprite);
        self.pack_all()?;
        Ok(self.entries[source])
    }

    /// Draw the packed pages. Every source pixel is copied exactly
    /// once, rotation is a 90 degree clockwise mapping.
    pub fn render_pages(&self) -> Vec<PixelBuffer> {
        let mut pages = vec![
            PixelBuffer::new(self.options.max_width, self.options.max_height);
            self.free.len()
        ];
        for entry in &self.entries {
            let sprite = &self.sprites[entry.source];
            let page = &mut pages[entry.page];
            if entry.rotated {
                for sy in 0..sprite.height() {
                    for sx in 0..sprite.width() {
                        let dx = entry.x + (sprite.height() - 1 - sy);
                        let dy = entry.y + sx;
                        page.set_pixel(dx, dy, sprite.pixel(sx, sy));
                    }
                }
            } else {
                page.blit(sprite, entry.x, entry.y);
            }
        }
        pages
    }

    fn pack_all(&mut self) -> Result<(), AtlasErrors> {
        for (index, sprite) in self.sprites.iter().enumerate() {
            self.check_fits(sprite, index)?;
        }

        // tallest first, widest first, then input order as tie-break
        let mut order: Vec<usize> = (0..self.sprites.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (&self.sprites[a], &self.sprites[b]);
            sb.height()
                .cmp(&sa.height())
                .then(sb.width().cmp(&sa.width()))
                .then(a.cmp(&b))
        });

        self.free.clear();
        let mut entries = vec![
            AtlasEntry {
                source:  0,
                page:    0,
                x:       0,
                y:       0,
                width:   0,
                height:  0,
                rotated: false
            };
            self.sprites.len()
        ];
        for source in order {
            let (w, h) = (self.sprites[source].width(), self.sprites[source].height());
            let (page, rect_index, rotated) = match self.find_spot(w, h) {
                Some(spot) => spot,
                None => {
                    self.free.push(vec![FreeRect {
                        x: 0,
                        y: 0,
                        w: self.options.max_width,
                        h: self.options.max_height
                    }]);
                    trace!("opened atlas page {}", self.free.len() - 1);
                    let page = self.free.len() - 1;
                    // fits by the check_fits pass above
                    match self.find_spot_on_page(page, w, h) {
                        Some((rect_index, rotated)) => (page, rect_index, rotated),
                        None => {
                            return Err(AtlasErrors::SpriteTooLarge { width: w, height: h })
                        }
                    }
                }
            };
            entries[source] = self.commit(source, page, rect_index, w, h, rotated);
        }
        self.entries = entries;
        Ok(())
    }

    fn check_fits(&self, sprite: &PixelBuffer, index: usize) -> Result<(), AtlasErrors> {
        let (w, h) = (sprite.width(), sprite.height());
        if w == 0 || h == 0 {
            return Err(AtlasErrors::ZeroSizedSprite(index));
        }
        let pad = 2 * self.options.padding;
        let (pw, ph) = (w + pad, h + pad);
        let (mw, mh) = (self.options.max_width, self.options.max_height);
        let fits = (pw <= mw && ph <= mh)
            || (self.options.allow_rotation && ph <= mw && pw <= mh);
        if !fits {
            return Err(AtlasErrors::SpriteTooLarge { width: w, height: h });
        }
        Ok(())
    }

    /// Best-area-fit search across all pages. Returns
    /// `(page, free-rect index, rotated)` or `None` when nothing fits.
    fn find_spot(&self, w: usize, h: usize) -> Option<(usize, usize, bool)> {
        let mut best: Option<(usize, usize, usize, bool)> = None;
        for page in 0..self.free.len() {
            if let Some((rect_index, rotated)) = self.find_spot_on_page(page, w, h) {
                let rect = self.free[page][rect_index];
                let (rw, rh) = if rotated { (h, w) } else { (w, h) };
                let pad = 2 * self.options.padding;
                let score = rect.w * rect.h - (rw + pad) * (rh + pad);
                // earlier page wins ties, keeps layouts stable
                if best.map_or(true, |(s, ..)| score < s) {
                    best = Some((score, page, rect_index, rotated));
                }
            }
        }
        best.map(|(_, page, rect_index, rotated)| (page, rect_index, rotated))
    }

    fn find_spot_on_page(&self, page: usize, w: usize, h: usize) -> Option<(usize, bool)> {
        let pad = 2 * self.options.padding;
        let (pw, ph) = (w + pad, h + pad);
        let mut best: Option<(usize, usize, bool)> = None;
        for (rect_index, rect) in self.free[page].iter().enumerate() {
            let mut consider = |rw: usize, rh: usize, rotated: bool| {
                if rw <= rect.w && rh <= rect.h {
                    let score = rect.w * rect.h - rw * rh;
                    if best.map_or(true, |(s, ..)| score < s) {
                        best = Some((score, rect_index, rotated));
                    }
                }
            };
            consider(pw, ph, false);
            if self.options.allow_rotation {
                consider(ph, pw, true);
            }
        }
        best.map(|(_, rect_index, rotated)| (rect_index, rotated))
    }

    /// Consume the chosen free rectangle and record the placement.
    fn commit(
        &mut self, source: usize, page: usize, rect_index: usize, w: usize, h: usize,
        rotated: bool
    ) -> AtlasEntry {
        let pad = self.options.padding;
        let (rw, rh) = if rotated { (h, w) } else { (w, h) };
        let rect = self.free[page].swap_remove(rect_index);

        split_free_rect(&mut self.free[page], rect, rw + 2 * pad, rh + 2 * pad);
        merge_free_rects(&mut self.free[page]);

        AtlasEntry {
            source,
            page,
            x: rect.x + pad,
            y: rect.y + pad,
            width: rw,
            height: rh,
            rotated
        }
    }
}

/// Split the consumed rectangle around a `used_w` x `used_h` placement
/// in its top-left corner, keeping the larger leftover in one piece.
fn split_free_rect(free: &mut Vec<FreeRect>, rect: FreeRect, used_w: usize, used_h: usize) {
    let leftover_w = rect.w - used_w;
    let leftover_h = rect.h - used_h;

    let (right, bottom) = if leftover_w <= leftover_h {
        // bottom strip keeps the full width
        (
            FreeRect { x: rect.x + used_w, y: rect.y, w: leftover_w, h: used_h },
            FreeRect { x: rect.x, y: rect.y + used_h, w: rect.w, h: leftover_h }
        )
    } else {
        // right strip keeps the full height
        (
            FreeRect { x: rect.x + used_w, y: rect.y, w: leftover_w, h: rect.h },
            FreeRect { x: rect.x, y: rect.y + used_h, w: used_w, h: leftover_h }
        )
    };
    if right.w > 0 && right.h > 0 {
        free.push(right);
    }
    if bottom.w > 0 && bottom.h > 0 {
        free.push(bottom);
    }
}

/// Re-join rectangles that share a full edge. Each merge removes one
/// rectangle so the pass count is bounded by the list length.
fn merge_free_rects(free: &mut Vec<FreeRect>) {
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..free.len() {
            for j in (i + 1)..free.len() {
                let (a, b) = (free[i], free[j]);
                if a.x == b.x && a.w == b.w && a.y + a.h == b.y {
                    free[i].h += b.h;
                    free.swap_remove(j);
                    merged = true;
                    break 'outer;
                }
                if a.x == b.x && a.w == b.w && b.y + b.h == a.y {
                    free[i].y = b.y;
                    free[i].h += b.h;
                    free.swap_remove(j);
                    merged = true;
                    break 'outer;
                }
                if a.y == b.y && a.h == b.h && a.x + a.w == b.x {
                    free[i].w += b.w;
                    free.swap_remove(j);
                    merged = true;
                    break 'outer;
                }
                if a.y == b.y && a.h == b.h && b.x + b.w == a.x {
                    free[i].x = b.x;
                    free[i].w += b.w;
                    free.swap_remove(j);
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
}

/// Pack and render in one call.
///
/// Returns the page buffers and one entry per input sprite, in input
/// order.
pub fn pack_atlas(
    sprites: &[PixelBuffer], options: AtlasOptions
) -> Result<(Vec<PixelBuffer>, Vec<AtlasEntry>), AtlasErrors> {
    let packer = AtlasPacker::pack(sprites.to_vec(), options)?;
    let pages = packer.render_pages();
    Ok((pages, packer.entries().to_vec()))
}
