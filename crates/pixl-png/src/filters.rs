/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scanline filters, types 0 to 4.
//!
//! Filtering happens on raw bytes per channel, `bpp` is the number of
//! bytes per complete pixel so the "previous pixel" reference skips a
//! whole pixel. The first row filters against an implicit zero row.

use crate::enums::FilterMethod;

/// The Paeth predictor, picks whichever neighbour is closest to the
/// linear estimate `a + b - c`.
#[inline]
pub fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Reverse a filter in place. `previous` must be the already
/// reconstructed row above, empty for the first row.
pub fn unfilter_scanline(filter: FilterMethod, current: &mut [u8], previous: &[u8], bpp: usize) {
    let up = |previous: &[u8], i: usize| -> u8 {
        if previous.is_empty() {
            0
        } else {
            previous[i]
        }
    };

    match filter {
        FilterMethod::None => {}
        FilterMethod::Sub => {
            for i in bpp..current.len() {
                current[i] = current[i].wrapping_add(current[i - bpp]);
            }
        }
        FilterMethod::Up => {
            for i in 0..current.len() {
                current[i] = current[i].wrapping_add(up(previous, i));
            }
        }
        FilterMethod::Average => {
            for i in 0..current.len() {
                let left = if i >= bpp { current[i - bpp] } else { 0 };
                let avg = (u16::from(left) + u16::from(up(previous, i))) / 2;
                current[i] = current[i].wrapping_add(avg as u8);
            }
        }
        FilterMethod::Paeth => {
            for i in 0..current.len() {
                let left = if i >= bpp { current[i - bpp] } else { 0 };
                let above = up(previous, i);
                let corner = if i >= bpp { up(previous, i - bpp) } else { 0 };
                current[i] = current[i].wrapping_add(paeth(left, above, corner));
            }
        }
    }
}

/// Apply a filter, writing the filtered bytes into `out`.
pub fn filter_scanline(
    filter: FilterMethod, current: &[u8], previous: &[u8], bpp: usize, out: &mut Vec<u8>
) {
    let up = |i: usize| -> u8 {
        if previous.is_empty() {
            0
        } else {
            previous[i]
        }
    };

    match filter {
        FilterMethod::None => out.extend_from_slice(current),
        FilterMethod::Sub => {
            for i in 0..current.len() {
                let left = if i >= bpp { current[i - bpp] } else { 0 };
                out.push(current[i].wrapping_sub(left));
            }
        }
        FilterMethod::Up => {
            for i in 0..current.len() {
                out.push(current[i].wrapping_sub(up(i)));
            }
        }
        FilterMethod::Average => {
            for i in 0..current.len() {
                let left = if i >= bpp { current[i - bpp] } else { 0 };
                let avg = (u16::from(left) + u16::from(up(i))) / 2;
                out.push(current[i].wrapping_sub(avg as u8));
            }
        }
        FilterMethod::Paeth => {
            for i in 0..current.len() {
                let left = if i >= bpp { current[i - bpp] } else { 0 };
                let corner = if i >= bpp { up(i - bpp) } else { 0 };
                out.push(current[i].wrapping_sub(paeth(left, up(i), corner)));
            }
        }
    }
}

/// Pick the filter minimizing the sum of absolute filtered values, the
/// usual proxy for downstream compressibility.
pub fn choose_filter(current: &[u8], previous: &[u8], bpp: usize) -> FilterMethod {
    const CANDIDATES: [FilterMethod; 5] = [
        FilterMethod::None,
        FilterMethod::Sub,
        FilterMethod::Up,
        FilterMethod::Average,
        FilterMethod::Paeth
    ];

    let mut best = FilterMethod::None;
    let mut best_score = u64::MAX;
    let mut scratch = Vec::with_capacity(current.len());

    for filter in CANDIDATES {
        scratch.clear();
        filter_scanline(filter, current, previous, bpp, &mut scratch);

        // filtered bytes are deltas, score them as signed magnitudes
        let score: u64 = scratch
            .iter()
            .map(|&b| u64::from((b as i8).unsigned_abs()))
            .sum();

        if score < best_score {
            best_score = score;
            best = filter;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(filter: FilterMethod, row: &[u8], previous: &[u8], bpp: usize) {
        let mut filtered = Vec::new();
        filter_scanline(filter, row, previous, bpp, &mut filtered);

        let mut restored = filtered;
        unfilter_scanline(filter, &mut restored, previous, bpp);
        assert_eq!(restored, row, "{filter:?}");
    }

    #[test]
    fn all_filters_invert_without_previous_row() {
        let row = [10, 250, 3, 255, 90, 14, 76, 20];
        for raw in 0..5_u8 {
            round_trip(FilterMethod::from_u8(raw).unwrap(), &row, &[], 4);
        }
    }

    #[test]
    fn all_filters_invert_with_previous_row() {
        let row = [0, 255, 128, 33, 7, 99, 200, 1];
        let previous = [17, 2, 240, 128, 255, 0, 45, 45];
        for raw in 0..5_u8 {
            round_trip(FilterMethod::from_u8(raw).unwrap(), &row, &previous, 4);
        }
    }

    #[test]
    fn paeth_prefers_exact_neighbour() {
        assert_eq!(paeth(10, 20, 20), 10);
        assert_eq!(paeth(20, 10, 20), 10);
    }

    #[test]
    fn flat_row_prefers_sub_or_up() {
        let row = [100_u8; 16];
        let chosen = choose_filter(&row, &row, 4);
        assert_ne!(chosen, FilterMethod::None);
    }
}
