/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Median-cut quantization over an explicit work queue.

use crate::histogram::ColorCount;

/// A bucket of histogram entries awaiting a split.
struct Bucket {
    entries: Vec<ColorCount>
}

impl Bucket {
    /// Widest channel and its range, weighted later by population.
    fn widest_channel(&self) -> (usize, u32) {
        let mut lo = [255_u8; 4];
        let mut hi = [0_u8; 4];

        for entry in &self.entries {
            for c in 0..4 {
                lo[c] = lo[c].min(entry.color[c]);
                hi[c] = hi[c].max(entry.color[c]);
            }
        }
        let mut channel = 0;
        let mut range = 0_u32;
        for c in 0..4 {
            let r = u32::from(hi[c]) - u32::from(lo[c]);
            if r > range {
                range = r;
                channel = c;
            }
        }
        (channel, range)
    }

    fn population(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }

    /// Split at the population median along `channel`.
    ///
    /// Entries are ordered by the split channel first with the full
    /// color as the tie break, keeping the cut deterministic.
    fn split(mut self, channel: usize) -> (Bucket, Bucket) {
        self.entries
            .sort_by_key(|e| (e.color[channel], e.color));

        let half = self.population() / 2;
        let mut seen = 0_u64;
        let mut cut = 0;

        for (i, entry) in self.entries.iter().enumerate() {
            seen += u64::from(entry.count);
            if seen >= half {
                cut = i + 1;
                break;
            }
        }
        // never produce an empty side
        cut = cut.clamp(1, self.entries.len() - 1);

        let right = self.entries.split_off(cut);
        (self, Bucket { entries: right })
    }

    /// Frequency-weighted average color of the bucket.
    fn representative(&self) -> [u8; 4] {
        let mut sums = [0_u64; 4];
        let mut total = 0_u64;

        for entry in &self.entries {
            let weight = u64::from(entry.count);
            total += weight;
            for c in 0..4 {
                sums[c] += u64::from(entry.color[c]) * weight;
            }
        }
        let mut color = [0_u8; 4];
        for c in 0..4 {
            color[c] = ((sums[c] + total / 2) / total) as u8;
        }
        color
    }
}

/// Reduce a histogram to at most `n` representative colors.
pub fn median_cut(histogram: &[ColorCount], n: usize) -> Vec<[u8; 4]> {
    debug_assert!(n >= 1);

    let mut queue = vec![Bucket {
        entries: histogram.to_vec()
    }];

    while queue.len() < n {
        // the bucket with the greatest population-weighted channel
        // range is the next to split, index as the tie break
        let mut best: Option<(usize, u64)> = None;
        for (i, bucket) in queue.iter().enumerate() {
            if bucket.entries.len() < 2 {
                continue;
            }
            let (_, range) = bucket.widest_channel();
            let score = u64::from(range) * bucket.population();
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        let Some((index, _)) = best else {
            break;
        };
        let bucket = queue.swap_remove(index);
        let (channel, _) = bucket.widest_channel();
        let (left, right) = bucket.split(channel);
        queue.push(left);
        queue.push(right);
    }
    let mut colors: Vec<[u8; 4]> = queue.iter().map(Bucket::representative).collect();
    colors.sort();
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(color: [u8; 4], count: u32) -> ColorCount {
        ColorCount { color, count }
    }

    #[test]
    fn two_clusters_split_cleanly() {
        let histogram = [
            entry([0, 0, 0, 255], 50),
            entry([10, 5, 0, 255], 50),
            entry([250, 250, 250, 255], 50),
            entry([255, 255, 255, 255], 50),
        ];
        let colors = median_cut(&histogram, 2);
        assert_eq!(colors.len(), 2);
        // one dark and one bright representative
        assert!(colors[0][0] < 20);
        assert!(colors[1][0] > 240);
    }

    #[test]
    fn never_returns_more_than_available() {
        let histogram = [entry([1, 2, 3, 255], 9)];
        let colors = median_cut(&histogram, 16);
        assert_eq!(colors, vec![[1, 2, 3, 255]]);
    }

    #[test]
    fn deterministic_across_calls() {
        let histogram: Vec<ColorCount> = (0_u32..64)
            .map(|i| entry([(i * 4) as u8, (i * 7 % 256) as u8, 13, 255], i + 1))
            .collect();
        assert_eq!(median_cut(&histogram, 8), median_cut(&histogram, 8));
    }
}
