/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Centroid refinement (k-means style) with deterministic seeding.
//!
//! Seeding is farthest-point sampling over the sorted unique color
//! list, never a random source, so identical inputs always converge to
//! identical palettes.

use crate::histogram::ColorCount;

const MAX_ITERATIONS: usize = 16;
/// Stop once no centroid moves further than this (squared distance).
const CONVERGENCE_EPSILON: f64 = 0.25;

#[inline]
fn distance_squared(a: [f64; 4], b: [u8; 4]) -> f64 {
    let mut sum = 0.0;
    for c in 0..4 {
        let d = a[c] - f64::from(b[c]);
        sum += d * d;
    }
    sum
}

fn to_f64(color: [u8; 4]) -> [f64; 4] {
    [
        f64::from(color[0]),
        f64::from(color[1]),
        f64::from(color[2]),
        f64::from(color[3])
    ]
}

/// Farthest-point seeds, starting from the most frequent color.
fn seed_centroids(histogram: &[ColorCount], n: usize) -> Vec<[f64; 4]> {
    // most populated color first, lowest color value on ties
    let first = histogram
        .iter()
        .max_by(|a, b| (a.count, b.color).cmp(&(b.count, a.color)))
        .map(|e| e.color)
        .unwrap_or([0; 4]);

    let mut seeds = vec![to_f64(first)];

    while seeds.len() < n.min(histogram.len()) {
        let mut best: Option<([u8; 4], f64)> = None;

        for entry in histogram {
            let nearest = seeds
                .iter()
                .map(|s| distance_squared(*s, entry.color))
                .fold(f64::MAX, f64::min);
            // histogram order is sorted, so strict > keeps the lowest
            // color on ties
            if best.map_or(true, |(_, d)| nearest > d) {
                best = Some((entry.color, nearest));
            }
        }
        match best {
            Some((color, distance)) if distance > 0.0 => seeds.push(to_f64(color)),
            _ => break
        }
    }
    seeds
}

/// Refine `n` centroids over the histogram, returning rounded colors.
pub fn kmeans(histogram: &[ColorCount], n: usize) -> Vec<[u8; 4]> {
    debug_assert!(n >= 1);

    let mut centroids = seed_centroids(histogram, n);

    for _ in 0..MAX_ITERATIONS {
        let mut sums = vec![[0.0_f64; 4]; centroids.len()];
        let mut weights = vec![0.0_f64; centroids.len()];

        for entry in histogram {
            let mut nearest = 0;
            let mut nearest_dist = f64::MAX;
            for (i, centroid) in centroids.iter().enumerate() {
                let dist = distance_squared(*centroid, entry.color);
                if dist < nearest_dist {
                    nearest_dist = dist;
                    nearest = i;
                }
            }
            let weight = f64::from(entry.count);
            weights[nearest] += weight;
            for c in 0..4 {
                sums[nearest][c] += f64::from(entry.color[c]) * weight;
            }
        }

        let mut moved = 0.0_f64;
        for i in 0..centroids.len() {
            if weights[i] == 0.0 {
                // empty cluster keeps its position
                continue;
            }
            let mut updated = [0.0_f64; 4];
            for c in 0..4 {
                updated[c] = sums[i][c] / weights[i];
            }
            let delta: f64 = (0..4)
                .map(|c| (updated[c] - centroids[i][c]).powi(2))
                .sum();
            moved = moved.max(delta);
            centroids[i] = updated;
        }
        if moved < CONVERGENCE_EPSILON {
            break;
        }
    }

    let mut colors: Vec<[u8; 4]> = centroids
        .iter()
        .map(|c| {
            [
                c[0].round() as u8,
                c[1].round() as u8,
                c[2].round() as u8,
                c[3].round() as u8
            ]
        })
        .collect();
    colors.sort();
    colors.dedup();
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(color: [u8; 4], count: u32) -> ColorCount {
        ColorCount { color, count }
    }

    #[test]
    fn two_tight_clusters_find_their_centers() {
        let histogram = [
            entry([10, 10, 10, 255], 10),
            entry([12, 10, 10, 255], 10),
            entry([240, 240, 240, 255], 10),
            entry([244, 240, 240, 255], 10),
        ];
        let colors = kmeans(&histogram, 2);
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[0], [11, 10, 10, 255]);
        assert_eq!(colors[1], [242, 240, 240, 255]);
    }

    #[test]
    fn seeding_is_deterministic() {
        let histogram: Vec<ColorCount> = (0_u32..50)
            .map(|i| entry([(i * 3) as u8, (i * 5 % 200) as u8, 40, 255], 1 + i % 4))
            .collect();
        assert_eq!(kmeans(&histogram, 6), kmeans(&histogram, 6));
    }

    #[test]
    fn fewer_colors_than_clusters() {
        let histogram = [entry([50, 60, 70, 255], 3)];
        assert_eq!(kmeans(&histogram, 4), vec![[50, 60, 70, 255]]);
    }
}
