/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Octree quantization.
//!
//! Colors are inserted into an 8-way tree keyed by successive RGB bit
//! planes, then the least-populated subtrees are folded upward until
//! the leaf count fits the target.

use crate::histogram::ColorCount;

const MAX_DEPTH: usize = 8;

#[derive(Default, Clone)]
struct Node {
    children: [Option<usize>; 8],
    /// RGBA channel sums over every color reaching this node, valid for
    /// leaves and for interior nodes after their children are folded in.
    sums:     [u64; 4],
    count:    u64,
    is_leaf:  bool
}

struct Octree {
    nodes: Vec<Node>
}

impl Octree {
    fn new() -> Octree {
        Octree {
            nodes: vec![Node::default()]
        }
    }

    /// Child slot for `color` at `depth`, one bit from each RGB plane.
    fn child_index(color: [u8; 4], depth: usize) -> usize {
        let shift = MAX_DEPTH - 1 - depth;
        (usize::from(color[0] >> shift & 1) << 2)
            | (usize::from(color[1] >> shift & 1) << 1)
            | usize::from(color[2] >> shift & 1)
    }

    fn insert(&mut self, color: [u8; 4], count: u32) {
        let mut node = 0;
        for depth in 0..MAX_DEPTH {
            let slot = Self::child_index(color, depth);
            node = match self.nodes[node].children[slot] {
                Some(child) => child,
                None => {
                    self.nodes.push(Node::default());
                    let child = self.nodes.len() - 1;
                    self.nodes[node].children[slot] = Some(child);
                    child
                }
            };
        }
        let leaf = &mut self.nodes[node];
        leaf.is_leaf = true;
        leaf.count += u64::from(count);
        for c in 0..4 {
            leaf.sums[c] += u64::from(color[c]) * u64::from(count);
        }
    }

    fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Fold the children of one interior node into it, picking the
    /// deepest node whose subtree population is smallest. Index order
    /// breaks ties so reduction is deterministic.
    fn reduce_once(&mut self) {
        let mut best: Option<(usize, usize, u64)> = None;

        let mut stack = vec![(0_usize, 0_usize)];
        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index];
            let has_leaf_child = node
                .children
                .iter()
                .flatten()
                .any(|&c| self.nodes[c].is_leaf);

            if has_leaf_child {
                let population: u64 = node
                    .children
                    .iter()
                    .flatten()
                    .map(|&c| self.nodes[c].count)
                    .sum();
                let better = match best {
                    None => true,
                    Some((_, d, p)) => (depth, u64::MAX - population) > (d, u64::MAX - p)
                };
                if better {
                    best = Some((index, depth, population));
                }
            }
            for &child in node.children.iter().flatten() {
                stack.push((child, depth + 1));
            }
        }

        if let Some((index, _, _)) = best {
            let children = self.nodes[index].children;
            for slot in 0..8 {
                if let Some(child) = children[slot] {
                    let (count, sums, child_is_leaf) = {
                        let c = &self.nodes[child];
                        (c.count, c.sums, c.is_leaf)
                    };
                    // only fold actual leaves, deeper structure keeps
                    // its own nodes until a later pass reaches it
                    if child_is_leaf {
                        let node = &mut self.nodes[index];
                        node.count += count;
                        for c in 0..4 {
                            node.sums[c] += sums[c];
                        }
                        node.children[slot] = None;
                    }
                }
            }
            self.nodes[index].is_leaf = true;
        }
    }

    fn collect_leaves(&self) -> Vec<[u8; 4]> {
        let mut colors = Vec::new();
        let mut stack = vec![0_usize];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if node.is_leaf && node.count > 0 {
                let mut color = [0_u8; 4];
                for c in 0..4 {
                    color[c] = ((node.sums[c] + node.count / 2) / node.count) as u8;
                }
                colors.push(color);
            }
            for &child in node.children.iter().flatten() {
                stack.push(child);
            }
        }
        colors.sort();
        colors
    }
}

/// Reduce a histogram to at most `n` colors by octree folding.
pub fn octree_quantize(histogram: &[ColorCount], n: usize) -> Vec<[u8; 4]> {
    debug_assert!(n >= 1);

    let mut tree = Octree::new();
    for entry in histogram {
        tree.insert(entry.color, entry.count);
    }
    while tree.leaf_count() > n {
        tree.reduce_once();
    }
    tree.collect_leaves()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::ColorCount;

    fn entry(color: [u8; 4], count: u32) -> ColorCount {
        ColorCount { color, count }
    }

    #[test]
    fn under_target_is_identity() {
        let histogram = [entry([5, 5, 5, 255], 1), entry([200, 10, 10, 255], 1)];
        let colors = octree_quantize(&histogram, 8);
        assert_eq!(colors, vec![[5, 5, 5, 255], [200, 10, 10, 255]]);
    }

    #[test]
    fn reduces_to_target_count() {
        let histogram: Vec<ColorCount> = (0_u32..100)
            .map(|i| entry([(i * 2) as u8, (255 - i * 2) as u8, (i % 8 * 32) as u8, 255], 1))
            .collect();
        let colors = octree_quantize(&histogram, 16);
        assert!(colors.len() <= 16);
        assert!(!colors.is_empty());
    }

    #[test]
    fn merging_preserves_population_average() {
        // two near-identical colors collapse to their weighted mean
        let histogram = [entry([100, 0, 0, 255], 3), entry([101, 0, 0, 255], 1)];
        let colors = octree_quantize(&histogram, 1);
        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0], [100, 0, 0, 255]);
    }

    #[test]
    fn deterministic_across_calls() {
        let histogram: Vec<ColorCount> = (0_u32..64)
            .map(|i| entry([(i * 5 % 256) as u8, (i * 11 % 256) as u8, i as u8, 255], i + 1))
            .collect();
        assert_eq!(
            octree_quantize(&histogram, 12),
            octree_quantize(&histogram, 12)
        );
    }
}
