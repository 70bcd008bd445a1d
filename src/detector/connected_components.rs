/// Two-pass 4-connected component labeling used to reassemble broken staff lines
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{BinaryRaster, Point};

/// Union-Find over provisional labels; the smaller label of a pair is always the root
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// `n` singleton labels, `0..n`
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Register one more label and return it
    pub fn make_label(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    /// Root of `x`'s class
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Path compression
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Join the classes of `x` and `y` under the smaller root
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x < root_y {
            self.parent[root_y as usize] = root_x;
        } else if root_y < root_x {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// Label raster produced by [`ComponentLabels::label`]
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    width: usize,
    height: usize,
    labels: Vec<u32>,
}

impl ComponentLabels {
    /// Label the pixels of `raster` whose value equals `foreground`
    ///
    /// Each such pixel looks at its up and left neighbours only. When
    /// both carry different labels the pixel takes the smaller one and the
    /// larger is recorded as equivalent to it; the second pass rewrites every
    /// pixel to the root of its equivalence class.
    pub fn label(raster: &BinaryRaster, foreground: bool) -> Self {
        let width = raster.width();
        let height = raster.height();

        let mut labels = vec![0u32; width * height];
        // Label 0 is background
        let mut uf = UnionFind::new(1);

        // First pass: provisional labels
        for y in 0..height {
            for x in 0..width {
                if raster.get(x, y) != foreground {
                    continue;
                }

                let idx = y * width + x;
                let left = if x > 0 { labels[idx - 1] } else { 0 };
                let up = if y > 0 { labels[idx - width] } else { 0 };

                labels[idx] = match (left, up) {
                    (0, 0) => uf.make_label(),
                    (l, 0) => l,
                    (0, u) => u,
                    (l, u) => {
                        if l != u {
                            uf.union(l, u);
                        }
                        l.min(u)
                    }
                };
            }
        }

        // Second pass: resolve equivalences
        for label in labels.iter_mut() {
            if *label != 0 {
                *label = uf.find(*label);
            }
        }

        let result = Self {
            width,
            height,
            labels,
        };
        log::trace!(
            "labeled {}x{} raster into {} components",
            width,
            height,
            result.component_count()
        );
        result
    }

    /// Row-major label raster; 0 marks unlabeled pixels
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Label at (x, y); 0 for unlabeled or out of bounds
    pub fn label_at(&self, x: usize, y: usize) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.labels[y * self.width + x]
    }

    /// Number of distinct components
    pub fn component_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&l| l != 0)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Points of every component, each set ordered by x then y
    pub fn components(&self) -> BTreeMap<u32, BTreeSet<Point>> {
        let mut components: BTreeMap<u32, BTreeSet<Point>> = BTreeMap::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let label = self.labels[y * self.width + x];
                if label == 0 {
                    continue;
                }
                components
                    .entry(label)
                    .or_default()
                    .insert(Point::new(x as i32, y as i32));
            }
        }
        components
    }
}
