//! Marker-based watershed by priority flooding.
//!
//! Flooding the negated distance field means voxels are claimed in order of
//! decreasing distance: each basin grows outward from its marker and two
//! basins meet along the narrow necks between them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::{face_neighbors, Dims};

#[derive(Debug, Clone, Copy)]
struct Frontier {
    distance: f64,
    order: u64,
    index: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    // Max-heap: larger distance first, then first pushed.
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Floods `mask` from `markers`, labeling basins `1..=markers.len()` in
/// marker order.
///
/// Voxels outside the mask, or not reachable from any marker, stay 0.
pub fn watershed(distance: &[f64], markers: &[usize], mask: &[bool], dims: Dims) -> Vec<u32> {
    let mut labels = vec![0u32; mask.len()];
    let mut heap = BinaryHeap::new();
    let mut order = 0u64;

    for (i, &marker) in markers.iter().enumerate() {
        if !mask[marker] || labels[marker] != 0 {
            continue;
        }
        labels[marker] = i as u32 + 1;
        heap.push(Frontier {
            distance: distance[marker],
            order,
            index: marker,
        });
        order += 1;
    }

    while let Some(Frontier { index, .. }) = heap.pop() {
        let label = labels[index];
        for next in face_neighbors(dims, index) {
            if mask[next] && labels[next] == 0 {
                labels[next] = label;
                heap.push(Frontier {
                    distance: distance[next],
                    order,
                    index: next,
                });
                order += 1;
            }
        }
    }

    labels
}
