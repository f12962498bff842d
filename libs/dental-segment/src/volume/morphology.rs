//! Binary morphology on voxel masks with the 6-neighbour cross as
//! structuring element. Voxels outside the grid count as empty.

use std::collections::VecDeque;

use super::{face_neighbors, Dims};

/// A voxel survives erosion only if all its face neighbours are set and it
/// is not on the grid border.
pub fn erode(mask: &[bool], dims: Dims) -> Vec<bool> {
    (0..mask.len())
        .map(|i| mask[i] && face_neighbors(dims, i).filter(|&n| mask[n]).count() == 6)
        .collect()
}

/// A voxel is set after dilation if it or any face neighbour is set.
pub fn dilate(mask: &[bool], dims: Dims) -> Vec<bool> {
    (0..mask.len())
        .map(|i| mask[i] || face_neighbors(dims, i).any(|n| mask[n]))
        .collect()
}

/// Erosion followed by dilation; severs bridges one voxel thick.
pub fn open(mask: &[bool], dims: Dims) -> Vec<bool> {
    dilate(&erode(mask, dims), dims)
}

/// Labels 6-connected components of `mask` as `1..=count`, in order of
/// their lowest voxel index. Background is 0.
pub fn label_components(mask: &[bool], dims: Dims) -> (Vec<u32>, u32) {
    let mut labels = vec![0u32; mask.len()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if !mask[start] || labels[start] != 0 {
            continue;
        }
        count += 1;
        labels[start] = count;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            for next in face_neighbors(dims, index) {
                if mask[next] && labels[next] == 0 {
                    labels[next] = count;
                    queue.push_back(next);
                }
            }
        }
    }

    (labels, count)
}
