//! # Volume Algorithms
//!
//! Dense boolean and scalar fields over a [`grid::VoxelGrid`], stored in
//! x-fastest linear order, plus the algorithms the voxel and watershed
//! strategies run on them.
//!
//! - [`grid`]: occupancy rasterization and interior fill
//! - [`morphology`]: erosion, dilation, opening, component labeling
//! - [`distance`]: Euclidean distance transform and local maxima
//! - [`flood`]: marker-based watershed flooding

pub mod distance;
pub mod flood;
pub mod grid;
pub mod morphology;

/// Grid dimensions along x, y and z.
pub type Dims = [usize; 3];

/// Linear index of a voxel.
pub fn linear_index(dims: Dims, [x, y, z]: [usize; 3]) -> usize {
    x + dims[0] * (y + dims[1] * z)
}

/// Voxel coordinates of a linear index.
pub fn voxel_coords(dims: Dims, index: usize) -> [usize; 3] {
    let x = index % dims[0];
    let rest = index / dims[0];
    [x, rest % dims[1], rest / dims[1]]
}

/// The up to six face-adjacent neighbours of a voxel.
pub fn face_neighbors(dims: Dims, index: usize) -> impl Iterator<Item = usize> {
    let [x, y, z] = voxel_coords(dims, index);
    let stride_y = dims[0];
    let stride_z = dims[0] * dims[1];
    [
        (x > 0).then(|| index - 1),
        (x + 1 < dims[0]).then(|| index + 1),
        (y > 0).then(|| index - stride_y),
        (y + 1 < dims[1]).then(|| index + stride_y),
        (z > 0).then(|| index - stride_z),
        (z + 1 < dims[2]).then(|| index + stride_z),
    ]
    .into_iter()
    .flatten()
}

/// Voxel count and index bounds of one labeled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub voxels: usize,
    pub min: [usize; 3],
    pub max: [usize; 3],
}

/// Collects the regions of a label field whose labels run `1..=count`.
///
/// Label 0 is background. Regions are returned in label order.
pub fn regions(labels: &[u32], count: u32, dims: Dims) -> Vec<Region> {
    let mut regions: Vec<Region> = (1..=count)
        .map(|label| Region {
            label,
            voxels: 0,
            min: [usize::MAX; 3],
            max: [0; 3],
        })
        .collect();

    for (index, &label) in labels.iter().enumerate() {
        if label == 0 || label > count {
            continue;
        }
        let region = &mut regions[(label - 1) as usize];
        let coords = voxel_coords(dims, index);
        region.voxels += 1;
        for axis in 0..3 {
            region.min[axis] = region.min[axis].min(coords[axis]);
            region.max[axis] = region.max[axis].max(coords[axis]);
        }
    }

    regions.retain(|r| r.voxels > 0);
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let dims = [4, 3, 5];
        let index = linear_index(dims, [3, 1, 4]);
        assert_eq!(index, 3 + 4 * (1 + 3 * 4));
        assert_eq!(voxel_coords(dims, index), [3, 1, 4]);
    }

    #[test]
    fn test_face_neighbors_at_corner_and_center() {
        let dims = [3, 3, 3];
        assert_eq!(face_neighbors(dims, 0).count(), 3);
        let center = linear_index(dims, [1, 1, 1]);
        let mut around: Vec<usize> = face_neighbors(dims, center).collect();
        around.sort_unstable();
        assert_eq!(around, vec![4, 10, 12, 14, 16, 22]);
    }

    #[test]
    fn test_regions_bounds() {
        let dims = [4, 1, 1];
        let labels = [1, 0, 2, 2];
        let found = regions(&labels, 2, dims);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].voxels, 1);
        assert_eq!(found[1].min, [2, 0, 0]);
        assert_eq!(found[1].max, [3, 0, 0]);
    }
}
