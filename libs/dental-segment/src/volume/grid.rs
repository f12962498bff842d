//! Binary occupancy grid rasterized from a triangle mesh.
//!
//! The grid origin sits half a voxel below the mesh bounding box, with one
//! extra empty voxel of padding on every side so that the border is always
//! background. Surfaces are rasterized by dense barycentric sampling, then
//! cavities enclosed by the surface are filled.

use std::collections::VecDeque;

use config::constants::MAX_VOXEL_CELLS;
use dental_mesh::Mesh;
use glam::DVec3;
use tracing::debug;

use super::{face_neighbors, linear_index, Dims};
use crate::error::{SegmentError, SegmentResult};

/// Empty voxels added around the rasterized bounds.
const PADDING: usize = 1;

/// Occupancy grid over a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    origin: DVec3,
    voxel_size: f64,
    dims: Dims,
    occupied: Vec<bool>,
}

impl VoxelGrid {
    /// Rasterizes `mesh` and fills its enclosed interior.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Voxelization`] for an empty mesh, a
    /// non-positive voxel size, non-finite coordinates, or a grid larger
    /// than [`MAX_VOXEL_CELLS`].
    pub fn from_mesh(mesh: &Mesh, voxel_size: f64) -> SegmentResult<Self> {
        if !(voxel_size > 0.0) || !voxel_size.is_finite() {
            return Err(SegmentError::voxelization(format!(
                "voxel size must be positive, got {}",
                voxel_size
            )));
        }
        if mesh.triangle_count() == 0 {
            return Err(SegmentError::voxelization("mesh has no triangles"));
        }

        let (min, max) = mesh.bounding_box();
        if !min.is_finite() || !max.is_finite() {
            return Err(SegmentError::voxelization("mesh has non-finite vertices"));
        }

        let origin = min - DVec3::splat(voxel_size * (0.5 + PADDING as f64));
        let span = ((max - origin) / voxel_size).floor();
        let dims = [span.x, span.y, span.z].map(|s| s as usize + 1 + PADDING);

        let cells = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&c| c <= MAX_VOXEL_CELLS)
            .ok_or_else(|| {
                SegmentError::voxelization(format!(
                    "grid {:?} exceeds {} cells at voxel size {}",
                    dims, MAX_VOXEL_CELLS, voxel_size
                ))
            })?;

        let mut grid = Self {
            origin,
            voxel_size,
            dims,
            occupied: vec![false; cells],
        };
        grid.rasterize(mesh);
        let surface = grid.occupied_count();
        grid.fill_interior();

        debug!(
            "Voxelized {} triangles into {:?} grid: {} surface, {} solid voxels",
            mesh.triangle_count(),
            dims,
            surface,
            grid.occupied_count()
        );

        Ok(grid)
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    pub fn occupied(&self) -> &[bool] {
        &self.occupied
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.iter().filter(|&&o| o).count()
    }

    /// Voxel containing `p`, clamped to the grid.
    pub fn voxel_of(&self, p: DVec3) -> [usize; 3] {
        let cell = ((p - self.origin) / self.voxel_size).floor();
        let mut coords = [0usize; 3];
        for axis in 0..3 {
            coords[axis] = (cell[axis].max(0.0) as usize).min(self.dims[axis] - 1);
        }
        coords
    }

    /// World-space box covering the voxels from `min` to `max` inclusive.
    pub fn world_bounds(&self, min: [usize; 3], max: [usize; 3]) -> (DVec3, DVec3) {
        let lo = DVec3::new(min[0] as f64, min[1] as f64, min[2] as f64);
        let hi = DVec3::new(max[0] as f64, max[1] as f64, max[2] as f64) + DVec3::ONE;
        (
            self.origin + lo * self.voxel_size,
            self.origin + hi * self.voxel_size,
        )
    }

    fn mark(&mut self, p: DVec3) {
        let index = linear_index(self.dims, self.voxel_of(p));
        self.occupied[index] = true;
    }

    fn rasterize(&mut self, mesh: &Mesh) {
        let spacing = self.voxel_size * 0.5;
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_positions(t);
            let longest = a.distance(b).max(b.distance(c)).max(c.distance(a));
            let steps = ((longest / spacing).ceil() as usize).max(1);
            let inv = 1.0 / steps as f64;
            for i in 0..=steps {
                for j in 0..=(steps - i) {
                    let u = i as f64 * inv;
                    let v = j as f64 * inv;
                    self.mark(a + (b - a) * u + (c - a) * v);
                }
            }
        }
    }

    /// Marks every empty voxel not reachable from the border as occupied.
    fn fill_interior(&mut self) {
        let mut outside = vec![false; self.occupied.len()];
        let mut queue = VecDeque::new();

        // The padded corner is always empty.
        outside[0] = true;
        queue.push_back(0);

        while let Some(index) = queue.pop_front() {
            for next in face_neighbors(self.dims, index) {
                if !outside[next] && !self.occupied[next] {
                    outside[next] = true;
                    queue.push_back(next);
                }
            }
        }

        for (cell, is_outside) in self.occupied.iter_mut().zip(outside) {
            if !is_outside {
                *cell = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dental_mesh::primitives::{create_box, create_cube};

    #[test]
    fn test_dims_include_padding() {
        let cube = create_cube(DVec3::splat(4.0), false).unwrap();
        let grid = VoxelGrid::from_mesh(&cube, 0.4).unwrap();
        // Surface spans voxels 1..=11 on each axis; one empty voxel each side.
        assert_eq!(grid.dims(), [13, 13, 13]);
        assert_eq!(grid.voxel_of(DVec3::ZERO), [1, 1, 1]);
        assert_eq!(grid.voxel_of(DVec3::splat(4.0)), [11, 11, 11]);
    }

    #[test]
    fn test_closed_box_is_filled_solid() {
        let cube = create_box(DVec3::splat(4.0), false, 3).unwrap();
        let grid = VoxelGrid::from_mesh(&cube, 0.4).unwrap();
        assert_eq!(grid.occupied_count(), 11 * 11 * 11);
        let center = linear_index(grid.dims(), [6, 6, 6]);
        assert!(grid.occupied()[center]);
        assert!(!grid.occupied()[0]);
    }

    #[test]
    fn test_world_bounds_cover_voxels() {
        let cube = create_cube(DVec3::splat(4.0), false).unwrap();
        let grid = VoxelGrid::from_mesh(&cube, 0.4).unwrap();
        let (lo, hi) = grid.world_bounds([1, 1, 1], [11, 11, 11]);
        assert!(lo.cmple(DVec3::ZERO).all());
        assert!(hi.cmpge(DVec3::splat(4.0)).all());
    }

    #[test]
    fn test_rejects_bad_input() {
        let cube = create_cube(DVec3::splat(4.0), false).unwrap();
        assert!(matches!(
            VoxelGrid::from_mesh(&cube, 0.0),
            Err(SegmentError::Voxelization { .. })
        ));
        assert!(matches!(
            VoxelGrid::from_mesh(&Mesh::new(), 0.4),
            Err(SegmentError::Voxelization { .. })
        ));
        assert!(matches!(
            VoxelGrid::from_mesh(&cube, 1e-4),
            Err(SegmentError::Voxelization { .. })
        ));
    }
}
