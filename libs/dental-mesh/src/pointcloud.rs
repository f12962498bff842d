//! Point clouds sampled from mesh surfaces.
//!
//! Sampling is area-weighted and driven by a seeded RNG, so the same mesh,
//! count and seed always produce the same cloud.
//!
//! # Example
//!
//! ```
//! use dental_mesh::{pointcloud::PointCloud, primitives::create_cube};
//! use glam::DVec3;
//!
//! let cube = create_cube(DVec3::splat(2.0), true).unwrap();
//! let cloud = PointCloud::sample_uniform(&cube, 500, 7)
//!     .unwrap()
//!     .with_estimated_normals(10);
//! assert_eq!(cloud.len(), 500);
//! assert!(cloud.normals().is_some());
//! ```

use glam::DVec3;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use crate::spatial::PointGrid;

/// A set of sampled surface points with optional normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<DVec3>,
    normals: Option<Vec<DVec3>>,
}

impl PointCloud {
    /// Wraps existing positions.
    pub fn from_points(points: Vec<DVec3>) -> Self {
        Self {
            points,
            normals: None,
        }
    }

    /// Draws `count` points uniformly over the surface of `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Sampling`] when no point can be produced: a zero
    /// count, no triangles, or zero total area.
    pub fn sample_uniform(mesh: &Mesh, count: usize, seed: u64) -> MeshResult<Self> {
        let mut cumulative = Vec::with_capacity(mesh.triangle_count());
        let mut total = 0.0;
        for i in 0..mesh.triangle_count() {
            total += mesh.triangle_area(i);
            cumulative.push(total);
        }

        if count == 0 || !(total > 0.0) {
            return Err(MeshError::sampling(format!(
                "no points sampled ({} requested, surface area {})",
                count, total
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let last = cumulative.len() - 1;
        let points: Vec<DVec3> = (0..count)
            .map(|_| {
                let target = rng.gen::<f64>() * total;
                let t = cumulative.partition_point(|&c| c <= target).min(last);
                let [a, b, c] = mesh.triangle_positions(t);
                let r1 = rng.gen::<f64>().sqrt();
                let r2 = rng.gen::<f64>();
                a * (1.0 - r1) + b * (r1 * (1.0 - r2)) + c * (r1 * r2)
            })
            .collect();

        debug!(
            "Sampled {} points over {} triangles (area {:.3})",
            points.len(),
            mesh.triangle_count(),
            total
        );

        Ok(Self::from_points(points))
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point positions.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Point normals, if estimated.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Returns the cloud with a PCA normal estimated at every point from its
    /// `k` nearest neighbours.
    ///
    /// Points with fewer than three neighbours get `+Z`.
    pub fn with_estimated_normals(mut self, k: usize) -> Self {
        let grid = PointGrid::with_auto_cell_size(&self.points);
        let normals: Vec<DVec3> = self
            .points
            .par_iter()
            .map(|&p| {
                let neighbors = grid.nearest_n(p, k);
                estimate_point_normal(&self.points, &neighbors)
            })
            .collect();
        self.normals = Some(normals);
        self
    }
}

/// Normal of the plane best fitting the given neighbourhood.
fn estimate_point_normal(points: &[DVec3], neighbors: &[u32]) -> DVec3 {
    if neighbors.len() < 3 {
        return DVec3::Z;
    }

    let centroid = neighbors
        .iter()
        .map(|&i| points[i as usize])
        .sum::<DVec3>()
        / neighbors.len() as f64;

    let mut cov = Matrix3::<f64>::zeros();
    for &i in neighbors {
        let d = points[i as usize] - centroid;
        let d = Vector3::new(d.x, d.y, d.z);
        cov += d * d.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let smallest = eigen.eigenvalues.imin();
    let column = eigen.eigenvectors.column(smallest);
    let normal = DVec3::new(column[0], column[1], column[2]).normalize_or_zero();
    if normal == DVec3::ZERO {
        DVec3::Z
    } else {
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_cube;
    use approx::assert_relative_eq;

    fn flat_square() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(DVec3::new(4.0, 0.0, 0.0));
        mesh.add_vertex(DVec3::new(4.0, 4.0, 0.0));
        mesh.add_vertex(DVec3::new(0.0, 4.0, 0.0));
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        mesh
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let cube = create_cube(DVec3::ONE, false).unwrap();
        let a = PointCloud::sample_uniform(&cube, 200, 11).unwrap();
        let b = PointCloud::sample_uniform(&cube, 200, 11).unwrap();
        let c = PointCloud::sample_uniform(&cube, 200, 12).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let cloud = PointCloud::sample_uniform(&flat_square(), 300, 1).unwrap();
        for p in cloud.points() {
            assert_relative_eq!(p.z, 0.0);
            assert!(p.x >= 0.0 && p.x <= 4.0 && p.y >= 0.0 && p.y <= 4.0);
        }
    }

    #[test]
    fn test_sampling_fails_without_area() {
        let err = PointCloud::sample_uniform(&Mesh::new(), 100, 0).unwrap_err();
        assert!(matches!(err, MeshError::Sampling { .. }));
        let err = PointCloud::sample_uniform(&flat_square(), 0, 0).unwrap_err();
        assert!(matches!(err, MeshError::Sampling { .. }));
    }

    #[test]
    fn test_plane_normals_are_vertical() {
        let cloud = PointCloud::sample_uniform(&flat_square(), 400, 3)
            .unwrap()
            .with_estimated_normals(12);
        for n in cloud.normals().unwrap() {
            assert!(n.z.abs() > 0.999, "normal {n:?} is not vertical");
        }
    }
}
