//! Principal component analysis of point sets.
//!
//! The eigen-decomposition of the 3×3 covariance matrix gives the same
//! directions as the singular value decomposition of the centered points;
//! eigenvalues are the per-axis variances.

use glam::DVec3;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

/// Principal axes of a point set, ordered by ascending variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrincipalAxes {
    /// Mean of the input points.
    pub mean: DVec3,
    /// Unit axes, smallest variance first.
    pub axes: [DVec3; 3],
    /// Variance along each axis, ascending.
    pub variances: [f64; 3],
}

impl PrincipalAxes {
    /// Computes the principal axes of `points`.
    ///
    /// Returns `None` for an empty input. Axis signs are canonicalized so
    /// the component with the largest magnitude is positive.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dental_mesh::pca::PrincipalAxes;
    /// use glam::DVec3;
    ///
    /// let points: Vec<DVec3> = (0..10)
    ///     .map(|i| DVec3::new(i as f64, (i % 2) as f64 * 0.1, 0.0))
    ///     .collect();
    /// let pca = PrincipalAxes::from_points(&points).unwrap();
    /// assert!(pca.largest().x.abs() > 0.99);
    /// assert!(pca.smallest().z.abs() > 0.99);
    /// ```
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mean = points.iter().copied().sum::<DVec3>() / points.len() as f64;

        let mut cov = Matrix3::<f64>::zeros();
        for p in points {
            let d = *p - mean;
            let d = Vector3::new(d.x, d.y, d.z);
            cov += d * d.transpose();
        }
        cov /= points.len() as f64;

        let eigen = SymmetricEigen::new(cov);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

        let axes = order.map(|i| {
            let column = eigen.eigenvectors.column(i);
            canonical_sign(DVec3::new(column[0], column[1], column[2]).normalize_or_zero())
        });
        let variances = order.map(|i| eigen.eigenvalues[i].max(0.0));

        Some(Self {
            mean,
            axes,
            variances,
        })
    }

    /// Axis of least spread.
    pub fn smallest(&self) -> DVec3 {
        self.axes[0]
    }

    /// Axis of intermediate spread.
    pub fn middle(&self) -> DVec3 {
        self.axes[1]
    }

    /// Axis of greatest spread.
    pub fn largest(&self) -> DVec3 {
        self.axes[2]
    }

    /// Signed coordinate of `point` along `axis`, relative to the mean.
    pub fn project(&self, point: DVec3, axis: DVec3) -> f64 {
        (point - self.mean).dot(axis)
    }
}

fn canonical_sign(axis: DVec3) -> DVec3 {
    let abs = axis.abs();
    let dominant = if abs.x >= abs.y && abs.x >= abs.z {
        axis.x
    } else if abs.y >= abs.z {
        axis.y
    } else {
        axis.z
    };
    if dominant < 0.0 {
        -axis
    } else {
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn box_points(extent: DVec3) -> Vec<DVec3> {
        let mut points = Vec::new();
        for i in 0..=4 {
            for j in 0..=4 {
                for k in 0..=4 {
                    let t = DVec3::new(i as f64, j as f64, k as f64) / 4.0 - 0.5;
                    points.push(t * extent);
                }
            }
        }
        points
    }

    #[test]
    fn test_empty_input() {
        assert!(PrincipalAxes::from_points(&[]).is_none());
    }

    #[test]
    fn test_axes_follow_extent() {
        let pca = PrincipalAxes::from_points(&box_points(DVec3::new(2.0, 10.0, 5.0))).unwrap();
        assert_relative_eq!(pca.smallest().x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(pca.middle().z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(pca.largest().y, 1.0, epsilon = 1e-9);
        assert!(pca.variances[0] < pca.variances[1]);
        assert!(pca.variances[1] < pca.variances[2]);
    }

    #[test]
    fn test_mean_and_projection() {
        let points: Vec<DVec3> = box_points(DVec3::splat(2.0))
            .into_iter()
            .map(|p| p + DVec3::new(3.0, 0.0, 0.0))
            .collect();
        let pca = PrincipalAxes::from_points(&points).unwrap();
        assert_relative_eq!(pca.mean.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(pca.project(DVec3::new(3.0, 0.0, 0.0), DVec3::X), 0.0);
    }

    #[test]
    fn test_signs_are_canonical() {
        let pca = PrincipalAxes::from_points(&box_points(DVec3::new(1.0, 3.0, 9.0))).unwrap();
        for axis in pca.axes {
            let dominant = axis.abs().max_element();
            assert!(axis.x == dominant || axis.y == dominant || axis.z == dominant);
        }
    }
}
