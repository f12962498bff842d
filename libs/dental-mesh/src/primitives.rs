//! # Box Primitives
//!
//! Closed box meshes used as synthetic arches and crowns in tests and demos.

use glam::DVec3;

use crate::clean::remove_duplicate_vertices;
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Creates a box mesh with 8 vertices and 12 triangles.
///
/// # Arguments
///
/// * `size` - Dimensions [x, y, z]
/// * `center` - If true, center at origin; if false, corner at origin
///
/// # Example
///
/// ```rust
/// use dental_mesh::primitives::create_cube;
/// use glam::DVec3;
///
/// let mesh = create_cube(DVec3::splat(10.0), false).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn create_cube(size: DVec3, center: bool) -> MeshResult<Mesh> {
    let (min, max) = corners(size, center)?;
    let mut mesh = Mesh::with_capacity(8, 12);

    // Bottom ring then top ring, counter-clockwise seen from above.
    let v0 = mesh.add_vertex(DVec3::new(min.x, min.y, min.z));
    let v1 = mesh.add_vertex(DVec3::new(max.x, min.y, min.z));
    let v2 = mesh.add_vertex(DVec3::new(max.x, max.y, min.z));
    let v3 = mesh.add_vertex(DVec3::new(min.x, max.y, min.z));
    let v4 = mesh.add_vertex(DVec3::new(min.x, min.y, max.z));
    let v5 = mesh.add_vertex(DVec3::new(max.x, min.y, max.z));
    let v6 = mesh.add_vertex(DVec3::new(max.x, max.y, max.z));
    let v7 = mesh.add_vertex(DVec3::new(min.x, max.y, max.z));

    // Outward winding
    mesh.add_triangle(v0, v2, v1);
    mesh.add_triangle(v0, v3, v2);
    mesh.add_triangle(v4, v5, v6);
    mesh.add_triangle(v4, v6, v7);
    mesh.add_triangle(v0, v1, v5);
    mesh.add_triangle(v0, v5, v4);
    mesh.add_triangle(v2, v3, v7);
    mesh.add_triangle(v2, v7, v6);
    mesh.add_triangle(v3, v0, v4);
    mesh.add_triangle(v3, v4, v7);
    mesh.add_triangle(v1, v2, v6);
    mesh.add_triangle(v1, v6, v5);

    Ok(mesh)
}

/// Creates a closed box whose faces are split into a
/// `subdivisions × subdivisions` grid of quads.
///
/// Shared edge vertices are welded, so the result is a single connected
/// surface with `6·n² + 2` vertices and `12·n²` triangles.
///
/// # Errors
///
/// Returns [`MeshError::Degenerate`] for a non-positive size or zero
/// subdivisions.
///
/// # Example
///
/// ```rust
/// use dental_mesh::primitives::create_box;
/// use glam::DVec3;
///
/// let mesh = create_box(DVec3::splat(2.0), true, 3).unwrap();
/// assert_eq!(mesh.vertex_count(), 56);
/// assert_eq!(mesh.triangle_count(), 108);
/// ```
pub fn create_box(size: DVec3, center: bool, subdivisions: u32) -> MeshResult<Mesh> {
    if subdivisions == 0 {
        return Err(MeshError::degenerate("box needs at least one subdivision"));
    }
    let (min, max) = corners(size, center)?;
    let n = subdivisions;

    let coordinate = |axis: usize, step: u32| -> f64 {
        if step == 0 {
            min[axis]
        } else if step == n {
            max[axis]
        } else {
            min[axis] + (max[axis] - min[axis]) * (step as f64 / n as f64)
        }
    };

    let per_face = ((n + 1) * (n + 1)) as usize;
    let mut mesh = Mesh::with_capacity(per_face * 6, (n * n * 12) as usize);

    for axis in 0..3 {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        for outward in [false, true] {
            let base = mesh.vertex_count() as u32;
            let fixed = if outward { max[axis] } else { min[axis] };

            for i in 0..=n {
                for j in 0..=n {
                    let mut p = DVec3::ZERO;
                    p[axis] = fixed;
                    p[u] = coordinate(u, i);
                    p[v] = coordinate(v, j);
                    mesh.add_vertex(p);
                }
            }

            let at = |i: u32, j: u32| base + i * (n + 1) + j;
            for i in 0..n {
                for j in 0..n {
                    let (a, b, c, d) = (at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
                    // u × v points along +axis
                    if outward {
                        mesh.add_triangle(a, b, c);
                        mesh.add_triangle(a, c, d);
                    } else {
                        mesh.add_triangle(a, c, b);
                        mesh.add_triangle(a, d, c);
                    }
                }
            }
        }
    }

    Ok(remove_duplicate_vertices(&mesh))
}

fn corners(size: DVec3, center: bool) -> MeshResult<(DVec3, DVec3)> {
    if !(size.x > 0.0 && size.y > 0.0 && size.z > 0.0) {
        return Err(MeshError::degenerate(format!(
            "box size must be positive: {:?}",
            size
        )));
    }
    Ok(if center {
        let half = size / 2.0;
        (-half, half)
    } else {
        (DVec3::ZERO, size)
    })
}
