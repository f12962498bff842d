//! # Mesh Data Structure
//!
//! Core triangle mesh representation: vertex positions, triangle indices and
//! optional per-vertex normals.
//!
//! Meshes are treated as values. Cleanup and selection operations take
//! `&Mesh` (or consume `self`) and return a new mesh, so the same input can
//! be handed to several segmentation strategies in turn without aliasing.

use config::constants::{CROP_TOLERANCE, DEGENERATE_AREA_EPSILON};
use glam::DVec3;

use crate::error::{MeshError, MeshResult};

/// A triangle mesh with vertices and indices.
///
/// # Example
///
/// ```rust
/// use dental_mesh::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
    /// Optional vertex normals
    normals: Option<Vec<DVec3>>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
            normals: None,
        }
    }

    /// Builds a mesh from raw arrays, checking every triangle index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfBounds`] if a triangle references a
    /// vertex that does not exist.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> MeshResult<Self> {
        let mesh = Self {
            vertices,
            triangles,
            normals: None,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals = None;
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the vertex at the given index.
    #[inline]
    pub fn vertex(&self, index: u32) -> DVec3 {
        self.vertices[index as usize]
    }

    /// Returns the triangle at the given index.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        self.triangles[index]
    }

    /// Returns the three corner positions of a triangle.
    #[inline]
    pub fn triangle_positions(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[index];
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Returns the centroid of a triangle.
    pub fn triangle_centroid(&self, index: usize) -> DVec3 {
        let [a, b, c] = self.triangle_positions(index);
        (a + b + c) / 3.0
    }

    /// Returns the area of a triangle.
    pub fn triangle_area(&self, index: usize) -> f64 {
        let [a, b, c] = self.triangle_positions(index);
        0.5 * (b - a).cross(c - a).length()
    }

    /// Returns true if a triangle repeats a vertex or has (near) zero area.
    pub fn is_degenerate(&self, index: usize) -> bool {
        let [a, b, c] = self.triangles[index];
        if a == b || b == c || a == c {
            return true;
        }
        let [pa, pb, pc] = self.triangle_positions(index);
        (pb - pa).cross(pc - pa).length() < DEGENERATE_AREA_EPSILON
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        (0..self.triangles.len()).map(|i| self.triangle_area(i)).sum()
    }

    /// Returns the vertex normals, if computed.
    pub fn normals(&self) -> Option<&[DVec3]> {
        self.normals.as_deref()
    }

    /// Returns the mesh with area-weighted vertex normals computed.
    pub fn with_vertex_normals(mut self) -> Self {
        let mut normals = vec![DVec3::ZERO; self.vertices.len()];

        for tri in &self.triangles {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            let normal = (v1 - v0).cross(v2 - v0);

            normals[tri[0] as usize] += normal;
            normals[tri[1] as usize] += normal;
            normals[tri[2] as usize] += normal;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }

        self.normals = Some(normals);
        self
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        if self.vertices.is_empty() {
            return (DVec3::ZERO, DVec3::ZERO);
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for v in &self.vertices[1..] {
            min = min.min(*v);
            max = max.max(*v);
        }

        (min, max)
    }

    /// Mean of all vertex positions.
    pub fn centroid(&self) -> DVec3 {
        if self.vertices.is_empty() {
            return DVec3::ZERO;
        }
        self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len() as f64
    }

    /// Returns a copy translated by `offset`.
    pub fn translated(mut self, offset: DVec3) -> Self {
        for v in &mut self.vertices {
            *v += offset;
        }
        self
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);

        for tri in &other.triangles {
            self.triangles
                .push([tri[0] + offset, tri[1] + offset, tri[2] + offset]);
        }

        self.normals = None;
    }

    /// Builds a sub-mesh from the given triangle indices.
    ///
    /// Only referenced vertices are kept, renumbered in order of first use.
    /// Triangle order follows `indices`.
    pub fn select_triangles(&self, indices: &[usize]) -> Mesh {
        let mut remap: Vec<Option<u32>> = vec![None; self.vertices.len()];
        let mut result = Mesh::with_capacity(indices.len(), indices.len());

        for &t in indices {
            let tri = self.triangles[t];
            let mut mapped = [0u32; 3];
            for (slot, &v) in mapped.iter_mut().zip(tri.iter()) {
                *slot = match remap[v as usize] {
                    Some(existing) => existing,
                    None => {
                        let new_index = result.add_vertex(self.vertices[v as usize]);
                        remap[v as usize] = Some(new_index);
                        new_index
                    }
                };
            }
            result.add_triangle(mapped[0], mapped[1], mapped[2]);
        }

        result
    }

    /// Keeps the triangles whose three vertices lie inside the box.
    pub fn crop(&self, min: DVec3, max: DVec3) -> Mesh {
        let lo = min - DVec3::splat(CROP_TOLERANCE);
        let hi = max + DVec3::splat(CROP_TOLERANCE);
        let inside: Vec<bool> = self
            .vertices
            .iter()
            .map(|v| v.cmpge(lo).all() && v.cmple(hi).all())
            .collect();

        let kept: Vec<usize> = self
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, tri)| tri.iter().all(|&v| inside[v as usize]))
            .map(|(i, _)| i)
            .collect();

        self.select_triangles(&kept)
    }

    /// Validates that every vertex is finite and every triangle index is in
    /// range.
    pub fn validate(&self) -> MeshResult<()> {
        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::invalid(format!(
                "non-finite vertex {} at {}",
                index, self.vertices[index]
            )));
        }

        let vertex_count = self.vertices.len();

        for (t, tri) in self.triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::IndexOutOfBounds {
                    triangle: t,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}
