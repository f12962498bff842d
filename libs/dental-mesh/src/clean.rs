//! # Mesh Cleanup
//!
//! Preprocessing that turns a raw scan into a mesh suitable for geometric
//! analysis, plus the lighter tidy pass applied to every extracted sub-mesh.
//!
//! ## Preprocessing Order
//!
//! 1. Remove duplicate vertices (exact position match)
//! 2. Remove duplicate triangles (same vertex set, any winding)
//! 3. Remove degenerate triangles (repeated index or zero area)
//! 4. Remove non-manifold edges (keep the two largest triangles per edge)
//! 5. One pass of Laplacian smoothing
//! 6. Recompute vertex normals
//!
//! Every function takes its input by reference and returns a new mesh.

use std::collections::{BTreeMap, HashMap, HashSet};

use config::constants::{LAPLACIAN_ITERATIONS, LAPLACIAN_LAMBDA};
use glam::DVec3;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Runs the full preprocessing chain on a raw mesh.
///
/// # Errors
///
/// Returns [`MeshError::InvalidMesh`] if the input has no vertices, or
/// [`MeshError::IndexOutOfBounds`] if a triangle index is invalid.
///
/// # Example
///
/// ```rust
/// use dental_mesh::{clean::preprocess, primitives::create_cube};
/// use glam::DVec3;
///
/// let cube = create_cube(DVec3::splat(2.0), true).unwrap();
/// let cleaned = preprocess(&cube).unwrap();
/// assert_eq!(cleaned.triangle_count(), 12);
/// assert!(cleaned.normals().is_some());
/// ```
pub fn preprocess(mesh: &Mesh) -> MeshResult<Mesh> {
    if mesh.vertex_count() == 0 {
        return Err(MeshError::invalid("mesh has no vertices"));
    }
    mesh.validate()?;

    let deduped = remove_duplicate_vertices(mesh);
    let deduped = remove_duplicate_triangles(&deduped);
    let solid = remove_degenerate_triangles(&deduped);
    let manifold = remove_non_manifold_edges(&solid);
    let smoothed = smooth_laplacian(&manifold, LAPLACIAN_ITERATIONS, LAPLACIAN_LAMBDA);
    let cleaned = smoothed.with_vertex_normals();

    info!(
        "Preprocessed mesh: {} -> {} vertices, {} -> {} triangles",
        mesh.vertex_count(),
        cleaned.vertex_count(),
        mesh.triangle_count(),
        cleaned.triangle_count()
    );

    Ok(cleaned)
}

/// Tidies an extracted sub-mesh: duplicates, degenerates and unreferenced
/// vertices are dropped and normals recomputed.
pub fn clean_submesh(mesh: &Mesh) -> Mesh {
    let deduped = remove_duplicate_vertices(mesh);
    let deduped = remove_duplicate_triangles(&deduped);
    let solid = remove_degenerate_triangles(&deduped);
    remove_unreferenced_vertices(&solid).with_vertex_normals()
}

/// Bit pattern of a position, with negative zero folded onto zero.
fn position_key(p: DVec3) -> [u64; 3] {
    [p.x, p.y, p.z].map(|c| if c == 0.0 { 0u64 } else { c.to_bits() })
}

/// Merges vertices with bit-identical positions.
pub fn remove_duplicate_vertices(mesh: &Mesh) -> Mesh {
    let mut first_seen: HashMap<[u64; 3], u32> = HashMap::with_capacity(mesh.vertex_count());
    let mut remap = Vec::with_capacity(mesh.vertex_count());
    let mut result = Mesh::with_capacity(mesh.vertex_count(), mesh.triangle_count());

    for &v in mesh.vertices() {
        let index = *first_seen
            .entry(position_key(v))
            .or_insert_with(|| result.add_vertex(v));
        remap.push(index);
    }

    for tri in mesh.triangles() {
        result.add_triangle(
            remap[tri[0] as usize],
            remap[tri[1] as usize],
            remap[tri[2] as usize],
        );
    }

    let merged = mesh.vertex_count() - result.vertex_count();
    if merged > 0 {
        debug!("Merged {} duplicate vertices", merged);
    }
    result
}

/// Drops triangles that repeat the vertex set of an earlier triangle.
pub fn remove_duplicate_triangles(mesh: &Mesh) -> Mesh {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(mesh.triangle_count());
    let kept: Vec<usize> = mesh
        .triangles()
        .iter()
        .enumerate()
        .filter(|(_, tri)| {
            let mut key = **tri;
            key.sort_unstable();
            seen.insert(key)
        })
        .map(|(i, _)| i)
        .collect();

    keep_triangles(mesh, &kept)
}

/// Drops triangles with repeated indices or (near) zero area.
pub fn remove_degenerate_triangles(mesh: &Mesh) -> Mesh {
    let kept: Vec<usize> = (0..mesh.triangle_count())
        .filter(|&i| !mesh.is_degenerate(i))
        .collect();

    keep_triangles(mesh, &kept)
}

/// Removes triangles until every edge is shared by at most two triangles.
///
/// On an over-shared edge the two largest triangles survive; ties go to the
/// lower triangle index.
pub fn remove_non_manifold_edges(mesh: &Mesh) -> Mesh {
    let mut edges: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
    for (t, tri) in mesh.triangles().iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            edges.entry((a.min(b), a.max(b))).or_default().push(t);
        }
    }

    let mut removed = vec![false; mesh.triangle_count()];
    for shared in edges.values() {
        let mut alive: Vec<usize> = shared.iter().copied().filter(|&t| !removed[t]).collect();
        if alive.len() <= 2 {
            continue;
        }
        alive.sort_by(|&a, &b| {
            mesh.triangle_area(b)
                .total_cmp(&mesh.triangle_area(a))
                .then(a.cmp(&b))
        });
        for &t in &alive[2..] {
            removed[t] = true;
        }
    }

    let kept: Vec<usize> = (0..mesh.triangle_count()).filter(|&t| !removed[t]).collect();
    if kept.len() < mesh.triangle_count() {
        debug!(
            "Removed {} triangles on non-manifold edges",
            mesh.triangle_count() - kept.len()
        );
    }
    keep_triangles(mesh, &kept)
}

/// Drops vertices no triangle references.
pub fn remove_unreferenced_vertices(mesh: &Mesh) -> Mesh {
    let all: Vec<usize> = (0..mesh.triangle_count()).collect();
    mesh.select_triangles(&all)
}

/// Moves each vertex toward the mean of its edge neighbours.
///
/// `v' = v + lambda * (mean(N(v)) - v)`, repeated `iterations` times.
/// Isolated vertices stay where they are.
pub fn smooth_laplacian(mesh: &Mesh, iterations: u32, lambda: f64) -> Mesh {
    let neighbors = vertex_neighbors(mesh);
    let mut positions = mesh.vertices().to_vec();

    for _ in 0..iterations {
        let next: Vec<DVec3> = positions
            .iter()
            .zip(&neighbors)
            .map(|(&p, adjacent)| {
                if adjacent.is_empty() {
                    return p;
                }
                let mean = adjacent
                    .iter()
                    .map(|&n| positions[n as usize])
                    .sum::<DVec3>()
                    / adjacent.len() as f64;
                p + (mean - p) * lambda
            })
            .collect();
        positions = next;
    }

    let mut result = Mesh::with_capacity(positions.len(), mesh.triangle_count());
    for p in positions {
        result.add_vertex(p);
    }
    for tri in mesh.triangles() {
        result.add_triangle(tri[0], tri[1], tri[2]);
    }
    result
}

/// Sorted, deduplicated edge neighbours of every vertex.
fn vertex_neighbors(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); mesh.vertex_count()];
    for tri in mesh.triangles() {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            neighbors[a as usize].push(b);
            neighbors[b as usize].push(a);
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

/// Keeps the listed triangles without renumbering vertices.
fn keep_triangles(mesh: &Mesh, kept: &[usize]) -> Mesh {
    let mut result = Mesh::with_capacity(mesh.vertex_count(), kept.len());
    for &v in mesh.vertices() {
        result.add_vertex(v);
    }
    for &t in kept {
        let tri = mesh.triangle(t);
        result.add_triangle(tri[0], tri[1], tri[2]);
    }
    result
}
