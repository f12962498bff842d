//! Connected-component extraction.
//!
//! Triangles sharing an edge belong to the same component. A single
//! component is a fused blob and counts as failure; otherwise every
//! component between `min_tooth_size` and its share of the total becomes a
//! candidate.

use std::collections::HashMap;

use config::SegmentationConfig;
use dental_mesh::Mesh;
use tracing::debug;

use super::{accept, Strategy, StrategyKind};
use crate::error::SegmentResult;
use crate::segment::{CandidateSet, Method};

/// Upper bound on the number of components sharing the mesh.
const MAX_SHARE_DIVISOR: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl Strategy for ConnectedComponents {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ConnectedComponents
    }

    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet> {
        let components = triangle_components(mesh);
        debug!("Found {} connected components", components.len());
        if components.len() <= 1 {
            return Ok(CandidateSet::new());
        }

        let total = mesh.triangle_count();
        let max_triangles = total / components.len().min(MAX_SHARE_DIVISOR);

        Ok(components
            .iter()
            .filter(|c| (config.min_tooth_size..=max_triangles).contains(&c.len()))
            .filter_map(|c| {
                accept(
                    &mesh.select_triangles(c),
                    Method::ConnectedComponent,
                    config.min_tooth_size,
                )
            })
            .collect())
    }
}

/// Groups triangles into edge-connected components.
///
/// Components are ordered by their lowest triangle index and list their
/// triangles in ascending order.
pub fn triangle_components(mesh: &Mesh) -> Vec<Vec<usize>> {
    let count = mesh.triangle_count();
    let mut edge_owner: HashMap<(u32, u32), usize> = HashMap::with_capacity(count * 3 / 2);
    let mut parent: Vec<usize> = (0..count).collect();

    for (t, tri) in mesh.triangles().iter().enumerate() {
        for i in 0..3 {
            let (a, b) = (tri[i], tri[(i + 1) % 3]);
            let edge = if a < b { (a, b) } else { (b, a) };
            match edge_owner.get(&edge) {
                Some(&other) => union(&mut parent, t, other),
                None => {
                    edge_owner.insert(edge, t);
                }
            }
        }
    }

    let mut slot_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for t in 0..count {
        let root = find(&mut parent, t);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(t);
    }
    components
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::UserOptions;
    use dental_mesh::primitives::create_cube;
    use glam::DVec3;

    fn config(min_tooth_size: usize) -> SegmentationConfig {
        SegmentationConfig::resolve(&UserOptions {
            min_tooth_size,
            ..UserOptions::default()
        })
        .unwrap()
    }

    fn cubes(n: usize) -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..n {
            let cube = create_cube(DVec3::ONE, false)
                .unwrap()
                .translated(DVec3::new(i as f64 * 3.0, 0.0, 0.0));
            mesh.merge(&cube);
        }
        mesh
    }

    #[test]
    fn test_components_of_disjoint_cubes() {
        let components = triangle_components(&cubes(3));
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], (0..12).collect::<Vec<_>>());
        assert_eq!(components[2], (24..36).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_component_is_rejected() {
        let result = ConnectedComponents.attempt(&cubes(1), &config(1)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_two_cubes_accepted() {
        let result = ConnectedComponents.attempt(&cubes(2), &config(10)).unwrap();
        assert_eq!(result.len(), 2);
        for candidate in &result {
            assert_eq!(candidate.triangle_count(), 12);
            assert_eq!(candidate.method, Method::ConnectedComponent);
        }
    }

    #[test]
    fn test_dominant_component_is_dropped() {
        let mut mesh = cubes(3);
        let big = dental_mesh::primitives::create_box(DVec3::ONE, false, 3)
            .unwrap()
            .translated(DVec3::new(20.0, 0.0, 0.0));
        mesh.merge(&big);
        // 36 + 108 triangles; the box exceeds a third of the total.
        let result = ConnectedComponents.attempt(&mesh, &config(10)).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| c.triangle_count() == 12));
    }

    #[test]
    fn test_size_floor() {
        let result = ConnectedComponents.attempt(&cubes(4), &config(13)).unwrap();
        assert!(result.is_empty());
    }
}
