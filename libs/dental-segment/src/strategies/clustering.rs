//! # Sampling + Density Clustering
//!
//! Separates touching teeth that share surface connectivity:
//!
//! 1. Sample the surface (seeded, area-weighted) and estimate point normals
//! 2. Map every sample onto its nearest mesh vertex
//! 3. For each radius of the configured sweep, run DBSCAN with a minimum
//!    point count that grows with the sweep index
//! 4. Project cluster labels onto vertices (majority vote) and triangles
//!    (at least two agreeing vertices), and extract one sub-mesh per label
//! 5. Keep the best-scoring radius; ties go to the earliest
//!
//! Radii run in parallel. A failing radius is logged and contributes
//! nothing.

use config::constants::{
    MIN_CLUSTER_SAMPLE_POINTS, MIN_CLUSTER_TRIANGLES, NORMAL_ESTIMATION_NEIGHBORS,
};
use config::SegmentationConfig;
use dental_mesh::spatial::PointGrid;
use dental_mesh::{Mesh, PointCloud};
use glam::DVec3;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{accept, Strategy, StrategyKind};
use crate::error::{SegmentError, SegmentResult};
use crate::score::score_segmentation;
use crate::segment::{CandidateSet, Method};

/// DBSCAN label of points belonging to no cluster.
pub const NOISE: i32 = -1;

const UNCLASSIFIED: i32 = -2;

#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterSampling;

impl Strategy for ClusterSampling {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ClusterSampling
    }

    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet> {
        let cloud = PointCloud::sample_uniform(mesh, config.point_cloud_samples, config.sampling_seed)?
            .with_estimated_normals(NORMAL_ESTIMATION_NEIGHBORS);
        let nearest_vertex = map_to_vertices(mesh, cloud.points());

        let sweep: Vec<SegmentResult<CandidateSet>> = config
            .clustering_eps_range
            .par_iter()
            .enumerate()
            .map(|(i, &eps)| {
                let min_points = config.min_points_for(i);
                let labels = dbscan(cloud.points(), eps, min_points)?;
                Ok(extract_clusters(mesh, &nearest_vertex, &labels, config))
            })
            .collect();

        Ok(select_best(
            config.clustering_eps_range.iter().copied().zip(sweep),
            config.expected_tooth_count,
        ))
    }
}

/// Picks the highest-scoring non-empty candidate set from a radius sweep.
///
/// Results are visited in sweep order and only a strictly higher score
/// replaces the current best, so ties keep the earliest radius. Failed
/// radii are logged and skipped.
fn select_best(
    sweep: impl IntoIterator<Item = (f64, SegmentResult<CandidateSet>)>,
    expected_tooth_count: u32,
) -> CandidateSet {
    let mut best: Option<(f64, CandidateSet)> = None;
    for (eps, attempt) in sweep {
        let candidates = match attempt {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!("Clustering with eps={} failed: {}", eps, err);
                continue;
            }
        };
        if candidates.is_empty() {
            debug!("Clustering with eps={} produced no segments", eps);
            continue;
        }
        let score = score_segmentation(&candidates, expected_tooth_count);
        debug!(
            "Clustering with eps={} produced {} segments, score={:.3}",
            eps,
            candidates.len(),
            score
        );
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, candidates));
        }
    }

    match best {
        Some((score, candidates)) => {
            info!(
                "Clustering selected {} segments (score {:.3})",
                candidates.len(),
                score
            );
            candidates
        }
        None => CandidateSet::new(),
    }
}

/// Index of the nearest mesh vertex for every point.
fn map_to_vertices(mesh: &Mesh, points: &[DVec3]) -> Vec<u32> {
    let grid = PointGrid::with_auto_cell_size(mesh.vertices());
    points
        .par_iter()
        .map(|&p| grid.nearest(p).unwrap_or(0))
        .collect()
}

/// Density-based clustering of `points`.
///
/// Returns one label per point: `0..n` for clusters in discovery order,
/// [`NOISE`] otherwise. A point's neighbourhood includes itself, and a
/// point is core when its neighbourhood holds at least `min_points` points.
///
/// # Errors
///
/// Returns [`SegmentError::Clustering`] for a non-positive or non-finite
/// radius.
///
/// # Example
///
/// ```rust
/// use dental_segment::strategies::clustering::{dbscan, NOISE};
/// use glam::DVec3;
///
/// let points = vec![
///     DVec3::ZERO,
///     DVec3::new(0.1, 0.0, 0.0),
///     DVec3::new(0.2, 0.0, 0.0),
///     DVec3::new(9.0, 0.0, 0.0),
/// ];
/// let labels = dbscan(&points, 0.15, 2).unwrap();
/// assert_eq!(labels, vec![0, 0, 0, NOISE]);
/// ```
pub fn dbscan(points: &[DVec3], eps: f64, min_points: usize) -> SegmentResult<Vec<i32>> {
    if !(eps > 0.0) || !eps.is_finite() {
        return Err(SegmentError::clustering(eps, "radius must be positive"));
    }

    let grid = PointGrid::new(points, eps);
    let mut labels = vec![UNCLASSIFIED; points.len()];
    let mut cluster = 0i32;
    let mut queue: Vec<u32> = Vec::new();

    for start in 0..points.len() {
        if labels[start] != UNCLASSIFIED {
            continue;
        }
        let neighbors = grid.within(points[start], eps);
        if neighbors.len() < min_points {
            labels[start] = NOISE;
            continue;
        }

        labels[start] = cluster;
        queue.clear();
        queue.extend(neighbors);

        while let Some(j) = queue.pop() {
            let j = j as usize;
            match labels[j] {
                NOISE => labels[j] = cluster,
                UNCLASSIFIED => {
                    labels[j] = cluster;
                    let around = grid.within(points[j], eps);
                    if around.len() >= min_points {
                        queue.extend(around.into_iter().filter(|&k| {
                            matches!(labels[k as usize], UNCLASSIFIED | NOISE)
                        }));
                    }
                }
                _ => {}
            }
        }
        cluster += 1;
    }

    Ok(labels)
}

/// Projects point labels onto the mesh and extracts one candidate per
/// cluster that passes the early-reject floors and the size floor.
fn extract_clusters(
    mesh: &Mesh,
    nearest_vertex: &[u32],
    labels: &[i32],
    config: &SegmentationConfig,
) -> CandidateSet {
    let cluster_count = labels.iter().copied().max().map_or(0, |m| (m + 1).max(0)) as usize;
    if cluster_count == 0 {
        return CandidateSet::new();
    }

    let mut cluster_sizes = vec![0usize; cluster_count];
    for &label in labels.iter().filter(|&&l| l >= 0) {
        cluster_sizes[label as usize] += 1;
    }
    let eligible = |label: i32| {
        label >= 0 && cluster_sizes[label as usize] >= MIN_CLUSTER_SAMPLE_POINTS
    };

    let vertex_labels = vote_vertex_labels(
        mesh.vertex_count(),
        nearest_vertex
            .iter()
            .zip(labels)
            .filter(|&(_, &label)| eligible(label))
            .map(|(&v, &label)| (v, label)),
    );

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    for (t, tri) in mesh.triangles().iter().enumerate() {
        if let Some(label) = triangle_label(tri.map(|v| vertex_labels[v as usize])) {
            members[label as usize].push(t);
        }
    }

    members
        .iter()
        .filter(|triangles| triangles.len() >= MIN_CLUSTER_TRIANGLES)
        .filter_map(|triangles| {
            accept(
                &mesh.select_triangles(triangles),
                Method::DensityClustering,
                config.min_tooth_size,
            )
        })
        .collect()
}

/// Majority label per vertex from `(vertex, label)` votes; ties go to the
/// lowest label and unvoted vertices get [`NOISE`].
fn vote_vertex_labels(vertex_count: usize, votes: impl Iterator<Item = (u32, i32)>) -> Vec<i32> {
    let mut votes: Vec<(u32, i32)> = votes.collect();
    votes.sort_unstable();

    let mut result = vec![NOISE; vertex_count];
    for run in votes.chunk_by(|a, b| a.0 == b.0) {
        let vertex = run[0].0 as usize;
        let mut best = (0usize, NOISE);
        for same in run.chunk_by(|a, b| a.1 == b.1) {
            // Labels ascend within a run, so only a strictly larger count wins.
            if same.len() > best.0 {
                best = (same.len(), same[0].1);
            }
        }
        result[vertex] = best.1;
    }
    result
}

/// Label shared by at least two of a triangle's vertices.
fn triangle_label([a, b, c]: [i32; 3]) -> Option<i32> {
    let label = if a == b || a == c {
        a
    } else if b == c {
        b
    } else {
        return None;
    };
    (label >= 0).then_some(label)
}
