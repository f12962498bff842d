//! Spatial slicing: the terminal fallback.
//!
//! Triangle centroids are projected onto their two dominant principal
//! axes. The largest-spread ("side") axis is split at its median into left
//! and right; the second ("arch") axis is cut into equal-width bands whose
//! count depends on the arch type. Every (side, band) cell with at least
//! `min_tooth_size` triangles becomes a segment.
//!
//! When no cell reaches the size floor the band count is halved, down to a
//! single band, and finally the whole mesh is emitted as one segment.

use config::SegmentationConfig;
use dental_mesh::pca::PrincipalAxes;
use dental_mesh::Mesh;
use tracing::debug;

use super::{accept, Strategy, StrategyKind};
use crate::error::SegmentResult;
use crate::segment::{CandidateSet, Method, Side};

#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialSlice;

impl Strategy for SpatialSlice {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SpatialSlice
    }

    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet> {
        if mesh.triangle_count() < config.min_tooth_size {
            return Ok(CandidateSet::new());
        }

        let centroids: Vec<_> = (0..mesh.triangle_count())
            .map(|t| mesh.triangle_centroid(t))
            .collect();
        let Some(axes) = PrincipalAxes::from_points(&centroids) else {
            return Ok(CandidateSet::new());
        };

        let arch: Vec<f64> = centroids.iter().map(|&c| axes.project(c, axes.middle())).collect();
        let side: Vec<f64> = centroids.iter().map(|&c| axes.project(c, axes.largest())).collect();
        let side_median = median(&side);
        let sides: Vec<Side> = side
            .iter()
            .map(|&s| if s <= side_median { Side::Left } else { Side::Right })
            .collect();

        let mut bands = config.arch_regions().max(1);
        loop {
            let candidates = slice(mesh, &arch, &sides, bands, config.min_tooth_size);
            if !candidates.is_empty() {
                debug!("Sliced mesh into {} regions ({} bands)", candidates.len(), bands);
                return Ok(candidates);
            }
            if bands == 1 {
                break;
            }
            bands /= 2;
        }

        let whole = Method::SpatialSlice {
            side: Side::Left,
            band: 0,
        };
        let all: Vec<usize> = (0..mesh.triangle_count()).collect();
        Ok(accept(&mesh.select_triangles(&all), whole, config.min_tooth_size)
            .into_iter()
            .collect())
    }
}

/// Emits one candidate per populated (side, band) cell, left side first.
fn slice(
    mesh: &Mesh,
    arch: &[f64],
    sides: &[Side],
    bands: usize,
    min_tooth_size: usize,
) -> CandidateSet {
    let (lo, hi) = arch
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &a| (lo.min(a), hi.max(a)));
    let width = (hi - lo) / bands as f64;

    let band_of = |a: f64| -> usize {
        if width > 0.0 {
            (((a - lo) / width).floor() as usize).min(bands - 1)
        } else {
            0
        }
    };

    let mut cells: Vec<Vec<usize>> = vec![Vec::new(); bands * 2];
    for (t, (&a, &s)) in arch.iter().zip(sides).enumerate() {
        let offset = if s == Side::Left { 0 } else { bands };
        cells[offset + band_of(a)].push(t);
    }

    cells
        .iter()
        .enumerate()
        .filter(|(_, triangles)| triangles.len() >= min_tooth_size)
        .filter_map(|(cell, triangles)| {
            let side = if cell < bands { Side::Left } else { Side::Right };
            let method = Method::SpatialSlice {
                side,
                band: cell % bands,
            };
            accept(&mesh.select_triangles(triangles), method, min_tooth_size)
        })
        .collect()
}

/// Median with the two middle values averaged for even counts.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
