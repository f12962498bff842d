//! # Gum/Teeth Split
//!
//! Separates the gum line from the dentition along the occlusal axis, the
//! principal axis of least spread. A triangle is gum only when all three of
//! its vertices sit strictly below the height percentile threshold.

use config::SegmentationConfig;
use dental_mesh::clean::clean_submesh;
use dental_mesh::pca::PrincipalAxes;
use dental_mesh::Mesh;
use tracing::info;

use crate::error::{SegmentError, SegmentResult};

/// Result of splitting an arch into gum and teeth.
#[derive(Debug, Clone, PartialEq)]
pub struct GumSplit {
    /// May have zero triangles.
    pub gum: Mesh,
    pub teeth: Mesh,
}

/// Splits `mesh` at `config.gum_height_percentile` along its vertical axis.
///
/// # Errors
///
/// Returns [`SegmentError::InvalidMesh`] if the mesh has no vertices.
pub fn split_gum_and_teeth(mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<GumSplit> {
    let axes = PrincipalAxes::from_points(mesh.vertices())
        .ok_or_else(|| SegmentError::invalid_mesh("cannot split gum from an empty mesh"))?;
    let vertical = axes.smallest();

    let heights: Vec<f64> = mesh
        .vertices()
        .iter()
        .map(|&v| axes.project(v, vertical))
        .collect();
    let threshold = percentile(&heights, config.gum_height_percentile);

    let (gum, teeth): (Vec<usize>, Vec<usize>) = (0..mesh.triangle_count())
        .partition(|&t| {
            mesh.triangle(t)
                .iter()
                .all(|&v| heights[v as usize] < threshold)
        });

    let split = GumSplit {
        gum: clean_submesh(&mesh.select_triangles(&gum)),
        teeth: clean_submesh(&mesh.select_triangles(&teeth)),
    };

    info!(
        "Gum split at {:.3} ({}th percentile): {} gum / {} teeth triangles",
        threshold,
        config.gum_height_percentile,
        split.gum.triangle_count(),
        split.teeth.triangle_count()
    );

    Ok(split)
}

/// Linearly interpolated percentile of `values`, `q` in [0, 100].
pub(crate) fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
