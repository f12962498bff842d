//! # Segments
//!
//! Candidate sub-meshes produced by strategies, and the exported segment
//! records with their metrics and coarse tooth-type label.

use std::fmt;

use config::ToothTypeThresholds;
use dental_mesh::Mesh;
use glam::DVec3;
use serde::Serialize;

/// Half of the arch on either side of the median split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Which strategy produced a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    ConnectedComponent,
    DensityClustering,
    VoxelComponent,
    WatershedRegion,
    /// One (side, band) cell of the spatial partition
    SpatialSlice { side: Side, band: usize },
    Gum,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::ConnectedComponent => write!(f, "connected-component"),
            Method::DensityClustering => write!(f, "density-clustering"),
            Method::VoxelComponent => write!(f, "voxel-component"),
            Method::WatershedRegion => write!(f, "watershed-region"),
            Method::SpatialSlice { side, band } => write!(f, "spatial-slice-{}-{}", side, band),
            Method::Gum => write!(f, "gum"),
        }
    }
}

/// One sub-mesh proposed by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Cleaned sub-mesh
    pub mesh: Mesh,
    /// Strategy tag carried through to export
    pub method: Method,
}

impl Candidate {
    /// Creates a candidate tagged with the method that produced it.
    pub fn new(mesh: Mesh, method: Method) -> Self {
        Self { mesh, method }
    }

    /// Number of triangles in the sub-mesh.
    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }
}

/// Ordered output of a single strategy attempt.
pub type CandidateSet = Vec<Candidate>;

/// Coarse anatomical label derived from bounding-box volume.
///
/// The thresholds are heuristics; the label is approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToothType {
    Molar,
    Premolar,
    Canine,
    Incisor,
    Gum,
}

impl ToothType {
    /// Classifies a tooth by volume, largest class first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::ToothTypeThresholds;
    /// use dental_segment::segment::ToothType;
    ///
    /// let thresholds = ToothTypeThresholds::default();
    /// assert_eq!(ToothType::classify(60.0, &thresholds), ToothType::Molar);
    /// assert_eq!(ToothType::classify(50.0, &thresholds), ToothType::Premolar);
    /// assert_eq!(ToothType::classify(3.0, &thresholds), ToothType::Incisor);
    /// ```
    pub fn classify(volume: f64, thresholds: &ToothTypeThresholds) -> Self {
        if volume > thresholds.molar {
            ToothType::Molar
        } else if volume > thresholds.premolar {
            ToothType::Premolar
        } else if volume > thresholds.canine {
            ToothType::Canine
        } else {
            ToothType::Incisor
        }
    }
}

impl fmt::Display for ToothType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToothType::Molar => "molar",
            ToothType::Premolar => "premolar",
            ToothType::Canine => "canine",
            ToothType::Incisor => "incisor",
            ToothType::Gum => "gum",
        };
        write!(f, "{}", name)
    }
}

/// Derived geometry of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentMetrics {
    /// Vertices in the segment mesh
    pub vertex_count: usize,
    /// Triangles in the segment mesh
    pub triangle_count: usize,
    /// Mean vertex position
    pub centroid: DVec3,
    /// Bounding-box minimum corner
    pub bbox_min: DVec3,
    /// Bounding-box maximum corner
    pub bbox_max: DVec3,
    /// Axis-aligned bounding-box volume
    pub volume: f64,
}

impl SegmentMetrics {
    /// Measures `mesh`.
    pub fn of(mesh: &Mesh) -> Self {
        let (bbox_min, bbox_max) = mesh.bounding_box();
        let extent = bbox_max - bbox_min;
        Self {
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            centroid: mesh.centroid(),
            bbox_min,
            bbox_max,
            volume: extent.x * extent.y * extent.z,
        }
    }
}

/// An exported segment. Created once per run and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Zero-based position in the output list
    pub id: usize,
    /// One-based tooth number
    pub tooth_number: usize,
    /// Segment geometry
    pub mesh: Mesh,
    /// Strategy that produced the segment
    pub method: Method,
    /// Counts, centroid, bounds and volume of `mesh`
    pub metrics: SegmentMetrics,
    /// Volume-based label, or `Gum` for the gum segment
    pub tooth_type: ToothType,
}

impl Segment {
    /// File stem used when the segment is written out, e.g. `tooth_03_gum`.
    pub fn file_stem(&self) -> String {
        format!("tooth_{:02}_{}", self.tooth_number, self.method)
    }

    /// Serializable view without the mesh payload.
    pub fn summary(&self) -> SegmentSummary {
        SegmentSummary {
            id: self.id,
            tooth_number: self.tooth_number,
            tooth_type: self.tooth_type,
            method: self.method.to_string(),
            file_stem: self.file_stem(),
            metrics: self.metrics,
        }
    }
}

/// Serializable segment description handed to the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub id: usize,
    pub tooth_number: usize,
    pub tooth_type: ToothType,
    /// Method label, e.g. `watershed-region`
    pub method: String,
    pub file_stem: String,
    /// Metrics inlined into the summary object
    #[serde(flatten)]
    pub metrics: SegmentMetrics,
}

/// Turns accepted candidates into numbered, classified segments.
pub fn export_segments(candidates: CandidateSet, thresholds: &ToothTypeThresholds) -> Vec<Segment> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(id, candidate)| {
            let metrics = SegmentMetrics::of(&candidate.mesh);
            let tooth_type = match candidate.method {
                Method::Gum => ToothType::Gum,
                _ => ToothType::classify(metrics.volume, thresholds),
            };
            Segment {
                id,
                tooth_number: id + 1,
                mesh: candidate.mesh,
                method: candidate.method,
                metrics,
                tooth_type,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dental_mesh::primitives::create_cube;

    #[test]
    fn test_method_names() {
        assert_eq!(Method::ConnectedComponent.to_string(), "connected-component");
        assert_eq!(Method::WatershedRegion.to_string(), "watershed-region");
        let slice = Method::SpatialSlice {
            side: Side::Right,
            band: 2,
        };
        assert_eq!(slice.to_string(), "spatial-slice-right-2");
    }

    #[test]
    fn test_classification_thresholds() {
        let t = ToothTypeThresholds::default();
        assert_eq!(ToothType::classify(50.1, &t), ToothType::Molar);
        assert_eq!(ToothType::classify(30.0, &t), ToothType::Premolar);
        assert_eq!(ToothType::classify(25.0, &t), ToothType::Canine);
        assert_eq!(ToothType::classify(15.0, &t), ToothType::Incisor);
    }

    #[test]
    fn test_export_numbers_and_metrics() {
        let small = create_cube(DVec3::splat(2.0), false).unwrap();
        let large = create_cube(DVec3::new(3.0, 4.0, 5.0), true).unwrap();
        let segments = export_segments(
            vec![
                Candidate::new(small, Method::VoxelComponent),
                Candidate::new(large, Method::Gum),
            ],
            &ToothTypeThresholds::default(),
        );

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].tooth_number, 1);
        assert_eq!(segments[0].file_stem(), "tooth_01_voxel-component");
        assert_eq!(segments[0].tooth_type, ToothType::Incisor);
        assert_relative_eq!(segments[0].metrics.volume, 8.0);
        assert_eq!(segments[0].metrics.centroid, DVec3::splat(1.0));

        assert_eq!(segments[1].id, 1);
        assert_eq!(segments[1].tooth_type, ToothType::Gum);
        assert_relative_eq!(segments[1].metrics.volume, 60.0);
        assert_eq!(segments[1].metrics.triangle_count, 12);
    }

    #[test]
    fn test_summary_mirrors_segment() {
        let cube = create_cube(DVec3::splat(4.0), false).unwrap();
        let segment = export_segments(
            vec![Candidate::new(cube, Method::ConnectedComponent)],
            &ToothTypeThresholds::default(),
        )
        .remove(0);
        let summary = segment.summary();
        assert_eq!(summary.tooth_type, ToothType::Molar);
        assert_eq!(summary.method, "connected-component");
        assert_eq!(summary.file_stem, "tooth_01_connected-component");
        assert_eq!(summary.metrics.vertex_count, 8);
    }
}
