//! # Segmentation Pipeline
//!
//! Runs the strategy chain over a cleaned mesh:
//!
//! ```text
//! [gum split] → ConnectedComponents → ClusterSampling → VoxelMorphology
//!             → Watershed → SpatialSlice → export
//! ```
//!
//! The first strategy returning a non-empty candidate set wins. Recoverable
//! strategy failures are logged and the chain moves on; any other failure
//! aborts the run without partial output. A run that finds nothing is a
//! valid, empty outcome.

use config::SegmentationConfig;
use dental_mesh::Mesh;
use tracing::{info, warn};

use crate::error::{SegmentError, SegmentResult};
use crate::gum::split_gum_and_teeth;
use crate::segment::{export_segments, Candidate, CandidateSet, Method, Segment};
use crate::strategies::{default_chain, Strategy, StrategyKind};

/// What one strategy did during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub kind: StrategyKind,
    /// Candidates returned (0 on failure)
    pub candidates: usize,
    /// Message of a recovered failure
    pub error: Option<String>,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOutcome {
    /// Exported segments; teeth first, then the gum if it was split off
    pub segments: Vec<Segment>,
    /// Strategies tried, in order
    pub attempts: Vec<Attempt>,
    /// Strategy whose candidates were accepted
    pub accepted: Option<StrategyKind>,
}

impl SegmentationOutcome {
    /// Returns true if a strategy of the given kind was tried.
    pub fn attempted(&self, kind: StrategyKind) -> bool {
        self.attempts.iter().any(|a| a.kind == kind)
    }
}

/// Ordered strategy chain.
pub struct Segmenter {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// Chain with every strategy in default priority order.
    pub fn new() -> Self {
        Self::with_strategies(default_chain())
    }

    /// Chain with custom strategies, tried in the given order.
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Kinds in chain order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Segments a cleaned mesh.
    ///
    /// # Errors
    ///
    /// - [`SegmentError::InvalidMesh`] for a mesh without vertices or with
    ///   out-of-range triangle indices
    /// - [`SegmentError::SegmentationFailed`] wrapping any unrecoverable
    ///   strategy failure
    pub fn run(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<SegmentationOutcome> {
        if mesh.vertex_count() == 0 {
            return Err(SegmentError::invalid_mesh("mesh has no vertices"));
        }
        mesh.validate()?;

        let (gum, teeth) = if config.split_gum {
            let split = split_gum_and_teeth(mesh, config)?;
            (Some(split.gum), split.teeth)
        } else {
            (None, mesh.clone())
        };

        let mut attempts = Vec::with_capacity(self.strategies.len());
        let mut accepted = None;
        let mut candidates = CandidateSet::new();

        for strategy in &self.strategies {
            let kind = strategy.kind();
            info!("Attempting {} segmentation", kind);
            match strategy.attempt(&teeth, config) {
                Ok(found) => {
                    attempts.push(Attempt {
                        kind,
                        candidates: found.len(),
                        error: None,
                    });
                    if !found.is_empty() {
                        info!("Accepted {} segments from {}", found.len(), kind);
                        accepted = Some(kind);
                        candidates = found;
                        break;
                    }
                    info!("{} produced no segments, falling back", kind);
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{} failed, falling back: {}", kind, err);
                    attempts.push(Attempt {
                        kind,
                        candidates: 0,
                        error: Some(err.to_string()),
                    });
                }
                Err(err @ SegmentError::InvalidMesh { .. }) => return Err(err),
                Err(err) => return Err(SegmentError::failed(err)),
            }
        }

        if accepted.is_none() {
            warn!("No strategy produced segments");
        }

        if let Some(gum) = gum.filter(|g| g.triangle_count() > 0) {
            candidates.push(Candidate::new(gum, Method::Gum));
        }

        Ok(SegmentationOutcome {
            segments: export_segments(candidates, &config.tooth_thresholds),
            attempts,
            accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::SpatialSlice;
    use config::UserOptions;
    use dental_mesh::primitives::create_cube;
    use dental_mesh::MeshError;
    use glam::DVec3;

    struct Failing(fn() -> SegmentError);

    impl Strategy for Failing {
        fn kind(&self) -> StrategyKind {
            StrategyKind::ClusterSampling
        }

        fn attempt(&self, _: &Mesh, _: &SegmentationConfig) -> SegmentResult<CandidateSet> {
            Err((self.0)())
        }
    }

    fn config(min_tooth_size: usize) -> SegmentationConfig {
        SegmentationConfig::resolve(&UserOptions {
            min_tooth_size,
            ..UserOptions::default()
        })
        .unwrap()
    }

    fn cube() -> Mesh {
        create_cube(DVec3::splat(2.0), false).unwrap()
    }

    #[test]
    fn test_recoverable_failure_falls_through() {
        let segmenter = Segmenter::with_strategies(vec![
            Box::new(Failing(|| SegmentError::voxelization("boom"))),
            Box::new(SpatialSlice),
        ]);
        let outcome = segmenter.run(&cube(), &config(1)).unwrap();
        assert_eq!(outcome.accepted, Some(StrategyKind::SpatialSlice));
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts[0].error.is_some());
        assert!(!outcome.segments.is_empty());
    }

    #[test]
    fn test_unexpected_failure_is_wrapped() {
        let segmenter = Segmenter::with_strategies(vec![
            Box::new(Failing(|| SegmentError::Mesh(MeshError::degenerate("flat")))),
            Box::new(SpatialSlice),
        ]);
        let err = segmenter.run(&cube(), &config(1)).unwrap_err();
        assert!(matches!(err, SegmentError::SegmentationFailed { .. }));
    }

    #[test]
    fn test_empty_mesh_is_invalid() {
        let err = Segmenter::new().run(&Mesh::new(), &config(1)).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidMesh { .. }));
    }

    #[test]
    fn test_nan_vertex_is_invalid() {
        let mut mesh = cube();
        let bad = mesh.add_vertex(DVec3::new(f64::NAN, 0.0, 0.0));
        mesh.add_triangle(0, 1, bad);
        let err = Segmenter::with_strategies(vec![Box::new(SpatialSlice)])
            .run(&mesh, &config(1))
            .unwrap_err();
        assert!(matches!(err, SegmentError::InvalidMesh { .. }));
    }

    #[test]
    fn test_bad_index_is_invalid() {
        let mut mesh = cube();
        mesh.add_triangle(0, 1, 99);
        let err = Segmenter::new().run(&mesh, &config(1)).unwrap_err();
        assert!(matches!(err, SegmentError::InvalidMesh { .. }));
    }

    #[test]
    fn test_nothing_found_is_not_an_error() {
        let segmenter = Segmenter::with_strategies(vec![Box::new(SpatialSlice)]);
        let outcome = segmenter.run(&cube(), &config(1000)).unwrap();
        assert!(outcome.segments.is_empty());
        assert_eq!(outcome.accepted, None);
        assert!(outcome.attempted(StrategyKind::SpatialSlice));
    }
}
