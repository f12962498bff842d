//! # Segmentation Strategies
//!
//! Each strategy turns a teeth mesh into a [`CandidateSet`]. The pipeline
//! runs them in [`StrategyKind`] order and accepts the first non-empty set.
//!
//! | Strategy | Method tag |
//! |----------|------------|
//! | [`ConnectedComponents`] | `connected-component` |
//! | [`ClusterSampling`] | `density-clustering` |
//! | [`VoxelMorphology`] | `voxel-component` |
//! | [`Watershed`] | `watershed-region` |
//! | [`SpatialSlice`] | `spatial-slice-<side>-<band>` |

use std::fmt;

use config::SegmentationConfig;
use dental_mesh::clean::clean_submesh;
use dental_mesh::Mesh;

use crate::error::SegmentResult;
use crate::segment::{Candidate, CandidateSet, Method};

pub mod clustering;
pub mod components;
pub mod spatial_slice;
pub mod voxel;
pub mod watershed;

pub use clustering::ClusterSampling;
pub use components::ConnectedComponents;
pub use spatial_slice::SpatialSlice;
pub use voxel::VoxelMorphology;
pub use watershed::Watershed;

/// Position of a strategy in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    ConnectedComponents,
    ClusterSampling,
    VoxelMorphology,
    Watershed,
    SpatialSlice,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::ConnectedComponents => "connected components",
            StrategyKind::ClusterSampling => "cluster sampling",
            StrategyKind::VoxelMorphology => "voxel morphology",
            StrategyKind::Watershed => "watershed",
            StrategyKind::SpatialSlice => "spatial slice",
        };
        write!(f, "{}", name)
    }
}

/// One segmentation algorithm in the fallback chain.
///
/// Implementations never mutate the input mesh, and every candidate they
/// return has at least `config.min_tooth_size` triangles.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Attempts to partition `mesh`. An empty set means "try the next one".
    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet>;
}

/// The default chain, in priority order.
pub fn default_chain() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(ConnectedComponents),
        Box::new(ClusterSampling),
        Box::new(VoxelMorphology),
        Box::new(Watershed),
        Box::new(SpatialSlice),
    ]
}

/// Cleans a sub-mesh and keeps it only if it still meets the size floor.
pub(crate) fn accept(sub_mesh: &Mesh, method: Method, min_tooth_size: usize) -> Option<Candidate> {
    let cleaned = clean_submesh(sub_mesh);
    (cleaned.triangle_count() >= min_tooth_size).then(|| Candidate::new(cleaned, method))
}
