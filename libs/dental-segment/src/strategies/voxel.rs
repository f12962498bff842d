//! Voxel morphology: rasterize, open, label, crop.
//!
//! Opening with the 6-neighbour cross severs bridges up to one voxel thick
//! between touching teeth. Each remaining component with at least
//! `min_voxel_size` voxels is mapped back to the mesh by cropping to its
//! voxel bounds.

use config::SegmentationConfig;
use dental_mesh::Mesh;
use tracing::{debug, warn};

use super::{accept, Strategy, StrategyKind};
use crate::error::SegmentResult;
use crate::segment::{CandidateSet, Method};
use crate::volume::grid::VoxelGrid;
use crate::volume::morphology::{label_components, open};
use crate::volume::{regions, Region};

#[derive(Debug, Clone, Copy, Default)]
pub struct VoxelMorphology;

impl Strategy for VoxelMorphology {
    fn kind(&self) -> StrategyKind {
        StrategyKind::VoxelMorphology
    }

    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet> {
        let Some(grid) = voxelize(mesh, config) else {
            return Ok(CandidateSet::new());
        };

        let opened = open(grid.occupied(), grid.dims());
        let (labels, count) = label_components(&opened, grid.dims());
        debug!("Opening left {} voxel components", count);

        Ok(crop_regions(
            mesh,
            &grid,
            &regions(&labels, count, grid.dims()),
            Method::VoxelComponent,
            config,
        ))
    }
}

/// Builds the occupancy grid, logging and swallowing voxelization failures.
pub(crate) fn voxelize(mesh: &Mesh, config: &SegmentationConfig) -> Option<VoxelGrid> {
    match VoxelGrid::from_mesh(mesh, config.voxel_size) {
        Ok(grid) => Some(grid),
        Err(err) => {
            warn!("Skipping voxel segmentation: {}", err);
            None
        }
    }
}

/// Crops `mesh` to the world bounds of every region large enough to count.
pub(crate) fn crop_regions(
    mesh: &Mesh,
    grid: &VoxelGrid,
    regions: &[Region],
    method: Method,
    config: &SegmentationConfig,
) -> CandidateSet {
    regions
        .iter()
        .filter(|r| r.voxels >= config.min_voxel_size)
        .filter_map(|r| {
            let (lo, hi) = grid.world_bounds(r.min, r.max);
            accept(&mesh.crop(lo, hi), method, config.min_tooth_size)
        })
        .collect()
}
