//! Watershed on the voxel distance field.
//!
//! Recovers teeth joined by a shallow neck that opening alone does not
//! sever: distance maxima at least two voxels apart seed basins, which are
//! flooded over the occupied voxels and cropped back to the mesh.

use config::constants::WATERSHED_MIN_PEAK_DISTANCE;
use config::SegmentationConfig;
use dental_mesh::Mesh;
use tracing::debug;

use super::voxel::{crop_regions, voxelize};
use super::{Strategy, StrategyKind};
use crate::error::SegmentResult;
use crate::segment::{CandidateSet, Method};
use crate::volume::distance::{distance_transform, local_maxima};
use crate::volume::flood::watershed;
use crate::volume::regions;

#[derive(Debug, Clone, Copy, Default)]
pub struct Watershed;

impl Strategy for Watershed {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Watershed
    }

    fn attempt(&self, mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<CandidateSet> {
        let Some(grid) = voxelize(mesh, config) else {
            return Ok(CandidateSet::new());
        };
        let dims = grid.dims();

        let distance = distance_transform(grid.occupied(), dims);
        let markers = local_maxima(&distance, dims, WATERSHED_MIN_PEAK_DISTANCE);
        let labels = watershed(&distance, &markers, grid.occupied(), dims);
        debug!("Watershed flooded {} basins", markers.len());

        Ok(crop_regions(
            mesh,
            &grid,
            &regions(&labels, markers.len() as u32, dims),
            Method::WatershedRegion,
            config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::UserOptions;
    use dental_mesh::primitives::create_box;
    use glam::DVec3;

    fn config() -> SegmentationConfig {
        SegmentationConfig::resolve(&UserOptions {
            min_tooth_size: 50,
            ..UserOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn test_two_boxes_give_two_basins() {
        let mut mesh = create_box(DVec3::splat(4.0), false, 4).unwrap();
        mesh.merge(
            &create_box(DVec3::splat(4.0), false, 4)
                .unwrap()
                .translated(DVec3::new(6.0, 0.0, 0.0)),
        );

        let result = Watershed.attempt(&mesh, &config()).unwrap();
        assert_eq!(result.len(), 2);
        for candidate in &result {
            assert_eq!(candidate.method, Method::WatershedRegion);
            assert_eq!(candidate.triangle_count(), 192);
        }
    }

    #[test]
    fn test_empty_mesh_is_soft_failure() {
        assert!(Watershed.attempt(&Mesh::new(), &config()).unwrap().is_empty());
    }
}
