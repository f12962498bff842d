//! # Configuration Constants
//!
//! Centralized constants for the segmentation pipeline. Every tunable
//! number used by the mesh cleanup, the segmentation strategies and the
//! export step is defined here.
//!
//! ## Categories
//!
//! - **Precision**: Geometric tolerances
//! - **User Defaults**: Values assumed when the caller leaves an option unset
//! - **Cleanup**: Mesh preprocessing parameters
//! - **Clustering**: Point sampling and density clustering parameters
//! - **Volume**: Voxelization parameters
//! - **Classification**: Tooth-type volume thresholds

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Area below which a triangle is treated as degenerate.
///
/// Cross-product magnitudes (twice the area) smaller than this are removed
/// during cleanup.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Tolerance applied to crop boxes when testing vertex containment.
pub const CROP_TOLERANCE: f64 = 1e-9;

// =============================================================================
// USER DEFAULTS
// =============================================================================

/// Number of teeth assumed when the caller does not say otherwise.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_EXPECTED_TOOTH_COUNT;
/// assert_eq!(DEFAULT_EXPECTED_TOOTH_COUNT, 28);
/// ```
pub const DEFAULT_EXPECTED_TOOTH_COUNT: u32 = 28;

/// Minimum triangle count for a segment to be reported.
pub const DEFAULT_MIN_TOOTH_SIZE: usize = 100;

/// Height percentile below which triangles are classified as gum.
pub const DEFAULT_GUM_HEIGHT_PERCENTILE: f64 = 25.0;

// =============================================================================
// CLEANUP CONSTANTS
// =============================================================================

/// Laplacian smoothing strength applied during preprocessing.
pub const LAPLACIAN_LAMBDA: f64 = 0.5;

/// Number of Laplacian smoothing passes applied during preprocessing.
pub const LAPLACIAN_ITERATIONS: u32 = 1;

// =============================================================================
// CLUSTERING CONSTANTS
// =============================================================================

/// Surface samples drawn for `ModelQuality::High`.
pub const HIGH_QUALITY_SAMPLES: usize = 75_000;

/// Surface samples drawn for `ModelQuality::Medium`.
pub const MEDIUM_QUALITY_SAMPLES: usize = 50_000;

/// Surface samples drawn for `ModelQuality::Low`.
pub const LOW_QUALITY_SAMPLES: usize = 30_000;

/// Base minimum cluster points for `ModelQuality::High`.
pub const HIGH_QUALITY_MIN_CLUSTER_POINTS: usize = 15;

/// Base minimum cluster points for `ModelQuality::Medium`.
pub const MEDIUM_QUALITY_MIN_CLUSTER_POINTS: usize = 25;

/// Base minimum cluster points for `ModelQuality::Low`.
pub const LOW_QUALITY_MIN_CLUSTER_POINTS: usize = 35;

/// Neighbourhood radii swept for `SeparationLevel::Natural`.
pub const NATURAL_EPS_RANGE: &[f64] = &[0.5, 1.0, 1.5];

/// Neighbourhood radii swept for `SeparationLevel::Touching`.
pub const TOUCHING_EPS_RANGE: &[f64] = &[0.8, 1.2, 1.8];

/// Neighbourhood radii swept for `SeparationLevel::Connected`.
pub const CONNECTED_EPS_RANGE: &[f64] = &[1.0, 1.5, 2.0, 2.5];

/// Increment of the minimum points per cluster for each successive radius.
///
/// # Example
///
/// ```rust
/// use config::constants::MIN_POINTS_STEP;
///
/// let base = 25;
/// let per_radius: Vec<usize> = (0..3).map(|i| base + i * MIN_POINTS_STEP).collect();
/// assert_eq!(per_radius, vec![25, 30, 35]);
/// ```
pub const MIN_POINTS_STEP: usize = 5;

/// Clusters with fewer sample points are skipped before mesh extraction.
pub const MIN_CLUSTER_SAMPLE_POINTS: usize = 20;

/// Clusters matching fewer triangles are skipped before mesh extraction.
pub const MIN_CLUSTER_TRIANGLES: usize = 10;

/// Neighbour count used when estimating normals of sampled points.
pub const NORMAL_ESTIMATION_NEIGHBORS: usize = 30;

/// Seed of the surface sampler when the caller does not supply one.
pub const DEFAULT_SAMPLING_SEED: u64 = 42;

/// Weight of the tooth-count fit in the segmentation score.
pub const SCORE_COUNT_WEIGHT: f64 = 0.7;

/// Weight of the size uniformity in the segmentation score.
pub const SCORE_UNIFORMITY_WEIGHT: f64 = 0.3;

// =============================================================================
// VOLUME CONSTANTS
// =============================================================================

/// Edge length of a voxel in mesh units.
pub const DEFAULT_VOXEL_SIZE: f64 = 0.4;

/// Minimum occupied voxels for a labeled component to be kept.
pub const DEFAULT_MIN_VOXEL_SIZE: usize = 30;

/// Minimum separation, in voxels, between watershed seed markers.
pub const WATERSHED_MIN_PEAK_DISTANCE: usize = 2;

/// Upper bound on voxel grid cells.
///
/// Grids larger than this are rejected instead of allocated.
pub const MAX_VOXEL_CELLS: usize = 16_000_000;

// =============================================================================
// CLASSIFICATION CONSTANTS
// =============================================================================

/// Bounding-box volume above which a segment is labeled a molar.
pub const MOLAR_MIN_VOLUME: f64 = 50.0;

/// Bounding-box volume above which a segment is labeled a premolar.
pub const PREMOLAR_MIN_VOLUME: f64 = 25.0;

/// Bounding-box volume above which a segment is labeled a canine.
pub const CANINE_MIN_VOLUME: f64 = 15.0;
