//! User-facing segmentation options and the resolved configuration derived
//! from them.
//!
//! Callers describe the scan in coarse terms (arch type, tooth count,
//! quality tier, how tightly the teeth touch). [`SegmentationConfig::resolve`]
//! turns those into the concrete numbers the pipeline consumes. The
//! derivation rules are part of the public contract:
//!
//! | Input | Derived |
//! |-------|---------|
//! | `model_quality = high / medium / low` | 75k / 50k / 30k samples, 15 / 25 / 35 min cluster points |
//! | `separation_level = natural` | radii `[0.5, 1.0, 1.5]` |
//! | `separation_level = touching` | radii `[0.8, 1.2, 1.8]` |
//! | `separation_level = connected` | radii `[1.0, 1.5, 2.0, 2.5]` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CANINE_MIN_VOLUME, CONNECTED_EPS_RANGE, DEFAULT_EXPECTED_TOOTH_COUNT,
    DEFAULT_GUM_HEIGHT_PERCENTILE, DEFAULT_MIN_TOOTH_SIZE, DEFAULT_MIN_VOXEL_SIZE,
    DEFAULT_SAMPLING_SEED, DEFAULT_VOXEL_SIZE, HIGH_QUALITY_MIN_CLUSTER_POINTS,
    HIGH_QUALITY_SAMPLES, LOW_QUALITY_MIN_CLUSTER_POINTS, LOW_QUALITY_SAMPLES,
    MEDIUM_QUALITY_MIN_CLUSTER_POINTS, MEDIUM_QUALITY_SAMPLES, MOLAR_MIN_VOLUME,
    NATURAL_EPS_RANGE, PREMOLAR_MIN_VOLUME, TOUCHING_EPS_RANGE,
};

// =============================================================================
// USER-FACING ENUMS
// =============================================================================

/// Which part of the dentition the scan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchType {
    /// Both arches.
    #[default]
    Full,
    /// Maxillary arch only.
    Upper,
    /// Mandibular arch only.
    Lower,
    /// A partial arch or a handful of teeth.
    Partial,
}

impl ArchType {
    /// Number of equal-width bands the spatial slicer cuts the arch axis into.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::options::ArchType;
    ///
    /// assert_eq!(ArchType::Full.arch_regions(28), 7);
    /// assert_eq!(ArchType::Upper.arch_regions(14), 7);
    /// assert_eq!(ArchType::Partial.arch_regions(3), 2);
    /// ```
    pub fn arch_regions(self, expected_tooth_count: u32) -> usize {
        let count = expected_tooth_count as usize;
        match self {
            ArchType::Full => (count / 4).max(6),
            ArchType::Upper | ArchType::Lower => (count / 2).max(4),
            ArchType::Partial => (count / 3).max(2),
        }
    }
}

/// Quality tier of the scan; controls sampling density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelQuality {
    /// Coarse scans.
    Low,
    /// Typical intraoral scans.
    #[default]
    Medium,
    /// Dense, clean scans.
    High,
}

impl ModelQuality {
    /// Surface samples drawn for clustering.
    pub fn point_cloud_samples(self) -> usize {
        match self {
            ModelQuality::High => HIGH_QUALITY_SAMPLES,
            ModelQuality::Medium => MEDIUM_QUALITY_SAMPLES,
            ModelQuality::Low => LOW_QUALITY_SAMPLES,
        }
    }

    /// Base minimum points per density cluster.
    pub fn min_cluster_points(self) -> usize {
        match self {
            ModelQuality::High => HIGH_QUALITY_MIN_CLUSTER_POINTS,
            ModelQuality::Medium => MEDIUM_QUALITY_MIN_CLUSTER_POINTS,
            ModelQuality::Low => LOW_QUALITY_MIN_CLUSTER_POINTS,
        }
    }
}

/// How tightly adjacent teeth sit against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparationLevel {
    /// Visible gaps between teeth.
    Natural,
    /// Teeth touch at contact points.
    #[default]
    Touching,
    /// Teeth are fused in the scan.
    Connected,
}

impl SeparationLevel {
    /// Ordered neighbourhood radii swept by the density clustering.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::options::SeparationLevel;
    /// assert_eq!(SeparationLevel::Touching.eps_range(), &[0.8, 1.2, 1.8]);
    /// ```
    pub fn eps_range(self) -> &'static [f64] {
        match self {
            SeparationLevel::Natural => NATURAL_EPS_RANGE,
            SeparationLevel::Touching => TOUCHING_EPS_RANGE,
            SeparationLevel::Connected => CONNECTED_EPS_RANGE,
        }
    }
}

macro_rules! lowercase_from_str {
    ($ty:ident, $kind:literal, { $($name:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    _ => Err(ConfigError::UnknownOption {
                        option: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($ty::$variant => $name,)+
                };
                f.write_str(name)
            }
        }
    };
}

lowercase_from_str!(ArchType, "arch_type", {
    "full" => Full,
    "upper" => Upper,
    "lower" => Lower,
    "partial" => Partial,
});

lowercase_from_str!(ModelQuality, "model_quality", {
    "low" => Low,
    "medium" => Medium,
    "high" => High,
});

lowercase_from_str!(SeparationLevel, "separation_level", {
    "natural" => Natural,
    "touching" => Touching,
    "connected" => Connected,
});

// =============================================================================
// USER OPTIONS
// =============================================================================

/// Options as supplied by the caller, before derivation.
///
/// Field names deserialize from the camelCase keys used by upload forms.
///
/// # Examples
/// ```
/// use config::options::{ArchType, UserOptions};
/// let options = UserOptions::default();
/// assert_eq!(options.arch_type, ArchType::Full);
/// assert_eq!(options.expected_tooth_count, 28);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserOptions {
    /// Arch coverage of the scan.
    pub arch_type: ArchType,
    /// Number of teeth the caller expects to find.
    pub expected_tooth_count: u32,
    /// Scan quality tier.
    pub model_quality: ModelQuality,
    /// Contact tightness between teeth.
    pub separation_level: SeparationLevel,
    /// Minimum triangles per reported segment.
    pub min_tooth_size: usize,
    /// Whether to split the gum away before segmenting teeth.
    pub split_gum: bool,
}

impl Default for UserOptions {
    fn default() -> Self {
        Self {
            arch_type: ArchType::default(),
            expected_tooth_count: DEFAULT_EXPECTED_TOOTH_COUNT,
            model_quality: ModelQuality::default(),
            separation_level: SeparationLevel::default(),
            min_tooth_size: DEFAULT_MIN_TOOTH_SIZE,
            split_gum: false,
        }
    }
}

// =============================================================================
// TOOTH TYPE THRESHOLDS
// =============================================================================

/// Bounding-box volume cutoffs for coarse tooth-type labels.
///
/// Checked largest to smallest; anything at or below `canine` is an incisor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToothTypeThresholds {
    /// Volumes above this are molars.
    pub molar: f64,
    /// Volumes above this are premolars.
    pub premolar: f64,
    /// Volumes above this are canines.
    pub canine: f64,
}

impl Default for ToothTypeThresholds {
    fn default() -> Self {
        Self {
            molar: MOLAR_MIN_VOLUME,
            premolar: PREMOLAR_MIN_VOLUME,
            canine: CANINE_MIN_VOLUME,
        }
    }
}

// =============================================================================
// RESOLVED CONFIGURATION
// =============================================================================

/// Fully resolved, immutable pipeline configuration.
///
/// A run is determined entirely by the input mesh and this value.
///
/// # Examples
/// ```
/// use config::options::{ModelQuality, SegmentationConfig, UserOptions};
///
/// let options = UserOptions { model_quality: ModelQuality::High, ..UserOptions::default() };
/// let config = SegmentationConfig::resolve(&options).expect("valid options");
/// assert_eq!(config.point_cloud_samples, 75_000);
/// assert_eq!(config.min_cluster_points, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationConfig {
    /// Arch coverage of the scan.
    pub arch_type: ArchType,
    /// Number of teeth expected; at least one.
    pub expected_tooth_count: u32,
    /// Scan quality tier the sampling values were derived from.
    pub model_quality: ModelQuality,
    /// Contact tightness the radius sweep was derived from.
    pub separation_level: SeparationLevel,
    /// Minimum triangles per reported segment.
    pub min_tooth_size: usize,
    /// Whether the gum is split away before teeth segmentation.
    pub split_gum: bool,
    /// Surface samples drawn for clustering.
    pub point_cloud_samples: usize,
    /// Minimum points per cluster for the first radius of the sweep.
    pub min_cluster_points: usize,
    /// Ordered neighbourhood radii for the clustering sweep.
    pub clustering_eps_range: Vec<f64>,
    /// Voxel edge length for the volumetric strategies.
    pub voxel_size: f64,
    /// Minimum occupied voxels per volumetric component.
    pub min_voxel_size: usize,
    /// Height percentile separating gum from teeth.
    pub gum_height_percentile: f64,
    /// Seed of the surface sampler.
    pub sampling_seed: u64,
    /// Tooth-type volume cutoffs.
    pub tooth_thresholds: ToothTypeThresholds,
}

impl SegmentationConfig {
    /// Derives the pipeline configuration from user options.
    pub fn resolve(options: &UserOptions) -> Result<Self, ConfigError> {
        let config = Self {
            arch_type: options.arch_type,
            expected_tooth_count: options.expected_tooth_count,
            model_quality: options.model_quality,
            separation_level: options.separation_level,
            min_tooth_size: options.min_tooth_size,
            split_gum: options.split_gum,
            point_cloud_samples: options.model_quality.point_cloud_samples(),
            min_cluster_points: options.model_quality.min_cluster_points(),
            clustering_eps_range: options.separation_level.eps_range().to_vec(),
            voxel_size: DEFAULT_VOXEL_SIZE,
            min_voxel_size: DEFAULT_MIN_VOXEL_SIZE,
            gum_height_percentile: DEFAULT_GUM_HEIGHT_PERCENTILE,
            sampling_seed: DEFAULT_SAMPLING_SEED,
            tooth_thresholds: ToothTypeThresholds::default(),
        };
        config.validate()
    }

    /// Overrides the number of surface samples.
    pub fn with_point_cloud_samples(mut self, samples: usize) -> Result<Self, ConfigError> {
        self.point_cloud_samples = samples;
        self.validate()
    }

    /// Overrides the base minimum points per cluster.
    pub fn with_min_cluster_points(mut self, points: usize) -> Result<Self, ConfigError> {
        self.min_cluster_points = points;
        self.validate()
    }

    /// Overrides the radius sweep.
    pub fn with_eps_range(mut self, eps_range: Vec<f64>) -> Result<Self, ConfigError> {
        self.clustering_eps_range = eps_range;
        self.validate()
    }

    /// Overrides the voxel edge length.
    pub fn with_voxel_size(mut self, voxel_size: f64) -> Result<Self, ConfigError> {
        self.voxel_size = voxel_size;
        self.validate()
    }

    /// Overrides the minimum voxel component size.
    pub fn with_min_voxel_size(mut self, min_voxel_size: usize) -> Result<Self, ConfigError> {
        self.min_voxel_size = min_voxel_size;
        self.validate()
    }

    /// Overrides the gum height percentile.
    pub fn with_gum_height_percentile(mut self, percentile: f64) -> Result<Self, ConfigError> {
        self.gum_height_percentile = percentile;
        self.validate()
    }

    /// Overrides the sampler seed.
    pub fn with_sampling_seed(mut self, seed: u64) -> Self {
        self.sampling_seed = seed;
        self
    }

    /// Overrides the tooth-type thresholds.
    pub fn with_tooth_thresholds(
        mut self,
        thresholds: ToothTypeThresholds,
    ) -> Result<Self, ConfigError> {
        self.tooth_thresholds = thresholds;
        self.validate()
    }

    /// Minimum points per cluster for the radius at `sweep_index`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use config::options::{SegmentationConfig, UserOptions};
    ///
    /// let config = SegmentationConfig::resolve(&UserOptions::default()).unwrap();
    /// assert_eq!(config.min_points_for(0), 25);
    /// assert_eq!(config.min_points_for(2), 35);
    /// ```
    pub fn min_points_for(&self, sweep_index: usize) -> usize {
        self.min_cluster_points + sweep_index * crate::constants::MIN_POINTS_STEP
    }

    /// Number of arch bands used by the spatial slicer.
    pub fn arch_regions(&self) -> usize {
        self.arch_type.arch_regions(self.expected_tooth_count)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.expected_tooth_count == 0 {
            return Err(ConfigError::InvalidToothCount(self.expected_tooth_count));
        }
        if self.min_tooth_size == 0 {
            return Err(ConfigError::InvalidMinToothSize(self.min_tooth_size));
        }
        if !(self.voxel_size > 0.0 && self.voxel_size.is_finite()) {
            return Err(ConfigError::InvalidVoxelSize(self.voxel_size));
        }
        if !(0.0..=100.0).contains(&self.gum_height_percentile) {
            return Err(ConfigError::InvalidPercentile(self.gum_height_percentile));
        }
        if self.clustering_eps_range.is_empty() {
            return Err(ConfigError::EmptyEpsRange);
        }
        if let Some(&eps) = self
            .clustering_eps_range
            .iter()
            .find(|eps| !(**eps > 0.0 && eps.is_finite()))
        {
            return Err(ConfigError::InvalidEps(eps));
        }
        let t = self.tooth_thresholds;
        if !(t.molar >= t.premolar && t.premolar >= t.canine && t.canine >= 0.0) {
            return Err(ConfigError::UnorderedThresholds);
        }
        Ok(self)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned when options cannot be resolved into a configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An enum option was given an unrecognized name.
    UnknownOption {
        /// Option being parsed.
        option: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Expected tooth count must be at least one.
    InvalidToothCount(u32),
    /// Minimum tooth size must be at least one triangle.
    InvalidMinToothSize(usize),
    /// Voxel size must be positive and finite.
    InvalidVoxelSize(f64),
    /// Percentile must lie in `[0, 100]`.
    InvalidPercentile(f64),
    /// The radius sweep has no entries.
    EmptyEpsRange,
    /// A sweep radius is zero, negative or not finite.
    InvalidEps(f64),
    /// Tooth-type thresholds are not ordered molar ≥ premolar ≥ canine ≥ 0.
    UnorderedThresholds,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownOption { option, value } => {
                write!(f, "unknown {option}: {value:?}")
            }
            ConfigError::InvalidToothCount(value) => {
                write!(f, "expected_tooth_count must be >= 1: {value}")
            }
            ConfigError::InvalidMinToothSize(value) => {
                write!(f, "min_tooth_size must be >= 1: {value}")
            }
            ConfigError::InvalidVoxelSize(value) => {
                write!(f, "voxel_size must be positive: {value}")
            }
            ConfigError::InvalidPercentile(value) => {
                write!(f, "gum_height_percentile must be within [0, 100]: {value}")
            }
            ConfigError::EmptyEpsRange => f.write_str("clustering_eps_range must not be empty"),
            ConfigError::InvalidEps(value) => {
                write!(f, "clustering radius must be positive: {value}")
            }
            ConfigError::UnorderedThresholds => {
                f.write_str("tooth thresholds must satisfy molar >= premolar >= canine >= 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
