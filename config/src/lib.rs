//! # Config Crate
//!
//! Centralized configuration for the dental arch segmentation pipeline.
//! Tunable constants live in [`constants`]; the user-facing options and the
//! resolved [`options::SegmentationConfig`] live in [`options`].
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::DEFAULT_VOXEL_SIZE;
//! use config::options::{SegmentationConfig, SeparationLevel, UserOptions};
//!
//! let options = UserOptions {
//!     separation_level: SeparationLevel::Connected,
//!     ..UserOptions::default()
//! };
//! let config = SegmentationConfig::resolve(&options).unwrap();
//! assert_eq!(config.clustering_eps_range, vec![1.0, 1.5, 2.0, 2.5]);
//! assert_eq!(config.voxel_size, DEFAULT_VOXEL_SIZE);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Immutable Resolution**: A resolved configuration is never mutated by
//!   the pipeline; overrides produce a new validated value

pub mod constants;
pub mod options;

pub use options::{
    ArchType, ConfigError, ModelQuality, SegmentationConfig, SeparationLevel,
    ToothTypeThresholds, UserOptions,
};

#[cfg(test)]
mod tests;
