//! # Dental Segment
//!
//! Splits a dental arch mesh into one sub-mesh per tooth, without labels
//! or trained models, by running classical geometric strategies in a
//! fixed fallback order.
//!
//! ## Architecture
//!
//! ```text
//! raw Mesh ─ preprocess ─▶ Segmenter ─▶ strategies ─▶ Vec<Segment>
//!                            │
//!                            └─ optional gum split
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use config::{SegmentationConfig, UserOptions};
//! use dental_mesh::primitives::create_cube;
//! use dental_segment::segment_arch;
//! use glam::DVec3;
//!
//! let mut arch = create_cube(DVec3::ONE, false).unwrap();
//! arch.merge(&create_cube(DVec3::ONE, false).unwrap().translated(DVec3::X * 3.0));
//!
//! let config = SegmentationConfig::resolve(&UserOptions {
//!     expected_tooth_count: 2,
//!     min_tooth_size: 10,
//!     ..UserOptions::default()
//! })
//! .unwrap();
//!
//! let outcome = segment_arch(&arch, &config).unwrap();
//! assert_eq!(outcome.segments.len(), 2);
//! ```

pub mod error;
pub mod gum;
pub mod pipeline;
pub mod score;
pub mod segment;
pub mod strategies;
pub mod volume;

pub use error::{SegmentError, SegmentResult};
pub use pipeline::{Attempt, SegmentationOutcome, Segmenter};
pub use segment::{Method, Segment, SegmentSummary, ToothType};

use config::{SegmentationConfig, UserOptions};
use dental_mesh::clean::preprocess;
use dental_mesh::Mesh;

/// Preprocesses a raw mesh and segments it with the default chain.
///
/// # Errors
///
/// Returns [`SegmentError::InvalidMesh`] for an empty or malformed mesh and
/// [`SegmentError::SegmentationFailed`] for unrecoverable failures.
pub fn segment_arch(mesh: &Mesh, config: &SegmentationConfig) -> SegmentResult<SegmentationOutcome> {
    let cleaned = preprocess(mesh)?;
    Segmenter::new().run(&cleaned, config)
}

/// Resolves upload-form options and segments a raw mesh.
///
/// # Errors
///
/// Returns [`SegmentError::Config`] when the options do not resolve to a
/// valid configuration, otherwise as [`segment_arch`].
pub fn segment_upload(mesh: &Mesh, options: &UserOptions) -> SegmentResult<SegmentationOutcome> {
    let config = SegmentationConfig::resolve(options)?;
    segment_arch(mesh, &config)
}
