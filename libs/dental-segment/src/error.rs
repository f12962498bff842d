//! # Segmentation Errors
//!
//! Error taxonomy for the segmentation pipeline.
//!
//! Strategy-local failures ([`SegmentError::Sampling`],
//! [`SegmentError::Voxelization`], [`SegmentError::Clustering`]) are
//! recovered by the pipeline; everything else is fatal to a run.

use config::ConfigError;
use dental_mesh::MeshError;
use thiserror::Error;

/// Errors raised while segmenting a mesh.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Empty or malformed input mesh
    #[error("Invalid mesh: {message}")]
    InvalidMesh { message: String },

    /// Surface sampling produced no points
    #[error("Sampling failed: {message}")]
    Sampling { message: String },

    /// Occupancy grid could not be built
    #[error("Voxelization failed: {message}")]
    Voxelization { message: String },

    /// A single clustering parameterization failed
    #[error("Clustering failed (eps {eps}): {message}")]
    Clustering { eps: f64, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unexpected mesh failure inside a strategy
    #[error("Mesh error: {0}")]
    Mesh(MeshError),

    /// Unexpected failure caught at the pipeline boundary
    #[error("Segmentation failed: {source}")]
    SegmentationFailed {
        #[source]
        source: Box<SegmentError>,
    },
}

impl SegmentError {
    /// Creates an invalid mesh error.
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// Creates a voxelization error.
    pub fn voxelization(message: impl Into<String>) -> Self {
        Self::Voxelization {
            message: message.into(),
        }
    }

    /// Creates a clustering error for the given radius.
    pub fn clustering(eps: f64, message: impl Into<String>) -> Self {
        Self::Clustering {
            eps,
            message: message.into(),
        }
    }

    /// Wraps an unexpected failure at the pipeline boundary.
    pub fn failed(source: SegmentError) -> Self {
        Self::SegmentationFailed {
            source: Box::new(source),
        }
    }

    /// Returns true if the pipeline may continue with the next strategy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Sampling { .. } | Self::Voxelization { .. } | Self::Clustering { .. }
        )
    }
}

impl From<MeshError> for SegmentError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::InvalidMesh { message } => Self::InvalidMesh { message },
            err @ MeshError::IndexOutOfBounds { .. } => Self::InvalidMesh {
                message: err.to_string(),
            },
            MeshError::Sampling { message } => Self::Sampling { message },
            other => Self::Mesh(other),
        }
    }
}

/// Result type for segmentation operations.
pub type SegmentResult<T> = Result<T, SegmentError>;
