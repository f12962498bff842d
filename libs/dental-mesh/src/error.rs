//! # Mesh Errors
//!
//! Error types for mesh construction, cleanup and sampling.

use thiserror::Error;

/// Errors that can occur while building or processing a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh cannot be processed at all (e.g. it has no vertices).
    #[error("Invalid mesh: {message}")]
    InvalidMesh { message: String },

    /// A triangle references a vertex that does not exist.
    #[error("Triangle {triangle} references vertex {index} (vertex count: {vertex_count})")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Surface sampling produced no points.
    #[error("Sampling failed: {message}")]
    Sampling { message: String },

    /// Geometry is too degenerate for the requested operation.
    #[error("Degenerate geometry: {message}")]
    Degenerate { message: String },
}

impl MeshError {
    /// Creates an invalid mesh error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// Creates a sampling error.
    pub fn sampling(message: impl Into<String>) -> Self {
        Self::Sampling {
            message: message.into(),
        }
    }

    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }
}

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
