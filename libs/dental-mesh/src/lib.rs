//! # Dental Mesh
//!
//! Triangle mesh value type and the geometric utilities the segmentation
//! pipeline is built on.
//!
//! ## Architecture
//!
//! ```text
//! raw scan → clean::preprocess → Mesh → dental-segment
//! ```
//!
//! ## Contents
//!
//! - **Mesh**: indexed triangles over `DVec3` vertices with optional normals
//! - **Cleanup**: duplicate, degenerate and non-manifold removal, smoothing
//! - **PCA**: principal axes of a point set
//! - **Point clouds**: seeded area-weighted sampling, normal estimation
//! - **Spatial grid**: radius and nearest-neighbour queries
//!
//! ## Usage
//!
//! ```rust
//! use dental_mesh::{clean::preprocess, primitives::create_box};
//! use glam::DVec3;
//!
//! let scan = create_box(DVec3::new(10.0, 4.0, 3.0), true, 4).unwrap();
//! let mesh = preprocess(&scan).unwrap();
//! assert_eq!(mesh.triangle_count(), scan.triangle_count());
//! ```

pub mod clean;
pub mod error;
pub mod mesh;
pub mod pca;
pub mod pointcloud;
pub mod primitives;
pub mod spatial;

pub use error::{MeshError, MeshResult};
pub use mesh::Mesh;
pub use pointcloud::PointCloud;
