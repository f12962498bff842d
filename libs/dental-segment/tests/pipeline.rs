//! End-to-end scenarios for the segmentation pipeline.

use std::collections::HashSet;

use config::{SegmentationConfig, UserOptions};
use dental_mesh::primitives::{create_box, create_cube};
use dental_mesh::Mesh;
use dental_segment::gum::split_gum_and_teeth;
use dental_segment::score::score_segmentation;
use dental_segment::segment::{Candidate, Method, ToothType};
use dental_segment::strategies::{
    default_chain, ClusterSampling, ConnectedComponents, SpatialSlice, Strategy, StrategyKind,
    VoxelMorphology, Watershed,
};
use dental_segment::{segment_arch, segment_upload, SegmentError, Segmenter};
use glam::DVec3;

// =============================================================================
// FIXTURES
// =============================================================================

fn options(expected_tooth_count: u32, min_tooth_size: usize) -> UserOptions {
    UserOptions {
        expected_tooth_count,
        min_tooth_size,
        ..UserOptions::default()
    }
}

fn config(expected_tooth_count: u32, min_tooth_size: usize) -> SegmentationConfig {
    SegmentationConfig::resolve(&options(expected_tooth_count, min_tooth_size)).unwrap()
}

fn two_unit_cubes() -> Mesh {
    let mut mesh = create_cube(DVec3::ONE, false).unwrap();
    mesh.merge(
        &create_cube(DVec3::ONE, false)
            .unwrap()
            .translated(DVec3::new(3.0, 0.0, 0.0)),
    );
    mesh
}

fn two_boxes(size: f64, gap: f64, subdivisions: u32) -> Mesh {
    let mut mesh = create_box(DVec3::splat(size), false, subdivisions).unwrap();
    mesh.merge(
        &create_box(DVec3::splat(size), false, subdivisions)
            .unwrap()
            .translated(DVec3::new(size + gap, 0.0, 0.0)),
    );
    mesh
}

/// Triangles as sets of exact vertex positions, independent of indexing.
fn triangle_keys(mesh: &Mesh) -> HashSet<[[u64; 3]; 3]> {
    (0..mesh.triangle_count())
        .map(|t| {
            let mut key = mesh
                .triangle_positions(t)
                .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]);
            key.sort_unstable();
            key
        })
        .collect()
}

// =============================================================================
// END-TO-END
// =============================================================================

#[test]
fn test_two_cubes_yield_two_connected_components() {
    let mesh = two_unit_cubes();
    let outcome = Segmenter::new().run(&mesh, &config(2, 10)).unwrap();

    assert_eq!(outcome.accepted, Some(StrategyKind::ConnectedComponents));
    assert_eq!(outcome.segments.len(), 2);
    for segment in &outcome.segments {
        assert_eq!(segment.method, Method::ConnectedComponent);
        assert_eq!(segment.metrics.triangle_count, 12);
    }
    assert_eq!(outcome.segments[0].file_stem(), "tooth_01_connected-component");
    assert_eq!(outcome.segments[1].tooth_number, 2);
}

#[test]
fn test_segment_arch_preprocesses_first() {
    let outcome = segment_arch(&two_unit_cubes(), &config(2, 10)).unwrap();
    assert_eq!(outcome.segments.len(), 2);
    assert!(outcome
        .segments
        .iter()
        .all(|s| s.method == Method::ConnectedComponent && s.mesh.normals().is_some()));
}

#[test]
fn test_upload_options_are_resolved() {
    let outcome = segment_upload(&two_unit_cubes(), &options(2, 10)).unwrap();
    assert_eq!(outcome.segments.len(), 2);

    let err = segment_upload(&two_unit_cubes(), &options(0, 10)).unwrap_err();
    assert!(matches!(err, SegmentError::Config(_)));
}

#[test]
fn test_nan_vertex_fails_before_segmenting() {
    let mut mesh = create_box(DVec3::new(6.0, 2.0, 2.0), true, 6).unwrap();
    let bad = mesh.add_vertex(DVec3::new(f64::NAN, 0.0, 0.0));
    mesh.add_triangle(0, 1, bad);

    let err = segment_arch(&mesh, &config(28, 50)).unwrap_err();
    assert!(matches!(err, SegmentError::InvalidMesh { .. }));
}

#[test]
fn test_fused_blob_reaches_clustering() {
    let blob = create_box(DVec3::new(6.0, 2.0, 2.0), true, 6).unwrap();
    let config = config(28, 100).with_point_cloud_samples(2000).unwrap();
    let outcome = Segmenter::new().run(&blob, &config).unwrap();

    assert_eq!(outcome.attempts[0].kind, StrategyKind::ConnectedComponents);
    assert_eq!(outcome.attempts[0].candidates, 0);
    assert!(outcome.attempted(StrategyKind::ClusterSampling));
    assert_ne!(outcome.accepted, Some(StrategyKind::ConnectedComponents));
    assert!(!outcome.segments.is_empty());
}

#[test]
fn test_mesh_below_floor_completes_empty() {
    let tiny = create_cube(DVec3::ONE, false).unwrap();
    let config = config(28, 100).with_point_cloud_samples(500).unwrap();
    let outcome = Segmenter::new().run(&tiny, &config).unwrap();

    assert!(outcome.segments.is_empty());
    assert_eq!(outcome.accepted, None);
    assert_eq!(outcome.attempts.len(), default_chain().len());
}

#[test]
fn test_split_gum_appends_gum_segment() {
    let slab = create_box(DVec3::new(20.0, 10.0, 2.0), true, 4).unwrap();
    let config = SegmentationConfig::resolve(&UserOptions {
        split_gum: true,
        ..options(2, 20)
    })
    .unwrap()
    .with_point_cloud_samples(1500)
    .unwrap();

    let outcome = Segmenter::new().run(&slab, &config).unwrap();
    let last = outcome.segments.last().unwrap();
    assert_eq!(last.method, Method::Gum);
    assert_eq!(last.tooth_type, ToothType::Gum);
    assert_eq!(last.file_stem(), format!("tooth_{:02}_gum", outcome.segments.len()));
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn test_spatial_slice_terminal_guarantee() {
    let meshes = [
        create_box(DVec3::new(30.0, 12.0, 3.0), true, 3).unwrap(),
        create_box(DVec3::splat(1.0), false, 5).unwrap(),
        two_boxes(2.0, 10.0, 3),
    ];
    for mesh in &meshes {
        let config = config(28, 100);
        assert!(mesh.triangle_count() >= config.min_tooth_size);
        let result = SpatialSlice.attempt(mesh, &config).unwrap();
        assert!(!result.is_empty());
    }
}

#[test]
fn test_triangle_conservation_and_size_floor() {
    let mesh = two_boxes(4.0, 2.0, 4);
    let source = triangle_keys(&mesh);
    let config = config(2, 50);
    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(ConnectedComponents),
        Box::new(VoxelMorphology),
        Box::new(Watershed),
        Box::new(SpatialSlice),
    ];

    for strategy in strategies {
        let candidates = strategy.attempt(&mesh, &config).unwrap();
        assert!(!candidates.is_empty(), "{} found nothing", strategy.kind());
        for candidate in &candidates {
            assert!(candidate.triangle_count() >= config.min_tooth_size);
            assert!(triangle_keys(&candidate.mesh).is_subset(&source));
        }
    }
}

#[test]
fn test_clustering_conserves_triangles() {
    let mesh = two_boxes(2.0, 3.0, 6);
    let source = triangle_keys(&mesh);
    let config = config(2, 50)
        .with_point_cloud_samples(3000)
        .unwrap()
        .with_min_cluster_points(5)
        .unwrap()
        .with_eps_range(vec![0.5, 0.8])
        .unwrap();

    let candidates = ClusterSampling.attempt(&mesh, &config).unwrap();
    assert_eq!(candidates.len(), 2);
    for candidate in &candidates {
        assert!(candidate.triangle_count() >= config.min_tooth_size);
        assert!(triangle_keys(&candidate.mesh).is_subset(&source));
    }
}

#[test]
fn test_gum_split_with_zero_percentile_is_idempotent() {
    let mesh = create_box(DVec3::new(12.0, 8.0, 3.0), true, 3).unwrap();
    let config = config(28, 100).with_gum_height_percentile(0.0).unwrap();
    let split = split_gum_and_teeth(&mesh, &config).unwrap();

    assert_eq!(split.gum.triangle_count(), 0);
    assert_eq!(split.teeth.triangle_count(), mesh.triangle_count());
}

#[test]
fn test_score_boundaries() {
    assert_eq!(score_segmentation(&[], 1), 0.0);
    assert_eq!(score_segmentation(&[], 28), 0.0);

    let cube = create_cube(DVec3::ONE, false).unwrap();
    let candidates: Vec<Candidate> = (0..4)
        .map(|_| Candidate::new(cube.clone(), Method::DensityClustering))
        .collect();
    assert_eq!(score_segmentation(&candidates, 4), 1.0);
}

#[test]
fn test_summary_serializes_for_web_layer() {
    let outcome = Segmenter::new().run(&two_unit_cubes(), &config(2, 10)).unwrap();
    let summary = outcome.segments[0].summary();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["toothNumber"], 1);
    assert_eq!(json["toothType"], "incisor");
    assert_eq!(json["method"], "connected-component");
    assert_eq!(json["triangleCount"], 12);
    assert_eq!(json["fileStem"], "tooth_01_connected-component");
}
