//! # Tests for Config
//!
//! Unit tests verifying the constants and the option derivation rules.

use crate::constants::*;
use crate::options::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_tolerances_are_small_and_positive() {
    assert!(DEGENERATE_AREA_EPSILON > 0.0);
    assert!(CROP_TOLERANCE > 0.0);
    assert!(DEGENERATE_AREA_EPSILON < CROP_TOLERANCE);
}

// =============================================================================
// DERIVATION TESTS
// =============================================================================

#[test]
fn test_defaults_match_documented_options() {
    let config = SegmentationConfig::resolve(&UserOptions::default()).unwrap();
    assert_eq!(config.arch_type, ArchType::Full);
    assert_eq!(config.expected_tooth_count, 28);
    assert_eq!(config.min_tooth_size, 100);
    assert_eq!(config.point_cloud_samples, 50_000);
    assert_eq!(config.min_cluster_points, 25);
    assert_eq!(config.clustering_eps_range, vec![0.8, 1.2, 1.8]);
    assert_eq!(config.voxel_size, 0.4);
    assert_eq!(config.min_voxel_size, 30);
    assert_eq!(config.gum_height_percentile, 25.0);
    assert!(!config.split_gum);
}

#[test]
fn test_quality_tiers() {
    let cases = [
        (ModelQuality::High, 75_000, 15),
        (ModelQuality::Medium, 50_000, 25),
        (ModelQuality::Low, 30_000, 35),
    ];
    for (quality, samples, min_points) in cases {
        let options = UserOptions {
            model_quality: quality,
            ..UserOptions::default()
        };
        let config = SegmentationConfig::resolve(&options).unwrap();
        assert_eq!(config.point_cloud_samples, samples, "{quality}");
        assert_eq!(config.min_cluster_points, min_points, "{quality}");
    }
}

#[test]
fn test_separation_levels() {
    assert_eq!(SeparationLevel::Natural.eps_range(), &[0.5, 1.0, 1.5]);
    assert_eq!(SeparationLevel::Touching.eps_range(), &[0.8, 1.2, 1.8]);
    assert_eq!(SeparationLevel::Connected.eps_range(), &[1.0, 1.5, 2.0, 2.5]);
}

#[test]
fn test_min_points_grow_with_sweep_index() {
    let config = SegmentationConfig::resolve(&UserOptions::default()).unwrap();
    assert_eq!(config.min_points_for(0), 25);
    assert_eq!(config.min_points_for(1), 30);
    assert_eq!(config.min_points_for(3), 40);
}

#[test]
fn test_arch_regions() {
    assert_eq!(ArchType::Full.arch_regions(28), 7);
    assert_eq!(ArchType::Full.arch_regions(8), 6);
    assert_eq!(ArchType::Upper.arch_regions(14), 7);
    assert_eq!(ArchType::Lower.arch_regions(4), 4);
    assert_eq!(ArchType::Partial.arch_regions(9), 3);
    assert_eq!(ArchType::Partial.arch_regions(1), 2);
}

// =============================================================================
// VALIDATION TESTS
// =============================================================================

#[test]
fn test_rejects_zero_tooth_count() {
    let options = UserOptions {
        expected_tooth_count: 0,
        ..UserOptions::default()
    };
    assert_eq!(
        SegmentationConfig::resolve(&options).unwrap_err(),
        ConfigError::InvalidToothCount(0)
    );
}

#[test]
fn test_rejects_zero_min_tooth_size() {
    let options = UserOptions {
        min_tooth_size: 0,
        ..UserOptions::default()
    };
    assert!(SegmentationConfig::resolve(&options).is_err());
}

#[test]
fn test_overrides_are_validated() {
    let config = SegmentationConfig::resolve(&UserOptions::default()).unwrap();
    assert_eq!(
        config.clone().with_voxel_size(0.0).unwrap_err(),
        ConfigError::InvalidVoxelSize(0.0)
    );
    assert_eq!(
        config.clone().with_eps_range(Vec::new()).unwrap_err(),
        ConfigError::EmptyEpsRange
    );
    assert_eq!(
        config.clone().with_eps_range(vec![1.0, -1.0]).unwrap_err(),
        ConfigError::InvalidEps(-1.0)
    );
    assert!(config.clone().with_gum_height_percentile(101.0).is_err());
    let unordered = ToothTypeThresholds {
        molar: 10.0,
        premolar: 20.0,
        canine: 5.0,
    };
    assert_eq!(
        config.with_tooth_thresholds(unordered).unwrap_err(),
        ConfigError::UnorderedThresholds
    );
}

#[test]
fn test_overrides_keep_other_fields() {
    let config = SegmentationConfig::resolve(&UserOptions::default())
        .unwrap()
        .with_point_cloud_samples(1_000)
        .unwrap()
        .with_sampling_seed(7);
    assert_eq!(config.point_cloud_samples, 1_000);
    assert_eq!(config.sampling_seed, 7);
    assert_eq!(config.min_cluster_points, 25);
}

// =============================================================================
// PARSING TESTS
// =============================================================================

#[test]
fn test_enums_parse_case_insensitively() {
    assert_eq!("Upper".parse::<ArchType>().unwrap(), ArchType::Upper);
    assert_eq!(" high ".parse::<ModelQuality>().unwrap(), ModelQuality::High);
    assert_eq!(
        "connected".parse::<SeparationLevel>().unwrap(),
        SeparationLevel::Connected
    );
}

#[test]
fn test_unknown_option_is_rejected() {
    let err = "sideways".parse::<ArchType>().unwrap_err();
    assert!(err.to_string().contains("arch_type"));
    assert!(err.to_string().contains("sideways"));
}

#[test]
fn test_display_roundtrips_through_from_str() {
    for arch in [
        ArchType::Full,
        ArchType::Upper,
        ArchType::Lower,
        ArchType::Partial,
    ] {
        assert_eq!(arch.to_string().parse::<ArchType>().unwrap(), arch);
    }
}

// =============================================================================
// SERIALIZATION TESTS
// =============================================================================

#[test]
fn test_user_options_from_upload_form() {
    let json = r#"{
        "archType": "lower",
        "expectedToothCount": 14,
        "separationLevel": "natural",
        "splitGum": true
    }"#;
    let options: UserOptions = serde_json::from_str(json).unwrap();
    assert_eq!(options.arch_type, ArchType::Lower);
    assert_eq!(options.expected_tooth_count, 14);
    assert_eq!(options.model_quality, ModelQuality::Medium);
    assert_eq!(options.separation_level, SeparationLevel::Natural);
    assert_eq!(options.min_tooth_size, DEFAULT_MIN_TOOTH_SIZE);
    assert!(options.split_gum);
}

#[test]
fn test_unknown_enum_value_fails_deserialization() {
    let json = r#"{ "modelQuality": "ultra" }"#;
    assert!(serde_json::from_str::<UserOptions>(json).is_err());
}
