//! Plausibility score of a candidate set.
//!
//! `score = 0.7 · count_fit + 0.3 · size_uniformity` where
//!
//! - `count_fit = max(0, 1 − |observed − expected| / expected)`
//! - `size_uniformity = 1 / (1 + variance / mean)` over triangle counts,
//!   where the dispersion term is zero for fewer than two segments

use config::constants::{SCORE_COUNT_WEIGHT, SCORE_UNIFORMITY_WEIGHT};

use crate::segment::Candidate;

/// Scores a candidate set against the expected tooth count.
///
/// # Example
///
/// ```rust
/// use dental_segment::score::score_segmentation;
///
/// assert_eq!(score_segmentation(&[], 28), 0.0);
/// ```
pub fn score_segmentation(candidates: &[Candidate], expected_count: u32) -> f64 {
    let sizes: Vec<usize> = candidates.iter().map(Candidate::triangle_count).collect();
    score_sizes(&sizes, expected_count)
}

/// Same score computed directly from segment sizes.
pub fn score_sizes(sizes: &[usize], expected_count: u32) -> f64 {
    if sizes.is_empty() || expected_count == 0 {
        return 0.0;
    }

    let expected = expected_count as f64;
    let observed = sizes.len() as f64;
    let count_fit = (1.0 - (observed - expected).abs() / expected).max(0.0);

    SCORE_COUNT_WEIGHT * count_fit + SCORE_UNIFORMITY_WEIGHT * size_uniformity(sizes)
}

fn size_uniformity(sizes: &[usize]) -> f64 {
    if sizes.len() < 2 {
        return 1.0;
    }
    let n = sizes.len() as f64;
    let mean = sizes.iter().map(|&s| s as f64).sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = sizes
        .iter()
        .map(|&s| {
            let d = s as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    1.0 / (1.0 + variance / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(score_sizes(&[], 1), 0.0);
        assert_eq!(score_sizes(&[], 28), 0.0);
    }

    #[test]
    fn test_perfect_match_scores_one() {
        assert_eq!(score_sizes(&[120, 120, 120, 120], 4), 1.0);
    }

    #[test]
    fn test_single_segment_is_uniform() {
        assert_eq!(score_sizes(&[500], 1), 1.0);
        assert_relative_eq!(score_sizes(&[500], 2), 0.35 + 0.3);
    }

    #[test]
    fn test_count_fit_floors_at_zero() {
        let sizes = vec![10; 9];
        // count_fit = max(0, 1 - 6/3) = 0; uniformity = 1
        assert_relative_eq!(score_sizes(&sizes, 3), 0.3);
    }

    #[test]
    fn test_uneven_sizes_penalized() {
        // mean 20, population variance 100
        let score = score_sizes(&[10, 30], 2);
        assert_relative_eq!(score, 0.7 + 0.3 / 6.0, epsilon = 1e-12);
        assert!(score < score_sizes(&[20, 20], 2));
    }
}
