//! Euclidean distance transform and peak detection.
//!
//! The transform is the separable lower-envelope algorithm of Felzenszwalb
//! and Huttenlocher, applied along x, y then z. Distances are in voxel
//! units, measured from each occupied voxel to the nearest empty one.

use super::{linear_index, voxel_coords, Dims};

/// Distance from every voxel to the nearest empty voxel (0 for empty ones).
///
/// A mask with no empty voxel yields `f64::INFINITY` everywhere.
pub fn distance_transform(mask: &[bool], dims: Dims) -> Vec<f64> {
    let mut field: Vec<f64> = mask
        .iter()
        .map(|&set| if set { f64::INFINITY } else { 0.0 })
        .collect();

    let strides = [1, dims[0], dims[0] * dims[1]];
    let longest = dims.iter().copied().max().unwrap_or(0);
    let mut line = vec![0.0; longest];
    let mut out = vec![0.0; longest];

    for axis in 0..3 {
        let n = dims[axis];
        let stride = strides[axis];
        for start in line_starts(dims, axis) {
            for (q, slot) in line[..n].iter_mut().enumerate() {
                *slot = field[start + q * stride];
            }
            transform_line(&line[..n], &mut out[..n]);
            for (q, &value) in out[..n].iter().enumerate() {
                field[start + q * stride] = value;
            }
        }
    }

    field.iter_mut().for_each(|d| *d = d.sqrt());
    field
}

/// First voxel of every grid line running along `axis`.
fn line_starts(dims: Dims, axis: usize) -> impl Iterator<Item = usize> {
    let (a, b) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    (0..dims[b]).flat_map(move |j| {
        (0..dims[a]).map(move |i| {
            let mut coords = [0usize; 3];
            coords[a] = i;
            coords[b] = j;
            linear_index(dims, coords)
        })
    })
}

/// One-dimensional squared distance transform of the sampled function `f`.
fn transform_line(f: &[f64], out: &mut [f64]) {
    let intersect = |p: usize, q: usize| {
        let (pf, qf) = (p as f64, q as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    // Parabola apexes and the left boundary of each one's envelope segment.
    let mut apex: Vec<usize> = Vec::with_capacity(f.len());
    let mut boundary: Vec<f64> = Vec::with_capacity(f.len());

    for q in 0..f.len() {
        if !f[q].is_finite() {
            continue;
        }
        while let (Some(&p), Some(&left)) = (apex.last(), boundary.last()) {
            if intersect(p, q) <= left {
                apex.pop();
                boundary.pop();
            } else {
                break;
            }
        }
        let left = apex.last().map_or(f64::NEG_INFINITY, |&p| intersect(p, q));
        apex.push(q);
        boundary.push(left);
    }

    if apex.is_empty() {
        out.iter_mut().for_each(|d| *d = f64::INFINITY);
        return;
    }

    let mut k = 0;
    for (q, slot) in out.iter_mut().enumerate() {
        while k + 1 < apex.len() && boundary[k + 1] < q as f64 {
            k += 1;
        }
        let offset = q as f64 - apex[k] as f64;
        *slot = offset * offset + f[apex[k]];
    }
}

/// Local maxima of `field` at least `min_distance` voxels apart.
///
/// A voxel is a candidate when its value is positive and equals the maximum
/// of the cube of radius `min_distance` around it. Candidates are accepted
/// greedily, highest first (lower index on ties), and suppress every other
/// candidate within Chebyshev distance `min_distance`.
pub fn local_maxima(field: &[f64], dims: Dims, min_distance: usize) -> Vec<usize> {
    let r = min_distance as isize;
    let window = |index: usize| {
        let [x, y, z] = voxel_coords(dims, index).map(|c| c as isize);
        let clip = move |c: isize, axis: usize| {
            (c - r).max(0) as usize..=((c + r) as usize).min(dims[axis] - 1)
        };
        let (xs, ys, zs) = (clip(x, 0), clip(y, 1), clip(z, 2));
        zs.flat_map(move |wz| {
            let xs = xs.clone();
            ys.clone().flat_map(move |wy| {
                xs.clone().map(move |wx| linear_index(dims, [wx, wy, wz]))
            })
        })
    };

    let mut candidates: Vec<usize> = (0..field.len())
        .filter(|&i| field[i] > 0.0 && window(i).all(|j| field[j] <= field[i]))
        .collect();
    candidates.sort_by(|&a, &b| field[b].total_cmp(&field[a]).then(a.cmp(&b)));

    let mut suppressed = vec![false; field.len()];
    let mut peaks = Vec::new();
    for index in candidates {
        if suppressed[index] {
            continue;
        }
        peaks.push(index);
        for j in window(index) {
            suppressed[j] = true;
        }
    }
    peaks
}
