//! # Spatial Point Grid
//!
//! Uniform spatial hashing over a point set for radius, nearest-neighbour
//! and k-nearest queries.
//!
//! ## Features
//!
//! - **Radius queries**: all points within a distance (density clustering)
//! - **Nearest queries**: closest point to a position (vertex mapping)
//! - **k-nearest queries**: local neighbourhoods (normal estimation)
//!
//! Unlike a k-d tree, the grid is insensitive to many points sharing a
//! coordinate, which is common on planar or axis-aligned scan regions.

use std::collections::HashMap;

use glam::DVec3;

/// Minimum cell size to avoid too many cells.
const MIN_CELL_SIZE: f64 = 1e-6;

/// Target number of points per occupied cell when sizing automatically.
const POINTS_PER_CELL: f64 = 4.0;

/// 3D cell coordinate for spatial hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i64,
    y: i64,
    z: i64,
}

impl CellCoord {
    /// Creates a cell coordinate from 3D position.
    fn from_position(pos: DVec3, cell_size: f64) -> Self {
        Self {
            x: (pos.x / cell_size).floor() as i64,
            y: (pos.y / cell_size).floor() as i64,
            z: (pos.z / cell_size).floor() as i64,
        }
    }

    fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// Hash grid mapping cells to the indices of the points they contain.
///
/// # Example
///
/// ```rust
/// use dental_mesh::spatial::PointGrid;
/// use glam::DVec3;
///
/// let points = vec![DVec3::ZERO, DVec3::new(0.5, 0.0, 0.0), DVec3::new(5.0, 0.0, 0.0)];
/// let grid = PointGrid::new(&points, 1.0);
/// assert_eq!(grid.within(DVec3::ZERO, 1.0).len(), 2);
/// assert_eq!(grid.nearest(DVec3::new(4.0, 0.0, 0.0)), Some(2));
/// ```
#[derive(Debug)]
pub struct PointGrid<'a> {
    /// Indexed points
    points: &'a [DVec3],
    /// Hash grid: cell -> point indices
    cells: HashMap<CellCoord, Vec<u32>>,
    /// Cell size for hashing
    cell_size: f64,
    /// Cell bounds covering every point
    cell_min: CellCoord,
    cell_max: CellCoord,
}

impl<'a> PointGrid<'a> {
    /// Indexes `points` with the given cell size.
    pub fn new(points: &'a [DVec3], cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };

        let mut cells: HashMap<CellCoord, Vec<u32>> = HashMap::new();
        let mut cell_min = CellCoord { x: 0, y: 0, z: 0 };
        let mut cell_max = cell_min;

        for (i, &p) in points.iter().enumerate() {
            let cell = CellCoord::from_position(p, cell_size);
            if i == 0 {
                cell_min = cell;
                cell_max = cell;
            } else {
                cell_min = CellCoord {
                    x: cell_min.x.min(cell.x),
                    y: cell_min.y.min(cell.y),
                    z: cell_min.z.min(cell.z),
                };
                cell_max = CellCoord {
                    x: cell_max.x.max(cell.x),
                    y: cell_max.y.max(cell.y),
                    z: cell_max.z.max(cell.z),
                };
            }
            cells.entry(cell).or_default().push(i as u32);
        }

        Self {
            points,
            cells,
            cell_size,
            cell_min,
            cell_max,
        }
    }

    /// Indexes `points` with a cell size derived from their density.
    pub fn with_auto_cell_size(points: &'a [DVec3]) -> Self {
        Self::new(points, auto_cell_size(points))
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no points are indexed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of all points within `radius` of `query` (inclusive).
    pub fn within(&self, query: DVec3, radius: f64) -> Vec<u32> {
        let mut found = Vec::new();
        if self.points.is_empty() || radius < 0.0 {
            return found;
        }

        let radius_sq = radius * radius;
        let reach = (radius / self.cell_size).ceil() as i64;
        let center = CellCoord::from_position(query, self.cell_size);

        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let Some(bucket) = self.cells.get(&center.offset(dx, dy, dz)) else {
                        continue;
                    };
                    found.extend(bucket.iter().copied().filter(|&i| {
                        self.points[i as usize].distance_squared(query) <= radius_sq
                    }));
                }
            }
        }

        found
    }

    /// Index of the point closest to `query`; ties go to the lower index.
    pub fn nearest(&self, query: DVec3) -> Option<u32> {
        self.nearest_n(query, 1).first().copied()
    }

    /// Indices of the `k` points closest to `query`, nearest first.
    ///
    /// Searches outward ring by ring until the k-th candidate is provably
    /// closer than anything in unvisited rings.
    pub fn nearest_n(&self, query: DVec3, k: usize) -> Vec<u32> {
        if self.points.is_empty() || k == 0 {
            return Vec::new();
        }

        let center = CellCoord::from_position(query, self.cell_size);
        let max_ring = self.max_ring(center);
        let mut candidates: Vec<(f64, u32)> = Vec::new();

        for ring in 0..=max_ring {
            self.visit_ring(center, ring, |bucket| {
                candidates.extend(
                    bucket
                        .iter()
                        .map(|&i| (self.points[i as usize].distance_squared(query), i)),
                );
            });

            if candidates.len() >= k {
                candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                // Everything within `ring * cell_size` of the query has been seen.
                let covered = ring as f64 * self.cell_size;
                if candidates[k - 1].0 <= covered * covered {
                    break;
                }
            }
        }

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.truncate(k);
        candidates.into_iter().map(|(_, i)| i).collect()
    }

    /// Largest Chebyshev ring around `center` that can still hold points.
    fn max_ring(&self, center: CellCoord) -> i64 {
        let spans = [
            (center.x - self.cell_min.x).abs(),
            (center.x - self.cell_max.x).abs(),
            (center.y - self.cell_min.y).abs(),
            (center.y - self.cell_max.y).abs(),
            (center.z - self.cell_min.z).abs(),
            (center.z - self.cell_max.z).abs(),
        ];
        spans.into_iter().max().unwrap_or(0)
    }

    /// Calls `visit` for every occupied cell on the surface of the cube of
    /// half-width `ring` around `center`, clipped to the occupied bounds.
    fn visit_ring(&self, center: CellCoord, ring: i64, mut visit: impl FnMut(&[u32])) {
        let mut visit_cell = |dx: i64, dy: i64, dz: i64| {
            if let Some(bucket) = self.cells.get(&center.offset(dx, dy, dz)) {
                visit(bucket);
            }
        };

        if ring == 0 {
            visit_cell(0, 0, 0);
            return;
        }

        let x_range = (self.cell_min.x - center.x).max(-ring)..=(self.cell_max.x - center.x).min(ring);
        let y_range = (self.cell_min.y - center.y).max(-ring)..=(self.cell_max.y - center.y).min(ring);
        let z_range = (self.cell_min.z - center.z).max(-ring)..=(self.cell_max.z - center.z).min(ring);

        for dx in x_range {
            for dy in y_range.clone() {
                if dx.abs() == ring || dy.abs() == ring {
                    for dz in z_range.clone() {
                        visit_cell(dx, dy, dz);
                    }
                } else {
                    for dz in [-ring, ring] {
                        if z_range.contains(&dz) {
                            visit_cell(dx, dy, dz);
                        }
                    }
                }
            }
        }
    }
}

/// Cell size that puts a handful of points in each cell of the bounding box.
fn auto_cell_size(points: &[DVec3]) -> f64 {
    if points.len() < 2 {
        return 1.0;
    }
    let (min, max) = points
        .iter()
        .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    let extent = (max - min).max(DVec3::splat(MIN_CELL_SIZE));
    // Scan surfaces are 2D manifolds; size cells by area per point.
    let area = extent.x * extent.y + extent.y * extent.z + extent.x * extent.z;
    (area * POINTS_PER_CELL / points.len() as f64)
        .sqrt()
        .max(MIN_CELL_SIZE)
}
