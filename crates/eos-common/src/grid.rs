//! Regular lat/lon grid descriptors.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// A regular latitude/longitude grid with cell-center registration.
///
/// Rows run north to south (row 0 is the northernmost), columns west to
/// east, matching the row-major order the data arrays are stored in after
/// any configured transpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoGrid {
    /// Geographic extent covered by the grid cells.
    pub bbox: BoundingBox,
    /// Number of columns (longitude points).
    pub nx: usize,
    /// Number of rows (latitude points).
    pub ny: usize,
}

impl GeoGrid {
    /// Create a grid covering `bbox` with the given dimensions.
    pub fn new(bbox: BoundingBox, nx: usize, ny: usize) -> Self {
        Self { bbox, nx, ny }
    }

    /// A global grid at the given dimensions (e.g. 360x180 for 1 degree).
    pub fn global(nx: usize, ny: usize) -> Self {
        Self::new(BoundingBox::global(), nx, ny)
    }

    /// Longitude step per column in degrees.
    pub fn dx(&self) -> f64 {
        self.bbox.width() / self.nx as f64
    }

    /// Latitude step per row in degrees.
    pub fn dy(&self) -> f64 {
        self.bbox.height() / self.ny as f64
    }

    /// Longitude of the center of column `i`.
    pub fn lon_at(&self, i: usize) -> f64 {
        self.bbox.min_x + (i as f64 + 0.5) * self.dx()
    }

    /// Latitude of the center of row `j` (row 0 is northernmost).
    pub fn lat_at(&self, j: usize) -> f64 {
        self.bbox.max_y - (j as f64 + 0.5) * self.dy()
    }

    /// Fractional grid position of a geographic point, or None outside the
    /// grid extent. Returns (column, row) with row 0 at the north edge.
    pub fn position_of(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !self.bbox.contains_point(lon, lat) {
            return None;
        }
        let i = (lon - self.bbox.min_x) / self.dx() - 0.5;
        let j = (self.bbox.max_y - lat) / self.dy() - 0.5;
        Some((i, j))
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// True for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_one_degree() {
        let grid = GeoGrid::global(360, 180);
        assert_eq!(grid.dx(), 1.0);
        assert_eq!(grid.dy(), 1.0);
        // Cell centers are offset half a step from the edges
        assert_eq!(grid.lon_at(0), -179.5);
        assert_eq!(grid.lat_at(0), 89.5);
        assert_eq!(grid.lon_at(359), 179.5);
        assert_eq!(grid.lat_at(179), -89.5);
    }

    #[test]
    fn test_position_roundtrip() {
        let grid = GeoGrid::global(360, 180);
        let (i, j) = grid.position_of(grid.lon_at(42), grid.lat_at(17)).unwrap();
        assert!((i - 42.0).abs() < 1e-9);
        assert!((j - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_position_outside() {
        let grid = GeoGrid::new(BoundingBox::new(-10.0, -10.0, 10.0, 10.0), 20, 20);
        assert!(grid.position_of(11.0, 0.0).is_none());
        assert!(grid.position_of(0.0, -90.0).is_none());
    }
}
