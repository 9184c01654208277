//! Sinusoidal projection and the MODIS sinusoidal grid.
//!
//! MODIS land products (NDVI, LST tiles) are stored on a sinusoidal grid;
//! the grid corner coordinates in meters come from the product metadata
//! and are carried in the product definition.

use eos_common::Swath;

use crate::MODIS_SPHERE_RADIUS_M;

/// Spherical sinusoidal projection.
#[derive(Debug, Clone, Copy)]
pub struct Sinusoidal {
    /// Central meridian (degrees).
    pub central_lon: f64,
    /// Sphere radius (meters).
    pub radius: f64,
}

impl Sinusoidal {
    /// The MODIS sinusoidal projection (central meridian 0).
    pub fn modis() -> Self {
        Self {
            central_lon: 0.0,
            radius: MODIS_SPHERE_RADIUS_M,
        }
    }

    /// Geographic to projected meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return None;
        }
        let lat = lat_deg.to_radians();
        let dlon = eos_common::bbox::normalize_longitude(lon_deg - self.central_lon).to_radians();
        Some((self.radius * dlon * lat.cos(), self.radius * lat))
    }

    /// Projected meters to geographic. Returns None outside the pseudo-
    /// elliptical valid region.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let lat = y / self.radius;
        if lat.abs() > std::f64::consts::FRAC_PI_2 {
            return None;
        }
        let cos_lat = lat.cos();
        if cos_lat < 1e-9 {
            // At the poles every x maps to the pole point
            return if x.abs() < 1e-6 {
                Some((self.central_lon, lat.to_degrees()))
            } else {
                None
            };
        }
        let dlon = x / (self.radius * cos_lat);
        if dlon.abs() > std::f64::consts::PI {
            return None;
        }
        Some((
            eos_common::bbox::normalize_longitude(self.central_lon + dlon.to_degrees()),
            lat.to_degrees(),
        ))
    }
}

/// A raster stored on the sinusoidal projection, described by its corner
/// coordinates in projected meters (upper-left x/y, lower-right x/y).
#[derive(Debug, Clone)]
pub struct SinusoidalGrid {
    pub projection: Sinusoidal,
    pub upper_left: (f64, f64),
    pub lower_right: (f64, f64),
    pub nx: usize,
    pub ny: usize,
}

impl SinusoidalGrid {
    /// Projected x/y of the center of cell (i, j).
    pub fn cell_center(&self, i: usize, j: usize) -> (f64, f64) {
        let dx = (self.lower_right.0 - self.upper_left.0) / self.nx as f64;
        let dy = (self.upper_left.1 - self.lower_right.1) / self.ny as f64;
        (
            self.upper_left.0 + (i as f64 + 0.5) * dx,
            self.upper_left.1 - (j as f64 + 0.5) * dy,
        )
    }

    /// Compute per-pixel geolocation for the whole raster.
    ///
    /// This is how the original gallery geolocates sinusoidal tiles: the
    /// lat/lon of every cell follows from the grid corners, so no
    /// geolocation arrays are stored in the file. Cells outside the valid
    /// projection region get NaN.
    pub fn to_swath(&self) -> Swath {
        let mut lats = Vec::with_capacity(self.nx * self.ny);
        let mut lons = Vec::with_capacity(self.nx * self.ny);

        for j in 0..self.ny {
            for i in 0..self.nx {
                let (x, y) = self.cell_center(i, j);
                match self.projection.inverse(x, y) {
                    Some((lon, lat)) => {
                        lons.push(lon as f32);
                        lats.push(lat as f32);
                    }
                    None => {
                        lons.push(f32::NAN);
                        lats.push(f32::NAN);
                    }
                }
            }
        }

        // Shapes are correct by construction
        Swath::new(lats, lons, self.nx, self.ny).expect("sinusoidal swath shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_on_central_meridian() {
        let proj = Sinusoidal::modis();
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-9);
        assert!(y.abs() < 1e-9);
    }

    #[test]
    fn test_latitude_is_linear_in_y() {
        let proj = Sinusoidal::modis();
        let (_, y) = proj.forward(0.0, 45.0).unwrap();
        assert!((y - proj.radius * 45.0_f64.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip() {
        let proj = Sinusoidal::modis();
        for &(lon, lat) in &[(-70.0, -10.0), (103.5, 47.2), (0.0, 89.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_inverse_outside_region() {
        let proj = Sinusoidal::modis();
        // x beyond the shrunken parallel at high latitude
        let x_at_equator = proj.forward(179.0, 0.0).unwrap().0;
        let y_at_80 = proj.forward(0.0, 80.0).unwrap().1;
        assert!(proj.inverse(x_at_equator, y_at_80).is_none());
    }

    #[test]
    fn test_grid_swath_geolocation() {
        // A small grid straddling the equator at the central meridian
        let half_deg_m = MODIS_SPHERE_RADIUS_M * 1.0_f64.to_radians();
        let grid = SinusoidalGrid {
            projection: Sinusoidal::modis(),
            upper_left: (-half_deg_m, half_deg_m),
            lower_right: (half_deg_m, -half_deg_m),
            nx: 4,
            ny: 4,
        };
        let swath = grid.to_swath();
        assert_eq!(swath.len(), 16);

        // Centered on (0, 0): latitudes symmetric, row 0 north of row 3
        let bounds = swath.bounds().unwrap();
        assert!((bounds.min_y + bounds.max_y).abs() < 1e-4);
        assert!(swath.lats[0] > swath.lats[12]);
    }
}
