//! Polar stereographic projection (spherical form).
//!
//! Used for the gallery's polar views (snow cover, sea ice, polar ozone).
//! Formulas follow Snyder, Map Projections: A Working Manual, eq. 21-5
//! through 21-15, on a sphere.

use eos_common::BoundingBox;

use crate::EARTH_RADIUS_M;

/// Polar stereographic projection centered on the north or south pole.
#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    /// True for the north polar aspect, false for the south.
    pub north: bool,
    /// Longitude at the top (north) or bottom (south) of the map (degrees).
    pub central_lon: f64,
    /// Latitude of the circular map edge (degrees). The projected extent
    /// is the square bounding that circle.
    pub bounding_lat: f64,
    /// Sphere radius (meters).
    pub radius: f64,
}

impl PolarStereographic {
    /// North polar aspect with the given central longitude and edge latitude.
    pub fn north(central_lon: f64, bounding_lat: f64) -> Self {
        Self {
            north: true,
            central_lon,
            bounding_lat,
            radius: EARTH_RADIUS_M,
        }
    }

    /// South polar aspect with the given central longitude and edge latitude.
    pub fn south(central_lon: f64, bounding_lat: f64) -> Self {
        Self {
            north: false,
            central_lon,
            bounding_lat,
            radius: EARTH_RADIUS_M,
        }
    }

    /// Radial distance from the pole for a latitude.
    fn rho(&self, lat_rad: f64) -> f64 {
        if self.north {
            2.0 * self.radius * (std::f64::consts::FRAC_PI_4 - lat_rad / 2.0).tan()
        } else {
            2.0 * self.radius * (std::f64::consts::FRAC_PI_4 + lat_rad / 2.0).tan()
        }
    }

    /// Geographic to projected meters. Points in the far hemisphere
    /// (beyond the equator on the opposite side) return None.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat_deg) {
            return None;
        }
        // The projection blows up approaching the opposite pole
        if self.north && lat_deg < -45.0 {
            return None;
        }
        if !self.north && lat_deg > 45.0 {
            return None;
        }

        let lat = lat_deg.to_radians();
        let dlon = (lon_deg - self.central_lon).to_radians();
        let rho = self.rho(lat);

        if self.north {
            Some((rho * dlon.sin(), -rho * dlon.cos()))
        } else {
            Some((rho * dlon.sin(), rho * dlon.cos()))
        }
    }

    /// Projected meters to geographic.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let rho = x.hypot(y);
        if rho == 0.0 {
            let pole = if self.north { 90.0 } else { -90.0 };
            return Some((self.central_lon, pole));
        }

        let c = 2.0 * (rho / (2.0 * self.radius)).atan();
        let (lat, dlon) = if self.north {
            (
                std::f64::consts::FRAC_PI_2 - c,
                x.atan2(-y),
            )
        } else {
            (
                c - std::f64::consts::FRAC_PI_2,
                x.atan2(y),
            )
        };

        let lon = eos_common::bbox::normalize_longitude(self.central_lon + dlon.to_degrees());
        Some((lon, lat.to_degrees()))
    }

    /// The square projected extent bounding the `bounding_lat` circle.
    pub fn extent(&self) -> BoundingBox {
        let half = self.rho(self.bounding_lat.to_radians()).abs();
        BoundingBox::new(-half, -half, half, half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pole_maps_to_origin() {
        let proj = PolarStereographic::north(-45.0, 30.0);
        let (x, y) = proj.forward(0.0, 90.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (lon, lat) = proj.inverse(0.0, 0.0).unwrap();
        assert_eq!(lat, 90.0);
        assert_eq!(lon, -45.0);
    }

    #[test]
    fn test_central_meridian_points_up() {
        // On the north polar aspect, the central meridian runs from the
        // pole toward the bottom of the map (negative y).
        let proj = PolarStereographic::north(0.0, 30.0);
        let (x, y) = proj.forward(0.0, 60.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y < 0.0);
    }

    #[test]
    fn test_roundtrip_north() {
        let proj = PolarStereographic::north(-100.0, 40.0);
        for &(lon, lat) in &[(-150.0, 75.0), (30.0, 55.0), (-100.0, 89.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_roundtrip_south() {
        let proj = PolarStereographic::south(0.0, -50.0);
        for &(lon, lat) in &[(45.0, -70.0), (-120.0, -89.5), (179.0, -60.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-9);
            assert!((lat - lat2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_far_hemisphere_rejected() {
        let proj = PolarStereographic::north(0.0, 30.0);
        assert!(proj.forward(0.0, -80.0).is_none());
    }

    #[test]
    fn test_extent_square() {
        let proj = PolarStereographic::north(0.0, 60.0);
        let extent = proj.extent();
        assert!((extent.width() - extent.height()).abs() < 1e-9);
        // The bounding latitude circle touches the extent edge
        let (x, _) = proj.forward(90.0, 60.0).unwrap();
        assert!((x - extent.max_x).abs() < 1e-6);
    }
}
