//! Equirectangular (plate carrée) projection.
//!
//! The identity projection for lat/lon data: projected coordinates are
//! degrees. This is what the bulk of the gallery's global maps use.

/// Equirectangular projection. Projected x/y are longitude/latitude degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlateCarree;

impl PlateCarree {
    /// Geographic to projected. Always succeeds inside the domain.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        if !(-180.0..=180.0).contains(&lon_deg) || !(-90.0..=90.0).contains(&lat_deg) {
            return None;
        }
        Some((lon_deg, lat_deg))
    }

    /// Projected to geographic.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) {
            return None;
        }
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let proj = PlateCarree;
        assert_eq!(proj.forward(-120.0, 45.0), Some((-120.0, 45.0)));
        assert_eq!(proj.inverse(-120.0, 45.0), Some((-120.0, 45.0)));
    }

    #[test]
    fn test_domain() {
        let proj = PlateCarree;
        assert!(proj.forward(-181.0, 0.0).is_none());
        assert!(proj.inverse(0.0, 91.0).is_none());
    }
}
