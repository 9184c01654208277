//! Per-pixel swath geolocation.

use crate::BoundingBox;

/// Geolocation for swath data: one latitude and longitude per pixel.
///
/// Arrays are row-major and must match the shape of the field they locate.
#[derive(Debug, Clone)]
pub struct Swath {
    pub lats: Vec<f32>,
    pub lons: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Swath {
    /// Build a swath, validating array shapes.
    pub fn new(
        lats: Vec<f32>,
        lons: Vec<f32>,
        width: usize,
        height: usize,
    ) -> Result<Self, SwathShapeError> {
        let expected = width * height;
        if lats.len() != expected || lons.len() != expected {
            return Err(SwathShapeError {
                expected,
                lats: lats.len(),
                lons: lons.len(),
            });
        }
        Ok(Self {
            lats,
            lons,
            width,
            height,
        })
    }

    /// Geographic bounds of all finite geolocation points.
    ///
    /// Geolocation arrays carry their own fill values (commonly -999.x),
    /// which arrive here as NaN or wildly out-of-range numbers; anything
    /// outside the valid lat/lon domain is skipped.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut bbox = BoundingBox::empty();
        for (&lat, &lon) in self.lats.iter().zip(self.lons.iter()) {
            if !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                continue;
            }
            bbox.expand_to(lon as f64, lat as f64);
        }
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True for a zero-sized swath.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Swath geolocation shape mismatch: expected {expected} points, got {lats} lats / {lons} lons")]
pub struct SwathShapeError {
    pub expected: usize,
    pub lats: usize,
    pub lons: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(Swath::new(vec![0.0; 6], vec![0.0; 6], 3, 2).is_ok());
        assert!(Swath::new(vec![0.0; 5], vec![0.0; 6], 3, 2).is_err());
    }

    #[test]
    fn test_bounds_skips_invalid_points() {
        let lats = vec![10.0, 20.0, f32::NAN, -999.9];
        let lons = vec![-40.0, -30.0, 0.0, -999.9];
        let swath = Swath::new(lats, lons, 2, 2).unwrap();
        let bbox = swath.bounds().unwrap();
        assert_eq!(bbox.min_y, 10.0);
        assert_eq!(bbox.max_y, 20.0);
        assert_eq!(bbox.min_x, -40.0);
        assert_eq!(bbox.max_x, -30.0);
    }

    #[test]
    fn test_bounds_all_invalid() {
        let swath = Swath::new(vec![f32::NAN; 4], vec![f32::NAN; 4], 2, 2).unwrap();
        assert!(swath.bounds().is_none());
    }
}
