//! Projection dispatch and the projected-extent-to-pixel mapping.

use eos_common::BoundingBox;

use crate::{PlateCarree, PolarStereographic, Sinusoidal};

/// A configured map projection.
#[derive(Debug, Clone)]
pub enum Projection {
    Geographic(PlateCarree),
    PolarStereographic(PolarStereographic),
    Sinusoidal(Sinusoidal),
}

impl Projection {
    /// Geographic (lon, lat) degrees to projected coordinates.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        match self {
            Projection::Geographic(p) => p.forward(lon_deg, lat_deg),
            Projection::PolarStereographic(p) => p.forward(lon_deg, lat_deg),
            Projection::Sinusoidal(p) => p.forward(lon_deg, lat_deg),
        }
    }

    /// Projected coordinates to geographic (lon, lat) degrees.
    pub fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self {
            Projection::Geographic(p) => p.inverse(x, y),
            Projection::PolarStereographic(p) => p.inverse(x, y),
            Projection::Sinusoidal(p) => p.inverse(x, y),
        }
    }

    /// Projected extent of a geographic bounding box, by projecting a
    /// sampling of its edges (the projected outline is curved for
    /// everything except the equirectangular case).
    pub fn projected_bounds(&self, geo: &BoundingBox) -> Option<BoundingBox> {
        let mut out = BoundingBox::empty();
        let samples = 50;
        for t in 0..=samples {
            let frac = t as f64 / samples as f64;
            let lon = geo.min_x + frac * geo.width();
            let lat = geo.min_y + frac * geo.height();

            let edges = [
                (lon, geo.min_y),
                (lon, geo.max_y),
                (geo.min_x, lat),
                (geo.max_x, lat),
            ];
            for (lon, lat) in edges {
                if let Some((x, y)) = self.forward(lon, lat) {
                    out.expand_to(x, y);
                }
            }
        }
        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

/// A projected extent mapped onto an output pixel raster.
///
/// Pixel row 0 is the top of the map (maximum projected y); pixel centers
/// sit half a pixel inside the extent edges.
#[derive(Debug, Clone)]
pub struct MapRegion {
    pub projection: Projection,
    pub extent: BoundingBox,
    pub width: usize,
    pub height: usize,
}

impl MapRegion {
    pub fn new(projection: Projection, extent: BoundingBox, width: usize, height: usize) -> Self {
        Self {
            projection,
            extent,
            width,
            height,
        }
    }

    /// Build a region with the height chosen to preserve the extent's
    /// aspect ratio at the given pixel width.
    pub fn with_aspect(projection: Projection, extent: BoundingBox, width: usize) -> Self {
        let aspect = extent.height() / extent.width();
        let height = ((width as f64 * aspect).round() as usize).max(1);
        Self::new(projection, extent, width, height)
    }

    /// Projected coordinates of a pixel center.
    pub fn pixel_to_projected(&self, px: usize, py: usize) -> (f64, f64) {
        let x = self.extent.min_x + (px as f64 + 0.5) / self.width as f64 * self.extent.width();
        let y = self.extent.max_y - (py as f64 + 0.5) / self.height as f64 * self.extent.height();
        (x, y)
    }

    /// Geographic coordinates of a pixel center, or None off the map body.
    pub fn pixel_to_geo(&self, px: usize, py: usize) -> Option<(f64, f64)> {
        let (x, y) = self.pixel_to_projected(px, py);
        self.projection.inverse(x, y)
    }

    /// Fractional pixel position of a geographic point, or None when it
    /// projects off the map or outside the extent.
    pub fn geo_to_pixel(&self, lon_deg: f64, lat_deg: f64) -> Option<(f64, f64)> {
        let (x, y) = self.projection.forward(lon_deg, lat_deg)?;
        if !self.extent.contains_point(x, y) {
            return None;
        }
        let px = (x - self.extent.min_x) / self.extent.width() * self.width as f64;
        let py = (self.extent.max_y - y) / self.extent.height() * self.height as f64;
        Some((px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geographic_region() -> MapRegion {
        MapRegion::new(
            Projection::Geographic(PlateCarree),
            BoundingBox::global(),
            360,
            180,
        )
    }

    #[test]
    fn test_pixel_geo_roundtrip() {
        let region = geographic_region();
        let (lon, lat) = region.pixel_to_geo(0, 0).unwrap();
        assert!((lon - (-179.5)).abs() < 1e-9);
        assert!((lat - 89.5).abs() < 1e-9);

        let (px, py) = region.geo_to_pixel(lon, lat).unwrap();
        assert!((px - 0.5).abs() < 1e-9);
        assert!((py - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_with_aspect() {
        let region = MapRegion::with_aspect(
            Projection::Geographic(PlateCarree),
            BoundingBox::global(),
            720,
        );
        assert_eq!(region.height, 360);
    }

    #[test]
    fn test_outside_extent() {
        let region = MapRegion::new(
            Projection::Geographic(PlateCarree),
            BoundingBox::new(-20.0, -20.0, 20.0, 20.0),
            100,
            100,
        );
        assert!(region.geo_to_pixel(40.0, 0.0).is_none());
    }

    #[test]
    fn test_projected_bounds_polar() {
        let proj = Projection::PolarStereographic(PolarStereographic::north(0.0, 50.0));
        let geo = BoundingBox::new(-180.0, 60.0, 180.0, 90.0);
        let bounds = proj.projected_bounds(&geo).unwrap();
        // Symmetric around the pole
        assert!((bounds.min_x + bounds.max_x).abs() < 1.0);
        assert!((bounds.min_y + bounds.max_y).abs() < 1.0);
    }
}
