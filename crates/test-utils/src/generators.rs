//! Synthetic data generators.

use eos_common::{DataField, Swath};

/// A field with a smooth Gaussian bump centered in the array, with a block
/// of missing values in one corner. Values range from ~0 at the edges to
/// `peak` at the center.
pub fn gaussian_field(width: usize, height: usize, peak: f32) -> DataField {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let sigma = (width.min(height) as f32 / 4.0).max(1.0);

    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            values.push(peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp());
        }
    }

    // Missing block in the upper-left corner
    for y in 0..height / 8 {
        for x in 0..width / 8 {
            values[y * width + x] = f32::NAN;
        }
    }

    DataField::new("synthetic", values, width, height)
}

/// A field whose values ramp linearly left to right from `lo` to `hi`.
pub fn ramp_field(width: usize, height: usize, lo: f32, hi: f32) -> DataField {
    let mut values = Vec::with_capacity(width * height);
    for _ in 0..height {
        for x in 0..width {
            let t = if width > 1 {
                x as f32 / (width - 1) as f32
            } else {
                0.0
            };
            values.push(lo + t * (hi - lo));
        }
    }
    DataField::new("ramp", values, width, height)
}

/// Swath geolocation for a gently curved ground track.
///
/// Pixel (0, 0) sits at (`lon0`, `lat0`); rows step north by `step`
/// degrees and columns step east, with a small cross-track curvature so
/// the swath is not axis-aligned.
pub fn synthetic_swath(width: usize, height: usize, lon0: f32, lat0: f32, step: f32) -> Swath {
    let mut lats = Vec::with_capacity(width * height);
    let mut lons = Vec::with_capacity(width * height);

    for j in 0..height {
        for i in 0..width {
            let along = j as f32 * step;
            let across = i as f32 * step;
            let curve = 0.05 * (j as f32 * step).sin();
            lats.push(lat0 + along + 0.1 * across);
            lons.push(lon0 + across + curve);
        }
    }

    Swath::new(lats, lons, width, height).expect("synthetic swath shape")
}

/// A 1-D sounding: temperature-like values against a decreasing pressure
/// axis (surface first), for profile chart tests.
pub fn synthetic_sounding(levels: usize) -> (DataField, Vec<f32>) {
    let mut values = Vec::with_capacity(levels);
    let mut pressure = Vec::with_capacity(levels);
    for k in 0..levels {
        let t = k as f32 / (levels.max(2) - 1) as f32;
        values.push(290.0 - 70.0 * t);
        pressure.push(1000.0 - 900.0 * t);
    }
    (DataField::new("sounding", values, levels, 1), pressure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_peak_at_center() {
        let field = gaussian_field(33, 33, 50.0);
        let center = field.values[16 * 33 + 16];
        assert!((center - 50.0).abs() < 0.5);
        assert!(field.values[0].is_nan());
    }

    #[test]
    fn test_ramp_endpoints() {
        let field = ramp_field(11, 2, -5.0, 5.0);
        assert_eq!(field.values[0], -5.0);
        assert_eq!(field.values[10], 5.0);
    }

    #[test]
    fn test_swath_is_monotonic_along_track() {
        let swath = synthetic_swath(4, 4, 0.0, 0.0, 1.0);
        assert!(swath.lats[12] > swath.lats[0]);
        assert!(swath.lons[3] > swath.lons[0]);
    }
}
