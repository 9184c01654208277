//! Geolocation extraction: 2-D swath arrays and 1-D coordinate axes.

use eos_common::{BoundingBox, GeoGrid, Swath};
use tracing::warn;

use crate::decode::is_close;
use crate::error::{ReadError, ReadResult};
use crate::fields::read_raw;
use crate::file::ScienceFile;

/// A regular grid recovered from 1-D coordinate variables, plus the row
/// order the data arrays use.
#[derive(Debug, Clone)]
pub struct CoordinateGrid {
    pub grid: GeoGrid,
    /// True when the latitude axis ascends (row 0 is the southernmost);
    /// the caller must flip data rows to match the north-up grid.
    pub south_up: bool,
}

/// Read per-pixel swath geolocation from 2-D lat/lon variables.
///
/// Geolocation arrays carry their own fill values; anything outside the
/// valid lat/lon domain is replaced with NaN so downstream resampling
/// skips it.
pub fn read_swath_geolocation(
    file: &ScienceFile,
    lat_path: &str,
    lon_path: &str,
) -> ReadResult<Swath> {
    let lat = read_raw(file, lat_path)?;
    let lon = read_raw(file, lon_path)?;

    if lat.dims != lon.dims {
        return Err(ReadError::Shape {
            variable: lat_path.to_string(),
            message: format!(
                "lat dims {:?} do not match lon dims {:?}",
                lat.dims, lon.dims
            ),
        });
    }
    let (width, height) = match lat.dims.as_slice() {
        [h, w] => (*w, *h),
        other => {
            return Err(ReadError::Shape {
                variable: lat_path.to_string(),
                message: format!("expected 2-D geolocation, got dims {:?}", other),
            })
        }
    };

    let lats: Vec<f32> = lat.values.iter().map(|&v| sanitize(v, 90.0)).collect();
    let lons: Vec<f32> = lon.values.iter().map(|&v| sanitize(v, 180.0)).collect();

    Swath::new(lats, lons, width, height).map_err(|e| ReadError::Shape {
        variable: lat_path.to_string(),
        message: e.to_string(),
    })
}

/// Recover a regular grid from 1-D `lat`/`lon` coordinate variables.
///
/// Cell-center registration: the bounding box extends half a step beyond
/// the first and last centers. Non-uniform spacing is accepted with a
/// warning; the original products in scope all use uniform axes.
pub fn read_coordinate_axes(
    file: &ScienceFile,
    lat_path: &str,
    lon_path: &str,
) -> ReadResult<CoordinateGrid> {
    let lat = read_axis(file, lat_path)?;
    let lon = read_axis(file, lon_path)?;

    let south_up = lat.first() < lat.last();

    let lat_step = axis_step(&lat, lat_path);
    let lon_step = axis_step(&lon, lon_path);

    let (lat_lo, lat_hi) = min_max(&lat);
    let (lon_lo, lon_hi) = min_max(&lon);

    let bbox = BoundingBox::new(
        lon_lo - lon_step / 2.0,
        lat_lo - lat_step / 2.0,
        lon_hi + lon_step / 2.0,
        lat_hi + lat_step / 2.0,
    );

    Ok(CoordinateGrid {
        grid: GeoGrid::new(bbox, lon.len(), lat.len()),
        south_up,
    })
}

struct Axis {
    values: Vec<f64>,
}

impl Axis {
    fn first(&self) -> f64 {
        self.values[0]
    }
    fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
    fn len(&self) -> usize {
        self.values.len()
    }
}

fn read_axis(file: &ScienceFile, path: &str) -> ReadResult<Axis> {
    let raw = read_raw(file, path)?;
    if raw.dims.len() != 1 || raw.values.len() < 2 {
        return Err(ReadError::Shape {
            variable: path.to_string(),
            message: format!("expected a 1-D coordinate axis, got dims {:?}", raw.dims),
        });
    }
    Ok(Axis { values: raw.values })
}

/// Mean absolute step, warning when the axis is not uniform.
fn axis_step(axis: &Axis, path: &str) -> f64 {
    let n = axis.len();
    let mean = (axis.last() - axis.first()).abs() / (n - 1) as f64;

    let first_step = (axis.values[1] - axis.values[0]).abs();
    if !is_close(first_step, mean, 1e-3) {
        warn!(
            variable = path,
            first_step,
            mean_step = mean,
            "Coordinate axis is not uniform; using mean spacing"
        );
    }
    mean
}

fn min_max(axis: &Axis) -> (f64, f64) {
    (
        axis.first().min(axis.last()),
        axis.first().max(axis.last()),
    )
}

/// NaN out geolocation fill values (|value| beyond the domain bound).
fn sanitize(v: f64, bound: f64) -> f32 {
    if v.is_finite() && v.abs() <= bound {
        v as f32
    } else {
        f32::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(45.0, 90.0), 45.0);
        assert!(sanitize(-999.9, 90.0).is_nan());
        assert!(sanitize(f64::NAN, 90.0).is_nan());
        assert_eq!(sanitize(180.0, 180.0), 180.0);
        assert!(sanitize(200.0, 180.0).is_nan());
    }

    #[test]
    fn test_axis_step_uniform() {
        let axis = Axis {
            values: vec![-179.5, -178.5, -177.5],
        };
        assert!((axis_step(&axis, "lon") - 1.0).abs() < 1e-12);
    }
}
