//! Resampling source grids and swaths onto output map rasters.
//!
//! Every output pixel is inverse-projected to lat/lon and sampled from the
//! source: bilinear for regular grids, nearest-neighbor through a bucketed
//! spatial index for swaths. Pixels that miss the data stay NaN.

use eos_common::{DataField, GeoGrid, Swath};
use tracing::debug;

use crate::transform::MapRegion;

/// Resample a field on a regular lat/lon grid onto a map raster.
pub fn resample_grid(field: &DataField, grid: &GeoGrid, region: &MapRegion) -> Vec<f32> {
    debug_assert_eq!(field.width, grid.nx);
    debug_assert_eq!(field.height, grid.ny);

    let mut out = vec![f32::NAN; region.width * region.height];

    for py in 0..region.height {
        for px in 0..region.width {
            if let Some((lon, lat)) = region.pixel_to_geo(px, py) {
                if let Some((i, j)) = grid.position_of(lon, lat) {
                    out[py * region.width + px] =
                        bilinear_sample(&field.values, field.width, field.height, i, j);
                }
            }
        }
    }

    out
}

/// Bilinear sample at fractional position (x, y), NaN-aware.
///
/// When any of the four surrounding cells is missing, falls back to the
/// nearest cell instead of bleeding NaN across a whole neighborhood.
pub fn bilinear_sample(values: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let x = x.clamp(0.0, (width - 1) as f64);
    let y = y.clamp(0.0, (height - 1) as f64);

    let x1 = x.floor() as usize;
    let y1 = y.floor() as usize;
    let x2 = (x1 + 1).min(width - 1);
    let y2 = (y1 + 1).min(height - 1);

    let dx = (x - x1 as f64) as f32;
    let dy = (y - y1 as f64) as f32;

    let v11 = values[y1 * width + x1];
    let v21 = values[y1 * width + x2];
    let v12 = values[y2 * width + x1];
    let v22 = values[y2 * width + x2];

    if v11.is_nan() || v21.is_nan() || v12.is_nan() || v22.is_nan() {
        // Nearest of the four corners
        let xi = if dx < 0.5 { x1 } else { x2 };
        let yi = if dy < 0.5 { y1 } else { y2 };
        return values[yi * width + xi];
    }

    let v1 = v11 * (1.0 - dx) + v21 * dx;
    let v2 = v12 * (1.0 - dx) + v22 * dx;
    v1 * (1.0 - dy) + v2 * dy
}

/// Bucketed nearest-neighbor index over swath geolocation.
///
/// Swath pixels are binned into a coarse lat/lon grid covering the swath
/// bounds; a nearest query searches outward ring by ring. Distances are in
/// degrees with the longitude difference scaled by cos(lat). Swaths that
/// cross the antimeridian get a bucket grid spanning the whole longitude
/// range, which is slower but still correct for the nearest search.
pub struct SwathIndex<'a> {
    swath: &'a Swath,
    buckets: Vec<Vec<u32>>,
    nx: usize,
    ny: usize,
    min_lon: f64,
    min_lat: f64,
    cell: f64,
}

impl<'a> SwathIndex<'a> {
    /// Build the index. Bucket size is chosen so buckets hold a handful of
    /// swath pixels each.
    pub fn build(swath: &'a Swath) -> Option<Self> {
        let bounds = swath.bounds()?;

        let area = (bounds.width() * bounds.height()).max(1e-6);
        let cell = (area / swath.len() as f64).sqrt().clamp(0.01, 5.0) * 2.0;

        let nx = ((bounds.width() / cell).ceil() as usize).max(1);
        let ny = ((bounds.height() / cell).ceil() as usize).max(1);

        let mut buckets = vec![Vec::new(); nx * ny];
        for (idx, (&lat, &lon)) in swath.lats.iter().zip(swath.lons.iter()).enumerate() {
            if !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            let bx = bucket_of(lon as f64, bounds.min_x, cell, nx);
            let by = bucket_of(lat as f64, bounds.min_y, cell, ny);
            buckets[by * nx + bx].push(idx as u32);
        }

        debug!(
            buckets = nx * ny,
            cell_deg = cell,
            points = swath.len(),
            "Built swath index"
        );

        Some(Self {
            swath,
            buckets,
            nx,
            ny,
            min_lon: bounds.min_x,
            min_lat: bounds.min_y,
            cell,
        })
    }

    /// Index of the nearest swath pixel within `max_dist_deg`, if any.
    pub fn nearest(&self, lon: f64, lat: f64, max_dist_deg: f64) -> Option<usize> {
        let bx = bucket_of(lon, self.min_lon, self.cell, self.nx) as isize;
        let by = bucket_of(lat, self.min_lat, self.cell, self.ny) as isize;

        let max_ring = (max_dist_deg / self.cell).ceil() as isize + 1;
        let cos_lat = lat.to_radians().cos().max(0.01);

        let mut best: Option<(f64, usize)> = None;
        let mut found_ring: Option<isize> = None;

        for ring in 0..=max_ring {
            // Once a hit exists, scan one extra ring for a closer point in
            // a diagonal bucket, then stop.
            if let Some(fr) = found_ring {
                if ring > fr + 1 {
                    break;
                }
            }

            for (cx, cy) in ring_buckets(bx, by, ring) {
                if cx < 0 || cy < 0 || cx >= self.nx as isize || cy >= self.ny as isize {
                    continue;
                }
                for &idx in &self.buckets[cy as usize * self.nx + cx as usize] {
                    let idx = idx as usize;
                    let dlat = self.swath.lats[idx] as f64 - lat;
                    let dlon = (self.swath.lons[idx] as f64 - lon) * cos_lat;
                    let d2 = dlat * dlat + dlon * dlon;
                    if best.map_or(true, |(b, _)| d2 < b) {
                        best = Some((d2, idx));
                        found_ring.get_or_insert(ring);
                    }
                }
            }
        }

        match best {
            Some((d2, idx)) if d2.sqrt() <= max_dist_deg => Some(idx),
            _ => None,
        }
    }
}

/// Resample swath data onto a map raster by nearest neighbor.
///
/// `search_radius_deg` bounds how far a map pixel may be from the nearest
/// swath pixel before it is left empty; it should be on the order of the
/// swath's own pixel spacing.
pub fn resample_swath(
    field: &DataField,
    swath: &Swath,
    region: &MapRegion,
    search_radius_deg: f64,
) -> Vec<f32> {
    debug_assert_eq!(field.width, swath.width);
    debug_assert_eq!(field.height, swath.height);

    let mut out = vec![f32::NAN; region.width * region.height];
    let index = match SwathIndex::build(swath) {
        Some(index) => index,
        None => return out,
    };

    for py in 0..region.height {
        for px in 0..region.width {
            if let Some((lon, lat)) = region.pixel_to_geo(px, py) {
                if let Some(idx) = index.nearest(lon, lat, search_radius_deg) {
                    out[py * region.width + px] = field.values[idx];
                }
            }
        }
    }

    out
}

fn bucket_of(v: f64, min: f64, cell: f64, n: usize) -> usize {
    (((v - min) / cell).floor().max(0.0) as usize).min(n - 1)
}

/// Bucket coordinates on the square ring at Chebyshev distance `ring`.
fn ring_buckets(cx: isize, cy: isize, ring: isize) -> Vec<(isize, isize)> {
    if ring == 0 {
        return vec![(cx, cy)];
    }
    let mut out = Vec::with_capacity((8 * ring) as usize);
    for dx in -ring..=ring {
        out.push((cx + dx, cy - ring));
        out.push((cx + dx, cy + ring));
    }
    for dy in (-ring + 1)..ring {
        out.push((cx - ring, cy + dy));
        out.push((cx + ring, cy + dy));
    }
    out
}
