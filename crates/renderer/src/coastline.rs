//! Coastline overlays from GeoJSON.
//!
//! The original gallery drew coastlines from its plotting toolkit's
//! bundled datasets. Here the geometry is an optional external GeoJSON
//! file (any of LineString, MultiLineString, Polygon, MultiPolygon,
//! standalone or inside a FeatureCollection); maps without one degrade to
//! graticule-only.

use std::path::Path;

use projection::MapRegion;
use serde_json::Value;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// One polyline in lon/lat degrees.
pub type GeoLine = Vec<(f64, f64)>;

/// Load line geometry from a GeoJSON file.
pub fn load_coastlines(path: &Path) -> RenderResult<Vec<GeoLine>> {
    let text = std::fs::read_to_string(path)?;
    let root: Value = serde_json::from_str(&text)?;

    let mut lines = Vec::new();
    collect_geometry(&root, &mut lines)?;

    if lines.is_empty() {
        return Err(RenderError::BadOverlay(format!(
            "no line geometry found in {}",
            path.display()
        )));
    }
    debug!(path = %path.display(), lines = lines.len(), "Loaded coastline overlay");
    Ok(lines)
}

fn collect_geometry(value: &Value, out: &mut Vec<GeoLine>) -> RenderResult<()> {
    let obj_type = value.get("type").and_then(Value::as_str).unwrap_or("");

    match obj_type {
        "FeatureCollection" => {
            if let Some(features) = value.get("features").and_then(Value::as_array) {
                for feature in features {
                    collect_geometry(feature, out)?;
                }
            }
        }
        "Feature" => {
            if let Some(geometry) = value.get("geometry") {
                collect_geometry(geometry, out)?;
            }
        }
        "GeometryCollection" => {
            if let Some(geoms) = value.get("geometries").and_then(Value::as_array) {
                for geom in geoms {
                    collect_geometry(geom, out)?;
                }
            }
        }
        "LineString" => {
            if let Some(coords) = value.get("coordinates") {
                out.push(parse_line(coords)?);
            }
        }
        "MultiLineString" | "Polygon" => {
            if let Some(parts) = value.get("coordinates").and_then(Value::as_array) {
                for part in parts {
                    out.push(parse_line(part)?);
                }
            }
        }
        "MultiPolygon" => {
            if let Some(polys) = value.get("coordinates").and_then(Value::as_array) {
                for poly in polys {
                    if let Some(rings) = poly.as_array() {
                        for ring in rings {
                            out.push(parse_line(ring)?);
                        }
                    }
                }
            }
        }
        other => {
            return Err(RenderError::BadOverlay(format!(
                "unsupported GeoJSON object type '{}'",
                other
            )));
        }
    }
    Ok(())
}

fn parse_line(coords: &Value) -> RenderResult<GeoLine> {
    let points = coords
        .as_array()
        .ok_or_else(|| RenderError::BadOverlay("coordinates are not an array".to_string()))?;

    let mut line = Vec::with_capacity(points.len());
    for point in points {
        let pair = point
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| RenderError::BadOverlay("coordinate is not a [lon, lat] pair".to_string()))?;
        let lon = pair[0].as_f64().unwrap_or(f64::NAN);
        let lat = pair[1].as_f64().unwrap_or(f64::NAN);
        line.push((lon, lat));
    }
    Ok(line)
}

/// Project geographic lines to pixel polylines within a map raster,
/// splitting where points leave the map or jump across the antimeridian.
pub fn project_lines(
    lines: &[GeoLine],
    region: &MapRegion,
    offset: (f32, f32),
) -> Vec<Vec<(f32, f32)>> {
    // A jump wider than a third of the raster means the segment wrapped
    // around rather than crossed the visible map
    let jump_limit = region.width as f64 / 3.0;

    let mut out = Vec::new();
    for line in lines {
        let mut current: Vec<(f32, f32)> = Vec::new();
        let mut last: Option<(f64, f64)> = None;

        for &(lon, lat) in line {
            match region.geo_to_pixel(lon, lat) {
                Some((px, py)) => {
                    if let Some((lx, _)) = last {
                        if (px - lx).abs() > jump_limit && current.len() > 1 {
                            out.push(std::mem::take(&mut current));
                        } else if (px - lx).abs() > jump_limit {
                            current.clear();
                        }
                    }
                    current.push((px as f32 + offset.0, py as f32 + offset.1));
                    last = Some((px, py));
                }
                None => {
                    if current.len() > 1 {
                        out.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                    last = None;
                }
            }
        }
        if current.len() > 1 {
            out.push(current);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use eos_common::BoundingBox;
    use projection::{PlateCarree, Projection};
    use std::io::Write;

    fn write_geojson(content: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(content.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn test_load_feature_collection() {
        let tmp = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[-10.0, 0.0], [10.0, 5.0]]
                    }
                }]
            }"#,
        );
        let lines = load_coastlines(tmp.path()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], vec![(-10.0, 0.0), (10.0, 5.0)]);
    }

    #[test]
    fn test_load_multipolygon() {
        let tmp = write_geojson(
            r#"{
                "type": "MultiPolygon",
                "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]]]
            }"#,
        );
        let lines = load_coastlines(tmp.path()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 4);
    }

    #[test]
    fn test_load_rejects_pointless_file() {
        let tmp = write_geojson(r#"{"type": "Point", "coordinates": [0, 0]}"#);
        assert!(load_coastlines(tmp.path()).is_err());
    }

    #[test]
    fn test_project_lines_splits_outside_map() {
        let region = MapRegion::new(
            Projection::Geographic(PlateCarree),
            BoundingBox::new(-10.0, -10.0, 10.0, 10.0),
            100,
            100,
        );
        // Middle point is outside the map extent
        let lines = vec![vec![(-5.0, 0.0), (-2.0, 0.0), (50.0, 0.0), (5.0, 0.0), (8.0, 0.0)]];
        let projected = project_lines(&lines, &region, (0.0, 0.0));
        assert_eq!(projected.len(), 2);
    }
}
