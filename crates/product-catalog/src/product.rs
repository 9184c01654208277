//! Product definition schema.

use eos_common::{BoundingBox, UnitConversion};
use serde::Deserialize;

/// One product definition: everything the generic pipeline needs to turn
/// one input file into one plot.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSpec {
    /// Unique product id, used for lookup and logging.
    pub id: String,
    /// Figure title.
    pub title: String,
    /// Input file name, resolved against the input directory.
    pub filename: String,
    /// One or two datasets to read. Two require a `combine` op.
    pub fields: Vec<FieldSpec>,
    /// How to merge two fields into one.
    #[serde(default)]
    pub combine: Option<CombineOp>,
    /// Display unit conversion applied after decoding.
    #[serde(default)]
    pub unit_conversion: UnitConversion,
    /// Where the data sits on the Earth. Required for map plots.
    #[serde(default)]
    pub geolocation: Option<GeolocationSpec>,
    /// What to draw.
    pub plot: PlotSpec,
    /// Output file name override; default is `<filename>.png`.
    #[serde(default)]
    pub output: Option<String>,
}

/// One dataset to read and decode.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// `/`-separated dataset path inside the file.
    pub path: String,
    /// Packing convention recovering physical units.
    #[serde(default)]
    pub convention: ConventionSpec,
    /// Axis selections applied in order (3-D -> 2-D -> 1-D).
    #[serde(default)]
    pub slices: Vec<SliceSpec>,
    /// Swap rows and columns (for `[x, y]`-ordered storage).
    #[serde(default)]
    pub transpose: bool,
    /// Overrides for wrong or missing file attributes.
    #[serde(default)]
    pub fill_value: Option<f64>,
    #[serde(default)]
    pub scale_factor: Option<f64>,
    #[serde(default)]
    pub add_offset: Option<f64>,
    #[serde(default)]
    pub valid_range: Option<[f64; 2]>,
}

/// Scale/offset convention names as written in product YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConventionSpec {
    /// `physical = raw * scale + offset`
    #[default]
    Cf,
    /// `physical = (raw - offset) * scale`
    HdfEos,
}

/// One axis selection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SliceSpec {
    pub axis: usize,
    pub index: usize,
}

/// How to merge two decoded fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineOp {
    /// `a - b`
    Difference,
    /// `sqrt(a^2 + b^2)`, e.g. wind speed from components
    Magnitude,
}

/// Where the geolocation comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeolocationSpec {
    /// The data is a regular lat/lon grid covering `bbox`
    /// ("minlon,minlat,maxlon,maxlat"), north row first unless `south_up`.
    Regular {
        bbox: String,
        #[serde(default)]
        south_up: bool,
    },
    /// 1-D `lat`/`lon` coordinate variables describe a regular grid.
    Coordinates { lat: String, lon: String },
    /// 2-D per-pixel geolocation variables (swath products).
    Swath { lat: String, lon: String },
    /// A sinusoidal raster described by its projected corner coordinates
    /// in meters (MODIS tiles and grids).
    Sinusoidal {
        upper_left: [f64; 2],
        lower_right: [f64; 2],
    },
}

/// Map projection selection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionSpec {
    #[default]
    Geographic,
    PolarStereographic {
        #[serde(default)]
        central_lon: f64,
        bounding_lat: f64,
        hemisphere: Hemisphere,
    },
    Sinusoidal {
        #[serde(default)]
        central_lon: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    North,
    South,
}

/// Plot kind and layout.
#[derive(Debug, Clone, Deserialize)]
pub struct PlotSpec {
    pub kind: PlotKind,
    #[serde(default)]
    pub projection: ProjectionSpec,
    /// Geographic extent override ("minlon,minlat,maxlon,maxlat");
    /// defaults to the data's own bounds.
    #[serde(default)]
    pub bbox: Option<String>,
    /// Output raster width in pixels (maps) or figure width (profiles).
    #[serde(default = "default_width")]
    pub width: usize,
    /// Style JSON path relative to the config directory.
    #[serde(default)]
    pub style_file: Option<String>,
    /// Style name within the file; defaults to the file's single style.
    #[serde(default)]
    pub style: Option<String>,
    /// Coastline GeoJSON path relative to the config directory.
    #[serde(default)]
    pub coastline: Option<String>,
    /// Swath resampling search radius in degrees.
    #[serde(default = "default_search_radius")]
    pub search_radius_deg: f64,
    /// Vertical coordinate for profile plots.
    #[serde(default)]
    pub vertical: Option<VerticalSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Map,
    Profile,
}

/// The vertical coordinate of a profile plot.
#[derive(Debug, Clone, Deserialize)]
pub struct VerticalSpec {
    /// Dataset path of the vertical coordinate variable.
    pub path: String,
    /// Axis caption; defaults to the variable's own label.
    #[serde(default)]
    pub label: Option<String>,
    /// Flip so the largest value (surface pressure) sits at the bottom.
    #[serde(default)]
    pub invert: bool,
}

fn default_width() -> usize {
    1000
}

fn default_search_radius() -> f64 {
    0.5
}

impl ProductSpec {
    /// Output file name: explicit override or `<filename>.png`.
    pub fn output_name(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("{}.png", self.filename))
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("empty product id".to_string());
        }
        if self.filename.trim().is_empty() {
            return Err("empty input filename".to_string());
        }

        match (self.fields.len(), self.combine) {
            (0, _) => return Err("no fields defined".to_string()),
            (1, Some(_)) => return Err("combine op given but only one field".to_string()),
            (2, None) => return Err("two fields need a combine op".to_string()),
            (1, None) | (2, Some(_)) => {}
            (n, _) => return Err(format!("{} fields; at most two are supported", n)),
        }

        if self.plot.width < 64 || self.plot.width > 8192 {
            return Err(format!("plot width {} out of range [64, 8192]", self.plot.width));
        }

        if let Some(bbox) = &self.plot.bbox {
            BoundingBox::from_corner_string(bbox).map_err(|e| format!("plot bbox: {}", e))?;
        }
        if let Some(GeolocationSpec::Regular { bbox, .. }) = &self.geolocation {
            BoundingBox::from_corner_string(bbox).map_err(|e| format!("geolocation bbox: {}", e))?;
        }

        match self.plot.kind {
            PlotKind::Profile => {
                if self.plot.vertical.is_none() {
                    return Err("profile plot needs a vertical coordinate".to_string());
                }
            }
            PlotKind::Map => {
                if self.geolocation.is_none() {
                    return Err("map plot needs a geolocation".to_string());
                }
                if matches!(self.plot.projection, ProjectionSpec::PolarStereographic { bounding_lat, hemisphere, .. }
                    if (hemisphere == Hemisphere::North && bounding_lat <= 0.0)
                        || (hemisphere == Hemisphere::South && bounding_lat >= 0.0))
                {
                    return Err("polar stereographic bounding_lat is in the wrong hemisphere".to_string());
                }
            }
        }

        if self.plot.search_radius_deg <= 0.0 || self.plot.search_radius_deg > 30.0 {
            return Err(format!(
                "search_radius_deg {} out of range (0, 30]",
                self.plot.search_radius_deg
            ));
        }

        Ok(())
    }
}
