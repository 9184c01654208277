//! The generic five-step pipeline: open, read, decode, render, write.
//!
//! Every product goes through the same sequence; all product-specific
//! knowledge comes from the catalog entry.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info_span, warn};

use eos_common::{BoundingBox, DataField, GeoGrid, PlotError, Swath, UnitConversion};
use product_catalog::{
    Catalog, CombineOp, ConventionSpec, FieldSpec, GeolocationSpec, Hemisphere, PlotKind,
    ProductSpec, ProjectionSpec,
};
use product_reader::{
    extract_field, read_coordinate_axes, read_swath_geolocation, DecodeRules, FieldRequest,
    ScaleConvention, ScienceFile,
};
use projection::{
    resample_grid, resample_swath, MapRegion, PlateCarree, PolarStereographic, Projection,
    Sinusoidal, SinusoidalGrid,
};
use renderer::{
    coastline::load_coastlines, png, render_map, render_profile, Colormap, MapPlotConfig,
    ProfileConfig, StyleConfig,
};

/// Invocation-level settings shared by all products in a batch.
pub struct RenderOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// CLI coastline, overriding per-product settings.
    pub coastline_override: Option<PathBuf>,
    pub font: Option<renderer::SharedFont>,
}

/// Render one product to a PNG, returning the output path.
pub fn render_product(
    catalog: &Catalog,
    spec: &ProductSpec,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let span = info_span!("render", product = %spec.id);
    let _guard = span.enter();

    let input = options.input_dir.join(&spec.filename);
    let file = ScienceFile::open(&input)
        .with_context(|| format!("opening {}", input.display()))?;
    debug!(format = %file.format(), "Opened input");

    let mut field = read_fields(&file, spec)?;
    apply_unit_conversion(&mut field, spec.unit_conversion);

    if field.finite_range().is_none() {
        return Err(PlotError::NoValidData(field.name.clone()).into());
    }
    debug!(
        valid = %format!("{:.1}%", field.valid_fraction() * 100.0),
        range = ?field.finite_range(),
        "Decoded field"
    );

    let canvas = match spec.plot.kind {
        PlotKind::Map => plot_map(catalog, spec, &file, &field, options)?,
        PlotKind::Profile => plot_profile(spec, &file, &field, options)?,
    };

    let (pixels, width, height) = canvas.into_rgba();
    let png_bytes = png::encode_auto(&pixels, width, height, concat!("eosplot ", env!("CARGO_PKG_VERSION")))
        .context("encoding PNG")?;

    let output = options.output_dir.join(spec.output_name());
    std::fs::write(&output, &png_bytes)
        .with_context(|| format!("writing {}", output.display()))?;

    Ok(output)
}

// =============================================================================
// Reading
// =============================================================================

fn to_request(field: &FieldSpec) -> FieldRequest {
    FieldRequest {
        path: field.path.clone(),
        slices: field.slices.iter().map(|s| (s.axis, s.index)).collect(),
        transpose: field.transpose,
        rules: DecodeRules {
            convention: match field.convention {
                ConventionSpec::Cf => ScaleConvention::CfPacked,
                ConventionSpec::HdfEos => ScaleConvention::HdfEos,
            },
            fill_value: field.fill_value,
            scale_factor: field.scale_factor,
            add_offset: field.add_offset,
            valid_range: field.valid_range.map(|[lo, hi]| (lo, hi)),
        },
    }
}

/// Read the product's one or two fields and combine them.
fn read_fields(file: &ScienceFile, spec: &ProductSpec) -> Result<DataField> {
    let first = extract_field(file, &to_request(&spec.fields[0]))
        .with_context(|| format!("reading {}", spec.fields[0].path))?;

    let Some(op) = spec.combine else {
        return Ok(first);
    };
    let second = extract_field(file, &to_request(&spec.fields[1]))
        .with_context(|| format!("reading {}", spec.fields[1].path))?;

    combine_fields(first, &second, op)
}

fn combine_fields(mut a: DataField, b: &DataField, op: CombineOp) -> Result<DataField> {
    if a.width != b.width || a.height != b.height {
        return Err(PlotError::DataShape {
            variable: b.name.clone(),
            message: format!(
                "cannot combine {}x{} with {}x{}",
                a.width, a.height, b.width, b.height
            ),
        }
        .into());
    }

    for (va, &vb) in a.values.iter_mut().zip(b.values.iter()) {
        *va = match op {
            CombineOp::Difference => *va - vb,
            CombineOp::Magnitude => va.hypot(vb),
        };
    }

    if op == CombineOp::Magnitude {
        a.name = format!("|({}, {})|", a.name, b.name);
        a.long_name = None;
    }
    Ok(a)
}

fn apply_unit_conversion(field: &mut DataField, conv: UnitConversion) {
    if conv == UnitConversion::None {
        return;
    }
    let native = field.units.clone().unwrap_or_default();
    field.map_values(|v| conv.apply(v));
    field.units = Some(conv.display_units(&native).to_string());
}

// =============================================================================
// Map plots
// =============================================================================

/// The data's location on Earth, in the two shapes resampling understands.
enum Geolocation {
    Grid(GeoGrid),
    Swath(Swath),
}

fn resolve_geolocation(
    file: &ScienceFile,
    spec: &ProductSpec,
    field: &mut DataField,
) -> Result<Geolocation> {
    let geolocation = spec
        .geolocation
        .as_ref()
        .expect("validated: map products carry a geolocation");
    match geolocation {
        GeolocationSpec::Regular { bbox, south_up } => {
            let bbox = BoundingBox::from_corner_string(bbox)?;
            if *south_up {
                flip_rows(field);
            }
            Ok(Geolocation::Grid(GeoGrid::new(bbox, field.width, field.height)))
        }
        GeolocationSpec::Coordinates { lat, lon } => {
            let coords = read_coordinate_axes(file, lat, lon)?;
            if coords.grid.nx != field.width || coords.grid.ny != field.height {
                bail!(
                    "coordinate axes {}x{} do not match field {}x{}",
                    coords.grid.nx, coords.grid.ny, field.width, field.height
                );
            }
            if coords.south_up {
                flip_rows(field);
            }
            Ok(Geolocation::Grid(coords.grid))
        }
        GeolocationSpec::Swath { lat, lon } => {
            let swath = read_swath_geolocation(file, lat, lon)?;
            if swath.width != field.width || swath.height != field.height {
                bail!(
                    "geolocation {}x{} does not match field {}x{}",
                    swath.width, swath.height, field.width, field.height
                );
            }
            Ok(Geolocation::Swath(swath))
        }
        GeolocationSpec::Sinusoidal {
            upper_left,
            lower_right,
        } => {
            let grid = SinusoidalGrid {
                projection: Sinusoidal::modis(),
                upper_left: (upper_left[0], upper_left[1]),
                lower_right: (lower_right[0], lower_right[1]),
                nx: field.width,
                ny: field.height,
            };
            Ok(Geolocation::Swath(grid.to_swath()))
        }
    }
}

fn build_projection(spec: &ProjectionSpec) -> Projection {
    match spec {
        ProjectionSpec::Geographic => Projection::Geographic(PlateCarree),
        ProjectionSpec::PolarStereographic {
            central_lon,
            bounding_lat,
            hemisphere,
        } => {
            let proj = match hemisphere {
                Hemisphere::North => PolarStereographic::north(*central_lon, *bounding_lat),
                Hemisphere::South => PolarStereographic::south(*central_lon, *bounding_lat),
            };
            Projection::PolarStereographic(proj)
        }
        ProjectionSpec::Sinusoidal { central_lon } => Projection::Sinusoidal(Sinusoidal {
            central_lon: *central_lon,
            radius: projection::MODIS_SPHERE_RADIUS_M,
        }),
    }
}

/// The projected extent the map raster covers.
fn map_extent(
    projection: &Projection,
    plot_bbox: Option<&String>,
    geolocation: &Geolocation,
) -> Result<BoundingBox> {
    // An explicit plot bbox wins; otherwise the data's own bounds
    let geo_bbox = match plot_bbox {
        Some(s) => Some(BoundingBox::from_corner_string(s)?),
        None => match geolocation {
            Geolocation::Grid(grid) => Some(grid.bbox),
            Geolocation::Swath(swath) => swath.bounds(),
        },
    };

    match projection {
        // Polar maps default to the full bounding-latitude circle
        Projection::PolarStereographic(p) => match plot_bbox {
            None => Ok(p.extent()),
            Some(_) => {
                let geo = geo_bbox.ok_or_else(|| anyhow!("no geographic bounds"))?;
                projection
                    .projected_bounds(&geo)
                    .ok_or_else(|| anyhow!("plot bbox projects entirely off the map"))
            }
        },
        _ => {
            let geo = geo_bbox.ok_or_else(|| {
                PlotError::MissingGeolocation("no finite geolocation points".to_string())
            })?;
            projection
                .projected_bounds(&geo)
                .ok_or_else(|| anyhow!("data bounds project entirely off the map"))
        }
    }
}

fn plot_map(
    catalog: &Catalog,
    spec: &ProductSpec,
    file: &ScienceFile,
    field: &DataField,
    options: &RenderOptions,
) -> Result<renderer::Canvas> {
    let mut field = field.clone();
    let geolocation = resolve_geolocation(file, spec, &mut field)?;

    let projection = build_projection(&spec.plot.projection);
    let extent = map_extent(&projection, spec.plot.bbox.as_ref(), &geolocation)?;
    let region = MapRegion::with_aspect(projection, extent, spec.plot.width);

    let values = match &geolocation {
        Geolocation::Grid(grid) => resample_grid(&field, grid, &region),
        Geolocation::Swath(swath) => {
            resample_swath(&field, swath, &region, spec.plot.search_radius_deg)
        }
    };

    let cmap = build_colormap(catalog, spec, &field)?;
    let coastlines = load_overlay(catalog, spec, options);

    let cfg = MapPlotConfig {
        title: spec.title.clone(),
        colorbar_label: field.display_label(),
        coastlines,
        font: options.font.clone(),
    };
    Ok(render_map(&values, &region, &cmap, &cfg)?)
}

fn build_colormap(catalog: &Catalog, spec: &ProductSpec, field: &DataField) -> Result<Colormap> {
    match &spec.plot.style_file {
        Some(rel) => {
            let path = catalog.resolve_path(rel);
            let config = StyleConfig::from_file(&path)
                .with_context(|| format!("loading style {}", path.display()))?;
            let style = config.resolve(spec.plot.style.as_deref())?;
            Ok(Colormap::from_style(style)?)
        }
        None => {
            let (lo, hi) = field
                .finite_range()
                .ok_or_else(|| anyhow!("no finite data for fallback colormap"))?;
            warn!(product = %spec.id, "No style configured; using fallback gradient");
            Ok(Colormap::fallback(lo, hi))
        }
    }
}

fn load_overlay(
    catalog: &Catalog,
    spec: &ProductSpec,
    options: &RenderOptions,
) -> Option<Vec<renderer::coastline::GeoLine>> {
    let path: Option<PathBuf> = options
        .coastline_override
        .clone()
        .or_else(|| spec.plot.coastline.as_ref().map(|rel| catalog.resolve_path(rel)));

    let path = path?;
    match load_coastlines(&path) {
        Ok(lines) => Some(lines),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Coastline overlay unavailable");
            None
        }
    }
}

// =============================================================================
// Profile plots
// =============================================================================

fn plot_profile(
    spec: &ProductSpec,
    file: &ScienceFile,
    field: &DataField,
    options: &RenderOptions,
) -> Result<renderer::Canvas> {
    let vertical_spec = spec
        .plot
        .vertical
        .as_ref()
        .expect("validated: profile plots carry a vertical spec");

    if field.height != 1 {
        bail!(
            "profile field '{}' is {}x{}; slice it down to one column",
            field.name, field.width, field.height
        );
    }

    let vertical = extract_field(
        file,
        &FieldRequest {
            path: vertical_spec.path.clone(),
            ..Default::default()
        },
    )
    .with_context(|| format!("reading vertical coordinate {}", vertical_spec.path))?;

    if vertical.values.len() != field.values.len() {
        bail!(
            "vertical coordinate has {} levels but the profile has {}",
            vertical.values.len(),
            field.values.len()
        );
    }

    let cfg = ProfileConfig {
        title: spec.title.clone(),
        x_label: field.display_label(),
        y_label: vertical_spec
            .label
            .clone()
            .unwrap_or_else(|| vertical.display_label()),
        invert_y: vertical_spec.invert,
        width: spec.plot.width,
        height: spec.plot.width,
        font: options.font.clone(),
    };

    Ok(render_profile(&field.values, &vertical.values, &cfg)?)
}

/// Flip data rows in place (south-up storage to north-up grid order).
fn flip_rows(field: &mut DataField) {
    let w = field.width;
    let h = field.height;
    for j in 0..h / 2 {
        for i in 0..w {
            field.values.swap(j * w + i, (h - 1 - j) * w + i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_rows() {
        let mut field = DataField::new("t", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        flip_rows(&mut field);
        assert_eq!(field.values, vec![5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_combine_magnitude() {
        let a = DataField::new("u", vec![3.0, f32::NAN], 2, 1);
        let b = DataField::new("v", vec![4.0, 1.0], 2, 1);
        let out = combine_fields(a, &b, CombineOp::Magnitude).unwrap();
        assert_eq!(out.values[0], 5.0);
        assert!(out.values[1].is_nan());
    }

    #[test]
    fn test_combine_difference() {
        let a = DataField::new("day", vec![10.0], 1, 1);
        let b = DataField::new("night", vec![4.0], 1, 1);
        let out = combine_fields(a, &b, CombineOp::Difference).unwrap();
        assert_eq!(out.values[0], 6.0);
    }

    #[test]
    fn test_combine_shape_mismatch() {
        let a = DataField::new("u", vec![0.0; 4], 2, 2);
        let b = DataField::new("v", vec![0.0; 2], 2, 1);
        assert!(combine_fields(a, &b, CombineOp::Difference).is_err());
    }

    #[test]
    fn test_unit_conversion_updates_label() {
        let mut field = DataField::new("T", vec![273.15], 1, 1);
        field.units = Some("K".to_string());
        apply_unit_conversion(&mut field, UnitConversion::KToC);
        assert!((field.values[0]).abs() < 1e-4);
        assert_eq!(field.units.as_deref(), Some("C"));
    }
}
