//! Map plot composition.
//!
//! Lays out the annotated figure around a resampled data raster: title,
//! graticule with degree labels, optional coastline overlay, and a
//! horizontal colorbar with nice-number ticks.

use eos_common::BoundingBox;
use projection::{MapRegion, Projection};
use rusttype::Font;
use std::sync::Arc;
use tracing::debug;

use crate::canvas::{Anchor, Canvas};
use crate::coastline::{project_lines, GeoLine};
use crate::colormap::Colormap;
use crate::error::RenderResult;
use crate::ticks::{format_tick, graticule_spacing, nice_ticks};

const MARGIN_LEFT: usize = 64;
const MARGIN_RIGHT: usize = 28;
const MARGIN_TOP: usize = 46;
const MARGIN_BOTTOM: usize = 96;

const COLOR_BG: [u8; 4] = [255, 255, 255, 255];
const COLOR_FRAME: [u8; 4] = [40, 40, 40, 255];
const COLOR_TEXT: [u8; 4] = [20, 20, 20, 255];
const COLOR_GRATICULE: [u8; 4] = [110, 110, 110, 140];
const COLOR_COAST: [u8; 4] = [30, 30, 30, 255];
const COLOR_SEA: [u8; 4] = [235, 239, 243, 255];

/// Annotation settings for a map plot.
pub struct MapPlotConfig {
    /// Figure title, drawn centered above the map.
    pub title: String,
    /// Colorbar caption, typically `long_name (units)`.
    pub colorbar_label: String,
    /// Coastline geometry in lon/lat, already loaded.
    pub coastlines: Option<Vec<GeoLine>>,
    /// Font for all text; None renders a text-free figure.
    pub font: Option<Arc<Font<'static>>>,
}

/// Render a resampled raster into a finished map figure.
///
/// `values` must have `region.width * region.height` entries, NaN where
/// the map has no data.
pub fn render_map(
    values: &[f32],
    region: &MapRegion,
    cmap: &Colormap,
    cfg: &MapPlotConfig,
) -> RenderResult<Canvas> {
    debug_assert_eq!(values.len(), region.width * region.height);

    let fig_w = MARGIN_LEFT + region.width + MARGIN_RIGHT;
    let fig_h = MARGIN_TOP + region.height + MARGIN_BOTTOM;
    let mut canvas = Canvas::new(fig_w, fig_h, COLOR_BG)?;
    let font = cfg.font.as_deref();

    debug!(
        figure = %format!("{}x{}", fig_w, fig_h),
        raster = %format!("{}x{}", region.width, region.height),
        "Composing map figure"
    );

    // Map body: neutral background where data is missing, then the data
    canvas.fill_rect(MARGIN_LEFT, MARGIN_TOP, region.width, region.height, COLOR_SEA);
    canvas.paste_values(MARGIN_LEFT, MARGIN_TOP, values, region.width, region.height, cmap);

    draw_graticule(&mut canvas, region, font);

    if let Some(lines) = &cfg.coastlines {
        let pixel_lines = project_lines(lines, region, (MARGIN_LEFT as f32, MARGIN_TOP as f32));
        canvas.draw_polylines(&pixel_lines, COLOR_COAST, 1.0);
    }

    canvas.draw_rect(MARGIN_LEFT, MARGIN_TOP, region.width, region.height, COLOR_FRAME);

    canvas.draw_text(
        font,
        &cfg.title,
        (fig_w / 2) as i32,
        12,
        17.0,
        COLOR_TEXT,
        Anchor::Center,
    );

    draw_colorbar(&mut canvas, region, cmap, &cfg.colorbar_label, font);

    Ok(canvas)
}

/// Geographic extent covered by the raster, from a coarse inverse-projection
/// sweep. Projections with curved outlines (polar, sinusoidal) have no
/// rectangular lat/lon extent, so this is the covering box.
fn geographic_extent(region: &MapRegion) -> Option<BoundingBox> {
    let mut bbox = BoundingBox::empty();
    let step = (region.width.max(region.height) / 32).max(1);
    for py in (0..region.height).step_by(step) {
        for px in (0..region.width).step_by(step) {
            if let Some((lon, lat)) = region.pixel_to_geo(px, py) {
                bbox.expand_to(lon, lat);
            }
        }
    }
    if bbox.is_empty() {
        None
    } else {
        Some(bbox)
    }
}

fn draw_graticule(canvas: &mut Canvas, region: &MapRegion, font: Option<&Font<'static>>) {
    let geo = match geographic_extent(region) {
        Some(b) => b,
        None => return,
    };

    let lon_step = graticule_spacing(geo.width());
    let lat_step = graticule_spacing(geo.height());
    let offset = (MARGIN_LEFT as f32, MARGIN_TOP as f32);

    let mut lines: Vec<GeoLine> = Vec::new();

    // Meridians sampled along latitude, parallels along longitude
    let mut lon = (geo.min_x / lon_step).ceil() * lon_step;
    while lon <= geo.max_x {
        let line: GeoLine = sample_range(geo.min_y, geo.max_y, 181)
            .into_iter()
            .map(|lat| (lon, lat))
            .collect();
        lines.push(line);
        lon += lon_step;
    }
    let mut lat = (geo.min_y / lat_step).ceil() * lat_step;
    while lat <= geo.max_y {
        let line: GeoLine = sample_range(geo.min_x, geo.max_x, 361)
            .into_iter()
            .map(|lon| (lon, lat))
            .collect();
        lines.push(line);
        lat += lat_step;
    }

    let pixel_lines = project_lines(&lines, region, offset);
    canvas.draw_polylines(&pixel_lines, COLOR_GRATICULE, 1.0);

    // Degree labels only make sense where the graticule meets the frame at
    // fixed positions, i.e. the equirectangular case
    if matches!(region.projection, Projection::Geographic(_)) {
        let mut lon = (geo.min_x / lon_step).ceil() * lon_step;
        while lon <= geo.max_x {
            if let Some((px, _)) = region.geo_to_pixel(lon, geo.center().1) {
                canvas.draw_text(
                    font,
                    &format_degrees(lon, true),
                    MARGIN_LEFT as i32 + px as i32,
                    (MARGIN_TOP + region.height + 4) as i32,
                    11.0,
                    COLOR_TEXT,
                    Anchor::Center,
                );
            }
            lon += lon_step;
        }
        let mut lat = (geo.min_y / lat_step).ceil() * lat_step;
        while lat <= geo.max_y {
            if let Some((_, py)) = region.geo_to_pixel(geo.center().0, lat) {
                canvas.draw_text(
                    font,
                    &format_degrees(lat, false),
                    MARGIN_LEFT as i32 - 6,
                    MARGIN_TOP as i32 + py as i32 - 6,
                    11.0,
                    COLOR_TEXT,
                    Anchor::Right,
                );
            }
            lat += lat_step;
        }
    }
}

fn sample_range(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

fn format_degrees(value: f64, is_lon: bool) -> String {
    let suffix = if is_lon {
        if value < 0.0 {
            "W"
        } else if value > 0.0 {
            "E"
        } else {
            ""
        }
    } else if value < 0.0 {
        "S"
    } else if value > 0.0 {
        "N"
    } else {
        ""
    };
    let magnitude = value.abs();
    if magnitude.fract() == 0.0 {
        format!("{}{}", magnitude as i64, suffix)
    } else {
        format!("{:.1}{}", magnitude, suffix)
    }
}

fn draw_colorbar(
    canvas: &mut Canvas,
    region: &MapRegion,
    cmap: &Colormap,
    label: &str,
    font: Option<&Font<'static>>,
) {
    let bar_w = region.width;
    let bar_h = 14usize;
    let bar_x = MARGIN_LEFT;
    let bar_y = MARGIN_TOP + region.height + 26;

    for x in 0..bar_w {
        let norm = x as f32 / (bar_w - 1).max(1) as f32;
        let (r, g, b, a) = cmap.color_at_norm(norm);
        canvas.fill_rect(bar_x + x, bar_y, 1, bar_h, [r, g, b, a]);
    }
    canvas.draw_rect(bar_x, bar_y, bar_w, bar_h, COLOR_FRAME);

    for tick in nice_ticks(cmap.vmin, cmap.vmax, 6) {
        let norm = (tick - cmap.vmin) / (cmap.vmax - cmap.vmin);
        let x = bar_x + (norm * (bar_w - 1) as f32).round() as usize;
        canvas.fill_rect(x, bar_y + bar_h, 1, 4, COLOR_FRAME);
        canvas.draw_text(
            font,
            &format_tick(tick),
            x as i32,
            (bar_y + bar_h + 6) as i32,
            11.0,
            COLOR_TEXT,
            Anchor::Center,
        );
    }

    canvas.draw_text(
        font,
        label,
        (bar_x + bar_w / 2) as i32,
        (bar_y + bar_h + 24) as i32,
        12.0,
        COLOR_TEXT,
        Anchor::Center,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use eos_common::BoundingBox;
    use projection::PlateCarree;

    #[test]
    fn test_render_map_produces_figure() {
        let region = MapRegion::new(
            Projection::Geographic(PlateCarree),
            BoundingBox::global(),
            180,
            90,
        );
        let field = test_utils::gaussian_field(180, 90, 10.0);
        let cmap = Colormap::fallback(0.0, 10.0);
        let cfg = MapPlotConfig {
            title: "Synthetic".to_string(),
            colorbar_label: "value".to_string(),
            coastlines: None,
            font: None,
        };

        let canvas = render_map(&field.values, &region, &cmap, &cfg).unwrap();
        assert_eq!(canvas.width(), MARGIN_LEFT + 180 + MARGIN_RIGHT);
        assert_eq!(canvas.height(), MARGIN_TOP + 90 + MARGIN_BOTTOM);

        // The figure must not be blank: the data bump puts non-background
        // pixels inside the map body
        let bytes = canvas.as_rgba();
        let non_white = bytes
            .chunks_exact(4)
            .filter(|px| px[0] != 255 || px[1] != 255 || px[2] != 255)
            .count();
        assert!(non_white > 1000);
    }

    #[test]
    fn test_geographic_extent_covers_bbox() {
        let region = MapRegion::new(
            Projection::Geographic(PlateCarree),
            BoundingBox::new(-40.0, 10.0, 20.0, 50.0),
            120,
            80,
        );
        let geo = geographic_extent(&region).unwrap();
        assert!(geo.min_x >= -40.0 && geo.max_x <= 20.0);
        assert!(geo.min_y >= 10.0 && geo.max_y <= 50.0);
        assert!(geo.width() > 50.0);
    }

    #[test]
    fn test_format_degrees() {
        assert_eq!(format_degrees(-120.0, true), "120W");
        assert_eq!(format_degrees(45.0, false), "45N");
        assert_eq!(format_degrees(0.0, true), "0");
        assert_eq!(format_degrees(-2.5, false), "2.5S");
    }
}
