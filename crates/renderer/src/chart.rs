//! Vertical profile charts.
//!
//! A profile plot draws an extracted 1-D column (temperature, ozone, ...)
//! against its vertical coordinate. Pressure axes render inverted so the
//! surface sits at the bottom of the figure.

use rusttype::Font;
use std::sync::Arc;

use crate::canvas::{Anchor, Canvas};
use crate::error::{RenderError, RenderResult};
use crate::ticks::{format_tick, nice_ticks};

const MARGIN_LEFT: usize = 84;
const MARGIN_RIGHT: usize = 32;
const MARGIN_TOP: usize = 56;
const MARGIN_BOTTOM: usize = 64;

const COLOR_BG: [u8; 4] = [255, 255, 255, 255];
const COLOR_FRAME: [u8; 4] = [40, 40, 40, 255];
const COLOR_TEXT: [u8; 4] = [20, 20, 20, 255];
const COLOR_GRID: [u8; 4] = [200, 200, 200, 255];
const COLOR_LINE: [u8; 4] = [178, 34, 34, 255];

/// Settings for a profile figure.
pub struct ProfileConfig {
    pub title: String,
    /// Horizontal axis caption (the data variable).
    pub x_label: String,
    /// Vertical axis caption (the vertical coordinate).
    pub y_label: String,
    /// Flip the vertical axis so the largest coordinate value (e.g.
    /// surface pressure) is at the bottom.
    pub invert_y: bool,
    /// Figure size in pixels.
    pub width: usize,
    pub height: usize,
    pub font: Option<Arc<Font<'static>>>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            invert_y: false,
            width: 640,
            height: 640,
            font: None,
        }
    }
}

/// Render a profile line chart.
///
/// `values` and `vertical` must be the same length; NaN values break the
/// line. Errors if fewer than two finite points remain.
pub fn render_profile(
    values: &[f32],
    vertical: &[f32],
    cfg: &ProfileConfig,
) -> RenderResult<Canvas> {
    if values.len() != vertical.len() {
        return Err(RenderError::EmptyPlot(format!(
            "profile has {} values but {} vertical levels",
            values.len(),
            vertical.len()
        )));
    }

    let finite: Vec<(f32, f32)> = values
        .iter()
        .zip(vertical.iter())
        .filter(|(v, z)| v.is_finite() && z.is_finite())
        .map(|(&v, &z)| (v, z))
        .collect();
    if finite.len() < 2 {
        return Err(RenderError::EmptyPlot(
            "fewer than two finite profile points".to_string(),
        ));
    }

    let (x_min, x_max) = padded_range(finite.iter().map(|p| p.0));
    let (y_min, y_max) = padded_range(finite.iter().map(|p| p.1));

    let mut canvas = Canvas::new(cfg.width, cfg.height, COLOR_BG)?;
    let font = cfg.font.as_deref();

    let plot_w = cfg.width.saturating_sub(MARGIN_LEFT + MARGIN_RIGHT);
    let plot_h = cfg.height.saturating_sub(MARGIN_TOP + MARGIN_BOTTOM);
    if plot_w < 16 || plot_h < 16 {
        return Err(RenderError::CanvasSize {
            width: cfg.width,
            height: cfg.height,
        });
    }

    let to_px = |x: f32| -> f32 {
        MARGIN_LEFT as f32 + (x - x_min) / (x_max - x_min) * plot_w as f32
    };
    let to_py = |y: f32| -> f32 {
        let norm = (y - y_min) / (y_max - y_min);
        let norm = if cfg.invert_y { norm } else { 1.0 - norm };
        MARGIN_TOP as f32 + norm * plot_h as f32
    };

    // Grid lines and tick labels
    let mut grid: Vec<Vec<(f32, f32)>> = Vec::new();
    for tick in nice_ticks(x_min, x_max, 6) {
        let px = to_px(tick);
        grid.push(vec![(px, MARGIN_TOP as f32), (px, (MARGIN_TOP + plot_h) as f32)]);
        canvas.draw_text(
            font,
            &format_tick(tick),
            px as i32,
            (MARGIN_TOP + plot_h + 6) as i32,
            11.0,
            COLOR_TEXT,
            Anchor::Center,
        );
    }
    for tick in nice_ticks(y_min, y_max, 7) {
        let py = to_py(tick);
        grid.push(vec![(MARGIN_LEFT as f32, py), ((MARGIN_LEFT + plot_w) as f32, py)]);
        canvas.draw_text(
            font,
            &format_tick(tick),
            MARGIN_LEFT as i32 - 8,
            py as i32 - 6,
            11.0,
            COLOR_TEXT,
            Anchor::Right,
        );
    }
    canvas.draw_polylines(&grid, COLOR_GRID, 1.0);

    // The profile itself, broken at NaN gaps
    let mut segments: Vec<Vec<(f32, f32)>> = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();
    for (&v, &z) in values.iter().zip(vertical.iter()) {
        if v.is_finite() && z.is_finite() {
            current.push((to_px(v), to_py(z)));
        } else if current.len() > 1 {
            segments.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
    }
    if current.len() > 1 {
        segments.push(current);
    }
    canvas.draw_polylines(&segments, COLOR_LINE, 2.0);

    canvas.draw_rect(MARGIN_LEFT, MARGIN_TOP, plot_w, plot_h, COLOR_FRAME);

    canvas.draw_text(
        font,
        &cfg.title,
        (cfg.width / 2) as i32,
        12,
        16.0,
        COLOR_TEXT,
        Anchor::Center,
    );
    canvas.draw_text(
        font,
        &cfg.x_label,
        (MARGIN_LEFT + plot_w / 2) as i32,
        (MARGIN_TOP + plot_h + 28) as i32,
        12.0,
        COLOR_TEXT,
        Anchor::Center,
    );
    canvas.draw_text(
        font,
        &cfg.y_label,
        MARGIN_LEFT as i32 - 8,
        (MARGIN_TOP - 22) as i32,
        12.0,
        COLOR_TEXT,
        Anchor::Left,
    );

    Ok(canvas)
}

/// Range of an iterator of finite values, padded 4% on both sides.
fn padded_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let pad = (max - min) * 0.04;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_renders() {
        let (field, pressure) = test_utils::synthetic_sounding(30);
        let cfg = ProfileConfig {
            title: "Sounding".to_string(),
            x_label: "Temperature (K)".to_string(),
            y_label: "Pressure (hPa)".to_string(),
            invert_y: true,
            ..Default::default()
        };
        let canvas = render_profile(&field.values, &pressure, &cfg).unwrap();

        let non_white = canvas
            .as_rgba()
            .chunks_exact(4)
            .filter(|px| px[0] != 255 || px[1] != 255 || px[2] != 255)
            .count();
        assert!(non_white > 500, "chart should not be blank");
    }

    #[test]
    fn test_profile_rejects_mismatched_lengths() {
        assert!(render_profile(&[1.0, 2.0], &[1.0], &ProfileConfig::default()).is_err());
    }

    #[test]
    fn test_profile_rejects_all_nan() {
        let values = vec![f32::NAN; 10];
        let levels: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert!(render_profile(&values, &levels, &ProfileConfig::default()).is_err());
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([0.0f32, 10.0].into_iter());
        assert!(lo < 0.0 && hi > 10.0);
        let (lo, hi) = padded_range([5.0f32, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
    }
}
