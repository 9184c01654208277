//! Color styles and colormap lookup tables.
//!
//! Styles are JSON color-stop definitions loaded from `config/styles/`;
//! the JSON files are the single source of truth for production color
//! scales. A style is compiled into a 256-entry LUT over its stop range
//! before rendering.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Style configuration loaded from JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub styles: HashMap<String, StyleDefinition>,
}

/// A single style definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDefinition {
    pub name: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub stops: Vec<ColorStop>,
    /// "clamp" (default) keeps out-of-range data at the end colors;
    /// "transparent" hides it.
    pub out_of_range: Option<String>,
}

/// Color stop for gradient interpolation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub value: f32,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from a JSON string.
    pub fn from_json(json_str: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from a file.
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Get a specific style definition.
    pub fn get_style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }

    /// Resolve a style by name, falling back to the single style in the
    /// file when only one is defined.
    pub fn resolve(&self, name: Option<&str>) -> RenderResult<&StyleDefinition> {
        match name {
            Some(n) => self
                .get_style(n)
                .ok_or_else(|| RenderError::StyleNotFound(n.to_string())),
            None => {
                if self.styles.len() == 1 {
                    Ok(self.styles.values().next().expect("len checked"))
                } else {
                    self.get_style("default")
                        .ok_or_else(|| RenderError::StyleNotFound("default".to_string()))
                }
            }
        }
    }
}

/// Parse a hex color string to RGB.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0-1)
/// * `v` - Value/brightness (0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h % 360.0;
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Number of LUT entries compiled per colormap.
const LUT_SIZE: usize = 256;

/// A compiled colormap: value range plus a precomputed color LUT.
#[derive(Debug, Clone)]
pub struct Colormap {
    lut: Vec<(u8, u8, u8, u8)>,
    pub vmin: f32,
    pub vmax: f32,
    clamp_out_of_range: bool,
    /// Units label carried from the style, if the data has none.
    pub units: Option<String>,
}

impl Colormap {
    /// Compile a style's color stops into a LUT.
    ///
    /// The value range is the span of the stops; stop spacing may be
    /// non-uniform and is interpolated piecewise.
    pub fn from_style(style: &StyleDefinition) -> RenderResult<Self> {
        let mut stops = style.stops.clone();
        stops.sort_by(|a, b| a.value.partial_cmp(&b.value).unwrap_or(std::cmp::Ordering::Equal));

        if stops.len() < 2 {
            return Err(RenderError::BadStyle {
                style: style.name.clone(),
                message: format!("need at least 2 color stops, got {}", stops.len()),
            });
        }

        let mut colors = Vec::with_capacity(stops.len());
        for stop in &stops {
            let rgb = hex_to_rgb(&stop.color).ok_or_else(|| RenderError::BadStyle {
                style: style.name.clone(),
                message: format!("bad hex color '{}'", stop.color),
            })?;
            colors.push(rgb);
        }

        let vmin = stops[0].value;
        let vmax = stops[stops.len() - 1].value;
        if vmax <= vmin {
            return Err(RenderError::BadStyle {
                style: style.name.clone(),
                message: "color stops span an empty value range".to_string(),
            });
        }

        let mut lut = Vec::with_capacity(LUT_SIZE);
        for i in 0..LUT_SIZE {
            let value = vmin + (vmax - vmin) * i as f32 / (LUT_SIZE - 1) as f32;
            // Find the surrounding stop pair
            let mut seg = stops.len() - 2;
            for s in 0..stops.len() - 1 {
                if value <= stops[s + 1].value {
                    seg = s;
                    break;
                }
            }
            let span = (stops[seg + 1].value - stops[seg].value).max(f32::EPSILON);
            let t = ((value - stops[seg].value) / span).clamp(0.0, 1.0);
            let (r1, g1, b1) = colors[seg];
            let (r2, g2, b2) = colors[seg + 1];
            lut.push((
                lerp_u8(r1, r2, t),
                lerp_u8(g1, g2, t),
                lerp_u8(b1, b2, t),
                255,
            ));
        }

        Ok(Self {
            lut,
            vmin,
            vmax,
            clamp_out_of_range: style.out_of_range.as_deref() != Some("transparent"),
            units: style.units.clone(),
        })
    }

    /// A generic blue-to-red fallback over the given range, used when a
    /// product names no style.
    pub fn fallback(vmin: f32, vmax: f32) -> Self {
        let mut lut = Vec::with_capacity(LUT_SIZE);
        for i in 0..LUT_SIZE {
            let norm = i as f32 / (LUT_SIZE - 1) as f32;
            let hue = (1.0 - norm) * 240.0; // Blue (240°) to red (0°)
            let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
            lut.push((r, g, b, 255));
        }
        let (vmin, vmax) = if vmax > vmin {
            (vmin, vmax)
        } else {
            (vmin, vmin + 1.0)
        };
        Self {
            lut,
            vmin,
            vmax,
            clamp_out_of_range: true,
            units: None,
        }
    }

    /// Color for a data value. NaN is transparent.
    pub fn color_of(&self, value: f32) -> (u8, u8, u8, u8) {
        if value.is_nan() {
            return (0, 0, 0, 0);
        }
        let norm = (value - self.vmin) / (self.vmax - self.vmin);
        if !(0.0..=1.0).contains(&norm) && !self.clamp_out_of_range {
            return (0, 0, 0, 0);
        }
        let idx = (norm.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize;
        self.lut[idx]
    }

    /// Color at a normalized position in [0, 1], for colorbar strips.
    pub fn color_at_norm(&self, norm: f32) -> (u8, u8, u8, u8) {
        let idx = (norm.clamp(0.0, 1.0) * (LUT_SIZE - 1) as f32).round() as usize;
        self.lut[idx]
    }
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 * (1.0 - t) + b as f32 * t).round() as u8
}
