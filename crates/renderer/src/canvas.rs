//! RGBA canvas composition.
//!
//! The canvas is an `image::RgbaImage`. Anti-aliased polylines are stroked
//! onto a transparent tiny-skia pixmap and composited over; text goes
//! through imageproc when a font is available.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

use crate::colormap::Colormap;
use crate::error::{RenderError, RenderResult};

/// Horizontal anchoring for text placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
    Right,
}

/// An RGBA drawing surface.
pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    /// Create a canvas filled with the background color.
    pub fn new(width: usize, height: usize, background: [u8; 4]) -> RenderResult<Self> {
        if width == 0 || height == 0 || width > 16_384 || height > 16_384 {
            return Err(RenderError::CanvasSize { width, height });
        }
        let img = RgbaImage::from_pixel(width as u32, height as u32, Rgba(background));
        Ok(Self { img })
    }

    pub fn width(&self) -> usize {
        self.img.width() as usize
    }

    pub fn height(&self) -> usize {
        self.img.height() as usize
    }

    /// Paint a rectangle of data values through a colormap with its top-left
    /// corner at (x0, y0). NaN values leave the background showing.
    pub fn paste_values(
        &mut self,
        x0: usize,
        y0: usize,
        values: &[f32],
        width: usize,
        height: usize,
        cmap: &Colormap,
    ) {
        for y in 0..height {
            for x in 0..width {
                let (r, g, b, a) = cmap.color_of(values[y * width + x]);
                if a == 0 {
                    continue;
                }
                let px = (x0 + x) as u32;
                let py = (y0 + y) as u32;
                if px < self.img.width() && py < self.img.height() {
                    self.img.put_pixel(px, py, Rgba([r, g, b, a]));
                }
            }
        }
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, width: usize, height: usize, color: [u8; 4]) {
        for y in y0..(y0 + height).min(self.height()) {
            for x in x0..(x0 + width).min(self.width()) {
                self.img.put_pixel(x as u32, y as u32, Rgba(color));
            }
        }
    }

    /// Stroke a 1-pixel rectangle outline.
    pub fn draw_rect(&mut self, x0: usize, y0: usize, width: usize, height: usize, color: [u8; 4]) {
        if width == 0 || height == 0 {
            return;
        }
        self.fill_rect(x0, y0, width, 1, color);
        self.fill_rect(x0, y0 + height - 1, width, 1, color);
        self.fill_rect(x0, y0, 1, height, color);
        self.fill_rect(x0 + width - 1, y0, 1, height, color);
    }

    /// Stroke a set of polylines (pixel coordinates) with anti-aliasing.
    pub fn draw_polylines(&mut self, lines: &[Vec<(f32, f32)>], color: [u8; 4], width: f32) {
        use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

        let pixmap = Pixmap::new(self.img.width(), self.img.height());
        let mut pixmap = match pixmap {
            Some(p) => p,
            None => return,
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], color[3]);
        paint.anti_alias = true;

        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        for line in lines {
            if line.len() < 2 {
                continue;
            }
            let mut pb = PathBuilder::new();
            pb.move_to(line[0].0, line[0].1);
            for &(x, y) in &line[1..] {
                pb.line_to(x, y);
            }
            if let Some(path) = pb.finish() {
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }

        self.composite_premultiplied(pixmap.data());
    }

    /// Composite a premultiplied-RGBA buffer (tiny-skia's format) over the
    /// canvas with source-over blending.
    fn composite_premultiplied(&mut self, src: &[u8]) {
        for (dst, s) in self.img.pixels_mut().zip(src.chunks_exact(4)) {
            let sa = s[3] as u32;
            if sa == 0 {
                continue;
            }
            let inv = 255 - sa;
            for c in 0..3 {
                let d = dst.0[c] as u32;
                dst.0[c] = (s[c] as u32 + d * inv / 255).min(255) as u8;
            }
            let da = dst.0[3] as u32;
            dst.0[3] = (sa + da * inv / 255).min(255) as u8;
        }
    }

    /// Draw text anchored at (x, y). The y coordinate is the top of the
    /// text box. A None font is a quiet no-op so text-free rendering
    /// degrades gracefully.
    pub fn draw_text(
        &mut self,
        font: Option<&Font<'static>>,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        color: [u8; 4],
        anchor: Anchor,
    ) {
        let font = match font {
            Some(f) => f,
            None => return,
        };
        if text.is_empty() {
            return;
        }

        let scale = Scale::uniform(size);
        let (text_w, _) = text_size(scale, font, text);
        let x = match anchor {
            Anchor::Left => x,
            Anchor::Center => x - text_w / 2,
            Anchor::Right => x - text_w,
        };

        draw_text_mut(&mut self.img, Rgba(color), x, y, scale, font, text);
    }

    /// Flatten to raw RGBA bytes for PNG encoding.
    pub fn into_rgba(self) -> (Vec<u8>, usize, usize) {
        let (w, h) = (self.img.width() as usize, self.img.height() as usize);
        (self.img.into_raw(), w, h)
    }

    /// Borrow the raw RGBA bytes.
    pub fn as_rgba(&self) -> &[u8] {
        self.img.as_raw()
    }
}
