//! Rendering decoded fields to annotated PNG plots.
//!
//! Two plot kinds cover the product gallery: geographic maps (data raster
//! through a colormap, graticule, optional coastlines, colorbar, title)
//! and vertical profile charts. PNG encoding is implemented directly over
//! flate2 + crc32fast.

pub mod canvas;
pub mod chart;
pub mod coastline;
pub mod colormap;
pub mod error;
pub mod font;
pub mod map;
pub mod png;
pub mod ticks;

pub use canvas::{Anchor, Canvas};
pub use chart::{render_profile, ProfileConfig};
pub use colormap::{Colormap, ColorStop, StyleConfig, StyleDefinition};
pub use error::{RenderError, RenderResult};
pub use font::{load_font, SharedFont};
pub use map::{render_map, MapPlotConfig};
