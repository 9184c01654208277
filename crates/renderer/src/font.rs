//! TrueType font loading.
//!
//! Plot text needs a font from disk: either an explicit path or the first
//! hit among common system locations. When none loads, plots render
//! without text and the caller logs a warning.

use once_cell::sync::Lazy;
use rusttype::Font;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// A font shared across plot renders.
pub type SharedFont = Arc<Font<'static>>;

/// System font locations probed in order.
const DEFAULT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Cached result of the default search, shared across all renders.
static DEFAULT_FONT: Lazy<Mutex<Option<Option<Arc<Font<'static>>>>>> =
    Lazy::new(|| Mutex::new(None));

/// Load a font from an explicit path, or fall back to the system search.
///
/// Returns None when nothing loads; rendering proceeds without text.
pub fn load_font(explicit: Option<&Path>) -> Option<Arc<Font<'static>>> {
    if let Some(path) = explicit {
        match load_from(path) {
            Some(font) => return Some(font),
            None => warn!(path = %path.display(), "Could not load requested font"),
        }
    }

    let mut cache = DEFAULT_FONT.lock().expect("font cache poisoned");
    if let Some(cached) = cache.as_ref() {
        return cached.clone();
    }

    let found = DEFAULT_FONT_PATHS
        .iter()
        .find_map(|p| load_from(Path::new(p)));
    if found.is_none() {
        warn!("No usable TrueType font found; plots will have no text");
    }
    *cache = Some(found.clone());
    found
}

fn load_from(path: &Path) -> Option<Arc<Font<'static>>> {
    let data = std::fs::read(path).ok()?;
    let font = Font::try_from_vec(data)?;
    debug!(path = %path.display(), "Loaded font");
    Some(Arc::new(font))
}
