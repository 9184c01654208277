//! Style file loading and styled rendering, end to end.

use renderer::{Colormap, StyleConfig};
use std::io::Write;

const OZONE_STYLE: &str = r##"{
    "version": "1.0",
    "styles": {
        "ozone": {
            "name": "ozone",
            "description": "Total column ozone",
            "units": "DU",
            "stops": [
                {"value": 100.0, "color": "#2c007a", "label": "100"},
                {"value": 220.0, "color": "#0050ff"},
                {"value": 300.0, "color": "#00d0a0"},
                {"value": 400.0, "color": "#ffd000"},
                {"value": 500.0, "color": "#c00000", "label": "500"}
            ],
            "out_of_range": "clamp"
        }
    }
}"##;

#[test]
fn load_style_from_disk_and_compile() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(OZONE_STYLE.as_bytes()).unwrap();
    tmp.flush().unwrap();

    let config = StyleConfig::from_file(tmp.path()).unwrap();
    let style = config.resolve(Some("ozone")).unwrap();
    assert_eq!(style.units.as_deref(), Some("DU"));

    let cmap = Colormap::from_style(style).unwrap();
    assert_eq!(cmap.vmin, 100.0);
    assert_eq!(cmap.vmax, 500.0);

    // Endpoints hit the stop colors exactly
    assert_eq!(cmap.color_of(100.0), (0x2c, 0x00, 0x7a, 255));
    assert_eq!(cmap.color_of(500.0), (0xc0, 0x00, 0x00, 255));
}

#[test]
fn resolve_single_style_without_name() {
    let config = StyleConfig::from_json(OZONE_STYLE).unwrap();
    let style = config.resolve(None).unwrap();
    assert_eq!(style.name, "ozone");
}

#[test]
fn missing_style_name_is_an_error() {
    let config = StyleConfig::from_json(OZONE_STYLE).unwrap();
    assert!(config.resolve(Some("rainfall")).is_err());
}

#[test]
fn styled_map_render_is_not_blank() {
    use eos_common::BoundingBox;
    use projection::{MapRegion, PlateCarree, Projection};
    use renderer::{render_map, MapPlotConfig};

    let config = StyleConfig::from_json(OZONE_STYLE).unwrap();
    let cmap = Colormap::from_style(config.resolve(None).unwrap()).unwrap();

    let region = MapRegion::new(
        Projection::Geographic(PlateCarree),
        BoundingBox::global(),
        120,
        60,
    );
    let field = test_utils::ramp_field(120, 60, 100.0, 500.0);
    let cfg = MapPlotConfig {
        title: "Ozone".to_string(),
        colorbar_label: "Total ozone (DU)".to_string(),
        coastlines: None,
        font: None,
    };
    let canvas = render_map(&field.values, &region, &cmap, &cfg).unwrap();

    let png = renderer::png::encode_auto(
        canvas.as_rgba(),
        canvas.width(),
        canvas.height(),
        "eos-plot tests",
    )
    .unwrap();
    assert_eq!(&png[0..4], &[137, 80, 78, 71]);
}
