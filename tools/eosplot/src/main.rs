//! Product plot renderer.
//!
//! Renders NASA Earth science product fields to annotated PNG maps and
//! profile charts, driven by the per-product YAML table under the config
//! directory. One product per invocation, or the whole table with --all.

mod pipeline;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use eos_common::PlotError;
use product_catalog::Catalog;

use pipeline::{render_product, RenderOptions};

#[derive(Parser, Debug)]
#[command(name = "eosplot")]
#[command(about = "Render NASA Earth science product fields to PNG plots")]
struct Args {
    /// Configuration directory (products/ and styles/ live here)
    #[arg(short, long, default_value = "config")]
    config_dir: PathBuf,

    /// Product id to render
    #[arg(short, long)]
    product: Option<String>,

    /// Render every product in the catalog
    #[arg(long)]
    all: bool,

    /// List available products and exit
    #[arg(long)]
    list: bool,

    /// Directory holding the input data files
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Directory to write PNG output into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Coastline GeoJSON applied to all map plots
    #[arg(long)]
    coastline: Option<PathBuf>,

    /// TrueType font for plot text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let catalog = Catalog::load_dir(&args.config_dir)
        .with_context(|| format!("loading catalog from {}", args.config_dir.display()))?;

    if args.list {
        print_catalog(&catalog);
        return Ok(());
    }

    let selected: Vec<String> = if args.all {
        catalog.ids().iter().map(|s| s.to_string()).collect()
    } else if let Some(id) = &args.product {
        if catalog.get(id).is_none() {
            return Err(PlotError::ProductNotFound(id.clone()))
                .with_context(|| format!("known products: {}", catalog.ids().join(", ")));
        }
        vec![id.clone()]
    } else {
        bail!("nothing to do: pass --product <id>, --all, or --list");
    };

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output dir {}", args.output_dir.display()))?;

    let options = RenderOptions {
        input_dir: args.input_dir.clone(),
        output_dir: args.output_dir.clone(),
        coastline_override: args.coastline.clone(),
        font: renderer::load_font(args.font.as_deref()),
    };

    info!(products = selected.len(), "Rendering");

    let failures: Vec<String> = selected
        .par_iter()
        .filter_map(|id| {
            let spec = catalog.get(id).expect("selected ids come from the catalog");
            match render_product(&catalog, spec, &options) {
                Ok(path) => {
                    info!(product = %id, output = %path.display(), "Rendered");
                    None
                }
                Err(e) => {
                    error!(product = %id, error = %format!("{:#}", e), "Render failed");
                    Some(id.clone())
                }
            }
        })
        .collect();

    if !failures.is_empty() {
        bail!("{}/{} products failed: {}", failures.len(), selected.len(), failures.join(", "));
    }

    info!(products = selected.len(), "Done");
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    println!("{:<28} {:<44} INPUT", "ID", "TITLE");
    for spec in catalog.products() {
        println!("{:<28} {:<44} {}", spec.id, spec.title, spec.filename);
    }
}
