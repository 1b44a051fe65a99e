//! Application entry point for the space-colonization tree viewer.
//!
//! This binary parses the command line, sets up logging, and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use clap::Parser;
use log::{error, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sca_tree_core::TreeConfig;
use std::path::PathBuf;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "sca-tree", version, about = "Grow a 2D space-colonization tree")]
struct Args {
    /// Seed for parameter and attraction point generation (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file overriding the parameter ranges
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between automatic growth steps
    #[arg(short = 'i', long, default_value = "0.3")]
    step_interval: f64,

    /// Start growing immediately
    #[arg(short, long)]
    run: bool,
}

fn load_config(path: Option<&PathBuf>) -> TreeConfig {
    let Some(path) = path else {
        return TreeConfig::default();
    };
    match TreeConfig::load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}: {e}; using default config", path.display());
            TreeConfig::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the first tree cannot be built from the configuration, or if
///   eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let cfg = load_config(args.config.as_ref());
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    info!("seed = {seed}");

    let mut viewer = Viewer::new(cfg, ChaCha8Rng::seed_from_u64(seed))
        .map_err(|e| eframe::Error::AppCreation(Box::new(e)))?;
    viewer.set_step_interval(args.step_interval);
    viewer.set_running(args.run);

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "2D SCA Tree",
        options,
        Box::new(|_cc| {
            // The tree was already built above; hand it to eframe.
            Ok(Box::new(viewer))
        }),
    )
}
