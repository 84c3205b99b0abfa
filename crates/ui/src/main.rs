use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use icicle_core::model::ProfileDatabase;
use icicle_core::ViewConfig;
use icicle_ui::PartitionApp;
use tracing_subscriber::EnvFilter;

/// Explore hierarchical profiles as zoomable icicle charts.
#[derive(Debug, Parser)]
#[command(name = "icicle-gui", version)]
struct Args {
    /// Profile to open on start (folded stacks or a JSON snapshot).
    profile: Option<PathBuf>,

    /// View configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("icicle=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            let data =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            ViewConfig::from_json(&data)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ViewConfig::default(),
    };

    // The view borrows the store while the window is open and eframe only
    // takes 'static apps.
    let db: &'static ProfileDatabase = Box::leak(Box::new(ProfileDatabase::new()));
    let profile = args.profile;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("icicle")
            .with_inner_size([1200.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "icicle",
        options,
        Box::new(move |cc| {
            let mut app = PartitionApp::new(cc, db, config);
            if let Some(path) = &profile {
                app.load_file(path);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}
