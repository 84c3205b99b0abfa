mod app;
mod nav;
mod surface;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use icicle_core::ViewConfig;
use tracing_subscriber::EnvFilter;

/// Explore a hierarchical profile as a zoomable icicle chart.
#[derive(Debug, Parser)]
#[command(name = "icicle", version)]
struct Args {
    /// Profile to open (folded stacks or a JSON snapshot).
    profile: PathBuf,

    /// View configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file; the terminal itself is busy.
    #[arg(long)]
    log: Option<PathBuf>,

    /// Render the root view to an SVG file instead of opening the terminal UI.
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// SVG size in pixels, `WIDTHxHEIGHT`.
    #[arg(long, default_value = "1200x600", value_parser = parse_size)]
    size: (u32, u32),
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w = w.parse().map_err(|e| format!("width: {e}"))?;
    let h = h.parse().map_err(|e| format!("height: {e}"))?;
    Ok((w, h))
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("icicle=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;

    let config = match &args.config {
        Some(path) => {
            let data =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            ViewConfig::from_json(&data)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ViewConfig::default(),
    };

    let data = std::fs::read(&args.profile)
        .with_context(|| format!("reading {}", args.profile.display()))?;
    let name = args
        .profile
        .file_stem()
        .map_or_else(|| "profile".to_owned(), |s| s.to_string_lossy().into_owned());
    let profile = icicle_core::parsers::parse_auto(&data, &name)
        .with_context(|| format!("parsing {}", args.profile.display()))?;
    tracing::info!(profile = %profile.name, nodes = profile.len(), "profile loaded");

    match &args.svg {
        Some(out) => app::export_svg(profile, config, args.size, out),
        None => app::run(profile, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_argument() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("ax1").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from(["icicle", "p.folded", "--log", "icicle.log"]).unwrap();
        assert_eq!(args.profile, PathBuf::from("p.folded"));
        assert_eq!(args.log, Some(PathBuf::from("icicle.log")));
        assert_eq!(args.size, (1200, 600));
    }
}
