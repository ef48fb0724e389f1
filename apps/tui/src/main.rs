//! Monotone TUI: browse and read tutorials in the terminal.
//!
//! A list screen over the tutorial index and a page screen driven by a
//! route-bound loader, built with `ratatui` + `crossterm`.

mod app;
mod html_view;
mod screens;
mod widgets;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::Result;
use monotone_shared::{config_dir, load_config};

/// Interactive tutorial reader.
#[derive(Parser)]
#[command(name = "monotone-tui", version, about, long_about = None)]
struct Args {
    /// Route to open on start, e.g. `#/tutorial/2`.
    route: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging()?;

    let config = load_config()?;
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    app::run(config, args.route.as_deref())
}

/// Log to `~/.monotone/tui.log` when `MONOTONE_LOG` is set.
///
/// The variable doubles as the filter directive (`MONOTONE_LOG=debug`).
fn init_logging() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(directive) = std::env::var("MONOTONE_LOG") else {
        return Ok(());
    };

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tui.log"))?;

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("monotone=debug"));

    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}
