//! YouTube thumbnail grabber: desktop window, or one-shot headless run with `--url`.

// Desktop window
mod app;
// Command-line arguments
mod cli;
// Config file loading
mod config;
// Saving a chosen thumbnail to disk
mod downloader;
mod error;
// Submission state machine
mod fetcher;
// One-shot command-line run
mod headless;
// Data types shared across modules
mod model;
// Download progress events
mod progress;
// Thumbnail URL construction and preview fetching
mod thumbnail;
// Link recognition
mod url_utils;

use clap::Parser;
use eframe::egui::Visuals;
use log::debug;
use tokio::runtime::Runtime;

use crate::{app::ThumbnailApp, cli::Cli, config::AppConfig, error::Result};

/// Program entry point: reports any failure by its message and exits non-zero
fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

/// Loads config, then either runs headless or opens the window
fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.config.as_deref())?;
    debug!("config: {config:?}");

    let rt = Runtime::new()?;

    if let Some(url) = cli.url.as_deref() {
        return rt.block_on(headless::run(&cli, url, &config));
    }

    let handle = rt.handle().clone();
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "YouTube Thumbnail Grabber",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(ThumbnailApp::new(handle, config))
        }),
    )?;
    Ok(())
}
