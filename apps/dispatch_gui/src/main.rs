use std::path::PathBuf;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent, ui::DispatchApp,
};

#[derive(Parser, Debug)]
#[command(about = "Operator console for the delivery dispatch service")]
struct Args {
    /// Base URL of the dispatch API, e.g. http://localhost:8080/api
    #[arg(long)]
    api_base: Option<String>,
    /// Path to a dispatch.toml configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref(), args.api_base.as_deref())
        .context("failed to load dispatch console settings")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(api_base = %settings.api_base, "starting dispatch console");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Delivery Dispatch")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Delivery Dispatch",
        options,
        Box::new(|_cc| Ok(Box::new(DispatchApp::new(cmd_tx, ui_rx)))),
    )
    .map_err(|err| anyhow::anyhow!("desktop shell failed: {err}"))
}
