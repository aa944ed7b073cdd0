mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::ClientSettings;
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::TherapyDeskApp;

#[derive(Parser, Debug)]
struct Args {
    /// Backend base url; overrides settings file and environment.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut status = "Starting...".to_string();
    let mut settings = match ClientSettings::load() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "failed to load settings; falling back to defaults");
            status = format!("Settings error: {err}; using defaults");
            ClientSettings::default()
        }
    };
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    tracing::info!(server_url = %settings.server_url, "starting therapy desk");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("AI Therapy Desk")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "AI Therapy Desk",
        options,
        Box::new(move |_cc| Ok(Box::new(TherapyDeskApp::new(cmd_tx, ui_rx, status)))),
    )
}
