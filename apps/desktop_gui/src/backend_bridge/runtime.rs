//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, EffectRunner, HttpTherapyApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Spawns the backend worker thread. It owns a tokio runtime and runs every
/// queued effect as its own task, so a slow report never blocks chat traffic.
pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let runner = match build_runner(&settings) {
            Ok(runner) => runner,
            Err(message) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: {message}"),
                )));
                tracing::error!("{message}");
                return;
            }
        };
        let _ = ui_tx.try_send(UiEvent::Info(format!(
            "Backend worker ready for {}",
            settings.server_url.trim()
        )));

        while let Ok(cmd) = cmd_rx.recv() {
            tracing::debug!(command = cmd.name(), "backend worker received command");
            match cmd {
                BackendCommand::Run(effect) => {
                    let runner = runner.clone();
                    let ui_tx = ui_tx.clone();
                    runtime.spawn(async move {
                        let completion = runner.run(effect).await;
                        if ui_tx.send(UiEvent::Completed(completion)).is_err() {
                            tracing::debug!("ui event queue closed; dropping completion");
                        }
                    });
                }
            }
        }
        tracing::info!("backend command queue closed; worker exiting");
    });
}

fn build_runner(settings: &ClientSettings) -> Result<EffectRunner, String> {
    let base_url = settings.base_url().map_err(|err| err.to_string())?;
    let api = HttpTherapyApi::with_request_timeout(base_url, settings.request_timeout())
        .map_err(|err| err.to_string())?;
    Ok(EffectRunner::from_settings(Arc::new(api), settings))
}
