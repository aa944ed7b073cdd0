//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{Action, AppState};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "UI command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status =
                "Backend command processor disconnected (possible startup/runtime failure); restart the app"
                    .to_string();
        }
    }
}

/// Applies `action` to the state and queues whatever effect it asks for.
pub fn apply_action(
    state: &mut AppState,
    action: Action,
    cmd_tx: &Sender<BackendCommand>,
    status: &mut String,
) {
    if let Some(effect) = state.apply(action) {
        dispatch_backend_command(cmd_tx, BackendCommand::Run(effect), status);
    }
}
