//! Backend commands queued from UI to backend worker.

use client_core::Effect;

pub enum BackendCommand {
    /// Execute a reducer effect; its completion comes back as a `UiEvent`.
    Run(Effect),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run(effect) => effect.name(),
        }
    }
}
