//! Executes reducer effects against a [`TherapyApi`].

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::{
    error::ClientError,
    settings::ClientSettings,
    state::{Action, Effect},
    transport::TherapyApi,
};

#[derive(Clone)]
pub struct EffectRunner {
    api: Arc<dyn TherapyApi>,
    report_timeout: Duration,
    settle_delay: Duration,
}

impl EffectRunner {
    pub fn new(api: Arc<dyn TherapyApi>, report_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            api,
            report_timeout,
            settle_delay,
        }
    }

    pub fn from_settings(api: Arc<dyn TherapyApi>, settings: &ClientSettings) -> Self {
        Self::new(api, settings.report_timeout(), settings.report_settle_delay())
    }

    /// Runs one effect to completion and returns the action that reports its
    /// outcome. Never fails: errors travel inside the action.
    pub async fn run(&self, effect: Effect) -> Action {
        let name = effect.name();
        let started = Instant::now();
        debug!(effect = name, "running effect");

        let action = match effect {
            Effect::LoadCharacters => Action::CharactersLoaded(self.api.list_characters().await),
            Effect::StartSession { character_id } => Action::SessionStarted {
                character_id,
                result: self.api.start_session(character_id).await,
            },
            Effect::SendChat {
                session_id,
                message,
            } => Action::ReplyReceived {
                session_id,
                result: self.api.send_chat(session_id, &message).await,
            },
            Effect::EndSession { session_id } => {
                let result = self.api.end_session(session_id).await;
                if result.is_ok() && !self.settle_delay.is_zero() {
                    // Give the backend a moment to finalise before the report is requested.
                    tokio::time::sleep(self.settle_delay).await;
                }
                Action::SessionEnded { session_id, result }
            }
            Effect::FetchReport { session_id } => {
                let result =
                    match tokio::time::timeout(self.report_timeout, self.api.fetch_report(session_id))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => {
                            info!(
                                %session_id,
                                timeout_secs = self.report_timeout.as_secs(),
                                "report request timed out"
                            );
                            Err(ClientError::Timeout {
                                after: self.report_timeout,
                            })
                        }
                    };
                Action::ReportLoaded { session_id, result }
            }
        };

        debug!(
            effect = name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "effect finished"
        );
        action
    }
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
