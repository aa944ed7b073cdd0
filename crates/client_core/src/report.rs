//! End-of-session report: payload validation and display fallbacks.

use serde_json::Value;
use shared::{
    domain::{MoodScore, SessionId},
    protocol::SessionReportPayload,
};

use crate::{error::ClientError, transport::endpoints};

const DEFAULT_INITIAL_MOOD: u8 = 3;
const DEFAULT_FINAL_MOOD: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTrend {
    Improved,
    Declined,
    Stable,
}

impl MoodTrend {
    pub fn label(self) -> &'static str {
        match self {
            Self::Improved => "Improved",
            Self::Declined => "Declined",
            Self::Stable => "Stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub session_id: Option<SessionId>,
    pub patient_name: String,
    pub character_description: String,
    pub duration_minutes: u64,
    pub session_duration: Option<String>,
    pub total_messages: u64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub initial_mood: MoodScore,
    pub final_mood: MoodScore,
    pub key_issues: Vec<String>,
    pub therapist_effectiveness: String,
    pub ai_progress: String,
    pub next_steps: Vec<String>,
    pub session_summary: String,
}

impl SessionReport {
    pub fn from_payload(payload: SessionReportPayload) -> Self {
        Self {
            session_id: payload.session_id,
            patient_name: text_or(payload.patient_name, "AI Patient"),
            character_description: text_or(
                payload.character_description,
                "Various AI mental health concerns",
            ),
            duration_minutes: payload.duration_minutes.unwrap_or(0),
            session_duration: payload
                .session_duration
                .filter(|value| !value.trim().is_empty()),
            total_messages: payload.total_messages.unwrap_or(0),
            start_time: payload.start_time.filter(|value| !value.trim().is_empty()),
            end_time: payload.end_time.filter(|value| !value.trim().is_empty()),
            initial_mood: mood_or(payload.initial_mood_score, DEFAULT_INITIAL_MOOD),
            final_mood: mood_or(payload.final_mood_score, DEFAULT_FINAL_MOOD),
            key_issues: list_or(payload.key_issues, "No specific issues identified"),
            therapist_effectiveness: text_or(
                payload.therapist_effectiveness,
                "Analysis not available",
            ),
            ai_progress: text_or(payload.ai_progress, "Progress analysis not available"),
            next_steps: list_or(payload.next_steps, "Continue regular therapy sessions"),
            session_summary: text_or(payload.session_summary, "Summary not available"),
        }
    }

    pub fn mood_change(&self) -> i16 {
        i16::from(self.final_mood.value()) - i16::from(self.initial_mood.value())
    }

    pub fn trend(&self) -> MoodTrend {
        match self.mood_change() {
            change if change > 0 => MoodTrend::Improved,
            change if change < 0 => MoodTrend::Declined,
            _ => MoodTrend::Stable,
        }
    }
}

/// Decodes a report body. Anything other than a JSON object is malformed.
pub fn parse_report(body: &[u8]) -> Result<SessionReport, ClientError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        ClientError::malformed(
            endpoints::SESSION_REPORT,
            format!("Invalid report data received: {err}"),
        )
    })?;
    if !value.is_object() {
        return Err(ClientError::malformed(
            endpoints::SESSION_REPORT,
            "Invalid report data received",
        ));
    }
    let payload: SessionReportPayload = serde_json::from_value(value).map_err(|err| {
        ClientError::malformed(
            endpoints::SESSION_REPORT,
            format!("Invalid report data received: {err}"),
        )
    })?;
    Ok(SessionReport::from_payload(payload))
}

fn text_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn list_or(value: Option<Vec<String>>, fallback: &str) -> Vec<String> {
    match value {
        Some(items) if !items.is_empty() => items,
        _ => vec![fallback.to_string()],
    }
}

// A zero score counts as missing, matching how the backend reports "no data".
fn mood_or(value: Option<MoodScore>, fallback: u8) -> MoodScore {
    value
        .filter(|score| score.value() > 0)
        .unwrap_or_else(|| MoodScore::new(fallback))
}
