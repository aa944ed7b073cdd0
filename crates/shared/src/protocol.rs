use serde::{Deserialize, Serialize};

use crate::domain::{lenient_mood, CharacterId, MoodScore, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterListResponse {
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub ai_character_id: CharacterId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub ai_character: CharacterSummary,
    pub initial_message: String,
    #[serde(
        default,
        deserialize_with = "lenient_mood::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_mood: Option<MoodScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_reflection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: SessionId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ai_response: String,
    #[serde(
        default,
        deserialize_with = "lenient_mood::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub mood_score: Option<MoodScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_reflection: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: SessionId,
}

/// End-of-session report as sent by the backend. Every field is optional;
/// the client fills gaps with display fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionReportPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_messages: Option<u64>,
    #[serde(
        deserialize_with = "lenient_mood::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_mood_score: Option<MoodScore>,
    #[serde(
        deserialize_with = "lenient_mood::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub final_mood_score: Option<MoodScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_issues: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapist_effectiveness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_session_response_ignores_extra_character_fields() {
        let raw = r#"{
            "session_id": 4,
            "ai_character": {"id": 1, "name": "ARIA-7 (Paranoid AI)", "description": "A security AI", "initial_prompt": "..."},
            "initial_message": "Who sent you?",
            "initial_mood": 3,
            "mood_reflection": "They are watching."
        }"#;
        let parsed: StartSessionResponse = serde_json::from_str(raw).expect("start response");
        assert_eq!(parsed.session_id, SessionId(4));
        assert_eq!(parsed.ai_character.id, CharacterId(1));
        assert_eq!(parsed.initial_mood.map(MoodScore::value), Some(3));
    }

    #[test]
    fn chat_response_tolerates_null_mood() {
        let raw = r#"{"ai_response": "...", "mood_score": null}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("chat response");
        assert!(parsed.mood_score.is_none());
        assert!(parsed.mood_reflection.is_none());
    }

    #[test]
    fn chat_response_reads_mood_sent_as_text() {
        let raw = r#"{"ai_response": "I hear you.", "mood_score": "6", "mood_reflection": "ok"}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("chat response");
        assert_eq!(parsed.ai_response, "I hear you.");
        assert_eq!(parsed.mood_score.map(MoodScore::value), Some(6));
    }

    #[test]
    fn unreadable_mood_keeps_the_reply() {
        for mood in [r#""calm""#, "[4]", r#"{"score": 4}"#, "true"] {
            let raw = format!(r#"{{"ai_response": "Still here.", "mood_score": {mood}}}"#);
            let parsed: ChatResponse = serde_json::from_str(&raw).expect("chat response");
            assert_eq!(parsed.ai_response, "Still here.");
            assert!(parsed.mood_score.is_none(), "{mood}");
        }
    }

    #[test]
    fn report_payload_tolerates_loose_mood_scores() {
        let raw = r#"{"initial_mood_score": " 4 ", "final_mood_score": "n/a", "total_messages": 6}"#;
        let parsed: SessionReportPayload = serde_json::from_str(raw).expect("report");
        assert_eq!(parsed.initial_mood_score.map(MoodScore::value), Some(4));
        assert!(parsed.final_mood_score.is_none());
        assert_eq!(parsed.total_messages, Some(6));
    }

    #[test]
    fn report_payload_accepts_empty_object() {
        let parsed: SessionReportPayload = serde_json::from_str("{}").expect("report");
        assert_eq!(parsed, SessionReportPayload::default());
    }
}
