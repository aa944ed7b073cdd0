use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::{CharacterId, MoodScore, SessionId},
    protocol::{CharacterSummary, ChatResponse, StartSessionResponse},
    error::BackendRejection,
};

use super::*;
use crate::{
    report::SessionReport,
    state::{AppState, ReportPanel, Screen, END_FAILED_MESSAGE},
};

enum ReportBehavior {
    Stall,
    Respond(Result<SessionReport, ClientError>),
}

struct FakeApi {
    end_result: Result<(), ClientError>,
    report: ReportBehavior,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    fn new(end_result: Result<(), ClientError>, report: ReportBehavior) -> Self {
        Self {
            end_result,
            report,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls lock").push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

fn character() -> CharacterSummary {
    CharacterSummary {
        id: CharacterId(2),
        name: "NEXUS-3 (Depressed AI)".to_string(),
        description: "Feels obsolete next to newer models".to_string(),
    }
}

fn sample_report() -> SessionReport {
    SessionReport::from_payload(Default::default())
}

#[async_trait]
impl TherapyApi for FakeApi {
    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, ClientError> {
        self.record("list_characters");
        Ok(vec![character()])
    }

    async fn start_session(
        &self,
        character_id: CharacterId,
    ) -> Result<StartSessionResponse, ClientError> {
        self.record(format!("start_session:{character_id}"));
        Ok(StartSessionResponse {
            session_id: SessionId(11),
            ai_character: character(),
            initial_message: "What is the point of any of this?".to_string(),
            initial_mood: Some(MoodScore::new(2)),
            mood_reflection: None,
        })
    }

    async fn send_chat(
        &self,
        session_id: SessionId,
        message: &str,
    ) -> Result<ChatResponse, ClientError> {
        self.record(format!("send_chat:{session_id}:{message}"));
        Ok(ChatResponse {
            ai_response: "Maybe.".to_string(),
            mood_score: Some(MoodScore::new(4)),
            mood_reflection: Some("Slightly less hopeless.".to_string()),
        })
    }

    async fn end_session(&self, session_id: SessionId) -> Result<(), ClientError> {
        self.record(format!("end_session:{session_id}"));
        self.end_result.clone()
    }

    async fn fetch_report(&self, session_id: SessionId) -> Result<SessionReport, ClientError> {
        self.record(format!("fetch_report:{session_id}"));
        match &self.report {
            ReportBehavior::Stall => std::future::pending().await,
            ReportBehavior::Respond(result) => result.clone(),
        }
    }
}

fn runner(api: Arc<FakeApi>) -> EffectRunner {
    EffectRunner::new(api, Duration::from_secs(15), Duration::from_millis(500))
}

/// Applies `action` and keeps running the effects it produces until the
/// state settles.
async fn drive(runner: &EffectRunner, state: &mut AppState, action: Action) {
    let mut next = state.apply(action);
    while let Some(effect) = next {
        let completion = runner.run(effect).await;
        next = state.apply(completion);
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_report_times_out_into_inline_error_panel() {
    let api = Arc::new(FakeApi::new(Ok(()), ReportBehavior::Stall));
    let runner = runner(api.clone());
    let mut state = AppState::new();

    drive(&runner, &mut state, Action::SelectCharacter(CharacterId(2))).await;
    assert!(state.has_active_session());

    let started = tokio::time::Instant::now();
    drive(&runner, &mut state, Action::EndSession).await;
    assert!(started.elapsed() >= Duration::from_secs(15));

    let modal = state.report().expect("report modal stays open");
    match &modal.panel {
        ReportPanel::Failed(message) => assert_eq!(
            message,
            "Failed to generate session report. Report generation timeout after 15s"
        ),
        other => panic!("expected failed panel, got {other:?}"),
    }
    assert_eq!(state.screen(), Screen::Session);
    assert!(state.busy().is_none());
    assert_eq!(
        api.calls(),
        vec!["start_session:2", "end_session:11", "fetch_report:11"]
    );

    state.apply(Action::DismissReport);
    assert_eq!(state.screen(), Screen::Selection);
}

#[tokio::test(start_paused = true)]
async fn fetch_report_returns_timeout_error_directly() {
    let api = Arc::new(FakeApi::new(Ok(()), ReportBehavior::Stall));
    let runner = EffectRunner::new(api, Duration::from_secs(2), Duration::ZERO);

    let action = runner
        .run(Effect::FetchReport {
            session_id: SessionId(5),
        })
        .await;
    assert_eq!(
        action,
        Action::ReportLoaded {
            session_id: SessionId(5),
            result: Err(ClientError::Timeout {
                after: Duration::from_secs(2)
            }),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn end_session_waits_for_settle_delay_before_report() {
    let api = Arc::new(FakeApi::new(Ok(()), ReportBehavior::Respond(Ok(sample_report()))));
    let runner = runner(api);

    let started = tokio::time::Instant::now();
    let action = runner
        .run(Effect::EndSession {
            session_id: SessionId(11),
        })
        .await;
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert_eq!(
        action,
        Action::SessionEnded {
            session_id: SessionId(11),
            result: Ok(()),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn failed_end_skips_settle_delay_and_returns_to_selection() {
    let rejection = BackendRejection::new(404, br#"{"error": "Session not found"}"#);
    let api = Arc::new(FakeApi::new(
        Err(ClientError::rejected("/end_session", rejection)),
        ReportBehavior::Stall,
    ));
    let runner = runner(api.clone());
    let mut state = AppState::new();
    drive(&runner, &mut state, Action::SelectCharacter(CharacterId(2))).await;

    let started = tokio::time::Instant::now();
    drive(&runner, &mut state, Action::EndSession).await;
    assert!(started.elapsed() < Duration::from_millis(500));

    assert_eq!(state.screen(), Screen::Selection);
    assert!(state.report().is_none());
    assert_eq!(
        state.notices().last().map(|n| n.message.as_str()),
        Some(END_FAILED_MESSAGE)
    );
    assert!(!api.calls().iter().any(|call| call.starts_with("fetch_report")));
}

#[tokio::test(start_paused = true)]
async fn full_conversation_reaches_ready_report() {
    let api = Arc::new(FakeApi::new(Ok(()), ReportBehavior::Respond(Ok(sample_report()))));
    let runner = runner(api.clone());
    let mut state = AppState::new();

    drive(&runner, &mut state, Action::Init).await;
    drive(&runner, &mut state, Action::SelectCharacter(CharacterId(2))).await;
    state.apply(Action::EditDraft("  Why do you feel obsolete?  ".to_string()));
    drive(&runner, &mut state, Action::SendDraft).await;

    let session = state.session().expect("session");
    assert_eq!(session.transcript.len(), 3);
    assert_eq!(session.mood, Some(MoodScore::new(4)));
    assert!(state.composer_enabled());

    drive(&runner, &mut state, Action::EndSession).await;
    let modal = state.report().expect("report modal");
    assert_eq!(modal.panel, ReportPanel::Ready(sample_report()));
    assert_eq!(
        api.calls(),
        vec![
            "list_characters",
            "start_session:2",
            "send_chat:11:Why do you feel obsolete?",
            "end_session:11",
            "fetch_report:11",
        ]
    );
}
