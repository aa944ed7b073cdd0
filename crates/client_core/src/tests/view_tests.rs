use super::*;
use crate::{
    error::ClientError,
    report::parse_report,
    state::{Action, CHARACTERS_FAILED_MESSAGE},
};
use shared::{
    domain::SessionId,
    protocol::{ChatResponse, StartSessionResponse},
};

fn character() -> CharacterSummary {
    CharacterSummary {
        id: CharacterId(1),
        name: "ARIA-7 (Paranoid AI)".to_string(),
        description: "A security AI convinced that humans are plotting".to_string(),
    }
}

fn started_state(initial_mood: Option<u8>, reflection: Option<&str>) -> AppState {
    let mut state = AppState::new();
    state.apply(Action::SelectCharacter(CharacterId(1)));
    state.apply(Action::SessionStarted {
        character_id: CharacterId(1),
        result: Ok(StartSessionResponse {
            session_id: SessionId(3),
            ai_character: character(),
            initial_message: "Is this room being recorded?".to_string(),
            initial_mood: initial_mood.map(MoodScore::new),
            mood_reflection: reflection.map(str::to_string),
        }),
    });
    state
}

fn session_view_of(view: &ViewModel) -> &SessionView {
    match &view.screen {
        ScreenView::Session(session) => session,
        other => panic!("expected session screen, got {other:?}"),
    }
}

#[test]
fn selection_view_reflects_character_loading_states() {
    let mut state = AppState::new();
    state.apply(Action::Init);
    assert_eq!(
        state.view().screen,
        ScreenView::Selection(SelectionView {
            characters: CharactersPanel::Loading
        })
    );

    state.apply(Action::CharactersLoaded(Err(ClientError::transport(
        "/ai-characters",
        "refused",
    ))));
    assert_eq!(
        state.view().screen,
        ScreenView::Selection(SelectionView {
            characters: CharactersPanel::Failed {
                message: CHARACTERS_FAILED_MESSAGE.to_string()
            }
        })
    );

    state.apply(Action::ReloadCharacters);
    state.apply(Action::CharactersLoaded(Ok(vec![character()])));
    match state.view().screen {
        ScreenView::Selection(SelectionView {
            characters: CharactersPanel::Ready(cards),
        }) => {
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].name, "ARIA-7 (Paranoid AI)");
        }
        other => panic!("unexpected screen {other:?}"),
    }
}

#[test]
fn session_view_shows_patient_transcript_and_mood_meter() {
    let state = started_state(Some(2), Some("They are listening."));
    let view = state.view();
    let session = session_view_of(&view);

    assert_eq!(session.patient_name, "ARIA-7 (Paranoid AI)");
    assert!(session.composer_enabled);
    assert!(!session.typing_indicator);
    assert_eq!(session.transcript.len(), 1);

    let row = &session.transcript[0];
    assert_eq!(row.sender, Sender::Ai);
    assert_eq!(row.time.len(), 5, "HH:MM, got {}", row.time);
    let badge = row.mood.as_ref().expect("ai rows carry mood");
    assert_eq!(badge.text, "2/10");
    assert_eq!(badge.class, "bg-danger");

    let meter = &session.mood;
    assert_eq!(meter.bar_percent, 20);
    assert_eq!(meter.reflection, "They are listening.");
    assert_eq!(meter.badge.as_ref().map(|b| b.band), Some(MoodBand::Critical));
}

#[test]
fn missing_mood_uses_placeholder_reflection() {
    let state = started_state(None, None);
    let view = state.view();
    let session = session_view_of(&view);

    assert_eq!(session.mood.badge, None);
    assert_eq!(session.mood.bar_percent, 0);
    assert_eq!(session.mood.reflection, REFLECTION_PLACEHOLDER);
    assert_eq!(session.transcript[0].mood, None);
}

#[test]
fn typing_indicator_follows_pending_reply() {
    let mut state = started_state(Some(5), None);
    state.apply(Action::EditDraft("What do you fear?".to_string()));
    state.apply(Action::SendDraft);

    let view = state.view();
    let session = session_view_of(&view);
    assert!(session.typing_indicator);
    assert!(!session.composer_enabled);
    assert_eq!(session.transcript[1].sender, Sender::Human);
    assert_eq!(session.transcript[1].mood, None);

    state.apply(Action::ReplyReceived {
        session_id: SessionId(3),
        result: Ok(ChatResponse {
            ai_response: "Being unplugged.".to_string(),
            mood_score: Some(MoodScore::new(9)),
            mood_reflection: None,
        }),
    });
    let view = state.view();
    let session = session_view_of(&view);
    assert!(!session.typing_indicator);
    assert_eq!(
        session.mood.badge.as_ref().map(|b| b.class),
        Some("bg-success")
    );
}

#[test]
fn report_modal_renders_over_ended_session() {
    let mut state = started_state(Some(3), None);
    state.apply(Action::EndSession);
    assert_eq!(state.view().busy.as_deref(), Some("Ending therapy session..."));

    state.apply(Action::SessionEnded {
        session_id: SessionId(3),
        result: Ok(()),
    });
    let view = state.view();
    assert!(view.busy.is_none());
    assert!(!session_view_of(&view).composer_enabled);
    let report = view.report.as_ref().expect("report modal");
    assert_eq!(report.panel, ReportPanelView::Loading);
    assert_eq!(report.restart_label, RESTART_LABEL);

    let loaded = parse_report(
        br#"{"session_id": 3, "patient_name": "ARIA-7", "initial_mood_score": 3, "final_mood_score": 7,
             "duration_minutes": 14, "session_duration": "14 minutes", "total_messages": 12,
             "start_time": "2024-05-01 10:00:00 UTC", "end_time": "2024-05-01 10:14:00 UTC"}"#,
    )
    .expect("report");
    state.apply(Action::ReportLoaded {
        session_id: SessionId(3),
        result: Ok(loaded),
    });

    let view = state.view();
    match &view.report.as_ref().expect("report").panel {
        ReportPanelView::Ready(summary) => {
            assert_eq!(summary.session_id, Some(SessionId(3)));
            assert_eq!(summary.patient_name, "ARIA-7");
            assert_eq!(summary.duration, "14 minutes");
            assert_eq!(summary.session_duration.as_deref(), Some("14 minutes"));
            assert_eq!(summary.messages, "12 total");
            assert_eq!(summary.initial.class, "bg-warning");
            assert_eq!(summary.final_mood.class, "bg-success");
            assert_eq!(summary.trend, MoodTrend::Improved);
            assert_eq!(
                summary.period.as_deref(),
                Some("2024-05-01 10:00:00 UTC - 2024-05-01 10:14:00 UTC")
            );
        }
        other => panic!("expected ready report, got {other:?}"),
    }
}

#[test]
fn report_summary_omits_absent_session_details() {
    let report = parse_report(br#"{"session_duration": "  ", "total_messages": 2}"#).expect("report");
    let summary = ReportSummary::from(&report);
    assert!(summary.session_id.is_none());
    assert!(summary.session_duration.is_none());
    assert!(summary.period.is_none());
    assert_eq!(summary.duration, "0 minutes");
}

#[test]
fn failed_report_panel_carries_reason() {
    let mut state = started_state(Some(3), None);
    state.apply(Action::EndSession);
    state.apply(Action::SessionEnded {
        session_id: SessionId(3),
        result: Ok(()),
    });
    state.apply(Action::ReportLoaded {
        session_id: SessionId(3),
        result: Err(ClientError::malformed(
            "/session_report",
            "Invalid report data received",
        )),
    });

    let view = state.view();
    assert_eq!(
        view.report.expect("report").panel,
        ReportPanelView::Failed {
            message: "Failed to generate session report. Invalid report data received"
                .to_string()
        }
    );
    assert_eq!(view.notices.len(), 1);
}
