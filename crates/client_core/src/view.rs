//! Declarative view model derived from [`AppState`].
//!
//! Frontends render a `ViewModel` and never inspect the state directly, so
//! everything a screen shows (labels, badge classes, enabled flags) is decided
//! here once.

use chrono::Local;
use shared::{
    domain::{CharacterId, MoodScore, Sender, SessionId},
    protocol::CharacterSummary,
};

use crate::{
    mood::{bar_percentage, score_text, MoodBand, REFLECTION_PLACEHOLDER},
    report::{MoodTrend, SessionReport},
    state::{
        ActiveSession, AppState, CharactersState, ChatMessage, Notice, ReportPanel, Screen,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub screen: ScreenView,
    pub report: Option<ReportView>,
    pub busy: Option<String>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenView {
    Selection(SelectionView),
    Session(SessionView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionView {
    pub characters: CharactersPanel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharactersPanel {
    Loading,
    Failed { message: String },
    Ready(Vec<CharacterCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterCard {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
}

impl From<&CharacterSummary> for CharacterCard {
    fn from(character: &CharacterSummary) -> Self {
        Self {
            id: character.id,
            name: character.name.clone(),
            description: character.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub patient_name: String,
    pub patient_description: String,
    pub transcript: Vec<TranscriptRow>,
    pub typing_indicator: bool,
    pub mood: MoodMeter,
    pub composer_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRow {
    pub sender: Sender,
    pub text: String,
    pub time: String,
    pub mood: Option<MoodBadge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodBadge {
    pub text: String,
    pub band: MoodBand,
    pub class: &'static str,
}

impl MoodBadge {
    pub fn new(score: MoodScore) -> Self {
        let band = MoodBand::classify(score);
        Self {
            text: score_text(score),
            band,
            class: band.badge_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodMeter {
    pub badge: Option<MoodBadge>,
    pub bar_percent: u8,
    pub reflection: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub panel: ReportPanelView,
    pub restart_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportPanelView {
    Loading,
    Ready(Box<ReportSummary>),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub session_id: Option<SessionId>,
    pub patient_name: String,
    pub condition: String,
    pub duration: String,
    pub messages: String,
    /// Backend-formatted length, e.g. "12 minutes".
    pub session_duration: Option<String>,
    pub period: Option<String>,
    pub initial: MoodBadge,
    pub final_mood: MoodBadge,
    pub trend: MoodTrend,
    pub key_issues: Vec<String>,
    pub therapist_effectiveness: String,
    pub ai_progress: String,
    pub next_steps: Vec<String>,
    pub summary: String,
}

impl From<&SessionReport> for ReportSummary {
    fn from(report: &SessionReport) -> Self {
        let period = match (&report.start_time, &report.end_time) {
            (Some(start), Some(end)) => Some(format!("{start} - {end}")),
            (Some(start), None) => Some(start.clone()),
            _ => None,
        };
        Self {
            session_id: report.session_id,
            patient_name: report.patient_name.clone(),
            condition: report.character_description.clone(),
            duration: format!("{} minutes", report.duration_minutes),
            messages: format!("{} total", report.total_messages),
            session_duration: report.session_duration.clone(),
            period,
            initial: MoodBadge::new(report.initial_mood),
            final_mood: MoodBadge::new(report.final_mood),
            trend: report.trend(),
            key_issues: report.key_issues.clone(),
            therapist_effectiveness: report.therapist_effectiveness.clone(),
            ai_progress: report.ai_progress.clone(),
            next_steps: report.next_steps.clone(),
            summary: report.session_summary.clone(),
        }
    }
}

pub const RESTART_LABEL: &str = "Start New Session";

impl AppState {
    pub fn view(&self) -> ViewModel {
        let screen = match self.screen() {
            Screen::Selection => ScreenView::Selection(SelectionView {
                characters: characters_panel(self.characters()),
            }),
            Screen::Session => {
                // With the report modal open the ended session is the backdrop.
                let session = self
                    .session()
                    .or_else(|| self.report().map(|modal| &modal.session));
                match session {
                    Some(session) => {
                        ScreenView::Session(session_view(session, self.composer_enabled()))
                    }
                    None => ScreenView::Selection(SelectionView {
                        characters: characters_panel(self.characters()),
                    }),
                }
            }
        };

        let report = self.report().map(|modal| ReportView {
            panel: match &modal.panel {
                ReportPanel::Loading => ReportPanelView::Loading,
                ReportPanel::Ready(report) => {
                    ReportPanelView::Ready(Box::new(ReportSummary::from(report)))
                }
                ReportPanel::Failed(message) => ReportPanelView::Failed {
                    message: message.clone(),
                },
            },
            restart_label: RESTART_LABEL,
        });

        ViewModel {
            screen,
            report,
            busy: self.busy().map(str::to_string),
            notices: self.notices().to_vec(),
        }
    }
}

fn characters_panel(characters: &CharactersState) -> CharactersPanel {
    match characters {
        CharactersState::Idle | CharactersState::Loading => CharactersPanel::Loading,
        CharactersState::Failed(message) => CharactersPanel::Failed {
            message: message.clone(),
        },
        CharactersState::Ready(characters) => {
            CharactersPanel::Ready(characters.iter().map(CharacterCard::from).collect())
        }
    }
}

fn session_view(session: &ActiveSession, composer_enabled: bool) -> SessionView {
    SessionView {
        patient_name: session.character.name.clone(),
        patient_description: session.character.description.clone(),
        transcript: session.transcript.iter().map(transcript_row).collect(),
        typing_indicator: session.awaiting_reply,
        mood: MoodMeter {
            badge: session.mood.map(MoodBadge::new),
            bar_percent: session.mood.map(bar_percentage).unwrap_or(0),
            reflection: session
                .mood_reflection
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| REFLECTION_PLACEHOLDER.to_string()),
        },
        composer_enabled,
    }
}

fn transcript_row(message: &ChatMessage) -> TranscriptRow {
    TranscriptRow {
        sender: message.sender,
        text: message.text.clone(),
        time: message
            .sent_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string(),
        mood: match message.sender {
            Sender::Ai => message.mood.map(MoodBadge::new),
            Sender::Human => None,
        },
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
