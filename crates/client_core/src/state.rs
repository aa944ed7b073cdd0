//! Owned view state for the therapy desk and the reducer that drives it.
//!
//! Every user intent and every backend completion is an [`Action`]. Applying
//! an action mutates [`AppState`] synchronously and may yield one [`Effect`]
//! for the caller to execute; the effect's outcome comes back as another
//! action. Completions carry the session they were issued for so that late
//! answers for a discarded session are dropped instead of applied.

use chrono::{DateTime, Utc};
use shared::{
    domain::{CharacterId, MoodScore, Sender, SessionId},
    protocol::{CharacterSummary, ChatResponse, StartSessionResponse},
};
use tracing::{debug, info, warn};

use crate::{error::ClientError, report::SessionReport};

pub const STARTING_SESSION_MESSAGE: &str = "Initializing therapy session...";
pub const ENDING_SESSION_MESSAGE: &str = "Ending therapy session...";
pub const CHARACTERS_FAILED_MESSAGE: &str =
    "Failed to load AI characters. Please retry in a moment.";
pub const START_FAILED_MESSAGE: &str = "Failed to start therapy session. Please try again.";
pub const CHAT_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";
pub const END_FAILED_MESSAGE: &str =
    "Failed to end session properly, but you can still start a new one.";
pub const REPORT_FAILED_MESSAGE: &str = "Report generation failed. You can start a new session.";
pub const EXIT_GUARD_MESSAGE: &str =
    "You have an active therapy session. Are you sure you want to leave?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Selection,
    Session,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharactersState {
    Idle,
    Loading,
    Failed(String),
    Ready(Vec<CharacterSummary>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub mood: Option<MoodScore>,
}

impl ChatMessage {
    fn human(text: String) -> Self {
        Self {
            sender: Sender::Human,
            text,
            sent_at: Utc::now(),
            mood: None,
        }
    }

    fn ai(text: String, mood: Option<MoodScore>) -> Self {
        Self {
            sender: Sender::Ai,
            text,
            sent_at: Utc::now(),
            mood,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub id: SessionId,
    pub character: CharacterSummary,
    pub mood: Option<MoodScore>,
    pub mood_reflection: Option<String>,
    pub transcript: Vec<ChatMessage>,
    pub awaiting_reply: bool,
}

impl ActiveSession {
    fn from_start(response: StartSessionResponse) -> Self {
        let opening = ChatMessage::ai(response.initial_message, response.initial_mood);
        Self {
            id: response.session_id,
            character: response.ai_character,
            mood: response.initial_mood,
            mood_reflection: response.mood_reflection,
            transcript: vec![opening],
            awaiting_reply: false,
        }
    }

    fn record_reply(&mut self, reply: ChatResponse) {
        self.transcript
            .push(ChatMessage::ai(reply.ai_response, reply.mood_score));
        if let Some(score) = reply.mood_score {
            self.mood = Some(score);
            self.mood_reflection = reply.mood_reflection;
        } else if reply.mood_reflection.is_some() {
            self.mood_reflection = reply.mood_reflection;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportPanel {
    Loading,
    Ready(SessionReport),
    Failed(String),
}

/// Report modal for a session that has already been closed on the backend.
/// The ended session stays around only as the modal's backdrop.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportModal {
    pub session: ActiveSession,
    pub panel: ReportPanel,
}

/// Error toast raised when a backend call fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Init,
    ReloadCharacters,
    CharactersLoaded(Result<Vec<CharacterSummary>, ClientError>),
    SelectCharacter(CharacterId),
    SessionStarted {
        character_id: CharacterId,
        result: Result<StartSessionResponse, ClientError>,
    },
    EditDraft(String),
    SendDraft,
    ReplyReceived {
        session_id: SessionId,
        result: Result<ChatResponse, ClientError>,
    },
    EndSession,
    SessionEnded {
        session_id: SessionId,
        result: Result<(), ClientError>,
    },
    ReportLoaded {
        session_id: SessionId,
        result: Result<SessionReport, ClientError>,
    },
    ReturnToSelection,
    DismissReport,
    DismissNotice(u64),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ReloadCharacters => "reload_characters",
            Self::CharactersLoaded(_) => "characters_loaded",
            Self::SelectCharacter(_) => "select_character",
            Self::SessionStarted { .. } => "session_started",
            Self::EditDraft(_) => "edit_draft",
            Self::SendDraft => "send_draft",
            Self::ReplyReceived { .. } => "reply_received",
            Self::EndSession => "end_session",
            Self::SessionEnded { .. } => "session_ended",
            Self::ReportLoaded { .. } => "report_loaded",
            Self::ReturnToSelection => "return_to_selection",
            Self::DismissReport => "dismiss_report",
            Self::DismissNotice(_) => "dismiss_notice",
        }
    }
}

/// Backend work requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadCharacters,
    StartSession { character_id: CharacterId },
    SendChat { session_id: SessionId, message: String },
    EndSession { session_id: SessionId },
    FetchReport { session_id: SessionId },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCharacters => "load_characters",
            Self::StartSession { .. } => "start_session",
            Self::SendChat { .. } => "send_chat",
            Self::EndSession { .. } => "end_session",
            Self::FetchReport { .. } => "fetch_report",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    characters: CharactersState,
    session: Option<ActiveSession>,
    report: Option<ReportModal>,
    pending_start: Option<CharacterId>,
    busy: Option<String>,
    draft: String,
    notices: Vec<Notice>,
    next_notice_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            characters: CharactersState::Idle,
            session: None,
            report: None,
            pending_start: None,
            busy: None,
            draft: String::new(),
            notices: Vec::new(),
            next_notice_id: 1,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_some() || self.report.is_some() {
            Screen::Session
        } else {
            Screen::Selection
        }
    }

    pub fn characters(&self) -> &CharactersState {
        &self.characters
    }

    pub fn session(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    pub fn report(&self) -> Option<&ReportModal> {
        self.report.as_ref()
    }

    pub fn busy(&self) -> Option<&str> {
        self.busy.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    /// Input box and send control are usable only with a live session that
    /// is not waiting on a reply and is not covered by an overlay.
    pub fn composer_enabled(&self) -> bool {
        match &self.session {
            Some(session) => {
                !session.awaiting_reply && self.report.is_none() && self.busy.is_none()
            }
            None => false,
        }
    }

    /// Closing the window mid-session needs explicit confirmation.
    pub fn exit_guard(&self) -> Option<&'static str> {
        self.has_active_session().then_some(EXIT_GUARD_MESSAGE)
    }

    pub fn apply(&mut self, action: Action) -> Option<Effect> {
        debug!(action = action.name(), "applying action");
        match action {
            Action::Init | Action::ReloadCharacters => self.load_characters(),
            Action::CharactersLoaded(result) => {
                self.characters_loaded(result);
                None
            }
            Action::SelectCharacter(character_id) => self.select_character(character_id),
            Action::SessionStarted {
                character_id,
                result,
            } => {
                self.session_started(character_id, result);
                None
            }
            Action::EditDraft(text) => {
                self.draft = text;
                None
            }
            Action::SendDraft => self.send_draft(),
            Action::ReplyReceived { session_id, result } => {
                self.reply_received(session_id, result);
                None
            }
            Action::EndSession => self.end_session(),
            Action::SessionEnded { session_id, result } => self.session_ended(session_id, result),
            Action::ReportLoaded { session_id, result } => {
                self.report_loaded(session_id, result);
                None
            }
            Action::ReturnToSelection | Action::DismissReport => {
                self.reset_to_selection();
                None
            }
            Action::DismissNotice(id) => {
                self.notices.retain(|notice| notice.id != id);
                None
            }
        }
    }

    fn load_characters(&mut self) -> Option<Effect> {
        if self.characters == CharactersState::Loading {
            return None;
        }
        self.characters = CharactersState::Loading;
        Some(Effect::LoadCharacters)
    }

    fn characters_loaded(&mut self, result: Result<Vec<CharacterSummary>, ClientError>) {
        match result {
            Ok(characters) => {
                info!(count = characters.len(), "loaded AI characters");
                self.characters = CharactersState::Ready(characters);
            }
            Err(err) => {
                warn!(error = %err, "error loading AI characters");
                self.characters = CharactersState::Failed(CHARACTERS_FAILED_MESSAGE.to_string());
            }
        }
    }

    fn select_character(&mut self, character_id: CharacterId) -> Option<Effect> {
        if self.pending_start.is_some() {
            debug!(%character_id, "session start already in flight; ignoring selection");
            return None;
        }
        self.pending_start = Some(character_id);
        self.busy = Some(STARTING_SESSION_MESSAGE.to_string());
        Some(Effect::StartSession { character_id })
    }

    fn session_started(
        &mut self,
        character_id: CharacterId,
        result: Result<StartSessionResponse, ClientError>,
    ) {
        if self.pending_start != Some(character_id) {
            debug!(%character_id, "dropping session start for a superseded selection");
            return;
        }
        self.pending_start = None;
        self.busy = None;

        match result {
            Ok(response) => {
                info!(
                    session_id = %response.session_id,
                    character = %response.ai_character.name,
                    "therapy session started"
                );
                // Any previous session is discarded without telling the backend.
                self.report = None;
                self.draft.clear();
                self.session = Some(ActiveSession::from_start(response));
            }
            Err(err) => {
                warn!(%character_id, error = %err, "error starting session");
                self.push_notice(START_FAILED_MESSAGE);
            }
        }
    }

    fn send_draft(&mut self) -> Option<Effect> {
        let message = self.draft.trim().to_string();
        if message.is_empty() {
            return None;
        }
        if !self.composer_enabled() {
            debug!("composer disabled; rejecting send");
            return None;
        }
        let session = self.session.as_mut()?;

        session.transcript.push(ChatMessage::human(message.clone()));
        session.awaiting_reply = true;
        self.draft.clear();
        Some(Effect::SendChat {
            session_id: session.id,
            message,
        })
    }

    fn reply_received(&mut self, session_id: SessionId, result: Result<ChatResponse, ClientError>) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == session_id) else {
            debug!(%session_id, "dropping chat reply for an inactive session");
            return;
        };
        session.awaiting_reply = false;

        match result {
            Ok(reply) => session.record_reply(reply),
            Err(err) => {
                warn!(%session_id, error = %err, "error sending message");
                self.push_notice(CHAT_FAILED_MESSAGE);
            }
        }
    }

    fn end_session(&mut self) -> Option<Effect> {
        if self.busy.is_some() {
            return None;
        }
        let session_id = self.session.as_ref()?.id;
        self.busy = Some(ENDING_SESSION_MESSAGE.to_string());
        Some(Effect::EndSession { session_id })
    }

    fn session_ended(
        &mut self,
        session_id: SessionId,
        result: Result<(), ClientError>,
    ) -> Option<Effect> {
        if self.session.as_ref().map(|s| s.id) != Some(session_id) {
            debug!(%session_id, "dropping end-session result for an inactive session");
            return None;
        }
        self.busy = None;

        match result {
            Ok(()) => {
                let session = self.session.take()?;
                info!(%session_id, messages = session.transcript.len(), "therapy session ended");
                self.draft.clear();
                self.report = Some(ReportModal {
                    session,
                    panel: ReportPanel::Loading,
                });
                Some(Effect::FetchReport { session_id })
            }
            Err(err) => {
                warn!(%session_id, error = %err, "error ending session");
                self.push_notice(END_FAILED_MESSAGE);
                self.reset_to_selection();
                None
            }
        }
    }

    fn report_loaded(&mut self, session_id: SessionId, result: Result<SessionReport, ClientError>) {
        let Some(modal) = self
            .report
            .as_mut()
            .filter(|modal| modal.session.id == session_id)
        else {
            debug!(%session_id, "dropping report for a dismissed modal");
            return;
        };

        match result {
            Ok(report) => modal.panel = ReportPanel::Ready(report),
            Err(err) => {
                warn!(%session_id, timeout = err.is_timeout(), error = %err, "error generating session report");
                modal.panel = ReportPanel::Failed(format!(
                    "Failed to generate session report. {err}"
                ));
                self.push_notice(REPORT_FAILED_MESSAGE);
            }
        }
    }

    fn reset_to_selection(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id, "discarding session and returning to selection");
        }
        self.report = None;
        self.busy = None;
        self.draft.clear();
    }

    fn push_notice(&mut self, message: &str) {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id,
            message: message.to_string(),
            raised_at: Utc::now(),
        });
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
