//! Incremental text rendering of the view model.

use client_core::{
    view::{CharactersPanel, ReportPanelView, ReportSummary, ScreenView, SessionView},
    ViewModel,
};
use shared::domain::Sender;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
enum Shown {
    #[default]
    Nothing,
    CharactersLoading,
    Characters,
    Session,
}

#[derive(Debug, Default)]
pub struct Transcript {
    shown: Shown,
    rows: usize,
    busy: Option<String>,
    typing: bool,
    report: Option<ReportPanelView>,
}

impl Transcript {
    /// Prints whatever changed since the last call.
    pub fn render(&mut self, view: &ViewModel) {
        for line in self.lines(view) {
            println!("{line}");
        }
    }

    fn lines(&mut self, view: &ViewModel) -> Vec<String> {
        let mut out = Vec::new();

        if view.busy != self.busy {
            if let Some(busy) = &view.busy {
                out.push(format!("... {busy}"));
            }
            self.busy = view.busy.clone();
        }

        match &view.screen {
            ScreenView::Selection(selection) => {
                self.rows = 0;
                self.typing = false;
                match &selection.characters {
                    CharactersPanel::Loading => {
                        if self.shown != Shown::CharactersLoading {
                            out.push("Loading AI characters...".to_string());
                            self.shown = Shown::CharactersLoading;
                        }
                    }
                    CharactersPanel::Failed { message } => {
                        if self.shown != Shown::Characters {
                            out.push(format!("{message} Type /reload to try again."));
                            self.shown = Shown::Characters;
                        }
                    }
                    CharactersPanel::Ready(cards) => {
                        if self.shown != Shown::Characters {
                            out.push("Choose an AI patient:".to_string());
                            for (index, card) in cards.iter().enumerate() {
                                out.push(format!(
                                    "  {}. {} - {}",
                                    index + 1,
                                    card.name,
                                    card.description
                                ));
                            }
                            self.shown = Shown::Characters;
                        }
                    }
                }
            }
            ScreenView::Session(session) => self.session_lines(session, &mut out),
        }

        for notice in &view.notices {
            out.push(format!("[error] {}", notice.message));
        }

        let panel = view.report.as_ref().map(|report| report.panel.clone());
        if panel != self.report {
            if let Some(report) = &view.report {
                out.extend(report_lines(&report.panel));
                if !matches!(report.panel, ReportPanelView::Loading) {
                    out.push(format!("Type /new to {}.", report.restart_label.to_lowercase()));
                }
            }
            self.report = panel;
        }

        out
    }

    fn session_lines(&mut self, session: &SessionView, out: &mut Vec<String>) {
        if self.shown != Shown::Session {
            out.push(format!(
                "Session with {} ({})",
                session.patient_name, session.patient_description
            ));
            out.push("Type a message, /end to finish, /quit to leave.".to_string());
            self.shown = Shown::Session;
            self.rows = 0;
        }

        let mut mood_changed = false;
        for row in session.transcript.iter().skip(self.rows) {
            let who = match row.sender {
                Sender::Human => "You".to_string(),
                Sender::Ai => session.patient_name.clone(),
            };
            let mood = match &row.mood {
                Some(badge) => {
                    mood_changed = true;
                    format!(" [mood {}]", badge.text)
                }
                None => String::new(),
            };
            out.push(format!("[{}] {who}: {}{mood}", row.time, row.text));
        }
        self.rows = session.transcript.len();

        if mood_changed {
            let meter = &session.mood;
            let score = meter
                .badge
                .as_ref()
                .map(|badge| format!("{} ({})", badge.text, badge.band.label()))
                .unwrap_or_else(|| "-".to_string());
            out.push(format!("    mood {score}: {}", meter.reflection));
        }

        if session.typing_indicator && !self.typing {
            out.push(format!("{} is typing...", session.patient_name));
        }
        self.typing = session.typing_indicator;
    }
}

fn report_lines(panel: &ReportPanelView) -> Vec<String> {
    match panel {
        ReportPanelView::Loading => vec!["Generating session report...".to_string()],
        ReportPanelView::Failed { message } => vec![message.clone()],
        ReportPanelView::Ready(summary) => summary_lines(summary),
    }
}

fn summary_lines(summary: &ReportSummary) -> Vec<String> {
    let mut lines = vec!["=== Session Report ===".to_string()];
    if let Some(id) = summary.session_id {
        lines.push(format!("Session:   #{id}"));
    }
    lines.extend([
        format!("Patient:   {}", summary.patient_name),
        format!("Condition: {}", summary.condition),
        format!("Duration:  {}", summary.duration),
    ]);
    if let Some(length) = &summary.session_duration {
        lines.push(format!("Recorded:  {length}"));
    }
    lines.push(format!("Messages:  {}", summary.messages));
    if let Some(period) = &summary.period {
        lines.push(format!("Period:    {period}"));
    }
    lines.push(format!(
        "Mood:      {} -> {} ({})",
        summary.initial.text,
        summary.final_mood.text,
        summary.trend.label()
    ));
    lines.push("Key issues:".to_string());
    lines.extend(summary.key_issues.iter().map(|issue| format!("  - {issue}")));
    lines.push(format!("Therapist effectiveness: {}", summary.therapist_effectiveness));
    lines.push(format!("AI progress: {}", summary.ai_progress));
    lines.push("Next steps:".to_string());
    lines.extend(summary.next_steps.iter().map(|step| format!("  - {step}")));
    lines.push(format!("Summary: {}", summary.summary));
    lines
}
