use std::time::Duration;

use chrono::{TimeDelta, Utc};
use client_core::{
    mood::MoodBand,
    state::Notice,
    view::{
        CharactersPanel, ReportPanelView, ReportView, ScreenView, SelectionView, SessionView,
        TranscriptRow,
    },
    Action, AppState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::Sender as MessageSender;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{err_label, UiError, UiErrorContext, UiEvent},
    orchestration::apply_action,
};
use crate::ui::widgets;

const NOTICE_LIFETIME_SECS: i64 = 5;
const SEND_BUTTON_WIDTH: f32 = 88.0;
const COMPOSER_ROW_HEIGHT: f32 = 32.0;

pub struct TherapyDeskApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: AppState,
    status: String,
    startup_error: Option<UiError>,
    close_prompt: Option<&'static str>,
    close_confirmed: bool,
    pending: Vec<Action>,
}

impl TherapyDeskApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, status: String) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            state: AppState::new(),
            status,
            startup_error: None,
            close_prompt: None,
            close_confirmed: false,
            pending: Vec::new(),
        };
        app.dispatch(Action::Init);
        app
    }

    fn dispatch(&mut self, action: Action) {
        apply_action(&mut self.state, action, &self.cmd_tx, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Completed(action) => {
                    if let Some(err) = UiError::from_completion(&action) {
                        tracing::warn!(
                            context = ?err.context(),
                            category = ?err.category(),
                            "{}",
                            err.message()
                        );
                        self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    }
                    self.dispatch(action);
                }
                UiEvent::Error(err) => {
                    self.status = format!("{} error: {}", err_label(err.category()), err.message());
                    if err.context() == UiErrorContext::BackendStartup {
                        self.startup_error = Some(err);
                    }
                }
            }
        }
    }

    fn expire_notices(&mut self) {
        let now = Utc::now();
        let lifetime = TimeDelta::seconds(NOTICE_LIFETIME_SECS);
        let expired: Vec<u64> = self
            .state
            .notices()
            .iter()
            .filter(|notice| now.signed_duration_since(notice.raised_at) >= lifetime)
            .map(|notice| notice.id)
            .collect();
        for id in expired {
            self.dispatch(Action::DismissNotice(id));
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.close_confirmed || !ctx.input(|i| i.viewport().close_requested()) {
            return;
        }
        if let Some(warning) = self.state.exit_guard() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.close_prompt = Some(warning);
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::new()
                    .fill(ctx.style().visuals.faint_bg_color)
                    .inner_margin(egui::Margin::symmetric(10, 4)),
            )
            .show(ctx, |ui| match &self.startup_error {
                Some(err) => {
                    ui.colored_label(widgets::band_color(MoodBand::Critical), err.message());
                }
                None => {
                    ui.small(self.status.as_str());
                }
            });
    }

    fn show_selection(&mut self, ctx: &egui::Context, selection: &SelectionView, interactive: bool) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading("AI Therapy Desk");
                ui.label("Choose an AI patient to begin a therapy session.");
            });
            ui.add_space(16.0);

            match &selection.characters {
                CharactersPanel::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading AI characters...");
                    });
                }
                CharactersPanel::Failed { message } => {
                    ui.colored_label(widgets::band_color(MoodBand::Critical), message.as_str());
                    if ui.button("Retry").clicked() {
                        self.pending.push(Action::ReloadCharacters);
                    }
                }
                CharactersPanel::Ready(cards) if cards.is_empty() => {
                    ui.label("No AI characters are available right now.");
                }
                CharactersPanel::Ready(cards) => {
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            for card in cards {
                                egui::Frame::NONE
                                    .fill(ui.visuals().faint_bg_color)
                                    .corner_radius(8.0)
                                    .inner_margin(egui::Margin::symmetric(14, 12))
                                    .show(ui, |ui| {
                                        ui.set_width(ui.available_width());
                                        ui.label(egui::RichText::new(card.name.as_str()).strong().size(16.0));
                                        ui.label(card.description.as_str());
                                        ui.add_space(6.0);
                                        let start = ui.add_enabled(
                                            interactive,
                                            egui::Button::new("Start Session"),
                                        );
                                        if start.clicked() {
                                            self.pending.push(Action::SelectCharacter(card.id));
                                        }
                                    });
                                ui.add_space(8.0);
                            }
                        });
                }
            }
        });
    }

    fn show_session(&mut self, ctx: &egui::Context, session: &SessionView, can_end: bool) {
        egui::TopBottomPanel::top("session_header")
            .frame(
                egui::Frame::new()
                    .fill(ctx.style().visuals.panel_fill)
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.heading(session.patient_name.as_str());
                        ui.label(egui::RichText::new(session.patient_description.as_str()).weak());
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .add_enabled(can_end, egui::Button::new("End Session"))
                            .clicked()
                        {
                            self.pending.push(Action::EndSession);
                        }
                        if ui
                            .add_enabled(can_end, egui::Button::new("New Patient"))
                            .on_hover_text("Discard this session and pick another character")
                            .clicked()
                        {
                            self.pending.push(Action::ReturnToSelection);
                        }
                    });
                });
            });

        egui::SidePanel::right("mood_panel")
            .resizable(false)
            .exact_width(240.0)
            .show(ctx, |ui| {
                ui.add_space(10.0);
                widgets::mood_meter(ui, &session.mood);
            });

        egui::TopBottomPanel::bottom("composer")
            .frame(
                egui::Frame::new()
                    .fill(ctx.style().visuals.panel_fill)
                    .inner_margin(egui::Margin::symmetric(12, 10)),
            )
            .show(ctx, |ui| {
                let mut draft = self.state.draft().to_string();
                ui.add_enabled_ui(session.composer_enabled, |ui| {
                    ui.horizontal(|ui| {
                        let edit_width = (ui.available_width() - SEND_BUTTON_WIDTH - 8.0).max(120.0);
                        let edit = ui.add_sized(
                            [edit_width, COMPOSER_ROW_HEIGHT],
                            egui::TextEdit::singleline(&mut draft)
                                .hint_text("Type your therapeutic response..."),
                        );
                        if edit.changed() {
                            self.pending.push(Action::EditDraft(draft.clone()));
                        }
                        let submitted =
                            edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        let clicked = ui
                            .add_sized([SEND_BUTTON_WIDTH, COMPOSER_ROW_HEIGHT], egui::Button::new("Send"))
                            .clicked();
                        if submitted || clicked {
                            self.pending.push(Action::SendDraft);
                            edit.request_focus();
                        }
                    });
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for row in &session.transcript {
                        message_row(ui, row, &session.patient_name);
                    }
                    if session.typing_indicator {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(
                                egui::RichText::new(format!("{} is typing...", session.patient_name))
                                    .italics()
                                    .weak(),
                            );
                        });
                    }
                });
        });
    }

    fn show_report(&mut self, ctx: &egui::Context, report: &ReportView) {
        let mut open = true;
        egui::Window::new("Session Report")
            .collapsible(false)
            .resizable(true)
            .default_width(520.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .open(&mut open)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(480.0)
                    .show(ui, |ui| match &report.panel {
                        ReportPanelView::Loading => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label("Generating session report...");
                            });
                        }
                        ReportPanelView::Failed { message } => {
                            ui.colored_label(
                                widgets::band_color(MoodBand::Critical),
                                message.as_str(),
                            );
                        }
                        ReportPanelView::Ready(summary) => widgets::report_summary(ui, summary),
                    });
                ui.separator();
                if ui.button(report.restart_label).clicked() {
                    self.pending.push(Action::ReturnToSelection);
                }
            });
        if !open {
            self.pending.push(Action::DismissReport);
        }
    }

    fn show_notices(&mut self, ctx: &egui::Context, notices: &[Notice]) {
        if notices.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("notices"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -40.0])
            .show(ctx, |ui| {
                for notice in notices {
                    egui::Frame::NONE
                        .fill(widgets::NOTICE_FILL)
                        .corner_radius(8.0)
                        .inner_margin(egui::Margin::symmetric(10, 8))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(notice.message.as_str())
                                        .color(egui::Color32::WHITE),
                                );
                                if ui.small_button("✕").clicked() {
                                    self.pending.push(Action::DismissNotice(notice.id));
                                }
                            });
                        });
                    ui.add_space(6.0);
                }
            });
    }

    fn show_close_prompt(&mut self, ctx: &egui::Context) {
        let Some(warning) = self.close_prompt else {
            return;
        };
        let mut leave = false;
        let mut stay = false;
        egui::Window::new("Leave session?")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(warning);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    leave = ui.button("Leave").clicked();
                    stay = ui.button("Stay").clicked();
                });
            });

        if leave {
            self.close_confirmed = true;
            self.close_prompt = None;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else if stay {
            self.close_prompt = None;
        }
    }
}

fn message_row(ui: &mut egui::Ui, row: &TranscriptRow, patient_name: &str) {
    let (who, fill, layout) = match row.sender {
        MessageSender::Human => (
            "You",
            ui.visuals().selection.bg_fill,
            egui::Layout::right_to_left(egui::Align::TOP),
        ),
        MessageSender::Ai => (
            patient_name,
            ui.visuals().faint_bg_color,
            egui::Layout::left_to_right(egui::Align::TOP),
        ),
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::NONE
            .fill(fill)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 6))
            .show(ui, |ui| {
                ui.set_max_width(420.0);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(who).strong());
                        ui.label(egui::RichText::new(row.time.as_str()).small().weak());
                        if let Some(badge) = &row.mood {
                            widgets::mood_badge(ui, badge);
                        }
                    });
                    ui.label(row.text.as_str());
                });
            });
    });
    ui.add_space(6.0);
}

fn show_busy_overlay(ctx: &egui::Context, message: &str) {
    let screen = ctx.content_rect();
    ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("busy_backdrop"),
    ))
    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(150));

    egui::Area::new(egui::Id::new("busy_overlay"))
        .order(egui::Order::Tooltip)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(ctx.style().visuals.window_fill)
                .corner_radius(10.0)
                .inner_margin(egui::Margin::symmetric(20, 16))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(message);
                    });
                });
        });
}

impl eframe::App for TherapyDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.expire_notices();
        self.handle_close_request(ctx);

        let view = self.state.view();
        let overlay_open =
            view.busy.is_some() || view.report.is_some() || self.close_prompt.is_some();

        self.show_status_bar(ctx);
        match &view.screen {
            ScreenView::Selection(selection) => {
                self.show_selection(ctx, selection, view.busy.is_none())
            }
            ScreenView::Session(session) => self.show_session(ctx, session, !overlay_open),
        }
        if let Some(report) = &view.report {
            self.show_report(ctx, report);
        }
        if let Some(busy) = &view.busy {
            show_busy_overlay(ctx, busy);
        }
        self.show_notices(ctx, &view.notices);
        self.show_close_prompt(ctx);

        for action in std::mem::take(&mut self.pending) {
            self.dispatch(action);
        }

        let animating = view.busy.is_some()
            || matches!(&view.screen, ScreenView::Session(session) if session.typing_indicator)
            || matches!(&view.report, Some(report) if report.panel == ReportPanelView::Loading);
        if animating {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
