//! Small reusable pieces: mood badges, the mood meter and the report body.

use client_core::{
    mood::MoodBand,
    view::{MoodBadge, MoodMeter, ReportSummary},
    MoodTrend,
};

pub fn band_color(band: MoodBand) -> egui::Color32 {
    let [r, g, b] = band.rgb();
    egui::Color32::from_rgb(r, g, b)
}

pub fn trend_color(trend: MoodTrend) -> egui::Color32 {
    match trend {
        MoodTrend::Improved => band_color(MoodBand::Good),
        MoodTrend::Declined => band_color(MoodBand::Critical),
        MoodTrend::Stable => egui::Color32::GRAY,
    }
}

pub const NOTICE_FILL: egui::Color32 = egui::Color32::from_rgb(111, 53, 53);

pub fn mood_badge(ui: &mut egui::Ui, badge: &MoodBadge) -> egui::Response {
    egui::Frame::NONE
        .fill(band_color(badge.band))
        .corner_radius(6.0)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(&badge.text)
                    .color(egui::Color32::WHITE)
                    .small()
                    .strong(),
            )
        })
        .inner
}

pub fn mood_meter(ui: &mut egui::Ui, meter: &MoodMeter) {
    ui.label(egui::RichText::new("Patient mood").strong());
    ui.add_space(4.0);
    match &meter.badge {
        Some(badge) => {
            ui.horizontal(|ui| {
                mood_badge(ui, badge);
                ui.label(badge.band.label());
            });
            ui.add(
                egui::ProgressBar::new(f32::from(meter.bar_percent) / 100.0)
                    .fill(band_color(badge.band))
                    .desired_height(10.0),
            );
        }
        None => {
            ui.add(egui::ProgressBar::new(0.0).desired_height(10.0));
        }
    }
    ui.add_space(6.0);
    ui.label(egui::RichText::new(&meter.reflection).italics());
}

pub fn report_summary(ui: &mut egui::Ui, summary: &ReportSummary) {
    egui::Grid::new("report_overview")
        .num_columns(2)
        .spacing([16.0, 6.0])
        .show(ui, |ui| {
            if let Some(id) = summary.session_id {
                ui.label("Session");
                ui.label(format!("#{id}"));
                ui.end_row();
            }
            ui.label("Patient");
            ui.label(egui::RichText::new(&summary.patient_name).strong());
            ui.end_row();
            ui.label("Condition");
            ui.label(summary.condition.as_str());
            ui.end_row();
            ui.label("Duration");
            ui.label(summary.duration.as_str());
            ui.end_row();
            if let Some(length) = &summary.session_duration {
                ui.label("Recorded length");
                ui.label(length.as_str());
                ui.end_row();
            }
            ui.label("Messages");
            ui.label(summary.messages.as_str());
            ui.end_row();
            if let Some(period) = &summary.period {
                ui.label("Session period");
                ui.label(period.as_str());
                ui.end_row();
            }
            ui.label("Mood");
            ui.horizontal(|ui| {
                mood_badge(ui, &summary.initial);
                ui.label("→");
                mood_badge(ui, &summary.final_mood);
                ui.colored_label(trend_color(summary.trend), summary.trend.label());
            });
            ui.end_row();
        });

    ui.separator();
    section(ui, "Key issues", |ui| bullet_list(ui, &summary.key_issues));
    section(ui, "Therapist effectiveness", |ui| {
        ui.label(summary.therapist_effectiveness.as_str());
    });
    section(ui, "AI progress", |ui| {
        ui.label(summary.ai_progress.as_str());
    });
    section(ui, "Next steps", |ui| bullet_list(ui, &summary.next_steps));
    section(ui, "Summary", |ui| {
        ui.label(summary.summary.as_str());
    });
}

fn section(ui: &mut egui::Ui, title: &str, body: impl FnOnce(&mut egui::Ui)) {
    ui.add_space(6.0);
    ui.label(egui::RichText::new(title).strong());
    body(ui);
}

fn bullet_list(ui: &mut egui::Ui, items: &[String]) {
    for item in items {
        ui.label(format!("• {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_colors_follow_mood_palette() {
        assert_eq!(
            band_color(MoodBand::Critical),
            egui::Color32::from_rgb(0xef, 0x44, 0x44)
        );
        assert_eq!(trend_color(MoodTrend::Improved), band_color(MoodBand::Good));
        assert_eq!(trend_color(MoodTrend::Stable), egui::Color32::GRAY);
    }
}
