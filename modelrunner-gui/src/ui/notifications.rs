//! Toast notifications in the bottom-right corner.

use eframe::egui::{self, RichText, Rounding, Vec2};

use modelrunner_core::NotificationLevel;

use crate::app::ModelRunnerApp;
use crate::ui::colors;

/// Render the active notifications, newest at the bottom.
pub fn render(app: &ModelRunnerApp, ctx: &egui::Context) {
    if app.notifications.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("notifications"))
        .anchor(egui::Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -36.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            let visuals = ui.visuals().clone();
            for active in &app.notifications {
                let accent = match active.notification.level {
                    NotificationLevel::Success => colors::SUCCESS,
                    NotificationLevel::Info => colors::ACCENT,
                    NotificationLevel::Error => colors::ERROR,
                };
                egui::Frame::none()
                    .fill(colors::toast_bg(&visuals))
                    .stroke(egui::Stroke::new(1.0, accent))
                    .rounding(Rounding::same(8.0))
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                    .show(ui, |ui| {
                        ui.set_max_width(360.0);
                        ui.label(RichText::new(&active.notification.message).color(accent));
                    });
                ui.add_space(6.0);
            }
        });
}
