//! Status bar at the bottom of the window.

use eframe::egui::{self, RichText};

use crate::app::ModelRunnerApp;
use crate::ui::colors;

/// Render the status bar.
pub fn render(app: &ModelRunnerApp, ui: &mut egui::Ui) {
    let muted = colors::muted(ui.visuals());

    ui.horizontal(|ui| {
        let current = app.store.current();
        ui.label(
            RichText::new(format!("Startup config: {}", current.name))
                .size(11.0)
                .color(muted),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let config_count = app.store.len();
            ui.label(
                RichText::new(format!("{} configs", config_count))
                    .size(11.0)
                    .color(muted),
            );
            ui.separator();

            let dir = &app.settings.local_model_dir;
            let len = dir.chars().count();
            let display_dir = if len > 50 {
                let tail: String = dir.chars().skip(len - 47).collect();
                format!("...{}", tail)
            } else {
                dir.clone()
            };
            ui.label(
                RichText::new(format!(
                    "Models: {} ({} local)",
                    display_dir,
                    app.store.catalog().local_models().len()
                ))
                .size(11.0)
                .color(muted),
            );
        });
    });
}
