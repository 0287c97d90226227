//! Top menu bar.

use eframe::egui::{self, RichText};

use modelrunner_core::Theme;

use crate::app::{apply_theme, ModelRunnerApp};
use crate::ui::colors;

/// Render the top menu bar.
pub fn render(app: &mut ModelRunnerApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    egui::menu::bar(ui, |ui| {
        ui.label(RichText::new("Model Runner").strong().size(15.0));
        ui.separator();

        // File menu
        ui.menu_button("File", |ui| {
            if ui.button("New Config").clicked() {
                app.create_config();
                ui.close_menu();
            }

            if ui.button("Rescan Models").clicked() {
                app.refresh_local_models();
                ui.close_menu();
            }

            ui.separator();

            if ui.button("Quit").clicked() {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        // Edit menu
        ui.menu_button("Edit", |ui| {
            if ui.button("Settings...").clicked() {
                app.show_settings = true;
                ui.close_menu();
            }
        });

        // View menu
        ui.menu_button("View", |ui| {
            let dark_mode = app.settings.theme == Theme::Dark;

            if ui.checkbox(&mut { dark_mode }, "Dark Mode").changed() {
                app.settings.theme = if dark_mode { Theme::Light } else { Theme::Dark };
                apply_theme(ctx, app.settings.theme);
                app.save_settings();
            }
        });

        // Right-aligned activity
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if app.editor.is_converting() {
                let time = ui.input(|i| i.time);
                let spinner = match ((time * 4.0) as i32) % 4 {
                    0 => ".",
                    1 => "..",
                    2 => "...",
                    _ => "",
                };
                ui.label(
                    RichText::new(format!("{} Converting...", spinner))
                        .color(colors::ACCENT)
                        .size(12.0),
                );
            }

            let pending = app.editor.pending_pushes();
            if pending > 0 {
                ui.spinner();
                ui.label(
                    RichText::new(format!("Updating server ({pending})"))
                        .color(colors::ACCENT)
                        .size(12.0),
                );
            }
        });
    });
}
