//! Settings dialog.

use eframe::egui::{self, RichText, Rounding, Vec2};

use modelrunner_core::Theme;

use crate::app::{apply_theme, ModelRunnerApp};
use crate::ui::colors;

const FIELD_WIDTH: f32 = 300.0;

const CONVERT_COMMAND_HINT: &str =
    "Conversion runs: <python> <script> --in <model> --out <output> --strategy <strategy>";

/// Render the settings dialog.
pub fn render(app: &mut ModelRunnerApp, ctx: &egui::Context) {
    let mut open = app.show_settings;

    egui::Window::new("Settings")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .default_width(520.0)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            let muted = colors::muted(ui.visuals());

            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([12.0, 10.0])
                .show(ui, |ui| {
                    heading_row(ui, "Models");

                    ui.label("Model directory");
                    ui.horizontal(|ui| {
                        text_field(ui, &mut app.settings.local_model_dir, FIELD_WIDTH - 90.0);
                        if ui
                            .add(egui::Button::new("Browse...").rounding(Rounding::same(6.0)))
                            .clicked()
                        {
                            app.open_model_dir_dialog();
                        }
                    });
                    ui.end_row();

                    ui.label("Python");
                    text_field(ui, &mut app.settings.python_path, FIELD_WIDTH);
                    ui.end_row();

                    ui.label("Convert script");
                    text_field(ui, &mut app.settings.convert_script, FIELD_WIDTH);
                    ui.end_row();

                    heading_row(ui, "API Server");

                    ui.label("Host");
                    text_field(ui, &mut app.settings.api_host, FIELD_WIDTH);
                    ui.end_row();

                    ui.label("Update timeout");
                    ui.add(
                        egui::Slider::new(&mut app.settings.update_timeout_secs, 1..=300)
                            .suffix(" s"),
                    );
                    ui.end_row();

                    ui.label("Startup config");
                    ui.checkbox(
                        &mut app.settings.apply_selection_immediately,
                        "Follow the selected config",
                    );
                    ui.end_row();

                    heading_row(ui, "Appearance");

                    ui.label("Theme");
                    ui.horizontal(|ui| theme_picker(app, ui, ctx));
                    ui.end_row();
                });

            ui.label(
                RichText::new(CONVERT_COMMAND_HINT)
                    .size(11.0)
                    .color(muted)
                    .monospace(),
            );

            ui.add_space(12.0);
            ui.separator();
            render_footer(app, ui, ctx, muted);
        });

    // Closing through the title bar discards changes
    if app.show_settings && !open {
        app.reload_settings(ctx);
        app.show_settings = false;
    }
}

fn heading_row(ui: &mut egui::Ui, title: &str) {
    ui.label(RichText::new(title).strong().size(14.0));
    ui.label("");
    ui.end_row();
}

/// Switch themes live; Cancel restores the saved one.
fn theme_picker(app: &mut ModelRunnerApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    for theme in Theme::all() {
        let selected = app.settings.theme == *theme;
        if ui.selectable_label(selected, theme.to_string()).clicked() && !selected {
            app.settings.theme = *theme;
            apply_theme(ctx, *theme);
        }
    }
}

fn text_field(ui: &mut egui::Ui, value: &mut String, width: f32) -> egui::Response {
    ui.add(egui::TextEdit::singleline(value).desired_width(width))
}

fn render_footer(
    app: &mut ModelRunnerApp,
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    muted: egui::Color32,
) {
    let button_size = Vec2::new(96.0, 28.0);

    ui.horizontal(|ui| {
        let save = egui::Button::new(RichText::new("Save").strong())
            .fill(colors::ACCENT)
            .rounding(Rounding::same(6.0));
        if ui.add_sized(button_size, save).clicked() {
            app.save_settings();
            app.show_settings = false;
        }

        let cancel = egui::Button::new("Cancel").rounding(Rounding::same(6.0));
        if ui.add_sized(button_size, cancel).clicked() {
            app.reload_settings(ctx);
            app.show_settings = false;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("Model Runner v{}", modelrunner_core::VERSION))
                    .size(11.0)
                    .color(muted),
            );
        });
    });
}
