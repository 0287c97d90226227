//! Config preset editor page.

use eframe::egui::{self, RichText, Rounding, Vec2};

use modelrunner_core::presets::{
    API_PORT_RANGE, MAX_RESPONSE_TOKEN_RANGE, PENALTY_RANGE, TEMPERATURE_RANGE, TOP_P_RANGE,
};
use modelrunner_core::{Device, FieldEdit, ModelConfig, Precision};

use crate::app::ModelRunnerApp;
use crate::ui::colors;

/// Toolbar actions, applied after rendering to avoid borrow conflicts.
enum Action {
    Select(usize),
    Create,
    Delete,
    Save,
    Convert,
    CancelConversion,
    RefreshModels,
}

/// Render the config editor.
pub fn render(app: &mut ModelRunnerApp, ui: &mut egui::Ui) {
    let muted = colors::muted(ui.visuals());
    let mut actions: Vec<Action> = Vec::new();
    let mut edits: Vec<FieldEdit> = Vec::new();

    // Snapshot the draft so widgets can edit copies
    let draft = app.editor.draft().clone();
    let selected = app.editor.selected_index();
    let dirty = app.editor.is_dirty(&app.store);

    // -------------------------------------------------------------------------
    // Preset toolbar
    // -------------------------------------------------------------------------
    ui.horizontal(|ui| {
        let selected_name = app
            .store
            .get(selected)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        egui::ComboBox::from_id_salt("config_select")
            .selected_text(selected_name)
            .width((ui.available_width() - 260.0).max(160.0))
            .show_ui(ui, |ui| {
                for (index, config) in app.store.configs().iter().enumerate() {
                    if ui.selectable_label(index == selected, &config.name).clicked() {
                        actions.push(Action::Select(index));
                    }
                }
            });

        if toolbar_button(ui, "New", "New Config").clicked() {
            actions.push(Action::Create);
        }
        if toolbar_button(ui, "Delete", "Delete Config").clicked() {
            actions.push(Action::Delete);
        }
        let save_label = if dirty { "Save *" } else { "Save" };
        if toolbar_button(ui, save_label, "Save Config").clicked() {
            actions.push(Action::Save);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Config Name");
        let mut name = draft.name.clone();
        if ui
            .add(egui::TextEdit::singleline(&mut name).desired_width(f32::INFINITY))
            .changed()
        {
            edits.push(FieldEdit::Name(name));
        }
    });

    ui.add_space(8.0);

    egui::ScrollArea::vertical().show(ui, |ui| {
        section(
            ui,
            "Default API Parameters",
            Some("Settings marked with * take effect immediately after being saved."),
            |ui| render_api_parameters(ui, &draft, &app.settings.api_host, muted, &mut edits),
        );

        ui.add_space(8.0);

        let local_models: Vec<String> = app
            .store
            .catalog()
            .local_models()
            .into_iter()
            .map(str::to_string)
            .collect();
        let converting = app.editor.is_converting();

        section(ui, "Model Parameters", None, |ui| {
            render_model_parameters(
                ui,
                &draft,
                &local_models,
                converting,
                muted,
                &mut edits,
                &mut actions,
            )
        });
    });

    // Apply collected edits and actions
    app.edit(edits);
    for action in actions {
        match action {
            Action::Select(index) => app.select_config(index),
            Action::Create => app.create_config(),
            Action::Delete => app.delete_config(),
            Action::Save => app.save_config(),
            Action::Convert => app.convert_model(),
            Action::CancelConversion => app.cancel_conversion(),
            Action::RefreshModels => app.refresh_local_models(),
        }
    }
}

fn render_api_parameters(
    ui: &mut egui::Ui,
    draft: &ModelConfig,
    api_host: &str,
    muted: egui::Color32,
    edits: &mut Vec<FieldEdit>,
) {
    let api = &draft.api_parameters;

    egui::Grid::new("api_parameters")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            ui.label("API Port");
            ui.horizontal(|ui| {
                let mut port = api.api_port;
                if ui
                    .add(
                        egui::DragValue::new(&mut port)
                            .range(API_PORT_RANGE.min..=API_PORT_RANGE.max)
                            .speed(API_PORT_RANGE.step),
                    )
                    .changed()
                {
                    edits.push(FieldEdit::ApiPort(port));
                }
                ui.label(
                    RichText::new(format!("{}:{}", api_host, api.api_port))
                        .size(11.0)
                        .color(muted),
                );
            });
            ui.end_row();

            ui.label("Max Response Token *");
            let mut tokens = api.max_response_token;
            if ui
                .add(
                    egui::Slider::new(
                        &mut tokens,
                        MAX_RESPONSE_TOKEN_RANGE.min..=MAX_RESPONSE_TOKEN_RANGE.max,
                    )
                    .step_by(MAX_RESPONSE_TOKEN_RANGE.step as f64),
                )
                .changed()
            {
                edits.push(FieldEdit::MaxResponseToken(tokens));
            }
            ui.end_row();

            let sliders: [(&str, f32, fn(f32) -> FieldEdit, _); 4] = [
                ("Temperature *", api.temperature, FieldEdit::Temperature, TEMPERATURE_RANGE),
                ("Top_P *", api.top_p, FieldEdit::TopP, TOP_P_RANGE),
                (
                    "Presence Penalty *",
                    api.presence_penalty,
                    FieldEdit::PresencePenalty,
                    PENALTY_RANGE,
                ),
                (
                    "Frequency Penalty *",
                    api.frequency_penalty,
                    FieldEdit::FrequencyPenalty,
                    PENALTY_RANGE,
                ),
            ];
            for (label, value, make_edit, range) in sliders {
                ui.label(label);
                let mut value = value;
                if ui
                    .add(
                        egui::Slider::new(&mut value, range.min..=range.max)
                            .step_by(range.step as f64)
                            .fixed_decimals(1),
                    )
                    .changed()
                {
                    edits.push(make_edit(value));
                }
                ui.end_row();
            }
        });
}

fn render_model_parameters(
    ui: &mut egui::Ui,
    draft: &ModelConfig,
    local_models: &[String],
    converting: bool,
    muted: egui::Color32,
    edits: &mut Vec<FieldEdit>,
    actions: &mut Vec<Action>,
) {
    let model = &draft.model_parameters;

    egui::Grid::new("model_parameters")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            ui.label("Model");
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("model_select")
                    .selected_text(model.model_name.as_str())
                    .width(320.0)
                    .show_ui(ui, |ui| {
                        if local_models.is_empty() {
                            ui.label(
                                RichText::new("No local models found")
                                    .color(muted)
                                    .italics(),
                            );
                        }
                        for name in local_models {
                            if ui
                                .selectable_label(&model.model_name == name, name)
                                .clicked()
                            {
                                edits.push(FieldEdit::ModelName(name.clone()));
                            }
                        }
                    });
                if toolbar_button(ui, "Rescan", "Rescan the model directory").clicked() {
                    actions.push(Action::RefreshModels);
                }
            });
            ui.end_row();

            ui.label("");
            ui.horizontal(|ui| {
                if converting {
                    ui.spinner();
                    if toolbar_button(ui, "Cancel", "Stop the running conversion").clicked() {
                        actions.push(Action::CancelConversion);
                    }
                } else if toolbar_button(ui, "Convert", "Convert model with these configs")
                    .clicked()
                {
                    actions.push(Action::Convert);
                }
            });
            ui.end_row();

            ui.label("Device");
            egui::ComboBox::from_id_salt("device_select")
                .selected_text(model.device.to_string())
                .show_ui(ui, |ui| {
                    for device in Device::all() {
                        if ui
                            .selectable_label(model.device == *device, device.to_string())
                            .clicked()
                        {
                            edits.push(FieldEdit::Device(*device));
                        }
                    }
                });
            ui.end_row();

            ui.label("Precision");
            egui::ComboBox::from_id_salt("precision_select")
                .selected_text(model.precision.to_string())
                .show_ui(ui, |ui| {
                    for precision in Precision::all() {
                        if ui
                            .selectable_label(model.precision == *precision, precision.to_string())
                            .clicked()
                        {
                            edits.push(FieldEdit::Precision(*precision));
                        }
                    }
                });
            ui.end_row();

            ui.label("Stored Layers");
            let mut layers = model.stored_layers;
            if ui
                .add(egui::Slider::new(&mut layers, 0..=model.max_stored_layers).step_by(1.0))
                .changed()
            {
                edits.push(FieldEdit::StoredLayers(layers));
            }
            ui.end_row();

            ui.label("Enable High Precision For Last Layer");
            let mut enabled = model.enable_high_precision_for_last_layer;
            if ui.checkbox(&mut enabled, "").changed() {
                edits.push(FieldEdit::EnableHighPrecisionForLastLayer(enabled));
            }
            ui.end_row();
        });

    ui.label(
        RichText::new(format!(
            "Strategy: {}",
            modelrunner_core::strategy(&draft.model_parameters)
        ))
        .size(11.0)
        .color(muted)
        .monospace(),
    );
}

/// Titled card around a group of fields.
fn section(
    ui: &mut egui::Ui,
    title: &str,
    desc: Option<&str>,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let visuals = ui.visuals().clone();
    egui::Frame::none()
        .fill(colors::card_bg(&visuals))
        .stroke(egui::Stroke::new(1.0, colors::border(&visuals)))
        .rounding(Rounding::same(8.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).strong().size(15.0));
            if let Some(desc) = desc {
                ui.label(
                    RichText::new(desc)
                        .size(11.0)
                        .color(colors::muted(&visuals))
                        .italics(),
                );
            }
            ui.add_space(8.0);
            add_contents(ui);
        });
}

fn toolbar_button(ui: &mut egui::Ui, label: &str, tooltip: &str) -> egui::Response {
    ui.add_sized(
        Vec2::new(72.0, 26.0),
        egui::Button::new(label).rounding(Rounding::same(6.0)),
    )
    .on_hover_text(tooltip)
}
