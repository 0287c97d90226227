//! Model configuration record and its field edits.

use serde::{Deserialize, Serialize};

use super::types::{
    Device, Precision, API_PORT_RANGE, MAX_RESPONSE_TOKEN_RANGE, PENALTY_RANGE,
    TEMPERATURE_RANGE, TOP_P_RANGE,
};

/// Name of the seed record in a fresh store.
pub const DEFAULT_CONFIG_NAME: &str = "Default";

/// Model loaded by a freshly created record.
pub const DEFAULT_MODEL_NAME: &str = "RWKV-4-Raven-1B5-v11-Eng99%-Other1%-20230425-ctx4096.pth";

/// Parameters of the local API server.
///
/// Everything except `api_port` can be pushed to a running instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiParameters {
    pub api_port: u16,
    pub max_response_token: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for ApiParameters {
    fn default() -> Self {
        Self {
            api_port: 8000,
            max_response_token: 4100,
            temperature: 1.0,
            top_p: 0.5,
            presence_penalty: 0.4,
            frequency_penalty: 0.4,
        }
    }
}

/// Parameters used when loading the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelParameters {
    /// File name inside the local model directory.
    pub model_name: String,
    pub device: Device,
    pub precision: Precision,
    /// Layers kept resident on the device, `0..=max_stored_layers`.
    pub stored_layers: u32,
    pub max_stored_layers: u32,
    pub enable_high_precision_for_last_layer: bool,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            device: Device::Cuda,
            precision: Precision::Fp16,
            stored_layers: 25,
            max_stored_layers: 25,
            enable_high_precision_for_last_layer: false,
        }
    }
}

/// A named configuration preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub name: String,
    pub api_parameters: ApiParameters,
    pub model_parameters: ModelParameters,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::named(DEFAULT_CONFIG_NAME)
    }
}

impl ModelConfig {
    /// Default-valued record with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_parameters: ApiParameters::default(),
            model_parameters: ModelParameters::default(),
        }
    }

    /// Default-valued record named after the current local time.
    pub fn timestamped() -> Self {
        Self::named(chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string())
    }

    /// Apply one field edit, clamping numeric values to their input range.
    pub fn apply(&mut self, edit: FieldEdit) {
        let api = &mut self.api_parameters;
        let model = &mut self.model_parameters;
        match edit {
            FieldEdit::Name(name) => self.name = name,
            FieldEdit::ApiPort(port) => api.api_port = API_PORT_RANGE.clamp(port),
            FieldEdit::MaxResponseToken(tokens) => {
                api.max_response_token = MAX_RESPONSE_TOKEN_RANGE.clamp(tokens)
            }
            FieldEdit::Temperature(value) => api.temperature = TEMPERATURE_RANGE.clamp(value),
            FieldEdit::TopP(value) => api.top_p = TOP_P_RANGE.clamp(value),
            FieldEdit::PresencePenalty(value) => api.presence_penalty = PENALTY_RANGE.clamp(value),
            FieldEdit::FrequencyPenalty(value) => {
                api.frequency_penalty = PENALTY_RANGE.clamp(value)
            }
            FieldEdit::ModelName(name) => model.model_name = name,
            FieldEdit::Device(device) => model.device = device,
            FieldEdit::Precision(precision) => model.precision = precision,
            FieldEdit::StoredLayers(layers) => {
                model.stored_layers = layers.min(model.max_stored_layers)
            }
            FieldEdit::EnableHighPrecisionForLastLayer(enabled) => {
                model.enable_high_precision_for_last_layer = enabled
            }
        }
    }
}

/// A single edit to one field of a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Name(String),
    ApiPort(u16),
    MaxResponseToken(u32),
    Temperature(f32),
    TopP(f32),
    PresencePenalty(f32),
    FrequencyPenalty(f32),
    ModelName(String),
    Device(Device),
    Precision(Precision),
    StoredLayers(u32),
    EnableHighPrecisionForLastLayer(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.name, "Default");
        assert_eq!(config.api_parameters.api_port, 8000);
        assert_eq!(config.api_parameters.max_response_token, 4100);
        assert_eq!(config.model_parameters.model_name, DEFAULT_MODEL_NAME);
        assert_eq!(config.model_parameters.device, Device::Cuda);
        assert_eq!(config.model_parameters.precision, Precision::Fp16);
        assert_eq!(config.model_parameters.stored_layers, 25);
        assert!(!config.model_parameters.enable_high_precision_for_last_layer);
    }

    #[test]
    fn test_timestamped_has_default_parameters() {
        let config = ModelConfig::timestamped();
        assert!(!config.name.is_empty());
        assert_ne!(config.name, DEFAULT_CONFIG_NAME);
        assert_eq!(config.api_parameters, ApiParameters::default());
        assert_eq!(config.model_parameters, ModelParameters::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ModelConfig::default()).unwrap();
        assert_eq!(json["apiParameters"]["apiPort"], 8000);
        assert_eq!(json["apiParameters"]["maxResponseToken"], 4100);
        assert_eq!(json["modelParameters"]["device"], "CUDA");
        assert_eq!(json["modelParameters"]["enableHighPrecisionForLastLayer"], false);
    }

    #[test]
    fn test_apply_sets_nested_fields() {
        let mut config = ModelConfig::default();
        config.apply(FieldEdit::Name("fast".to_string()));
        config.apply(FieldEdit::TopP(0.9));
        config.apply(FieldEdit::Device(Device::Cpu));
        config.apply(FieldEdit::EnableHighPrecisionForLastLayer(true));

        assert_eq!(config.name, "fast");
        assert!((config.api_parameters.top_p - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.model_parameters.device, Device::Cpu);
        assert!(config.model_parameters.enable_high_precision_for_last_layer);
        // Untouched fields keep their values
        assert_eq!(config.api_parameters.api_port, 8000);
    }

    #[test]
    fn test_apply_clamps_to_input_ranges() {
        let mut config = ModelConfig::default();
        config.apply(FieldEdit::ApiPort(0));
        config.apply(FieldEdit::MaxResponseToken(50));
        config.apply(FieldEdit::Temperature(5.0));
        config.apply(FieldEdit::FrequencyPenalty(-3.0));

        assert_eq!(config.api_parameters.api_port, 1);
        assert_eq!(config.api_parameters.max_response_token, 100);
        assert!((config.api_parameters.temperature - 2.0).abs() < f32::EPSILON);
        assert!((config.api_parameters.frequency_penalty + 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_replaces_nan_with_range_minimum() {
        let mut config = ModelConfig::default();
        config.apply(FieldEdit::TopP(f32::NAN));
        config.apply(FieldEdit::PresencePenalty(f32::NAN));

        assert_eq!(config.api_parameters.top_p, 0.0);
        assert_eq!(config.api_parameters.presence_penalty, -2.0);
    }

    #[test]
    fn test_deserialize_fills_missing_fields_with_defaults() {
        let config: ModelConfig = serde_json::from_value(serde_json::json!({
            "name": "partial",
            "apiParameters": { "apiPort": 9000 },
            "modelParameters": { "device": "CPU" }
        }))
        .unwrap();

        assert_eq!(config.name, "partial");
        assert_eq!(config.api_parameters.api_port, 9000);
        assert_eq!(config.api_parameters.max_response_token, 4100);
        assert_eq!(config.model_parameters.device, Device::Cpu);
        assert_eq!(config.model_parameters.max_stored_layers, 25);
    }

    #[test]
    fn test_stored_layers_bounded_by_max_stored_layers() {
        let mut config = ModelConfig::default();
        config.model_parameters.max_stored_layers = 12;
        config.apply(FieldEdit::StoredLayers(40));
        assert_eq!(config.model_parameters.stored_layers, 12);

        config.apply(FieldEdit::StoredLayers(0));
        assert_eq!(config.model_parameters.stored_layers, 0);
    }
}
