//! Core preset type definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while working with configuration presets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("Config index {index} out of range (have {len} configs)")]
    IndexOutOfRange { index: usize, len: usize },
}

// =============================================================================
// Device / Precision
// =============================================================================

/// Device the model is loaded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Device {
    #[serde(rename = "CPU")]
    Cpu,
    #[default]
    #[serde(rename = "CUDA")]
    Cuda,
}

impl Device {
    /// Get all available devices.
    pub fn all() -> &'static [Device] {
        &[Self::Cpu, Self::Cuda]
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "CPU"),
            Self::Cuda => write!(f, "CUDA"),
        }
    }
}

/// Weight precision used when loading the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Fp16,
    Int8,
    Fp32,
}

impl Precision {
    /// Get all available precisions, in the order the picker shows them.
    pub fn all() -> &'static [Precision] {
        &[Self::Fp16, Self::Int8, Self::Fp32]
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fp16 => write!(f, "fp16"),
            Self::Int8 => write!(f, "int8"),
            Self::Fp32 => write!(f, "fp32"),
        }
    }
}

// =============================================================================
// Parameter Ranges
// =============================================================================

/// Input range for a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> ParamRange<T> {
    /// Clamp a value into `[min, max]`. Values that do not compare, such
    /// as NaN, become `min`.
    pub fn clamp(&self, value: T) -> T {
        if value.partial_cmp(&self.min).is_none() || value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

pub const API_PORT_RANGE: ParamRange<u16> = ParamRange { min: 1, max: 65535, step: 1 };

pub const MAX_RESPONSE_TOKEN_RANGE: ParamRange<u32> = ParamRange {
    min: 100,
    max: 8100,
    step: 400,
};

pub const TEMPERATURE_RANGE: ParamRange<f32> = ParamRange { min: 0.0, max: 2.0, step: 0.1 };

pub const TOP_P_RANGE: ParamRange<f32> = ParamRange { min: 0.0, max: 1.0, step: 0.1 };

/// Shared by presence and frequency penalty.
pub const PENALTY_RANGE: ParamRange<f32> = ParamRange { min: -2.0, max: 2.0, step: 0.1 };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_serialization_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Device::Cpu).unwrap(), "\"CPU\"");
        assert_eq!(serde_json::to_string(&Device::Cuda).unwrap(), "\"CUDA\"");
        let parsed: Device = serde_json::from_str("\"CUDA\"").unwrap();
        assert_eq!(parsed, Device::Cuda);
    }

    #[test]
    fn test_precision_serialization_uses_lower_case() {
        assert_eq!(serde_json::to_string(&Precision::Int8).unwrap(), "\"int8\"");
        let parsed: Precision = serde_json::from_str("\"fp32\"").unwrap();
        assert_eq!(parsed, Precision::Fp32);
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(Device::Cpu.to_string(), "CPU");
        assert_eq!(Precision::Fp16.to_string(), "fp16");
    }

    #[test]
    fn test_all_lists_every_variant() {
        assert_eq!(Device::all().len(), 2);
        assert_eq!(Precision::all(), &[Precision::Fp16, Precision::Int8, Precision::Fp32]);
    }

    #[test]
    fn test_param_range_clamp() {
        assert_eq!(API_PORT_RANGE.clamp(0), 1);
        assert_eq!(MAX_RESPONSE_TOKEN_RANGE.clamp(9000), 8100);
        assert_eq!(MAX_RESPONSE_TOKEN_RANGE.clamp(4100), 4100);
        assert!((TEMPERATURE_RANGE.clamp(3.5) - 2.0).abs() < f32::EPSILON);
        assert!((PENALTY_RANGE.clamp(-7.0) + 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_param_range_clamp_rejects_nan() {
        assert_eq!(TEMPERATURE_RANGE.clamp(f32::NAN), TEMPERATURE_RANGE.min);
        assert_eq!(TOP_P_RANGE.clamp(f32::NAN), TOP_P_RANGE.min);
        assert_eq!(PENALTY_RANGE.clamp(f32::NAN), PENALTY_RANGE.min);
    }
}
