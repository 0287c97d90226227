//! Strategy descriptors for model conversion.
//!
//! A strategy encodes device, precision and layer placement, e.g.
//! `cuda fp16i8 *10+ -> cpu fp32 *1`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::config::ModelParameters;
use super::types::{Device, Precision};

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[> *+]").expect("valid regex"));

/// Build the strategy descriptor for a set of model parameters.
pub fn strategy(params: &ModelParameters) -> String {
    let device = match params.device {
        Device::Cpu => "cpu",
        Device::Cuda => "cuda",
    };
    let precision = match params.precision {
        Precision::Fp16 => "fp16",
        Precision::Int8 => "fp16i8",
        Precision::Fp32 => "fp32",
    };

    let mut strategy = format!("{device} {precision}");
    if params.stored_layers < params.max_stored_layers {
        strategy.push_str(&format!(" *{}+", params.stored_layers));
    }
    if params.enable_high_precision_for_last_layer {
        strategy.push_str(" -> cpu fp32 *1");
    }
    strategy
}

/// Replace every `>`, space, `*` and `+` with `-`.
pub fn sanitize_strategy(strategy: &str) -> String {
    UNSAFE_PATH_CHARS.replace_all(strategy, "-").into_owned()
}

/// Output path for a converted model: `<input>-<sanitized strategy>`.
pub fn converted_model_path(input: &Path, strategy: &str) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push("-");
    path.push(sanitize_strategy(strategy));
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(device: Device, precision: Precision, stored: u32) -> ModelParameters {
        ModelParameters {
            model_name: "m.bin".to_string(),
            device,
            precision,
            stored_layers: stored,
            max_stored_layers: 25,
            enable_high_precision_for_last_layer: false,
        }
    }

    #[test]
    fn test_strategy_all_layers_stored() {
        assert_eq!(strategy(&params(Device::Cuda, Precision::Fp16, 25)), "cuda fp16");
        assert_eq!(strategy(&params(Device::Cpu, Precision::Fp32, 25)), "cpu fp32");
    }

    #[test]
    fn test_strategy_int8_maps_to_fp16i8() {
        assert_eq!(strategy(&params(Device::Cuda, Precision::Int8, 25)), "cuda fp16i8");
    }

    #[test]
    fn test_strategy_partial_layers() {
        assert_eq!(strategy(&params(Device::Cpu, Precision::Fp16, 0)), "cpu fp16 *0+");
        assert_eq!(strategy(&params(Device::Cuda, Precision::Int8, 10)), "cuda fp16i8 *10+");
    }

    #[test]
    fn test_strategy_high_precision_last_layer() {
        let mut p = params(Device::Cuda, Precision::Fp16, 20);
        p.enable_high_precision_for_last_layer = true;
        assert_eq!(strategy(&p), "cuda fp16 *20+ -> cpu fp32 *1");
    }

    #[test]
    fn test_sanitize_strategy() {
        assert_eq!(sanitize_strategy("cpu fp16 *0+"), "cpu-fp16--0-");
        assert_eq!(
            sanitize_strategy("cuda fp16 *20+ -> cpu fp32 *1"),
            "cuda-fp16--20-----cpu-fp32--1"
        );
        assert_eq!(sanitize_strategy("cuda fp16"), "cuda-fp16");
    }

    #[test]
    fn test_converted_model_path() {
        let output = converted_model_path(Path::new("/models/m.bin"), "cpu fp16 *0+");
        assert_eq!(output, PathBuf::from("/models/m.bin-cpu-fp16--0-"));
    }
}
