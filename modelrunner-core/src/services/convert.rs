//! Model conversion through the Python conversion script.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::ServiceError;

/// Converts `input` for `strategy`, writing the result to `output`.
#[async_trait]
pub trait ModelConverter: Send + Sync {
    async fn convert(&self, input: &Path, strategy: &str, output: &Path)
        -> Result<(), ServiceError>;
}

/// Runs `<python> <script> --in <input> --out <output> --strategy <strategy>`.
#[derive(Debug, Clone)]
pub struct PythonConverter {
    python: PathBuf,
    script: PathBuf,
}

impl PythonConverter {
    pub fn new(python: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
        }
    }

    fn command(&self, input: &Path, strategy: &str, output: &Path) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script)
            .arg("--in")
            .arg(input)
            .arg("--out")
            .arg(output)
            .arg("--strategy")
            .arg(strategy);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ModelConverter for PythonConverter {
    async fn convert(
        &self,
        input: &Path,
        strategy: &str,
        output: &Path,
    ) -> Result<(), ServiceError> {
        info!(
            input = %input.display(),
            output = %output.display(),
            strategy,
            "Converting model"
        );

        let result = self.command(input, strategy, output).output().await?;

        if !result.status.success() {
            let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&result.stderr));
            let message = match combined.trim() {
                "" => format!("conversion exited with {}", result.status),
                text => text.to_string(),
            };
            warn!(status = %result.status, "Model conversion failed");
            return Err(ServiceError::ConversionFailed(message));
        }

        debug!(output = %output.display(), "Model conversion finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let converter = PythonConverter::new("python3", "convert_model.py");
        let cmd = converter.command(
            Path::new("/models/m.bin"),
            "cpu fp16 *0+",
            Path::new("/models/m.bin-cpu-fp16--0-"),
        );
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "python3");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "convert_model.py",
                "--in",
                "/models/m.bin",
                "--out",
                "/models/m.bin-cpu-fp16--0-",
                "--strategy",
                "cpu fp16 *0+",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_io_error() {
        let converter = PythonConverter::new("/nonexistent/python-for-tests", "convert.py");
        let err = converter
            .convert(Path::new("in"), "cpu fp32", Path::new("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_reports_process_output() {
        // `sh <script> --in ...` runs the script with the conversion arguments
        let tmp = tempfile::TempDir::new().unwrap();
        let script = tmp.path().join("fail.sh");
        std::fs::write(&script, "echo \"bad strategy: $6\" >&2\nexit 3\n").unwrap();

        let converter = PythonConverter::new("sh", &script);
        let err = converter
            .convert(Path::new("in"), "cuda", Path::new("out"))
            .await
            .unwrap_err();

        match err {
            ServiceError::ConversionFailed(message) => assert_eq!(message, "bad strategy: cuda"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success() {
        let tmp = tempfile::TempDir::new().unwrap();
        let script = tmp.path().join("ok.sh");
        std::fs::write(&script, "touch \"$4\"\n").unwrap();
        let output = tmp.path().join("converted");

        let converter = PythonConverter::new("sh", &script);
        converter
            .convert(Path::new("in"), "cpu fp32", &output)
            .await
            .unwrap();
        assert!(output.exists());
    }
}
