// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{Error, Result};

/// Converts a model file from one serialization format to another.
///
/// The real backend shells out to an external tool, so this trait
/// exists to let tests substitute a stub. It is not a plugin system.
pub trait Converter {
    fn convert(&self, input: &Path, output: &Path, opset: i64) -> Result<()>;
}

/// Converts TFLite models to ONNX by invoking `tf2onnx` as a
/// subprocess: `python -m tf2onnx.convert --tflite <in> --output <out>
/// --opset <n>`.
pub struct Tf2OnnxConverter {
    program: String,
}

impl Default for Tf2OnnxConverter {
    fn default() -> Self {
        Self::with_program("python")
    }
}

impl Tf2OnnxConverter {
    /// Use an alternative interpreter, e.g. `python3` or a venv path.
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Converter for Tf2OnnxConverter {
    fn convert(&self, input: &Path, output: &Path, opset: i64) -> Result<()> {
        debug!("Running {} -m tf2onnx.convert", self.program);
        let status = Command::new(&self.program)
            .arg("-m")
            .arg("tf2onnx.convert")
            .arg("--tflite")
            .arg(input)
            .arg("--output")
            .arg(output)
            .arg("--opset")
            .arg(opset.to_string())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Tool {
                program: self.program.clone(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_exit_is_ok() {
        // `true` ignores the tf2onnx arguments and exits 0.
        let converter = Tf2OnnxConverter::with_program("true");
        let result = converter.convert(Path::new("in.tflite"), Path::new("out.onnx"), 13);
        assert!(result.is_ok());
    }

    #[test]
    fn test_non_zero_exit_is_tool_error() {
        let converter = Tf2OnnxConverter::with_program("false");
        let result = converter.convert(Path::new("in.tflite"), Path::new("out.onnx"), 13);
        assert!(matches!(result, Err(Error::Tool { .. })));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let converter = Tf2OnnxConverter::with_program("no-such-interpreter");
        let result = converter.convert(Path::new("in.tflite"), Path::new("out.onnx"), 13);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
