// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Converts the BlazeFace short-range face detector from TFLite to
//! ONNX, downloading the TFLite file first if it isn't present.

use std::path::Path;

use tracing::debug;

use crate::convert::Converter;
use crate::download::Fetcher;
use crate::{Result, OPSET_VERSION};

/// Where the pretrained TFLite model is expected on disk.
pub const TFLITE_PATH: &str = "blaze_face_short_range.tflite";

/// Where the converted ONNX model is written.
/// The parent directory must already exist.
pub const ONNX_PATH: &str = "../public/models/onnx/blazeface.onnx";

/// Published MediaPipe model weights.
pub const MODEL_URL: &str = "https://storage.googleapis.com/mediapipe-models/face_detector/blaze_face_short_range/float16/1/blaze_face_short_range.tflite";

/// Run the conversion at the fixed paths.
pub fn run(fetcher: &dyn Fetcher, converter: &dyn Converter) -> Result<()> {
    run_at(
        fetcher,
        converter,
        Path::new(TFLITE_PATH),
        Path::new(ONNX_PATH),
        MODEL_URL,
    )
}

/// Ensure the TFLite model at `tflite_path` exists (fetching it from
/// `url` if absent), then convert it to ONNX at `onnx_path`.
///
/// A fetch failure propagates immediately. A converter failure is
/// returned as [`crate::Error::Tool`] for the caller to report.
pub fn run_at(
    fetcher: &dyn Fetcher,
    converter: &dyn Converter,
    tflite_path: &Path,
    onnx_path: &Path,
    url: &str,
) -> Result<()> {
    if tflite_path.exists() {
        debug!("{:?} already present, skipping download", tflite_path);
    } else {
        println!("Downloading BlazeFace TFLite model...");
        fetcher.fetch(url, tflite_path)?;
        println!("✓ Downloaded\n");
    }

    println!("Converting TFLite → ONNX...");
    converter.convert(tflite_path, onnx_path, OPSET_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;

    /// Records procedure steps so tests can assert on ordering.
    #[derive(Default)]
    struct Log {
        events: RefCell<Vec<String>>,
    }

    impl Log {
        fn push(&self, event: impl Into<String>) {
            self.events.borrow_mut().push(event.into());
        }
    }

    struct StubFetcher<'a> {
        log: &'a Log,
        fail: bool,
    }

    impl Fetcher for StubFetcher<'_> {
        fn fetch(&self, _url: &str, dest: &Path) -> Result<()> {
            self.log.push("fetch");
            if self.fail {
                return Err(Error::Io(std::io::Error::other("connection reset")));
            }
            fs::write(dest, b"tflite")?;
            Ok(())
        }
    }

    struct StubConverter<'a> {
        log: &'a Log,
    }

    impl Converter for StubConverter<'_> {
        fn convert(&self, input: &Path, output: &Path, opset: i64) -> Result<()> {
            self.log.push(format!(
                "convert {} {} {}",
                input.display(),
                output.display(),
                opset
            ));
            Ok(())
        }
    }

    struct FailingConverter;

    impl Converter for FailingConverter {
        fn convert(&self, _input: &Path, _output: &Path, _opset: i64) -> Result<()> {
            let status = std::process::Command::new("false").status().unwrap();
            Err(Error::Tool {
                program: "python".into(),
                status,
            })
        }
    }

    fn paths() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let tflite = dir.path().join("detector.tflite");
        let onnx = dir.path().join("detector.onnx");
        (dir, tflite, onnx)
    }

    #[test]
    fn test_present_input_is_not_downloaded() {
        let (_dir, tflite, onnx) = paths();
        fs::write(&tflite, b"tflite").unwrap();

        let log = Log::default();
        let fetcher = StubFetcher {
            log: &log,
            fail: false,
        };
        let converter = StubConverter { log: &log };

        run_at(&fetcher, &converter, &tflite, &onnx, "http://example.com").unwrap();

        let events = log.events.borrow();
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("convert"));
    }

    #[test]
    fn test_absent_input_is_fetched_once_before_conversion() {
        let (_dir, tflite, onnx) = paths();

        let log = Log::default();
        let fetcher = StubFetcher {
            log: &log,
            fail: false,
        };
        let converter = StubConverter { log: &log };

        run_at(&fetcher, &converter, &tflite, &onnx, "http://example.com").unwrap();

        let events = log.events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], "fetch");
        assert_eq!(
            events[1],
            format!("convert {} {} 13", tflite.display(), onnx.display())
        );
    }

    #[test]
    fn test_fetch_failure_aborts_before_conversion() {
        let (_dir, tflite, onnx) = paths();

        let log = Log::default();
        let fetcher = StubFetcher {
            log: &log,
            fail: true,
        };
        let converter = StubConverter { log: &log };

        let result = run_at(&fetcher, &converter, &tflite, &onnx, "http://example.com");

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(log.events.borrow().as_slice(), ["fetch"]);
    }

    #[test]
    fn test_conversion_failure_is_returned_not_panicked() {
        let (_dir, tflite, onnx) = paths();
        fs::write(&tflite, b"tflite").unwrap();

        let log = Log::default();
        let fetcher = StubFetcher {
            log: &log,
            fail: false,
        };

        let result = run_at(
            &fetcher,
            &FailingConverter,
            &tflite,
            &onnx,
            "http://example.com",
        );

        assert!(matches!(result, Err(Error::Tool { .. })));
    }
}
