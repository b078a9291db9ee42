// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::process::ExitStatus;

use thiserror::Error;

/// A unified error type for the conversion library.
#[derive(Error, Debug)]
pub enum Error {
    /// Wraps errors from the HTTP client while fetching a model.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Wraps standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wraps tensor errors from model construction or the trace run.
    #[error("Tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// An external converter ran but exited with a non-zero status.
    #[error("Converter '{program}' failed with {status}")]
    Tool { program: String, status: ExitStatus },

    /// A named parameter was expected in the variable store but absent.
    #[error("Missing model parameter: {0}")]
    MissingParameter(String),

    /// The constructed network produced an unexpected shape.
    #[error("Unexpected topology: {0}")]
    Topology(String),
}
