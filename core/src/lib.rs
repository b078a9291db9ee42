// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod convert;
pub mod detector;
pub mod download;
pub mod error;
pub mod onnx;
pub mod spoof;

pub use convert::Converter;
pub use convert::Tf2OnnxConverter;
pub use download::Fetcher;
pub use download::HttpFetcher;
pub use error::Error;

/// A typedef of the result returned by many methods.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// ONNX operator-set version all exported and converted models target.
pub const OPSET_VERSION: i64 = 13;
