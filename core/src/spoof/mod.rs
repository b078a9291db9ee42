// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! MiniFASNetV2 anti-spoofing classifier: builds the architecture with
//! randomly initialized parameters and exports it to ONNX.
//!
//! No pretrained weights are loaded. The exported file is the
//! architecture only and is unusable in production until weights from
//! the Silent-Face-Anti-Spoofing project are brought in externally.

pub mod export;
pub mod model;

pub use model::MiniFasNetV2;

use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{VarBuilder, VarMap};

use crate::{Error, Result};

/// Where the exported ONNX model is written.
/// The parent directory must already exist.
pub const OUTPUT_PATH: &str = "../public/models/onnx/minifasnet_v2.onnx";

/// Width of the embedding vector produced before the classifier head.
pub const EMBEDDING_SIZE: usize = 128;

/// Kernel of the final depthwise convolution. Sized to cover the whole
/// 10×10 map that remains after an 80×80 input has been downsampled.
pub const CONV6_KERNEL: usize = 10;

/// Expected input images are 80×80 pixels.
pub const INPUT_SIZE: usize = 80;

/// Two output logits: [live, spoof].
pub(crate) const CLASSES: usize = 2;

/// Build the classifier with random parameters, trace it once on a
/// synthetic batch to validate the graph, then serialize to `path`.
pub fn export_architecture(path: &Path) -> Result<()> {
    let device = Device::Cpu;
    let varmap = VarMap::new();
    let variables = VarBuilder::from_varmap(&varmap, DType::F32, &device);

    println!("Creating MiniFASNetV2 model...");
    let model = MiniFasNetV2::new(&variables, EMBEDDING_SIZE, CONV6_KERNEL)?;
    println!("✓ Model created\n");

    // One forward pass stands in for graph tracing: it proves the
    // layer wiring is consistent before anything is written.
    let sample = Tensor::randn(0f32, 1f32, (1, 3, INPUT_SIZE, INPUT_SIZE), &device)?;
    let logits = model.forward(&sample)?;
    if logits.dims() != [1, CLASSES].as_slice() {
        return Err(Error::Topology(format!(
            "expected (1, {}) logits, got {:?}",
            CLASSES,
            logits.dims()
        )));
    }

    println!("Exporting to ONNX...");
    export::export(&varmap, CONV6_KERNEL, path)
}
