// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Serializes the MiniFASNetV2 architecture and its (random)
//! parameters as an ONNX computation graph.

use std::path::Path;

use candle_nn::VarMap;
use candle_onnx::onnx::{GraphProto, ModelProto, OperatorSetIdProto, TensorProto};

use super::model::backbone;
use super::{CLASSES, INPUT_SIZE};
use crate::onnx::{
    attr_float, attr_int, attr_ints, float_initializer, node, tensor_info, write_model, Dim,
};
use crate::{Error, Result, OPSET_VERSION};

pub const INPUT_NAME: &str = "input";
pub const OUTPUT_NAME: &str = "output";

/// The leading dimension of both input and output is symbolic, so the
/// exported model accepts any batch size.
pub const BATCH_DIM: &str = "batch_size";

// Matches candle_nn::BatchNormConfig::default().
const BATCH_NORM_EPS: f32 = 1e-5;

// IR version paired with opset 13.
const IR_VERSION: i64 = 7;

/// Walk the same topology table the model was built from and emit one
/// ONNX node per layer, pulling initializers out of the variable map.
pub fn export(varmap: &VarMap, conv6_kernel: usize, path: &Path) -> Result<()> {
    let data = varmap.data().lock().expect("variable store lock");

    let tensor_of = |name: &str| -> Result<TensorProto> {
        let var = data
            .get(name)
            .ok_or_else(|| Error::MissingParameter(name.into()))?;
        let tensor = var.as_tensor();
        let dims = tensor.dims().iter().map(|d| *d as i64).collect();
        let values = tensor.flatten_all()?.to_vec1::<f32>()?;
        Ok(float_initializer(name, dims, values))
    };

    let mut nodes = Vec::new();
    let mut initializers = Vec::new();
    let mut prev = INPUT_NAME.to_string();

    for spec in backbone(conv6_kernel) {
        let weight = format!("{}.weight", spec.name);
        initializers.push(tensor_of(&weight)?);

        let conv_out = format!("{}_out", spec.name);
        let kernel = spec.kernel as i64;
        let stride = spec.stride as i64;
        let pad = spec.padding as i64;
        nodes.push(node(
            "Conv",
            spec.name,
            &[prev.as_str(), weight.as_str()],
            &[conv_out.as_str()],
            vec![
                attr_ints("kernel_shape", &[kernel, kernel]),
                attr_ints("strides", &[stride, stride]),
                attr_ints("pads", &[pad, pad, pad, pad]),
                attr_int("group", spec.groups as i64),
            ],
        ));

        let scale = format!("{}.weight", spec.bn);
        let bias = format!("{}.bias", spec.bn);
        let mean = format!("{}.running_mean", spec.bn);
        let var = format!("{}.running_var", spec.bn);
        initializers.push(tensor_of(&scale)?);
        initializers.push(tensor_of(&bias)?);
        initializers.push(tensor_of(&mean)?);
        initializers.push(tensor_of(&var)?);

        let bn_out = format!("{}_out", spec.bn);
        nodes.push(node(
            "BatchNormalization",
            spec.bn,
            &[
                conv_out.as_str(),
                scale.as_str(),
                bias.as_str(),
                mean.as_str(),
                var.as_str(),
            ],
            &[bn_out.as_str()],
            vec![attr_float("epsilon", BATCH_NORM_EPS)],
        ));

        let relu_name = format!("{}_relu", spec.name);
        let relu_out = format!("{}_relu_out", spec.name);
        nodes.push(node(
            "Relu",
            &relu_name,
            &[bn_out.as_str()],
            &[relu_out.as_str()],
            vec![],
        ));

        prev = relu_out;
    }

    // 1x1 projection down to the embedding width. No normalization or
    // activation after this point.
    let embed_weight = "conv6_flatten.weight";
    initializers.push(tensor_of(embed_weight)?);
    nodes.push(node(
        "Conv",
        "conv6_flatten",
        &[prev.as_str(), embed_weight],
        &["conv6_flatten_out"],
        vec![
            attr_ints("kernel_shape", &[1, 1]),
            attr_ints("strides", &[1, 1]),
            attr_ints("pads", &[0, 0, 0, 0]),
            attr_int("group", 1),
        ],
    ));

    // (B, E, H, W) -> (B, E), mirroring the forward pass.
    nodes.push(node(
        "ReduceMean",
        "embedding",
        &["conv6_flatten_out"],
        &["embedding"],
        vec![attr_ints("axes", &[2, 3]), attr_int("keepdims", 0)],
    ));

    initializers.push(tensor_of("fc.weight")?);
    initializers.push(tensor_of("fc.bias")?);
    nodes.push(node(
        "Gemm",
        "fc",
        &["embedding", "fc.weight", "fc.bias"],
        &[OUTPUT_NAME],
        vec![
            attr_float("alpha", 1.0),
            attr_float("beta", 1.0),
            attr_int("transB", 1),
        ],
    ));

    let graph = GraphProto {
        name: "minifasnet_v2".into(),
        node: nodes,
        initializer: initializers,
        input: vec![tensor_info(
            INPUT_NAME,
            &[
                Dim::Param(BATCH_DIM),
                Dim::Value(3),
                Dim::Value(INPUT_SIZE as i64),
                Dim::Value(INPUT_SIZE as i64),
            ],
        )],
        output: vec![tensor_info(
            OUTPUT_NAME,
            &[Dim::Param(BATCH_DIM), Dim::Value(CLASSES as i64)],
        )],
        ..Default::default()
    };

    let model = ModelProto {
        ir_version: IR_VERSION,
        producer_name: "faceport".into(),
        producer_version: env!("CARGO_PKG_VERSION").into(),
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: OPSET_VERSION,
        }],
        graph: Some(graph),
        ..Default::default()
    };

    write_model(path, &model)
}
