// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Thin constructors over the ONNX protobuf types so graph-building
//! code reads as a layer list rather than nested struct literals.

use std::fs;
use std::path::Path;

use candle_onnx::onnx::{
    attribute_proto, tensor_proto, tensor_shape_proto, type_proto, AttributeProto, ModelProto,
    NodeProto, TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
};
use prost::Message;

use crate::Result;

/// One dimension of a tensor shape declaration: either a fixed extent
/// or a named symbolic dimension.
pub enum Dim {
    Value(i64),
    Param(&'static str),
}

/// Declares a float tensor input or output of the graph.
pub fn tensor_info(name: &str, dims: &[Dim]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|d| tensor_shape_proto::Dimension {
            value: Some(match d {
                Dim::Value(v) => tensor_shape_proto::dimension::Value::DimValue(*v),
                Dim::Param(p) => tensor_shape_proto::dimension::Value::DimParam((*p).into()),
            }),
            ..Default::default()
        })
        .collect();

    ValueInfoProto {
        name: name.into(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: tensor_proto::DataType::Float as i32,
                shape: Some(TensorShapeProto { dim }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// An f32 initializer (weight) tensor.
pub fn float_initializer(name: &str, dims: Vec<i64>, data: Vec<f32>) -> TensorProto {
    TensorProto {
        name: name.into(),
        dims,
        data_type: tensor_proto::DataType::Float as i32,
        float_data: data,
        ..Default::default()
    }
}

pub fn node(
    op_type: &str,
    name: &str,
    inputs: &[&str],
    outputs: &[&str],
    attributes: Vec<AttributeProto>,
) -> NodeProto {
    NodeProto {
        op_type: op_type.into(),
        name: name.into(),
        input: inputs.iter().map(|s| (*s).into()).collect(),
        output: outputs.iter().map(|s| (*s).into()).collect(),
        attribute: attributes,
        ..Default::default()
    }
}

pub fn attr_int(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        name: name.into(),
        r#type: attribute_proto::AttributeType::Int as i32,
        i: value,
        ..Default::default()
    }
}

pub fn attr_ints(name: &str, values: &[i64]) -> AttributeProto {
    AttributeProto {
        name: name.into(),
        r#type: attribute_proto::AttributeType::Ints as i32,
        ints: values.to_vec(),
        ..Default::default()
    }
}

pub fn attr_float(name: &str, value: f32) -> AttributeProto {
    AttributeProto {
        name: name.into(),
        r#type: attribute_proto::AttributeType::Float as i32,
        f: value,
        ..Default::default()
    }
}

/// Serialize the model and write it in one step.
///
/// Encoding to memory first means a failure can never leave a
/// truncated file at `path`.
pub fn write_model(path: &Path, model: &ModelProto) -> Result<()> {
    let bytes = model.encode_to_vec();
    fs::write(path, bytes)?;
    Ok(())
}
