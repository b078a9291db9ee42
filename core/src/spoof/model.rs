// SPDX-FileCopyrightText: © 2025 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// Reference implementation:
// https://github.com/minivision-ai/Silent-Face-Anti-Spoofing

use candle_core::{Module, ModuleT, Result, Tensor, D};
use candle_nn::{
    batch_norm, conv2d_no_bias, linear, BatchNorm, BatchNormConfig, Conv2d, Conv2dConfig, Linear,
    VarBuilder,
};

/// Hyperparameters of one convolution stage and the name of its
/// parameters in the variable store. The same table drives both the
/// candle modules and the exported ONNX graph.
pub(crate) struct ConvSpec {
    pub name: &'static str,
    pub bn: &'static str,
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel: usize,
    pub stride: usize,
    pub padding: usize,
    pub groups: usize,
}

/// The convolutional backbone: a stem convolution, four
/// depthwise-separable blocks (depthwise then pointwise, each
/// normalized and activated), and a final depthwise convolution over
/// the full remaining spatial extent.
pub(crate) fn backbone(conv6_kernel: usize) -> Vec<ConvSpec> {
    vec![
        ConvSpec {
            name: "conv1",
            bn: "bn1",
            in_channels: 3,
            out_channels: 32,
            kernel: 3,
            stride: 2,
            padding: 1,
            groups: 1,
        },
        ConvSpec {
            name: "conv2_dw",
            bn: "bn2_dw",
            in_channels: 32,
            out_channels: 32,
            kernel: 3,
            stride: 1,
            padding: 1,
            groups: 32,
        },
        ConvSpec {
            name: "conv2_sep",
            bn: "bn2_sep",
            in_channels: 32,
            out_channels: 64,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
        },
        ConvSpec {
            name: "conv3_dw",
            bn: "bn3_dw",
            in_channels: 64,
            out_channels: 64,
            kernel: 3,
            stride: 2,
            padding: 1,
            groups: 64,
        },
        ConvSpec {
            name: "conv3_sep",
            bn: "bn3_sep",
            in_channels: 64,
            out_channels: 64,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
        },
        ConvSpec {
            name: "conv4_dw",
            bn: "bn4_dw",
            in_channels: 64,
            out_channels: 64,
            kernel: 3,
            stride: 1,
            padding: 1,
            groups: 64,
        },
        ConvSpec {
            name: "conv4_sep",
            bn: "bn4_sep",
            in_channels: 64,
            out_channels: 128,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
        },
        ConvSpec {
            name: "conv5_dw",
            bn: "bn5_dw",
            in_channels: 128,
            out_channels: 128,
            kernel: 3,
            stride: 2,
            padding: 1,
            groups: 128,
        },
        ConvSpec {
            name: "conv5_sep",
            bn: "bn5_sep",
            in_channels: 128,
            out_channels: 128,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
        },
        ConvSpec {
            name: "conv6_dw",
            bn: "bn6_dw",
            in_channels: 128,
            out_channels: 128,
            kernel: conv6_kernel,
            stride: 1,
            padding: 0,
            groups: 128,
        },
    ]
}

/// Convolution, batch normalization, ReLU.
struct ConvBlock {
    conv: Conv2d,
    bn: BatchNorm,
}

impl ConvBlock {
    fn new(spec: &ConvSpec, variables: &VarBuilder) -> Result<Self> {
        let conv = conv2d_no_bias(
            spec.in_channels,
            spec.out_channels,
            spec.kernel,
            Conv2dConfig {
                stride: spec.stride,
                padding: spec.padding,
                groups: spec.groups,
                ..Default::default()
            },
            variables.pp(spec.name),
        )?;
        let bn = batch_norm(
            spec.out_channels,
            BatchNormConfig::default(),
            variables.pp(spec.bn),
        )?;
        Ok(Self { conv, bn })
    }
}

impl Module for ConvBlock {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let h = self.conv.forward(input)?;
        let h = self.bn.forward_t(&h, false)?;
        h.relu()
    }
}

/// MiniFASNetV2 classifier: the backbone above, a 1×1 projection to
/// the embedding width, spatial mean reduction, and a linear layer to
/// the two [live, spoof] logits.
pub struct MiniFasNetV2 {
    blocks: Vec<ConvBlock>,
    embed: Conv2d,
    fc: Linear,
}

impl MiniFasNetV2 {
    pub fn new(
        variables: &VarBuilder,
        embedding_size: usize,
        conv6_kernel: usize,
    ) -> Result<Self> {
        let specs = backbone(conv6_kernel);

        let mut blocks = Vec::with_capacity(specs.len());
        for spec in &specs {
            blocks.push(ConvBlock::new(spec, variables)?);
        }
        let width = specs.last().map_or(3, |spec| spec.out_channels);

        let embed = conv2d_no_bias(
            width,
            embedding_size,
            1,
            Conv2dConfig::default(),
            variables.pp("conv6_flatten"),
        )?;
        let fc = linear(embedding_size, super::CLASSES, variables.pp("fc"))?;

        Ok(Self { blocks, embed, fc })
    }
}

impl Module for MiniFasNetV2 {
    fn forward(&self, input: &Tensor) -> Result<Tensor> {
        let mut h = input.clone();
        for block in &self.blocks {
            h = block.forward(&h)?;
        }
        let h = self.embed.forward(&h)?;
        // Collapse whatever spatial extent remains: (B, E, H, W) -> (B, E).
        let h = h.mean(D::Minus1)?.mean(D::Minus1)?;
        self.fc.forward(&h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};

    fn build(conv6_kernel: usize) -> MiniFasNetV2 {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let variables = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        MiniFasNetV2::new(&variables, 128, conv6_kernel).unwrap()
    }

    #[test]
    fn test_forward_produces_two_logits() {
        let device = Device::Cpu;
        let model = build(super::super::CONV6_KERNEL);

        let input = Tensor::rand(0f32, 1f32, (1, 3, 80, 80), &device).unwrap();
        let output = model.forward(&input).unwrap();

        assert_eq!(output.dims(), &[1, 2]);
    }

    #[test]
    fn test_forward_with_kernel_override_on_zero_input() {
        // A (1, 1) final kernel leaves a 10x10 map; the mean head must
        // still reduce it to two logits.
        let device = Device::Cpu;
        let model = build(1);

        let input = Tensor::zeros((1, 3, 80, 80), DType::F32, &device).unwrap();
        let output = model.forward(&input).unwrap();

        assert_eq!(output.dims(), &[1, 2]);
    }

    #[test]
    fn test_forward_keeps_batch_extent() {
        let device = Device::Cpu;
        let model = build(super::super::CONV6_KERNEL);

        let input = Tensor::rand(0f32, 1f32, (4, 3, 80, 80), &device).unwrap();
        let output = model.forward(&input).unwrap();

        assert_eq!(output.dims(), &[4, 2]);
    }

    #[test]
    fn test_backbone_reduces_80px_input_to_unit_map() {
        // 80 -> 40 -> 20 -> 10, then the full-extent depthwise kernel.
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let variables = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let mut h = Tensor::rand(0f32, 1f32, (1, 3, 80, 80), &device).unwrap();
        for spec in backbone(super::super::CONV6_KERNEL) {
            let block = ConvBlock::new(&spec, &variables).unwrap();
            h = block.forward(&h).unwrap();
        }

        assert_eq!(h.dims(), &[1, 128, 1, 1]);
    }
}
