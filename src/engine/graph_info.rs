//! Serialized description of a custom engine graph.
//!
//! A graph file is a JSON document describing the input tensor shape, the sizes
//! of the segments of one unified computation buffer, and the ordered list of
//! layers that read and write those segments.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;

/// Top-level graph document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineGraphInfo {
    /// Shape of the single input tensor. Its element count must equal `segment_sizes[0]`.
    pub input_shape: Vec<usize>,
    /// Sizes of the consecutive segments of the computation buffer. The first
    /// segment receives the input, the last one holds the output.
    pub segment_sizes: Vec<usize>,
    pub layers: Vec<LayerInfo>,
    /// Dense weight matrices, one `[rows][columns]` entry per dense layer.
    #[serde(default)]
    pub weights: Vec<Vec<Vec<f32>>>,
    /// Dense biases, parallel to `weights`.
    #[serde(default)]
    pub bias: Vec<Vec<f32>>,
    /// Element-wise parameter vectors.
    #[serde(default)]
    pub parameters: Vec<Vec<f32>>,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_input_name() -> String {
    "input".to_string()
}

fn default_output_name() -> String {
    "output".to_string()
}

/// One layer of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerInfo {
    #[serde(rename = "DENSE")]
    Dense(DenseLayerInfo),
    #[serde(rename = "ACTIVATION")]
    Activation(ActivationLayerInfo),
    #[serde(rename = "ADD_ELEMENTWISE")]
    ElemWiseAdd(ElemWiseLayerInfo),
    #[serde(rename = "MUL_ELEMENTWISE")]
    ElemWiseMul(ElemWiseLayerInfo),
    #[serde(rename = "CHANNEL_MEAN")]
    ChannelMean(ChannelMeanLayerInfo),
    #[serde(rename = "COPY")]
    Copy(CopyLayerInfo),
}

impl LayerInfo {
    pub fn type_name(&self) -> &'static str {
        match self {
            LayerInfo::Dense(_) => "DENSE",
            LayerInfo::Activation(_) => "ACTIVATION",
            LayerInfo::ElemWiseAdd(_) => "ADD_ELEMENTWISE",
            LayerInfo::ElemWiseMul(_) => "MUL_ELEMENTWISE",
            LayerInfo::ChannelMean(_) => "CHANNEL_MEAN",
            LayerInfo::Copy(_) => "COPY",
        }
    }

    /// Segments read by this layer.
    pub fn inputs(&self) -> Vec<usize> {
        match self {
            LayerInfo::Dense(info) => vec![info.input],
            LayerInfo::Activation(info) => vec![info.input],
            LayerInfo::ElemWiseAdd(info) | LayerInfo::ElemWiseMul(info) => vec![info.input],
            LayerInfo::ChannelMean(info) => vec![info.input],
            LayerInfo::Copy(info) => vec![info.input],
        }
    }

    /// Segment written by this layer. In-place layers write their input.
    pub fn output(&self) -> usize {
        match self {
            LayerInfo::Dense(info) => info.output,
            LayerInfo::Activation(info) => info.input,
            LayerInfo::ElemWiseAdd(info) | LayerInfo::ElemWiseMul(info) => info.input,
            LayerInfo::ChannelMean(info) => info.output,
            LayerInfo::Copy(info) => info.output,
        }
    }
}

/// Fully connected layer: `output = weights * input + bias`, then an optional activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayerInfo {
    pub input: usize,
    pub output: usize,
    pub weights: usize,
    #[serde(default)]
    pub activation: Option<Activation>,
}

/// Applies an activation to a segment in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationLayerInfo {
    pub input: usize,
    pub activation: Activation,
}

/// Adds or multiplies a parameter vector into a segment in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElemWiseLayerInfo {
    pub input: usize,
    pub parameters: usize,
}

/// Global average pooling over a planar (channel-first) segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMeanLayerInfo {
    pub input: usize,
    pub output: usize,
    pub channels: usize,
}

/// Copies a whole segment into another one starting at `internal_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyLayerInfo {
    pub input: usize,
    pub output: usize,
    #[serde(default)]
    pub internal_index: usize,
}
