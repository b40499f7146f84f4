//! Image preprocessing pipeline.
//!
//! Turns a decoded image (or a raw pixel buffer) into a backend-ready tensor:
//!
//! 1. every destination pixel centre is mapped back onto the source through the
//!    resize scale (derived from the target tensor's shape) and then through the
//!    configured affine [`Matrix3`];
//! 2. the source is resampled with the configured [`Filter`] and [`Wrap`] policy;
//! 3. the sample is converted from the source [`ImageFormat`] to the destination
//!    format, reordering or deriving channels;
//! 4. `(value - mean[c]) * normal[c]` is written into the tensor in the
//!    backend's [`TensorLayout`].

mod color;
pub mod image_source;
mod matrix;
mod sampler;

use serde::{Deserialize, Serialize};

use crate::errors::{PreprocessError, PreprocessResult};
use crate::tensor::{DataType, Tensor};

pub use image_source::{DecodedImage, ImageSet};
pub use matrix::Matrix3;
use sampler::SourceImage;

/// Pixel formats understood by the pipeline. Numeric codes follow the
/// mobile image-process convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "BGR")]
    Bgr,
    #[serde(rename = "GRAY")]
    Gray,
    #[serde(rename = "BGRA")]
    Bgra,
    /// Planar I420: full-resolution Y plane, then quarter-resolution U and V planes.
    #[serde(rename = "YUV_420")]
    Yuv420,
    /// Y plane followed by an interleaved V/U plane.
    #[serde(rename = "YUV_NV21")]
    YuvNv21,
}

impl ImageFormat {
    pub fn code(self) -> u32 {
        match self {
            ImageFormat::Rgba => 0,
            ImageFormat::Rgb => 1,
            ImageFormat::Bgr => 2,
            ImageFormat::Gray => 3,
            ImageFormat::Bgra => 4,
            ImageFormat::Yuv420 => 10,
            ImageFormat::YuvNv21 => 11,
        }
    }

    pub fn is_planar(self) -> bool {
        matches!(self, ImageFormat::Yuv420 | ImageFormat::YuvNv21)
    }

    /// Number of tensor channels produced when this is the destination format.
    /// Planar YUV cannot be a tensor destination.
    pub fn channels(self) -> Option<usize> {
        match self {
            ImageFormat::Rgba | ImageFormat::Bgra => Some(4),
            ImageFormat::Rgb | ImageFormat::Bgr => Some(3),
            ImageFormat::Gray => Some(1),
            ImageFormat::Yuv420 | ImageFormat::YuvNv21 => None,
        }
    }

    /// Bytes per pixel for packed formats, 1 (the luma byte) for planar ones.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Rgba | ImageFormat::Bgra => 4,
            ImageFormat::Rgb | ImageFormat::Bgr => 3,
            ImageFormat::Gray | ImageFormat::Yuv420 | ImageFormat::YuvNv21 => 1,
        }
    }

    /// Minimum buffer length for a `width` x `height` image.
    pub fn buffer_len(self, width: usize, height: usize) -> usize {
        if self.is_planar() {
            width * height + 2 * width.div_ceil(2) * height.div_ceil(2)
        } else {
            width * height * self.bytes_per_pixel()
        }
    }
}

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
}

/// Policy for samples that fall outside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Zero,
    Repeat,
}

/// Memory layout of a 4D image tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[batch, channels, height, width]`, channel-first.
    Nchw,
    /// `[batch, height, width, channels]`, channel-last.
    Nhwc,
}

impl TensorLayout {
    /// Tensor shape for a single image.
    pub fn image_shape(self, height: usize, width: usize, channels: usize) -> Vec<usize> {
        match self {
            TensorLayout::Nchw => vec![1, channels, height, width],
            TensorLayout::Nhwc => vec![1, height, width, channels],
        }
    }

    /// Reads `(height, width, channels)` from a single-batch 4D shape.
    fn dimensions(self, shape: &[usize]) -> Option<(usize, usize, usize)> {
        match (self, shape) {
            (TensorLayout::Nchw, &[1, c, h, w]) => Some((h, w, c)),
            (TensorLayout::Nhwc, &[1, h, w, c]) => Some((h, w, c)),
            _ => None,
        }
    }

    #[inline]
    fn index(
        self,
        channel: usize,
        y: usize,
        x: usize,
        height: usize,
        width: usize,
        channels: usize,
    ) -> usize {
        match self {
            TensorLayout::Nchw => channel * height * width + y * width + x,
            TensorLayout::Nhwc => (y * width + x) * channels + channel,
        }
    }
}

/// Immutable preprocessing settings paired with one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub source: ImageFormat,
    pub dest: ImageFormat,
    /// Per-channel mean, always four values; channels beyond the destination's are ignored.
    pub mean: [f32; 4],
    /// Per-channel scale applied after the mean is subtracted.
    pub normal: [f32; 4],
    pub filter: Filter,
    pub wrap: Wrap,
    /// Maps resized destination coordinates onto source coordinates.
    pub matrix: Matrix3,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            source: ImageFormat::Rgba,
            dest: ImageFormat::Bgr,
            mean: [0.0; 4],
            normal: [1.0; 4],
            filter: Filter::Nearest,
            wrap: Wrap::ClampToEdge,
            matrix: Matrix3::identity(),
        }
    }
}

impl PreprocessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: ImageFormat) -> Self {
        self.source = source;
        self
    }

    pub fn with_dest(mut self, dest: ImageFormat) -> Self {
        self.dest = dest;
        self
    }

    pub fn with_mean(mut self, mean: [f32; 4]) -> Self {
        self.mean = mean;
        self
    }

    pub fn with_normal(mut self, normal: [f32; 4]) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_matrix(mut self, matrix: Matrix3) -> Self {
        self.matrix = matrix;
        self
    }
}

/// Converts images into tensors for one backend.
#[derive(Debug, Clone)]
pub struct ImageProcess {
    config: PreprocessConfig,
    layout: TensorLayout,
}

impl ImageProcess {
    pub fn new(config: PreprocessConfig, layout: TensorLayout) -> Self {
        Self { config, layout }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn layout(&self) -> TensorLayout {
        self.layout
    }

    /// Converts a raw pixel buffer stored in `config.source` format.
    pub fn convert_buffer(
        &self,
        buffer: &[u8],
        width: usize,
        height: usize,
        tensor: &mut Tensor,
    ) -> PreprocessResult<()> {
        let source = SourceImage::new(buffer, width, height, self.config.source)?;
        self.convert_source(&source, tensor)
    }

    /// Converts a decoded image. Decoded images are always RGBA, so `config.source`
    /// does not apply here.
    pub fn convert_image(&self, image: &DecodedImage, tensor: &mut Tensor) -> PreprocessResult<()> {
        let source = SourceImage::new(
            image.rgba(),
            image.width(),
            image.height(),
            ImageFormat::Rgba,
        )?;
        self.convert_source(&source, tensor)
    }

    fn convert_source(&self, source: &SourceImage<'_>, tensor: &mut Tensor) -> PreprocessResult<()> {
        let dest = self.config.dest;
        let dest_channels = dest.channels().ok_or(PreprocessError::UnsupportedConversion {
            from: source.format(),
            to: dest,
        })?;
        let (height, width, channels) =
            self.layout
                .dimensions(tensor.shape())
                .ok_or_else(|| PreprocessError::UnsupportedTensorShape {
                    shape: tensor.shape().to_vec(),
                })?;
        if channels != dest_channels {
            return Err(PreprocessError::ChannelMismatch {
                format: dest,
                format_channels: dest_channels,
                tensor_channels: channels,
            });
        }

        let scale_x = source.width() as f32 / width as f32;
        let scale_y = source.height() as f32 / height as f32;
        let mean = &self.config.mean;
        let normal = &self.config.normal;
        let mut values = vec![0.0f32; height * width * channels];

        for y in 0..height {
            let resized_y = (y as f32 + 0.5) * scale_y - 0.5;
            for x in 0..width {
                let resized_x = (x as f32 + 0.5) * scale_x - 0.5;
                let (u, v) = self.config.matrix.map_point(resized_x, resized_y);
                if !u.is_finite() || !v.is_finite() {
                    return Err(PreprocessError::NonFiniteCoordinate { x, y });
                }
                let rgba = source.sample(u, v, self.config.filter, self.config.wrap);
                let pixel = color::rgba_to_dest(dest, &rgba);
                for c in 0..channels {
                    let index = self.layout.index(c, y, x, height, width, channels);
                    values[index] = (pixel[c] - mean[c]) * normal[c];
                }
            }
        }

        write_values(tensor, &values)
    }
}

/// Stores preprocessed values, quantizing for integer tensors.
fn write_values(tensor: &mut Tensor, values: &[f32]) -> PreprocessResult<()> {
    match tensor.dtype() {
        DataType::Float32 => tensor.set_data(values)?,
        DataType::Uint8 => {
            let quantized: Vec<u8> = values
                .iter()
                .map(|&v| v.round().clamp(0.0, 255.0) as u8)
                .collect();
            tensor.set_data(&quantized)?
        }
        DataType::Int32 => {
            let rounded: Vec<i32> = values.iter().map(|&v| v.round() as i32).collect();
            tensor.set_data(&rounded)?
        }
    }
    Ok(())
}
