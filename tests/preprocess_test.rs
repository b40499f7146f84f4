//! Tests for the image preprocessing pipeline.

use inference_bench::preprocess::{
    DecodedImage, Filter, ImageFormat, ImageProcess, Matrix3, PreprocessConfig, TensorLayout, Wrap,
};
use inference_bench::errors::PreprocessError;
use inference_bench::tensor::{DataType, Tensor};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// 2x2 checkerboard: red on the diagonal, blue elsewhere.
fn checkerboard() -> DecodedImage {
    let rgba = [RED, BLUE, BLUE, RED].concat();
    DecodedImage::from_rgba("checkerboard", 2, 2, rgba).unwrap()
}

#[test]
fn test_checkerboard_rgba_to_bgr_planar() {
    let process = ImageProcess::new(
        PreprocessConfig::new().with_dest(ImageFormat::Bgr),
        TensorLayout::Nchw,
    );
    let mut tensor = Tensor::new(&[1, 3, 2, 2], DataType::Float32).unwrap();
    process.convert_image(&checkerboard(), &mut tensor).unwrap();

    let values = tensor.read_float();
    assert_eq!(&values[0..4], &[0.0, 255.0, 255.0, 0.0], "blue plane");
    assert_eq!(&values[4..8], &[0.0, 0.0, 0.0, 0.0], "green plane");
    assert_eq!(&values[8..12], &[255.0, 0.0, 0.0, 255.0], "red plane");
}

#[test]
fn test_checkerboard_normalized_interleaved() {
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_dest(ImageFormat::Rgb)
            .with_mean([127.5; 4])
            .with_normal([1.0 / 127.5; 4]),
        TensorLayout::Nhwc,
    );
    let mut tensor = Tensor::new(&[1, 2, 2, 3], DataType::Float32).unwrap();
    process.convert_image(&checkerboard(), &mut tensor).unwrap();

    let values = tensor.read_float();
    let expected_red = [1.0, -1.0, -1.0];
    let expected_blue = [-1.0, -1.0, 1.0];
    for (actual, expected) in values[0..3].iter().zip(expected_red) {
        assert!((actual - expected).abs() < 1e-6);
    }
    for (actual, expected) in values[3..6].iter().zip(expected_blue) {
        assert!((actual - expected).abs() < 1e-6);
    }
}

#[test]
fn test_source_format_applies_to_raw_buffers_only() {
    // A BGR buffer holding one red pixel.
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_source(ImageFormat::Bgr)
            .with_dest(ImageFormat::Rgb),
        TensorLayout::Nhwc,
    );
    let mut tensor = Tensor::new(&[1, 1, 1, 3], DataType::Float32).unwrap();
    process
        .convert_buffer(&[0, 0, 255], 1, 1, &mut tensor)
        .unwrap();
    assert_eq!(tensor.read_float(), &[255.0, 0.0, 0.0]);

    // Decoded images are RGBA whatever the configured source.
    let image = DecodedImage::from_rgba("red", 1, 1, RED.to_vec()).unwrap();
    process.convert_image(&image, &mut tensor).unwrap();
    assert_eq!(tensor.read_float(), &[255.0, 0.0, 0.0]);
}

#[test]
fn test_uniform_image_survives_bilinear_upscale() {
    let image = DecodedImage::from_rgba("gray", 3, 3, [90, 90, 90, 255].repeat(9)).unwrap();
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_dest(ImageFormat::Gray)
            .with_filter(Filter::Bilinear),
        TensorLayout::Nchw,
    );
    let mut tensor = Tensor::new(&[1, 1, 7, 5], DataType::Float32).unwrap();
    process.convert_image(&image, &mut tensor).unwrap();
    assert!(tensor.read_float().iter().all(|v| (v - 90.0).abs() < 1e-3));
}

#[test]
fn test_quantized_tensor_receives_rounded_bytes() {
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_dest(ImageFormat::Rgb)
            .with_normal([0.5; 4]),
        TensorLayout::Nhwc,
    );
    let mut tensor = Tensor::new(&[1, 2, 2, 3], DataType::Uint8).unwrap();
    process.convert_image(&checkerboard(), &mut tensor).unwrap();
    assert_eq!(&tensor.read_bytes()[0..3], &[128, 0, 0]);
}

#[test]
fn test_zero_wrap_blanks_translated_pixels() {
    // Shift sampling one pixel to the right: the last column falls outside.
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_dest(ImageFormat::Rgb)
            .with_wrap(Wrap::Zero)
            .with_matrix(Matrix3::translation(1.0, 0.0)),
        TensorLayout::Nhwc,
    );
    let mut tensor = Tensor::new(&[1, 2, 2, 3], DataType::Float32).unwrap();
    process.convert_image(&checkerboard(), &mut tensor).unwrap();

    let values = tensor.read_float();
    assert_eq!(&values[0..3], &[0.0, 0.0, 255.0], "(0,0) samples source (1,0)");
    assert_eq!(&values[3..6], &[0.0, 0.0, 0.0], "(1,0) falls outside");
}

#[test]
fn test_channel_count_mismatch_is_rejected() {
    let process = ImageProcess::new(
        PreprocessConfig::new().with_dest(ImageFormat::Rgb),
        TensorLayout::Nchw,
    );
    let mut tensor = Tensor::new(&[1, 4, 2, 2], DataType::Float32).unwrap();
    let result = process.convert_image(&checkerboard(), &mut tensor);
    assert!(matches!(
        result,
        Err(PreprocessError::ChannelMismatch {
            format_channels: 3,
            tensor_channels: 4,
            ..
        })
    ));
}

#[test]
fn test_planar_destination_is_unsupported() {
    let process = ImageProcess::new(
        PreprocessConfig::new().with_dest(ImageFormat::Yuv420),
        TensorLayout::Nchw,
    );
    let mut tensor = Tensor::new(&[1, 3, 2, 2], DataType::Float32).unwrap();
    assert!(matches!(
        process.convert_image(&checkerboard(), &mut tensor),
        Err(PreprocessError::UnsupportedConversion { .. })
    ));
}

#[test]
fn test_batched_tensor_is_unsupported() {
    let process = ImageProcess::new(PreprocessConfig::new(), TensorLayout::Nchw);
    let mut tensor = Tensor::new(&[2, 3, 2, 2], DataType::Float32).unwrap();
    assert!(matches!(
        process.convert_image(&checkerboard(), &mut tensor),
        Err(PreprocessError::UnsupportedTensorShape { .. })
    ));
}

#[test]
fn test_degenerate_perspective_is_rejected() {
    let process = ImageProcess::new(
        PreprocessConfig::new()
            .with_dest(ImageFormat::Rgb)
            .with_filter(Filter::Bilinear)
            .with_matrix(Matrix3::from_values([
                1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0,
            ])),
        TensorLayout::Nhwc,
    );
    let mut tensor = Tensor::new(&[1, 2, 2, 3], DataType::Float32).unwrap();
    assert_eq!(
        process.convert_image(&checkerboard(), &mut tensor),
        Err(PreprocessError::NonFiniteCoordinate { x: 0, y: 0 })
    );
}

mod yuv_tests {
    use super::*;

    // Two 2x2 chroma blocks over a flat luma of 100.
    // Left block: U = 90, V = 200. Right block: U = 178, V = 128.
    const LUMA: [u8; 8] = [100; 8];
    const LEFT_RGB: [f32; 3] = [200.944, 61.659_376, 32.664];
    const RIGHT_RGB: [f32; 3] = [100.0, 82.793_2, 188.6];

    fn convert(format: ImageFormat, buffer: &[u8]) -> Vec<f32> {
        let process = ImageProcess::new(
            PreprocessConfig::new()
                .with_source(format)
                .with_dest(ImageFormat::Rgb),
            TensorLayout::Nhwc,
        );
        let mut tensor = Tensor::new(&[1, 2, 4, 3], DataType::Float32).unwrap();
        process.convert_buffer(buffer, 4, 2, &mut tensor).unwrap();
        tensor.read_float().to_vec()
    }

    fn assert_rgb(actual: &[f32], expected: [f32; 3]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_i420_reads_separate_u_and_v_planes() {
        let buffer = [&LUMA[..], &[90u8, 178][..], &[200u8, 128][..]].concat();
        let values = convert(ImageFormat::Yuv420, &buffer);
        assert_rgb(&values[0..3], LEFT_RGB);
        assert_rgb(&values[9..12], RIGHT_RGB);
        // Second row shares the chroma of the first.
        assert_rgb(&values[12..15], LEFT_RGB);
    }

    #[test]
    fn test_nv21_reads_interleaved_v_then_u() {
        let buffer = [&LUMA[..], &[200u8, 90, 128, 178][..]].concat();
        let values = convert(ImageFormat::YuvNv21, &buffer);
        assert_rgb(&values[0..3], LEFT_RGB);
        assert_rgb(&values[9..12], RIGHT_RGB);
        assert_rgb(&values[21..24], RIGHT_RGB);
    }
}
