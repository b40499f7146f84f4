//! Per-pixel color conversions.
//!
//! Sampled pixels travel through the pipeline as `[r, g, b, a]` in the 0..=255 range.
//! Packed and planar sources are decoded into that form and the destination
//! format derives its channels from it.

use super::ImageFormat;

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Decodes one packed pixel. `bytes` holds exactly `format.bytes_per_pixel()` values.
#[inline]
pub(crate) fn packed_to_rgba(format: ImageFormat, bytes: &[u8]) -> [f32; 4] {
    let b = |i: usize| f32::from(bytes[i]);
    match format {
        ImageFormat::Rgba => [b(0), b(1), b(2), b(3)],
        ImageFormat::Bgra => [b(2), b(1), b(0), b(3)],
        ImageFormat::Rgb => [b(0), b(1), b(2), 255.0],
        ImageFormat::Bgr => [b(2), b(1), b(0), 255.0],
        ImageFormat::Gray => [b(0), b(0), b(0), 255.0],
        ImageFormat::Yuv420 | ImageFormat::YuvNv21 => {
            unreachable!("planar formats are decoded with yuv_to_rgba")
        }
    }
}

/// BT.601 full-range YUV to RGBA.
#[inline]
pub(crate) fn yuv_to_rgba(y: u8, u: u8, v: u8) -> [f32; 4] {
    let y = f32::from(y);
    let u = f32::from(u) - 128.0;
    let v = f32::from(v) - 128.0;
    [
        (y + 1.402 * v).clamp(0.0, 255.0),
        (y - 0.344_136 * u - 0.714_136 * v).clamp(0.0, 255.0),
        (y + 1.772 * u).clamp(0.0, 255.0),
        255.0,
    ]
}

#[inline]
pub(crate) fn luma(rgba: &[f32; 4]) -> f32 {
    LUMA_R * rgba[0] + LUMA_G * rgba[1] + LUMA_B * rgba[2]
}

/// Derives the destination channels from an RGBA pixel. Unused trailing
/// slots are zero.
#[inline]
pub(crate) fn rgba_to_dest(dest: ImageFormat, rgba: &[f32; 4]) -> [f32; 4] {
    match dest {
        ImageFormat::Rgba => *rgba,
        ImageFormat::Bgra => [rgba[2], rgba[1], rgba[0], rgba[3]],
        ImageFormat::Rgb => [rgba[0], rgba[1], rgba[2], 0.0],
        ImageFormat::Bgr => [rgba[2], rgba[1], rgba[0], 0.0],
        ImageFormat::Gray => [luma(rgba), 0.0, 0.0, 0.0],
        ImageFormat::Yuv420 | ImageFormat::YuvNv21 => {
            unreachable!("planar formats are rejected as destinations before conversion")
        }
    }
}
