//! Source pixel access and resampling filters.

use crate::errors::{PreprocessError, PreprocessResult};

use super::color::{packed_to_rgba, yuv_to_rgba};
use super::{Filter, ImageFormat, Wrap};

/// Keys cubic convolution coefficient.
const CUBIC_A: f32 = -0.75;

/// A borrowed pixel buffer in a known format.
pub(crate) struct SourceImage<'a> {
    buffer: &'a [u8],
    width: usize,
    height: usize,
    format: ImageFormat,
}

impl<'a> SourceImage<'a> {
    pub(crate) fn new(
        buffer: &'a [u8],
        width: usize,
        height: usize,
        format: ImageFormat,
    ) -> PreprocessResult<Self> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage { width, height });
        }
        let required = format.buffer_len(width, height);
        if buffer.len() < required {
            return Err(PreprocessError::BufferTooSmall {
                format,
                width,
                height,
                required,
                actual: buffer.len(),
            });
        }
        Ok(Self {
            buffer,
            width,
            height,
            format,
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn format(&self) -> ImageFormat {
        self.format
    }

    /// Decodes the in-bounds pixel at `(x, y)` into RGBA.
    fn pixel(&self, x: usize, y: usize) -> [f32; 4] {
        let luma_plane = self.width * self.height;
        let chroma_width = self.width.div_ceil(2);
        let chroma_height = self.height.div_ceil(2);
        match self.format {
            ImageFormat::Yuv420 => {
                let chroma = (y / 2) * chroma_width + x / 2;
                let u = self.buffer[luma_plane + chroma];
                let v = self.buffer[luma_plane + chroma_width * chroma_height + chroma];
                yuv_to_rgba(self.buffer[y * self.width + x], u, v)
            }
            ImageFormat::YuvNv21 => {
                let chroma = luma_plane + (y / 2) * chroma_width * 2 + (x / 2) * 2;
                let v = self.buffer[chroma];
                let u = self.buffer[chroma + 1];
                yuv_to_rgba(self.buffer[y * self.width + x], u, v)
            }
            packed => {
                let bpp = packed.bytes_per_pixel();
                let start = (y * self.width + x) * bpp;
                packed_to_rgba(packed, &self.buffer[start..start + bpp])
            }
        }
    }

    /// Fetches a pixel at integer coordinates, resolving out-of-bounds positions with `wrap`.
    #[inline]
    fn fetch(&self, x: isize, y: isize, wrap: Wrap) -> [f32; 4] {
        match (
            resolve(x, self.width, wrap),
            resolve(y, self.height, wrap),
        ) {
            (Some(x), Some(y)) => self.pixel(x, y),
            _ => [0.0; 4],
        }
    }

    /// Samples the image at fractional source coordinates.
    pub(crate) fn sample(&self, u: f32, v: f32, filter: Filter, wrap: Wrap) -> [f32; 4] {
        match filter {
            Filter::Nearest => self.fetch(u.round() as isize, v.round() as isize, wrap),
            Filter::Bilinear => self.sample_bilinear(u, v, wrap),
            Filter::Bicubic => self.sample_bicubic(u, v, wrap),
        }
    }

    fn sample_bilinear(&self, u: f32, v: f32, wrap: Wrap) -> [f32; 4] {
        let x0 = u.floor();
        let y0 = v.floor();
        let fx = u - x0;
        let fy = v - y0;
        let (x0, y0) = (x0 as isize, y0 as isize);

        let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));

        let top_left = self.fetch(x0, y0, wrap);
        let top_right = self.fetch(x1, y0, wrap);
        let bottom_left = self.fetch(x0, y1, wrap);
        let bottom_right = self.fetch(x1, y1, wrap);

        let mut out = [0.0f32; 4];
        for c in 0..4 {
            let top = top_left[c] + (top_right[c] - top_left[c]) * fx;
            let bottom = bottom_left[c] + (bottom_right[c] - bottom_left[c]) * fx;
            out[c] = top + (bottom - top) * fy;
        }
        out
    }

    fn sample_bicubic(&self, u: f32, v: f32, wrap: Wrap) -> [f32; 4] {
        let x0 = u.floor();
        let y0 = v.floor();
        let weights_x = cubic_weights(u - x0);
        let weights_y = cubic_weights(v - y0);
        let (x0, y0) = (x0 as isize, y0 as isize);

        let mut out = [0.0f32; 4];
        for (j, &wy) in weights_y.iter().enumerate() {
            for (i, &wx) in weights_x.iter().enumerate() {
                let pixel = self.fetch(
                    x0.saturating_add(i as isize - 1),
                    y0.saturating_add(j as isize - 1),
                    wrap,
                );
                let weight = wx * wy;
                for c in 0..4 {
                    out[c] += pixel[c] * weight;
                }
            }
        }
        for value in out.iter_mut() {
            *value = value.clamp(0.0, 255.0);
        }
        out
    }
}

/// Resolves a coordinate against an axis of `len` pixels.
#[inline]
fn resolve(index: isize, len: usize, wrap: Wrap) -> Option<usize> {
    let len_signed = len as isize;
    match wrap {
        Wrap::ClampToEdge => Some(index.clamp(0, len_signed - 1) as usize),
        Wrap::Repeat => Some(index.rem_euclid(len_signed) as usize),
        Wrap::Zero => (0..len_signed).contains(&index).then_some(index as usize),
    }
}

/// Weights for the four taps at offsets -1, 0, 1, 2 from the floor position.
fn cubic_weights(t: f32) -> [f32; 4] {
    let kernel = |x: f32| {
        let x = x.abs();
        if x <= 1.0 {
            ((CUBIC_A + 2.0) * x - (CUBIC_A + 3.0)) * x * x + 1.0
        } else if x < 2.0 {
            ((CUBIC_A * x - 5.0 * CUBIC_A) * x + 8.0 * CUBIC_A) * x - 4.0 * CUBIC_A
        } else {
            0.0
        }
    };
    [kernel(t + 1.0), kernel(t), kernel(1.0 - t), kernel(2.0 - t)]
}
