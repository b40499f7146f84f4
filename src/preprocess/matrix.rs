//! 3x3 affine/perspective matrix applied to sampling coordinates.

use serde::{Deserialize, Serialize};

/// Row-major 3x3 matrix laid out as
/// `[scale_x, skew_x, trans_x, skew_y, scale_y, trans_y, persp_0, persp_1, persp_2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Matrix3 {
    values: [f32; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    pub const fn identity() -> Self {
        Self {
            values: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub const fn from_values(values: [f32; 9]) -> Self {
        Self { values }
    }

    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self {
            values: [sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            values: [1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0],
        }
    }

    pub fn values(&self) -> &[f32; 9] {
        &self.values
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Maps a point through the matrix, including the perspective divide.
    #[inline]
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let m = &self.values;
        let mapped_x = m[0] * x + m[1] * y + m[2];
        let mapped_y = m[3] * x + m[4] * y + m[5];
        let w = m[6] * x + m[7] * y + m[8];
        if w == 1.0 {
            (mapped_x, mapped_y)
        } else {
            (mapped_x / w, mapped_y / w)
        }
    }

    /// Returns `self * other`: `other` is applied to a point first.
    pub fn concat(&self, other: &Matrix3) -> Matrix3 {
        let a = &self.values;
        let b = &other.values;
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = (0..3).map(|k| a[row * 3 + k] * b[k * 3 + col]).sum();
            }
        }
        Matrix3 { values: out }
    }

    /// Inverse matrix, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Matrix3> {
        let m = &self.values;
        let cofactor = [
            m[4] * m[8] - m[5] * m[7],
            m[5] * m[6] - m[3] * m[8],
            m[3] * m[7] - m[4] * m[6],
        ];
        let determinant = m[0] * cofactor[0] + m[1] * cofactor[1] + m[2] * cofactor[2];
        if determinant.abs() < f32::EPSILON {
            return None;
        }
        let inv = 1.0 / determinant;
        Some(Matrix3 {
            values: [
                cofactor[0] * inv,
                (m[2] * m[7] - m[1] * m[8]) * inv,
                (m[1] * m[5] - m[2] * m[4]) * inv,
                cofactor[1] * inv,
                (m[0] * m[8] - m[2] * m[6]) * inv,
                (m[2] * m[3] - m[0] * m[5]) * inv,
                cofactor[2] * inv,
                (m[1] * m[6] - m[0] * m[7]) * inv,
                (m[0] * m[4] - m[1] * m[3]) * inv,
            ],
        })
    }
}
