//! Typed, shaped numeric buffers exchanged between preprocessing and backends.
//!
//! A [`Tensor`] owns a contiguous buffer whose element type is fixed at creation.
//! Readback views (`read_float`, `read_int`, `read_bytes`) are materialized lazily
//! and cached; any reshape or write clears the caches before the next read.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};

use crate::errors::{TensorError, TensorResult};

/// Element type of a tensor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    Int32,
    Uint8,
}

impl DataType {
    /// Size in bytes of one element.
    pub fn size(self) -> usize {
        match self {
            DataType::Float32 | DataType::Int32 => 4,
            DataType::Uint8 => 1,
        }
    }
}

/// Owned typed storage backing a tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    Uint8(Vec<u8>),
}

impl TensorData {
    fn zeros(dtype: DataType, len: usize) -> Self {
        match dtype {
            DataType::Float32 => TensorData::Float32(vec![0.0; len]),
            DataType::Int32 => TensorData::Int32(vec![0; len]),
            DataType::Uint8 => TensorData::Uint8(vec![0; len]),
        }
    }

    fn len(&self) -> usize {
        match self {
            TensorData::Float32(values) => values.len(),
            TensorData::Int32(values) => values.len(),
            TensorData::Uint8(values) => values.len(),
        }
    }

    fn dtype(&self) -> DataType {
        match self {
            TensorData::Float32(_) => DataType::Float32,
            TensorData::Int32(_) => DataType::Int32,
            TensorData::Uint8(_) => DataType::Uint8,
        }
    }
}

/// Scalar types that can be written into a tensor with [`Tensor::set_data`].
pub trait Element: Copy {
    const DTYPE: DataType;

    fn into_data(values: Vec<Self>) -> TensorData;
}

impl Element for f32 {
    const DTYPE: DataType = DataType::Float32;

    fn into_data(values: Vec<Self>) -> TensorData {
        TensorData::Float32(values)
    }
}

impl Element for i32 {
    const DTYPE: DataType = DataType::Int32;

    fn into_data(values: Vec<Self>) -> TensorData {
        TensorData::Int32(values)
    }
}

impl Element for u8 {
    const DTYPE: DataType = DataType::Uint8;

    fn into_data(values: Vec<Self>) -> TensorData {
        TensorData::Uint8(values)
    }
}

/// A shaped buffer of a single element type.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Vec<usize>,
    data: TensorData,
    float_view: OnceCell<Vec<f32>>,
    int_view: OnceCell<Vec<i32>>,
    byte_view: OnceCell<Vec<u8>>,
}

impl Tensor {
    /// Creates a zero-filled tensor.
    pub fn new(shape: &[usize], dtype: DataType) -> TensorResult<Self> {
        let element_count = Self::validate_shape(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            data: TensorData::zeros(dtype, element_count),
            float_view: OnceCell::new(),
            int_view: OnceCell::new(),
            byte_view: OnceCell::new(),
        })
    }

    /// Creates a tensor from existing values.
    pub fn from_data<T: Element>(shape: &[usize], values: Vec<T>) -> TensorResult<Self> {
        let element_count = Self::validate_shape(shape)?;
        if values.len() != element_count {
            return Err(TensorError::SizeMismatch {
                expected: element_count,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            data: T::into_data(values),
            float_view: OnceCell::new(),
            int_view: OnceCell::new(),
            byte_view: OnceCell::new(),
        })
    }

    fn validate_shape(shape: &[usize]) -> TensorResult<usize> {
        if shape.is_empty() || shape.contains(&0) {
            return Err(TensorError::ShapeError {
                shape: shape.to_vec(),
            });
        }
        Ok(shape.iter().product())
    }

    fn invalidate_views(&mut self) {
        self.float_view.take();
        self.int_view.take();
        self.byte_view.take();
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.element_count() * self.dtype().size()
    }

    /// Reallocates the tensor to a new logical shape. The contents are reset to zero.
    pub fn reshape(&mut self, new_shape: &[usize]) -> TensorResult<()> {
        let element_count = Self::validate_shape(new_shape)?;
        self.invalidate_views();
        self.shape = new_shape.to_vec();
        self.data = TensorData::zeros(self.dtype(), element_count);
        Ok(())
    }

    /// Overwrites the buffer with `values`.
    pub fn set_data<T: Element>(&mut self, values: &[T]) -> TensorResult<()> {
        if T::DTYPE != self.dtype() {
            return Err(TensorError::TypeMismatch {
                expected: self.dtype(),
                actual: T::DTYPE,
            });
        }
        if values.len() != self.element_count() {
            return Err(TensorError::SizeMismatch {
                expected: self.element_count(),
                actual: values.len(),
            });
        }
        self.invalidate_views();
        self.data = T::into_data(values.to_vec());
        Ok(())
    }

    /// Borrows the raw typed storage.
    pub fn data(&self) -> &TensorData {
        &self.data
    }

    /// Mutable access to float storage. Clears cached views.
    pub fn as_f32_mut(&mut self) -> TensorResult<&mut [f32]> {
        self.invalidate_views();
        match &mut self.data {
            TensorData::Float32(values) => Ok(values),
            other => Err(TensorError::TypeMismatch {
                expected: DataType::Float32,
                actual: other.dtype(),
            }),
        }
    }

    /// Direct access to float storage without conversion.
    pub fn as_f32(&self) -> TensorResult<&[f32]> {
        match &self.data {
            TensorData::Float32(values) => Ok(values),
            other => Err(TensorError::TypeMismatch {
                expected: DataType::Float32,
                actual: other.dtype(),
            }),
        }
    }

    /// Cached float view of the buffer, converting from the stored element type.
    pub fn read_float(&self) -> &[f32] {
        self.float_view.get_or_init(|| match &self.data {
            TensorData::Float32(values) => values.clone(),
            TensorData::Int32(values) => values.iter().map(|&v| v as f32).collect(),
            TensorData::Uint8(values) => values.iter().map(|&v| f32::from(v)).collect(),
        })
    }

    /// Cached integer view of the buffer. Float values are truncated toward zero.
    pub fn read_int(&self) -> &[i32] {
        self.int_view.get_or_init(|| match &self.data {
            TensorData::Float32(values) => values.iter().map(|&v| v as i32).collect(),
            TensorData::Int32(values) => values.clone(),
            TensorData::Uint8(values) => values.iter().map(|&v| i32::from(v)).collect(),
        })
    }

    /// Cached native-endian byte view of the buffer.
    pub fn read_bytes(&self) -> &[u8] {
        self.byte_view.get_or_init(|| match &self.data {
            TensorData::Float32(values) => bytemuck::cast_slice(values).to_vec(),
            TensorData::Int32(values) => bytemuck::cast_slice(values).to_vec(),
            TensorData::Uint8(values) => values.clone(),
        })
    }
}
