//! Channel pooling and copy kernels.

use crate::engine::Kernel;
use crate::errors::EngineResult;

/// Averages each channel plane of a channel-first segment into one value.
pub struct ChannelMeanKernel {
    input_ptr: usize,
    output_ptr: usize,
    channels: usize,
    plane_size: usize,
}

impl ChannelMeanKernel {
    pub fn new(input_ptr: usize, output_ptr: usize, channels: usize, input_size: usize) -> Self {
        Self {
            input_ptr,
            output_ptr,
            channels,
            plane_size: input_size / channels,
        }
    }
}

impl Kernel for ChannelMeanKernel {
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()> {
        for channel in 0..self.channels {
            let start = self.input_ptr + channel * self.plane_size;
            let sum: f32 = buffer[start..start + self.plane_size].iter().sum();
            buffer[self.output_ptr + channel] = sum / self.plane_size as f32;
        }
        Ok(())
    }
}

/// Copies one segment into another at an offset.
pub struct CopyKernel {
    input_ptr: usize,
    output_ptr: usize,
    data_size: usize,
}

impl CopyKernel {
    pub fn new(input_ptr: usize, output_ptr: usize, data_size: usize) -> Self {
        Self {
            input_ptr,
            output_ptr,
            data_size,
        }
    }
}

impl Kernel for CopyKernel {
    fn apply(&self, buffer: &mut [f32]) -> EngineResult<()> {
        buffer.copy_within(
            self.input_ptr..self.input_ptr + self.data_size,
            self.output_ptr,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mean_over_planes() {
        // Two 2x1 planes followed by a two-value output segment.
        let mut buffer = vec![1.0, 3.0, 10.0, 20.0, 0.0, 0.0];
        ChannelMeanKernel::new(0, 4, 2, 4).apply(&mut buffer).unwrap();
        assert_eq!(&buffer[4..], &[2.0, 15.0]);
    }

    #[test]
    fn test_copy_at_offset() {
        let mut buffer = vec![7.0, 8.0, 0.0, 0.0, 0.0];
        CopyKernel::new(0, 3, 2).apply(&mut buffer).unwrap();
        assert_eq!(buffer, vec![7.0, 8.0, 0.0, 7.0, 8.0]);
    }
}
