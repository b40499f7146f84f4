//! Decoded input images and folder enumeration.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::errors::{PreprocessError, PreprocessResult};

/// An image decoded to 8-bit RGBA, the platform decode format.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    name: String,
    width: usize,
    height: usize,
    rgba: Vec<u8>,
}

impl DecodedImage {
    /// Wraps an RGBA pixel buffer.
    pub fn from_rgba(
        name: impl Into<String>,
        width: usize,
        height: usize,
        rgba: Vec<u8>,
    ) -> PreprocessResult<Self> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::EmptyImage { width, height });
        }
        let required = width * height * 4;
        if rgba.len() != required {
            return Err(PreprocessError::BufferTooSmall {
                format: super::ImageFormat::Rgba,
                width,
                height,
                required,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            width,
            height,
            rgba,
        })
    }

    /// Decodes an image file with the `image` codecs.
    pub fn open(path: &Path) -> PreprocessResult<Self> {
        let decoded = image::open(path).map_err(|e| PreprocessError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_rgba(name, width, height, rgba.into_raw())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// The named collection of input images used for one benchmark.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    images: Vec<DecodedImage>,
}

impl ImageSet {
    pub fn from_images(images: Vec<DecodedImage>) -> Self {
        Self { images }
    }

    /// Decodes every file in `folder`, in file name order. Files that fail to
    /// decode are skipped with a warning.
    pub fn from_folder(folder: &Path) -> std::io::Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(folder)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in &paths {
            match DecodedImage::open(path) {
                Ok(image) => {
                    debug!(
                        "Decoded input '{}' ({}x{})",
                        image.name(),
                        image.width(),
                        image.height()
                    );
                    images.push(image);
                }
                Err(e) => warn!("Skipping input: {}", e),
            }
        }
        Ok(Self { images })
    }

    pub fn images(&self) -> &[DecodedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
