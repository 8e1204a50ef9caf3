use std::error::Error;
use std::fmt;
use std::ops::Range;

pub const BYTES_PER_PIXEL: usize = 4; // RGBA

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameBufferError {
    SliceSizeMismatch {
        expected_bytes: usize,
        actual_bytes: usize,
    },
    RangeOutOfBounds {
        range: Range<usize>,
        total_pixels: usize,
    },
}

impl fmt::Display for FrameBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SliceSizeMismatch {
                expected_bytes,
                actual_bytes,
            } => {
                write!(
                    f,
                    "slice size {} does not match range size {}",
                    actual_bytes, expected_bytes
                )
            }
            Self::RangeOutOfBounds {
                range,
                total_pixels,
            } => {
                write!(
                    f,
                    "pixel range {}..{} outside of buffer with {} pixels",
                    range.start, range.end, total_pixels
                )
            }
        }
    }
}

impl Error for FrameBufferError {}

/// RGBA raster for one render, `width * height * 4` bytes.
///
/// Batches write disjoint pixel ranges into it via [`FrameBuffer::write_range`];
/// the ranges come from the render plan, so writers never alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let total_bytes = width as usize * height as usize * BYTES_PER_PIXEL;

        Self {
            width,
            height,
            data: vec![0; total_bytes],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn total_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Copies `bytes` over the pixels in `pixel_range`.
    pub fn write_range(
        &mut self,
        pixel_range: Range<usize>,
        bytes: &[u8],
    ) -> Result<(), FrameBufferError> {
        if pixel_range.end > self.total_pixels() {
            return Err(FrameBufferError::RangeOutOfBounds {
                range: pixel_range,
                total_pixels: self.total_pixels(),
            });
        }

        let expected_bytes = pixel_range.len() * BYTES_PER_PIXEL;
        if bytes.len() != expected_bytes {
            return Err(FrameBufferError::SliceSizeMismatch {
                expected_bytes,
                actual_bytes: bytes.len(),
            });
        }

        let byte_start = pixel_range.start * BYTES_PER_PIXEL;
        self.data[byte_start..byte_start + expected_bytes].copy_from_slice(bytes);

        Ok(())
    }

    /// Borrows the bytes backing the pixels in `pixel_range`.
    pub fn range(&self, pixel_range: Range<usize>) -> Result<&[u8], FrameBufferError> {
        if pixel_range.end > self.total_pixels() {
            return Err(FrameBufferError::RangeOutOfBounds {
                range: pixel_range,
                total_pixels: self.total_pixels(),
            });
        }

        let byte_range = pixel_range.start * BYTES_PER_PIXEL..pixel_range.end * BYTES_PER_PIXEL;

        Ok(&self.data[byte_range])
    }
}
