use crate::core::data::view_parameters::ViewParameters;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    BufferSizeMismatch {
        pixel_count: usize,
        colour_bytes: usize,
        result_entries: usize,
    },
    PixelRangeOutOfImage {
        pixel_offset: usize,
        pixel_count: usize,
        total_pixels: usize,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferSizeMismatch {
                pixel_count,
                colour_bytes,
                result_entries,
            } => {
                write!(
                    f,
                    "buffers for {} pixels must hold {} colour bytes and {} results, got {} and {}",
                    pixel_count,
                    pixel_count * 4,
                    pixel_count,
                    colour_bytes,
                    result_entries
                )
            }
            Self::PixelRangeOutOfImage {
                pixel_offset,
                pixel_count,
                total_pixels,
            } => {
                write!(
                    f,
                    "pixel range {}..{} outside of image with {} pixels",
                    pixel_offset,
                    pixel_offset + pixel_count,
                    total_pixels
                )
            }
        }
    }
}

impl Error for KernelError {}

/// Per-pixel compute seam the render pipeline drives.
///
/// Both operations work on exactly `pixel_count` pixels starting at
/// `pixel_offset` (linear, row-major), with `pixel_count * 4` RGBA bytes in
/// the colour buffer and `pixel_count` entries in the results buffer.
///
/// The first pass fills colours and iteration results and returns the lowest
/// escape iteration seen in the range (`None` when every pixel is interior).
/// The second pass recolours using the image-wide minimum reduced from all
/// first-pass ranges.
pub trait ComputeKernel: Send + Sync {
    fn first_pass(
        &self,
        colour_out: &mut [u8],
        results_out: &mut [i32],
        params: &ViewParameters,
        pixel_offset: usize,
        pixel_count: usize,
    ) -> Result<Option<u32>, KernelError>;

    fn second_pass(
        &self,
        colour_in_out: &mut [u8],
        results_in: &[i32],
        params: &ViewParameters,
        pixel_offset: usize,
        pixel_count: usize,
        global_minimum: u32,
    ) -> Result<(), KernelError>;
}

pub(crate) fn check_buffers(
    colour: &[u8],
    results: &[i32],
    params: &ViewParameters,
    pixel_offset: usize,
    pixel_count: usize,
) -> Result<(), KernelError> {
    if colour.len() != pixel_count * 4 || results.len() != pixel_count {
        return Err(KernelError::BufferSizeMismatch {
            pixel_count,
            colour_bytes: colour.len(),
            result_entries: results.len(),
        });
    }

    if pixel_offset + pixel_count > params.total_pixels() {
        return Err(KernelError::PixelRangeOutOfImage {
            pixel_offset,
            pixel_count,
            total_pixels: params.total_pixels(),
        });
    }

    Ok(())
}
