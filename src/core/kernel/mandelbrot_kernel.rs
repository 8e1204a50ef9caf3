use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::colour::iteration_colour;
use crate::core::kernel::escape_time::{escape_time, index_to_complex};
use crate::core::kernel::ports::compute_kernel::{check_buffers, ComputeKernel, KernelError};

/// Interior pixels are recorded with this sentinel in the results buffer;
/// escaped pixels record their (always positive) iteration count.
pub const INTERIOR_RESULT: i32 = -1;

/// Escape-time Mandelbrot kernel behind the [`ComputeKernel`] seam.
#[derive(Debug, Default, Clone, Copy)]
pub struct MandelbrotKernel;

impl ComputeKernel for MandelbrotKernel {
    fn first_pass(
        &self,
        colour_out: &mut [u8],
        results_out: &mut [i32],
        params: &ViewParameters,
        pixel_offset: usize,
        pixel_count: usize,
    ) -> Result<Option<u32>, KernelError> {
        check_buffers(colour_out, results_out, params, pixel_offset, pixel_count)?;

        let mut lowest_iterations: Option<u32> = None;

        for local in 0..pixel_count {
            let c = index_to_complex(pixel_offset + local, params);
            let result = escape_time(c, params.max_iterations());

            match result {
                Some(iterations) => {
                    lowest_iterations = Some(match lowest_iterations {
                        Some(current) => current.min(iterations),
                        None => iterations,
                    });
                    results_out[local] = iterations as i32;
                }
                None => {
                    results_out[local] = INTERIOR_RESULT;
                }
            }

            colour_out[local * 4..local * 4 + 4]
                .copy_from_slice(&iteration_colour(result, params.max_iterations()));
        }

        Ok(lowest_iterations)
    }

    fn second_pass(
        &self,
        colour_in_out: &mut [u8],
        results_in: &[i32],
        params: &ViewParameters,
        pixel_offset: usize,
        pixel_count: usize,
        global_minimum: u32,
    ) -> Result<(), KernelError> {
        check_buffers(colour_in_out, results_in, params, pixel_offset, pixel_count)?;

        for local in 0..pixel_count {
            let recorded = results_in[local];

            // interior pixels keep their first-pass colour
            if recorded > 0 && global_minimum > 0 {
                let normalized = recorded as u32 - global_minimum + 1;
                colour_in_out[local * 4..local * 4 + 4].copy_from_slice(&iteration_colour(
                    Some(normalized),
                    params.max_iterations(),
                ));
            }
        }

        Ok(())
    }
}
