use rayon::prelude::*;

use crate::core::data::frame_buffer::{FrameBuffer, BYTES_PER_PIXEL};
use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::ports::compute_kernel::{ComputeKernel, KernelError};

/// Output of the non-batched reference render.
#[derive(Debug)]
pub struct ReferenceRender {
    pub image: FrameBuffer,
    pub results: Vec<i32>,
    pub global_minimum: Option<u32>,
}

/// Renders the whole view in one logical range, both passes, without the
/// batch pipeline.
///
/// Rows are computed in parallel with rayon, but the reduction and the
/// second pass see exactly the same per-pixel inputs as the batched
/// orchestrator, so the two must produce byte-identical images. Used to
/// cross-check the pipeline and as a benchmark baseline.
pub fn render_reference<K: ComputeKernel>(
    kernel: &K,
    params: &ViewParameters,
) -> Result<ReferenceRender, KernelError> {
    let width = params.width() as usize;
    let total_pixels = params.total_pixels();

    let mut colours = vec![0u8; total_pixels * BYTES_PER_PIXEL];
    let mut results = vec![0i32; total_pixels];

    let row_minima: Vec<Option<u32>> = colours
        .par_chunks_mut(width * BYTES_PER_PIXEL)
        .zip(results.par_chunks_mut(width))
        .enumerate()
        .map(|(row, (colour_row, result_row))| {
            kernel.first_pass(colour_row, result_row, params, row * width, width)
        })
        .collect::<Result<_, _>>()?;

    let global_minimum = row_minima.into_iter().flatten().min();

    if let Some(minimum) = global_minimum {
        colours
            .par_chunks_mut(width * BYTES_PER_PIXEL)
            .zip(results.par_chunks(width))
            .enumerate()
            .try_for_each(|(row, (colour_row, result_row))| {
                kernel.second_pass(colour_row, result_row, params, row * width, width, minimum)
            })?;
    }

    let mut image = FrameBuffer::new(params.width(), params.height());
    image
        .write_range(0..total_pixels, &colours)
        .expect("reference buffers sized from the same params");

    Ok(ReferenceRender {
        image,
        results,
        global_minimum,
    })
}
