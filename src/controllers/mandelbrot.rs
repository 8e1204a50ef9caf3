use std::sync::Arc;

use crate::core::data::complex::Complex;
use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::mandelbrot_kernel::MandelbrotKernel;
use crate::render::orchestrator::{RenderOptions, RenderOrchestrator};
use crate::render::ports::progress::NullProgress;
use crate::storage::write_ppm::write_ppm;

pub fn mandelbrot_controller() -> Result<(), Box<dyn std::error::Error>> {
    let width: u32 = 800;
    let height: u32 = 600;
    let max_iterations: u32 = 256;
    let filepath = "output/mandelbrot.ppm";

    // Classic Mandelbrot view
    let params = ViewParameters::new(
        Complex::new(-2.5, -1.0),
        Complex::new(1.0, 1.0),
        width,
        height,
        max_iterations,
        false,
    )?;

    let options = RenderOptions::default();

    println!("Rendering Mandelbrot set...");
    println!("Image size: {}x{}", width, height);
    println!("Max iterations: {}", max_iterations);
    println!("Concurrency hint: {}", options.concurrency_hint);

    let mut orchestrator = RenderOrchestrator::new(Arc::new(MandelbrotKernel), options);
    let frame = orchestrator.render(&params, &NullProgress)?;

    println!("Duration:   {:?}", frame.elapsed);
    println!("Lowest escape iteration: {}", frame.global_minimum);

    write_ppm(&frame.image, filepath)?;
    println!("Saved to {}", filepath);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandelbrot_controller_returns_ok() {
        let result = mandelbrot_controller();

        assert!(result.is_ok());
    }
}
