pub mod colour;
pub mod escape_time;
pub mod mandelbrot_kernel;
pub mod ports;
