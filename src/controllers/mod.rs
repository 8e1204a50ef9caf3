pub mod interactive;
pub mod mandelbrot;
