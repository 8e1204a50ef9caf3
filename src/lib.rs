pub mod controllers;
pub mod core;
pub mod render;
pub mod storage;

pub use crate::controllers::interactive::InteractiveController;
pub use crate::controllers::mandelbrot::mandelbrot_controller;
pub use crate::core::data::complex::Complex;
pub use crate::core::data::frame_buffer::FrameBuffer;
pub use crate::core::data::view_parameters::ViewParameters;
pub use crate::core::kernel::mandelbrot_kernel::MandelbrotKernel;
pub use crate::render::orchestrator::{RenderOptions, RenderOrchestrator, RenderedFrame};
