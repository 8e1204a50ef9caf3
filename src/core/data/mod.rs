pub mod complex;
pub mod frame_buffer;
pub mod render_plan;
pub mod view_parameters;
