use std::time::Duration;

use crate::core::data::frame_buffer::FrameBuffer;

#[derive(Debug)]
pub struct FrameData {
    pub generation: u64,
    pub image: FrameBuffer,
    pub global_minimum: u32,
    pub render_duration: Duration,
}
