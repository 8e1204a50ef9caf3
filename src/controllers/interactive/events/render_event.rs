use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::errors::render_failure::RenderFailure;
use crate::render::ports::progress::ProgressUpdate;

#[derive(Debug)]
pub enum RenderEvent {
    Frame(FrameData),
    Progress {
        generation: u64,
        update: ProgressUpdate,
    },
    Error(RenderFailure),
}
