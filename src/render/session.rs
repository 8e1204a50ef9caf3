use std::time::Instant;

use crate::core::data::render_plan::RenderPlan;
use crate::core::data::view_parameters::ViewParameters;
use crate::render::assembler::FrameAssembler;

/// Where a session is in its two-phase lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderPhase {
    FirstPass,
    SecondPass,
    Done,
}

/// Mutable state of one in-flight render.
///
/// Exactly one session is active at a time; every result message carries the
/// session's generation so completions from a superseded session can be
/// detected and dropped before they touch these buffers. `completed_batches`
/// is monotonic within a pass and resets at the pass boundary.
pub struct RenderSession {
    generation: u64,
    plan: RenderPlan,
    phase: RenderPhase,
    completed_batches: usize,
    global_minimum: Option<u32>,
    assembler: FrameAssembler,
    started: Instant,
}

impl RenderSession {
    #[must_use]
    pub fn new(generation: u64, plan: RenderPlan, params: &ViewParameters) -> Self {
        Self {
            generation,
            plan,
            phase: RenderPhase::FirstPass,
            completed_batches: 0,
            global_minimum: None,
            assembler: FrameAssembler::new(plan, params.width(), params.height()),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn plan(&self) -> RenderPlan {
        self.plan
    }

    #[must_use]
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    #[must_use]
    pub fn completed_batches(&self) -> usize {
        self.completed_batches
    }

    #[must_use]
    pub fn global_minimum(&self) -> Option<u32> {
        self.global_minimum
    }

    #[must_use]
    pub fn started(&self) -> Instant {
        self.started
    }

    #[must_use]
    pub fn pass_complete(&self) -> bool {
        self.completed_batches == self.plan.batch_count()
    }

    pub fn assembler(&mut self) -> &mut FrameAssembler {
        &mut self.assembler
    }

    #[must_use]
    pub fn assembler_ref(&self) -> &FrameAssembler {
        &self.assembler
    }

    pub fn record_batch_complete(&mut self) {
        self.completed_batches += 1;
    }

    pub fn fold_local_minimum(&mut self, local_minimum: Option<u32>) {
        if let Some(local) = local_minimum {
            self.global_minimum = Some(match self.global_minimum {
                Some(current) => current.min(local),
                None => local,
            });
        }
    }

    /// Crosses the pass boundary: completion counting and merge tracking
    /// start over for the second pass.
    pub fn begin_second_pass(&mut self) {
        self.completed_batches = 0;
        self.phase = RenderPhase::SecondPass;
        self.assembler.reset_merges();
    }

    pub fn finish(mut self) -> (crate::core::data::frame_buffer::FrameBuffer, std::time::Duration) {
        self.phase = RenderPhase::Done;
        let elapsed = self.started.elapsed();

        (self.assembler.into_image(), elapsed)
    }
}
