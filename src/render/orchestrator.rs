use crossbeam_channel::RecvTimeoutError;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::core::data::frame_buffer::FrameBuffer;
use crate::core::data::render_plan::{RenderPlan, RenderPlanError, DEFAULT_CONCURRENCY};
use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::ports::compute_kernel::ComputeKernel;
use crate::render::assembler::{AssemblerError, FrameAssembler};
use crate::render::messages::{BatchJob, BatchResult, Pass};
use crate::render::ports::progress::{ProgressSink, ProgressUpdate};
use crate::render::session::{RenderPhase, RenderSession};
use crate::render::worker_pool::{WorkerPool, WorkerPoolError};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Plan(RenderPlanError),
    Pool(WorkerPoolError),
    Assembler(AssemblerError),
    BatchFailed {
        pass: Pass,
        batch_index: usize,
        message: String,
    },
    BatchTimeout {
        pass: Pass,
        missing_batches: Vec<usize>,
    },
    NoFiniteMinimum,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plan(err) => write!(f, "render plan error: {}", err),
            Self::Pool(err) => write!(f, "worker pool error: {}", err),
            Self::Assembler(err) => write!(f, "assembler error: {}", err),
            Self::BatchFailed {
                pass,
                batch_index,
                message,
            } => {
                write!(f, "batch {} failed in {}: {}", batch_index, pass, message)
            }
            Self::BatchTimeout {
                pass,
                missing_batches,
            } => {
                write!(
                    f,
                    "timed out in {} waiting for batches {:?}",
                    pass, missing_batches
                )
            }
            Self::NoFiniteMinimum => {
                write!(f, "no batch reported a finite minimum after the first pass")
            }
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Plan(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::Assembler(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RenderPlanError> for RenderError {
    fn from(err: RenderPlanError) -> Self {
        Self::Plan(err)
    }
}

impl From<WorkerPoolError> for RenderError {
    fn from(err: WorkerPoolError) -> Self {
        Self::Pool(err)
    }
}

impl From<AssemblerError> for RenderError {
    fn from(err: AssemblerError) -> Self {
        Self::Assembler(err)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub concurrency_hint: NonZeroUsize,
    /// Longest the controller waits for any single completion message
    /// before declaring the outstanding batches lost.
    pub batch_timeout: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            concurrency_hint: NonZeroUsize::new(DEFAULT_CONCURRENCY)
                .expect("default concurrency is non-zero"),
            batch_timeout: Duration::from_secs(30),
        }
    }
}

/// Completed render handed back to the caller.
#[derive(Debug)]
pub struct RenderedFrame {
    pub image: FrameBuffer,
    pub global_minimum: u32,
    pub elapsed: Duration,
}

/// Drives one full render through both passes.
///
/// The orchestrator is the single logical controller of the pipeline: it
/// partitions the image, dispatches one first-pass job per batch, waits at
/// the barrier until *every* batch has reported, reduces the global minimum,
/// and only then dispatches second-pass jobs. The second pass normalizes
/// colours against the image-wide minimum, so any speculative dispatch
/// before the reduction would miscolour the output. All session mutation
/// happens on the calling thread; workers only ever own disjoint buffer
/// ranges.
///
/// `render` takes `&mut self`, so a second render cannot start while one is
/// in flight. Results are generation-tagged: completions that straggle in
/// from an abandoned render are dropped, never merged.
pub struct RenderOrchestrator {
    pool: WorkerPool,
    options: RenderOptions,
    generation: u64,
}

impl RenderOrchestrator {
    #[must_use]
    pub fn new(kernel: Arc<dyn ComputeKernel>, options: RenderOptions) -> Self {
        Self {
            pool: WorkerPool::new(kernel),
            options,
            generation: 0,
        }
    }

    #[must_use]
    pub fn with_default_options(kernel: Arc<dyn ComputeKernel>) -> Self {
        Self::new(kernel, RenderOptions::default())
    }

    pub fn set_batch_timeout(&mut self, batch_timeout: Duration) {
        self.options.batch_timeout = batch_timeout;
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    pub fn render(
        &mut self,
        params: &ViewParameters,
        progress: &dyn ProgressSink,
    ) -> Result<RenderedFrame, RenderError> {
        self.generation += 1;

        let plan = RenderPlan::plan(params.total_pixels(), self.options.concurrency_hint)?;
        let mut session = RenderSession::new(self.generation, plan, params);

        info!(
            "render {} started: {} pixels in {} batches of {}",
            session.generation(),
            plan.total_pixels(),
            plan.batch_count(),
            plan.batch_size()
        );

        self.pool.ensure_capacity(plan.batch_count());

        let params_json =
            serde_json::to_string(params).expect("view parameters always serialize");

        // first pass: raw iteration data plus per-batch minima
        for (batch_index, range) in plan.batch_ranges() {
            let job = BatchJob::FirstPass {
                generation: session.generation(),
                batch_index,
                params_json: params_json.clone(),
                pixel_offset: range.start,
                pixel_count: range.len(),
            };
            self.dispatch(&mut session, batch_index, job, progress)?;
        }

        self.await_pass(&mut session, progress)?;

        let global_minimum = session
            .global_minimum()
            .ok_or(RenderError::NoFiniteMinimum)?;

        info!(
            "render {} first pass complete, global minimum {}",
            session.generation(),
            global_minimum
        );

        // barrier crossed: every batch has contributed to the minimum, so
        // second-pass recolouring is now safe for all of them
        session.begin_second_pass();

        for (batch_index, range) in plan.batch_ranges() {
            let (colours, results) = session.assembler().batch_slices(batch_index)?;
            let job = BatchJob::SecondPass {
                generation: session.generation(),
                batch_index,
                params_json: params_json.clone(),
                pixel_offset: range.start,
                pixel_count: range.len(),
                global_minimum,
                colours,
                results,
            };
            self.dispatch(&mut session, batch_index, job, progress)?;
        }

        self.await_pass(&mut session, progress)?;

        let generation = session.generation();
        let (image, elapsed) = session.finish();

        info!("render {} done in {:?}", generation, elapsed);

        Ok(RenderedFrame {
            image,
            global_minimum,
            elapsed,
        })
    }

    /// Dispatches one job to its batch-indexed worker, draining completion
    /// messages while that worker is still finishing an older job.
    fn dispatch(
        &mut self,
        session: &mut RenderSession,
        worker_index: usize,
        job: BatchJob,
        progress: &dyn ProgressSink,
    ) -> Result<(), RenderError> {
        while self.pool.is_busy(worker_index) {
            let result = self.recv(session)?;
            self.handle_result(session, result, progress)?;
        }

        self.pool.dispatch(worker_index, job)?;
        Ok(())
    }

    /// Suspends until every batch of the current pass has merged. This is
    /// the only place the controller waits: batches complete in any order,
    /// but the pass as a whole is a strict barrier.
    fn await_pass(
        &mut self,
        session: &mut RenderSession,
        progress: &dyn ProgressSink,
    ) -> Result<(), RenderError> {
        while !session.pass_complete() {
            let result = self.recv(session)?;
            self.handle_result(session, result, progress)?;
        }

        Ok(())
    }

    fn recv(&mut self, session: &RenderSession) -> Result<BatchResult, RenderError> {
        match self.pool.recv_result(self.options.batch_timeout) {
            Ok(result) => Ok(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                Err(RenderError::BatchTimeout {
                    pass: current_pass(session.phase()),
                    missing_batches: session_missing(session),
                })
            }
        }
    }

    fn handle_result(
        &mut self,
        session: &mut RenderSession,
        result: BatchResult,
        progress: &dyn ProgressSink,
    ) -> Result<(), RenderError> {
        if result.generation() != session.generation() {
            debug!(
                "dropping stale batch {} result from superseded render {}",
                result.batch_index(),
                result.generation()
            );
            return Ok(());
        }

        match result {
            BatchResult::Failed {
                batch_index,
                pass,
                message,
                ..
            } => Err(RenderError::BatchFailed {
                pass,
                batch_index,
                message,
            }),
            BatchResult::FirstPass {
                batch_index,
                colours,
                results,
                local_minimum,
                ..
            } => {
                if session.phase() != RenderPhase::FirstPass {
                    warn!(
                        "ignoring first-pass result for batch {} outside the first pass",
                        batch_index
                    );
                    return Ok(());
                }

                if session.assembler().merge(batch_index, &colours)? {
                    session.assembler().merge_results(batch_index, &results)?;
                    session.fold_local_minimum(local_minimum);
                    session.record_batch_complete();
                    self.report_progress(session, progress);
                }

                Ok(())
            }
            BatchResult::SecondPass {
                batch_index,
                colours,
                ..
            } => {
                if session.phase() != RenderPhase::SecondPass {
                    warn!(
                        "ignoring second-pass result for batch {} outside the second pass",
                        batch_index
                    );
                    return Ok(());
                }

                if session.assembler().merge(batch_index, &colours)? {
                    session.record_batch_complete();
                    self.report_progress(session, progress);
                }

                Ok(())
            }
        }
    }

    fn report_progress(&self, session: &RenderSession, progress: &dyn ProgressSink) {
        let completed_batches = session.completed_batches();
        let batch_count = session.plan().batch_count();

        debug!(
            "render {} {} at {:.0}%",
            session.generation(),
            current_pass(session.phase()),
            FrameAssembler::progress_fraction(completed_batches, batch_count) * 100.0
        );

        progress.progress(ProgressUpdate {
            pass: current_pass(session.phase()),
            completed_batches,
            batch_count,
        });
    }
}

fn current_pass(phase: RenderPhase) -> Pass {
    match phase {
        RenderPhase::SecondPass | RenderPhase::Done => Pass::Second,
        RenderPhase::FirstPass => Pass::First,
    }
}

fn session_missing(session: &RenderSession) -> Vec<usize> {
    session.assembler_ref().missing_batches()
}
