use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::errors::render_failure::RenderFailure;
use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::presenter::InteractiveControllerPresenterPort;
use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::ports::compute_kernel::ComputeKernel;
use crate::render::orchestrator::RenderOrchestrator;
use crate::render::ports::progress::{ProgressSink, ProgressUpdate};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

struct SharedState {
    generation: AtomicU64,
    last_completed_generation: AtomicU64,
    latest_request: Mutex<Option<(u64, Arc<ViewParameters>)>>,
    wake: Condvar,
    shutdown: AtomicBool,
    presenter_port: Arc<dyn InteractiveControllerPresenterPort>,
}

/// Single-render-at-a-time front end for interactive exploration.
///
/// Requests coalesce: only the newest pending request is ever rendered, and
/// every request gets a fresh generation id. Results for a superseded
/// generation are never presented, so the presenter only sees frames worth
/// showing.
pub struct InteractiveController {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

impl InteractiveController {
    pub fn new(
        kernel: Arc<dyn ComputeKernel>,
        presenter_port: Arc<dyn InteractiveControllerPresenterPort>,
    ) -> Self {
        let shared = Arc::new(SharedState {
            generation: AtomicU64::new(0),
            last_completed_generation: AtomicU64::new(0),
            latest_request: Mutex::new(None),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            presenter_port,
        });

        let worker_shared = Arc::clone(&shared);

        let worker = thread::spawn(move || {
            let mut orchestrator = RenderOrchestrator::with_default_options(kernel);
            Self::worker_loop(&worker_shared, &mut orchestrator);
        });

        Self {
            shared,
            worker: Some(worker),
        }
    }

    pub fn submit_request(&self, request: Arc<ViewParameters>) -> u64 {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut guard = self.shared.latest_request.lock().unwrap();
            *guard = Some((generation, request));
        }

        self.shared.wake.notify_one();

        generation
    }

    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.wake.notify_one();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    fn worker_loop(shared: &Arc<SharedState>, orchestrator: &mut RenderOrchestrator) {
        loop {
            let (job_generation, request) = {
                let mut guard = shared.latest_request.lock().unwrap();
                loop {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    if let Some(req) = guard.take() {
                        break req;
                    }

                    guard = shared.wake.wait(guard).unwrap();
                }
            };

            let progress = GenerationProgress {
                shared,
                job_generation,
            };

            let result = orchestrator.render(&request, &progress);

            // a newer request supersedes this one; its outcome is not worth
            // presenting
            let current_generation = shared.generation.load(Ordering::Acquire);
            if job_generation != current_generation {
                continue;
            }

            match result {
                Ok(frame) => {
                    shared.presenter_port.present(RenderEvent::Frame(FrameData {
                        generation: job_generation,
                        global_minimum: frame.global_minimum,
                        render_duration: frame.elapsed,
                        image: frame.image,
                    }));
                }
                Err(err) => {
                    shared
                        .presenter_port
                        .present(RenderEvent::Error(RenderFailure {
                            generation: job_generation,
                            message: err.to_string(),
                        }));
                }
            }

            shared
                .last_completed_generation
                .store(job_generation, Ordering::Release);
        }
    }
}

/// Forwards per-batch progress to the presenter, stamped with the render's
/// generation; goes quiet once the render is superseded.
struct GenerationProgress<'a> {
    shared: &'a Arc<SharedState>,
    job_generation: u64,
}

impl ProgressSink for GenerationProgress<'_> {
    fn progress(&self, update: ProgressUpdate) {
        if self.job_generation != self.shared.generation.load(Ordering::Relaxed) {
            return;
        }

        self.shared.presenter_port.present(RenderEvent::Progress {
            generation: self.job_generation,
            update,
        });
    }
}

impl Drop for InteractiveController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
