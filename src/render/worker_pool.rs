use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::core::data::view_parameters::ViewParameters;
use crate::core::kernel::ports::compute_kernel::ComputeKernel;
use crate::render::messages::{BatchJob, BatchResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerPoolError {
    UnknownWorker {
        worker_index: usize,
        pool_size: usize,
    },
    WorkerBusy {
        worker_index: usize,
    },
    WorkerUnavailable {
        worker_index: usize,
    },
}

impl fmt::Display for WorkerPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWorker {
                worker_index,
                pool_size,
            } => {
                write!(
                    f,
                    "worker {} does not exist in a pool of {}",
                    worker_index, pool_size
                )
            }
            Self::WorkerBusy { worker_index } => {
                write!(f, "worker {} already has a job in flight", worker_index)
            }
            Self::WorkerUnavailable { worker_index } => {
                write!(f, "worker {} is no longer running", worker_index)
            }
        }
    }
}

impl Error for WorkerPoolError {}

struct WorkerHandle {
    job_tx: Sender<BatchJob>,
    busy: bool,
    thread: Option<JoinHandle<()>>,
}

/// Grow-only pool of long-lived compute threads.
///
/// Each worker owns a private job channel and processes one job at a time;
/// all workers report into one shared result channel. Workers are spawned
/// lazily by [`WorkerPool::ensure_capacity`] and reused across renders;
/// thread startup is assumed non-trivial, so the pool never shrinks.
///
/// Jobs and results carry their buffers with them, so no buffer is ever
/// writable from two threads at once and the pool needs no locks around
/// pixel data.
pub struct WorkerPool {
    kernel: Arc<dyn ComputeKernel>,
    workers: Vec<WorkerHandle>,
    result_tx: Sender<BatchResult>,
    result_rx: Receiver<BatchResult>,
}

impl WorkerPool {
    #[must_use]
    pub fn new(kernel: Arc<dyn ComputeKernel>) -> Self {
        let (result_tx, result_rx) = unbounded();

        Self {
            kernel,
            workers: Vec::new(),
            result_tx,
            result_rx,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Spawns workers until at least `capacity` exist.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if self.workers.len() >= capacity {
            return;
        }

        debug!(
            "growing worker pool from {} to {}",
            self.workers.len(),
            capacity
        );

        while self.workers.len() < capacity {
            let (job_tx, job_rx) = unbounded::<BatchJob>();
            let kernel = Arc::clone(&self.kernel);
            let result_tx = self.result_tx.clone();
            let worker_index = self.workers.len();

            let thread = thread::Builder::new()
                .name(format!("render-worker-{}", worker_index))
                .spawn(move || worker_loop(&*kernel, &job_rx, &result_tx))
                .expect("spawning a render worker thread");

            self.workers.push(WorkerHandle {
                job_tx,
                busy: false,
                thread: Some(thread),
            });
        }
    }

    /// Whether the worker still has a job in flight. Out-of-range indices
    /// report as idle, since there is nothing to wait for.
    #[must_use]
    pub fn is_busy(&self, worker_index: usize) -> bool {
        self.workers
            .get(worker_index)
            .is_some_and(|worker| worker.busy)
    }

    /// Hands one job to one worker. Dispatching to a busy worker is a caller
    /// error; a worker whose thread has exited reports as unavailable.
    pub fn dispatch(&mut self, worker_index: usize, job: BatchJob) -> Result<(), WorkerPoolError> {
        let pool_size = self.workers.len();
        let worker = self
            .workers
            .get_mut(worker_index)
            .ok_or(WorkerPoolError::UnknownWorker {
                worker_index,
                pool_size,
            })?;

        if worker.busy {
            return Err(WorkerPoolError::WorkerBusy { worker_index });
        }

        if worker.job_tx.send(job).is_err() {
            warn!("worker {} is gone, dispatch refused", worker_index);
            return Err(WorkerPoolError::WorkerUnavailable { worker_index });
        }

        worker.busy = true;
        Ok(())
    }

    /// Waits up to `timeout` for the next completion message and releases
    /// the reporting worker for its next job.
    pub fn recv_result(&mut self, timeout: Duration) -> Result<BatchResult, RecvTimeoutError> {
        let result = self.result_rx.recv_timeout(timeout)?;

        // a worker's identity for a job is the batch index it was assigned
        if let Some(worker) = self.workers.get_mut(result.batch_index()) {
            worker.busy = false;
        }

        Ok(result)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for worker in &mut self.workers {
            // dropping the sender disconnects the job channel; the worker
            // loop exits once its current job finishes
            let (closed_tx, _) = unbounded();
            worker.job_tx = closed_tx;
        }

        for worker in &mut self.workers {
            if let Some(handle) = worker.thread.take() {
                let _ = handle.join();
            }
        }
    }
}

fn worker_loop(kernel: &dyn ComputeKernel, job_rx: &Receiver<BatchJob>, result_tx: &Sender<BatchResult>) {
    while let Ok(job) = job_rx.recv() {
        let result = run_job(kernel, job);

        if result_tx.send(result).is_err() {
            break;
        }
    }
}

fn run_job(kernel: &dyn ComputeKernel, job: BatchJob) -> BatchResult {
    let generation = job.generation();
    let batch_index = job.batch_index();
    let pass = job.pass();

    match run_job_inner(kernel, job) {
        Ok(result) => result,
        Err(message) => {
            warn!(
                "batch {} failed in {} (generation {}): {}",
                batch_index, pass, generation, message
            );
            BatchResult::Failed {
                generation,
                batch_index,
                pass,
                message,
            }
        }
    }
}

fn run_job_inner(kernel: &dyn ComputeKernel, job: BatchJob) -> Result<BatchResult, String> {
    match job {
        BatchJob::FirstPass {
            generation,
            batch_index,
            params_json,
            pixel_offset,
            pixel_count,
        } => {
            let params: ViewParameters =
                serde_json::from_str(&params_json).map_err(|e| e.to_string())?;

            let mut colours = vec![0u8; pixel_count * 4];
            let mut results = vec![0i32; pixel_count];

            let local_minimum = kernel
                .first_pass(&mut colours, &mut results, &params, pixel_offset, pixel_count)
                .map_err(|e| e.to_string())?;

            Ok(BatchResult::FirstPass {
                generation,
                batch_index,
                colours,
                results,
                local_minimum,
            })
        }
        BatchJob::SecondPass {
            generation,
            batch_index,
            params_json,
            pixel_offset,
            pixel_count,
            global_minimum,
            mut colours,
            results,
        } => {
            let params: ViewParameters =
                serde_json::from_str(&params_json).map_err(|e| e.to_string())?;

            kernel
                .second_pass(
                    &mut colours,
                    &results,
                    &params,
                    pixel_offset,
                    pixel_count,
                    global_minimum,
                )
                .map_err(|e| e.to_string())?;

            Ok(BatchResult::SecondPass {
                generation,
                batch_index,
                colours,
            })
        }
    }
}
