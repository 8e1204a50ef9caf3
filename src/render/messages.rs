use std::fmt;

/// Which of the two dependent rendering phases a message belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Pass {
    First,
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "pass 1"),
            Self::Second => write!(f, "pass 2"),
        }
    }
}

/// Job handed to one worker.
///
/// View parameters travel as a JSON snapshot so the worker can never observe
/// later caller-side mutation. Second-pass jobs additionally carry the
/// batch's first-pass buffers and the reduced global minimum; buffer
/// ownership moves with the message.
#[derive(Debug)]
pub enum BatchJob {
    FirstPass {
        generation: u64,
        batch_index: usize,
        params_json: String,
        pixel_offset: usize,
        pixel_count: usize,
    },
    SecondPass {
        generation: u64,
        batch_index: usize,
        params_json: String,
        pixel_offset: usize,
        pixel_count: usize,
        global_minimum: u32,
        colours: Vec<u8>,
        results: Vec<i32>,
    },
}

impl BatchJob {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::FirstPass { generation, .. } | Self::SecondPass { generation, .. } => *generation,
        }
    }

    #[must_use]
    pub fn batch_index(&self) -> usize {
        match self {
            Self::FirstPass { batch_index, .. } | Self::SecondPass { batch_index, .. } => {
                *batch_index
            }
        }
    }

    #[must_use]
    pub fn pass(&self) -> Pass {
        match self {
            Self::FirstPass { .. } => Pass::First,
            Self::SecondPass { .. } => Pass::Second,
        }
    }
}

/// Completion message from a worker, tagged with the generation of the
/// session that dispatched it so stale results can be detected and dropped.
///
/// Worker-level failures arrive on the same channel as successes; a job
/// never disappears silently.
#[derive(Debug)]
pub enum BatchResult {
    FirstPass {
        generation: u64,
        batch_index: usize,
        colours: Vec<u8>,
        results: Vec<i32>,
        local_minimum: Option<u32>,
    },
    SecondPass {
        generation: u64,
        batch_index: usize,
        colours: Vec<u8>,
    },
    Failed {
        generation: u64,
        batch_index: usize,
        pass: Pass,
        message: String,
    },
}

impl BatchResult {
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::FirstPass { generation, .. }
            | Self::SecondPass { generation, .. }
            | Self::Failed { generation, .. } => *generation,
        }
    }

    #[must_use]
    pub fn batch_index(&self) -> usize {
        match self {
            Self::FirstPass { batch_index, .. }
            | Self::SecondPass { batch_index, .. }
            | Self::Failed { batch_index, .. } => *batch_index,
        }
    }

    #[must_use]
    pub fn pass(&self) -> Pass {
        match self {
            Self::FirstPass { .. } => Pass::First,
            Self::SecondPass { .. } => Pass::Second,
            Self::Failed { pass, .. } => *pass,
        }
    }
}
