use crate::render::messages::Pass;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub pass: Pass,
    pub completed_batches: usize,
    pub batch_count: usize,
}

/// Receives one update per merged batch result.
pub trait ProgressSink: Send + Sync {
    fn progress(&self, update: ProgressUpdate);
}

/// Sink for callers that do not care about progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn progress(&self, _update: ProgressUpdate) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        updates: Mutex<Vec<ProgressUpdate>>,
    }

    impl ProgressSink for RecordingSink {
        fn progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    #[test]
    fn test_null_progress_accepts_updates() {
        NullProgress.progress(ProgressUpdate {
            pass: Pass::First,
            completed_batches: 1,
            batch_count: 10,
        });
    }

    #[test]
    fn test_sink_trait_object_is_usable() {
        let sink = RecordingSink::default();
        let as_dyn: &dyn ProgressSink = &sink;

        as_dyn.progress(ProgressUpdate {
            pass: Pass::Second,
            completed_batches: 3,
            batch_count: 10,
        });

        let updates = sink.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].pass, Pass::Second);
    }
}
