use std::error::Error;
use std::fmt;

use crate::core::data::frame_buffer::{FrameBuffer, FrameBufferError};
use crate::core::data::render_plan::RenderPlan;
use crate::core::kernel::mandelbrot_kernel::INTERIOR_RESULT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    UnknownBatch {
        batch_index: usize,
        batch_count: usize,
    },
    Frame(FrameBufferError),
    ResultSliceSizeMismatch {
        expected_entries: usize,
        actual_entries: usize,
    },
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBatch {
                batch_index,
                batch_count,
            } => {
                write!(
                    f,
                    "batch {} outside of plan with {} batches",
                    batch_index, batch_count
                )
            }
            Self::Frame(err) => write!(f, "frame merge error: {}", err),
            Self::ResultSliceSizeMismatch {
                expected_entries,
                actual_entries,
            } => {
                write!(
                    f,
                    "result slice has {} entries, batch owns {}",
                    actual_entries, expected_entries
                )
            }
        }
    }
}

impl Error for AssemblerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Frame(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FrameBufferError> for AssemblerError {
    fn from(err: FrameBufferError) -> Self {
        Self::Frame(err)
    }
}

/// Merges per-batch slices into the shared output buffers.
///
/// Batch ranges come from the plan, so concurrent batches never alias; the
/// only coordination needed is duplicate suppression, tracked per batch and
/// reset at the pass boundary. Merging is commutative over disjoint ranges,
/// so batch completion order never matters.
pub struct FrameAssembler {
    plan: RenderPlan,
    image: FrameBuffer,
    results: Vec<i32>,
    merged: Vec<bool>,
}

impl FrameAssembler {
    #[must_use]
    pub fn new(plan: RenderPlan, width: u32, height: u32) -> Self {
        Self {
            plan,
            image: FrameBuffer::new(width, height),
            results: vec![INTERIOR_RESULT; plan.total_pixels()],
            merged: vec![false; plan.batch_count()],
        }
    }

    /// Writes a batch's colour slice at its pixel offset.
    ///
    /// Returns `false` without touching the image when this batch already
    /// merged during the current pass, so re-delivered results are no-ops.
    pub fn merge(
        &mut self,
        batch_index: usize,
        colour_slice: &[u8],
    ) -> Result<bool, AssemblerError> {
        if batch_index >= self.plan.batch_count() {
            return Err(AssemblerError::UnknownBatch {
                batch_index,
                batch_count: self.plan.batch_count(),
            });
        }

        if self.merged[batch_index] {
            return Ok(false);
        }

        self.image
            .write_range(self.plan.batch_range(batch_index), colour_slice)?;
        self.merged[batch_index] = true;

        Ok(true)
    }

    /// Writes a batch's first-pass iteration results at its pixel offset.
    pub fn merge_results(
        &mut self,
        batch_index: usize,
        result_slice: &[i32],
    ) -> Result<(), AssemblerError> {
        if batch_index >= self.plan.batch_count() {
            return Err(AssemblerError::UnknownBatch {
                batch_index,
                batch_count: self.plan.batch_count(),
            });
        }

        let range = self.plan.batch_range(batch_index);
        if result_slice.len() != range.len() {
            return Err(AssemblerError::ResultSliceSizeMismatch {
                expected_entries: range.len(),
                actual_entries: result_slice.len(),
            });
        }

        self.results[range].copy_from_slice(result_slice);

        Ok(())
    }

    /// Clears per-batch merge tracking at the pass boundary.
    pub fn reset_merges(&mut self) {
        self.merged.fill(false);
    }

    #[must_use]
    pub fn progress_fraction(completed_batches: usize, batch_count: usize) -> f64 {
        if batch_count == 0 {
            return 0.0;
        }

        completed_batches as f64 / batch_count as f64
    }

    /// Owned copies of a batch's already-merged slices, for second-pass
    /// dispatch (ownership of the copies moves to the worker).
    pub fn batch_slices(&self, batch_index: usize) -> Result<(Vec<u8>, Vec<i32>), AssemblerError> {
        if batch_index >= self.plan.batch_count() {
            return Err(AssemblerError::UnknownBatch {
                batch_index,
                batch_count: self.plan.batch_count(),
            });
        }

        let range = self.plan.batch_range(batch_index);
        let colours = self.image.range(range.clone())?.to_vec();
        let results = self.results[range].to_vec();

        Ok((colours, results))
    }

    /// Batch indices that have not merged during the current pass.
    #[must_use]
    pub fn missing_batches(&self) -> Vec<usize> {
        self.merged
            .iter()
            .enumerate()
            .filter(|&(_, &merged)| !merged)
            .map(|(index, _)| index)
            .collect()
    }

    #[must_use]
    pub fn image(&self) -> &FrameBuffer {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> FrameBuffer {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn assembler(total_pixels: usize, hint: usize) -> FrameAssembler {
        let plan = RenderPlan::plan(total_pixels, NonZeroUsize::new(hint).unwrap()).unwrap();
        // width*height must match total pixels for these tests
        FrameAssembler::new(plan, total_pixels as u32, 1)
    }

    #[test]
    fn test_merge_writes_at_batch_offset() {
        // 2 batches of 25_000 pixels
        let mut assembler = assembler(50_000, 2);
        let slice = vec![7u8; 25_000 * 4];

        assert!(assembler.merge(1, &slice).unwrap());

        let data = assembler.image().data();
        assert!(data[..25_000 * 4].iter().all(|&b| b == 0));
        assert!(data[25_000 * 4..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_duplicate_merge_is_a_no_op() {
        let mut assembler = assembler(25_000, 1);

        assert!(assembler.merge(0, &vec![1u8; 25_000 * 4]).unwrap());
        // re-delivery of the same batch must not double-apply
        assert!(!assembler.merge(0, &vec![9u8; 25_000 * 4]).unwrap());

        assert!(assembler.image().data().iter().all(|&b| b == 1));
    }

    #[test]
    fn test_reset_merges_allows_second_pass_overwrite() {
        let mut assembler = assembler(25_000, 1);
        assembler.merge(0, &vec![1u8; 25_000 * 4]).unwrap();

        assembler.reset_merges();

        assert!(assembler.merge(0, &vec![2u8; 25_000 * 4]).unwrap());
        assert!(assembler.image().data().iter().all(|&b| b == 2));
    }

    #[test]
    fn test_merge_unknown_batch_is_an_error() {
        let mut assembler = assembler(25_000, 1);

        let result = assembler.merge(1, &[]);

        assert_eq!(
            result,
            Err(AssemblerError::UnknownBatch {
                batch_index: 1,
                batch_count: 1
            })
        );
    }

    #[test]
    fn test_merge_results_checks_slice_length() {
        let mut assembler = assembler(25_000, 1);

        let result = assembler.merge_results(0, &[0i32; 10]);

        assert_eq!(
            result,
            Err(AssemblerError::ResultSliceSizeMismatch {
                expected_entries: 25_000,
                actual_entries: 10
            })
        );
    }

    #[test]
    fn test_batch_slices_round_trip() {
        let mut assembler = assembler(50_000, 2);
        assembler.merge(0, &vec![3u8; 25_000 * 4]).unwrap();
        assembler.merge_results(0, &vec![42i32; 25_000]).unwrap();

        let (colours, results) = assembler.batch_slices(0).unwrap();

        assert!(colours.iter().all(|&b| b == 3));
        assert!(results.iter().all(|&r| r == 42));
    }

    #[test]
    fn test_missing_batches_tracks_unmerged() {
        let mut assembler = assembler(75_000, 3);
        assembler.merge(1, &vec![0u8; 25_000 * 4]).unwrap();

        assert_eq!(assembler.missing_batches(), vec![0, 2]);

        assembler.merge(0, &vec![0u8; 25_000 * 4]).unwrap();
        assembler.merge(2, &vec![0u8; 25_000 * 4]).unwrap();

        assert!(assembler.missing_batches().is_empty());
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(FrameAssembler::progress_fraction(0, 10), 0.0);
        assert_eq!(FrameAssembler::progress_fraction(5, 10), 0.5);
        assert_eq!(FrameAssembler::progress_fraction(10, 10), 1.0);
        assert_eq!(FrameAssembler::progress_fraction(0, 0), 0.0);
    }
}
