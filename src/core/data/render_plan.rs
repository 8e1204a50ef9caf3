use std::error::Error;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Range;

/// Floor on pixels per batch, so dispatch and merge overhead stays amortized
/// over a meaningful amount of kernel work.
pub const MIN_BATCH_SIZE: usize = 25_000;

/// Upper bound on parallel workers per render; caps worker spawn cost and
/// the memory held by per-batch scratch buffers.
pub const DEFAULT_CONCURRENCY: usize = 20;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderPlanError {
    NoPixels,
}

impl fmt::Display for RenderPlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPixels => write!(f, "cannot plan a render over zero pixels"),
        }
    }
}

impl Error for RenderPlanError {}

/// Derived partition of a render into contiguous pixel batches.
///
/// Computed once per render invocation and immutable afterwards. Batch `i`
/// owns `[i * batch_size, min((i + 1) * batch_size, total_pixels))`; the
/// last batch may be shorter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderPlan {
    total_pixels: usize,
    batch_size: usize,
    batch_count: usize,
}

impl RenderPlan {
    pub fn plan(
        total_pixels: usize,
        concurrency_hint: NonZeroUsize,
    ) -> Result<Self, RenderPlanError> {
        if total_pixels == 0 {
            return Err(RenderPlanError::NoPixels);
        }

        let batch_size = total_pixels
            .div_ceil(concurrency_hint.get())
            .max(MIN_BATCH_SIZE);
        let batch_count = total_pixels.div_ceil(batch_size);

        Ok(Self {
            total_pixels,
            batch_size,
            batch_count,
        })
    }

    #[must_use]
    pub fn total_pixels(&self) -> usize {
        self.total_pixels
    }

    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Pixel range owned by a batch. The range is empty for out-of-plan
    /// indices, which callers treat as a bug.
    #[must_use]
    pub fn batch_range(&self, batch_index: usize) -> Range<usize> {
        let start = (batch_index * self.batch_size).min(self.total_pixels);
        let end = ((batch_index + 1) * self.batch_size).min(self.total_pixels);

        start..end
    }

    pub fn batch_ranges(&self) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (0..self.batch_count).map(|index| (index, self.batch_range(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_plan_rejects_zero_pixels() {
        assert_eq!(
            RenderPlan::plan(0, hint(DEFAULT_CONCURRENCY)),
            Err(RenderPlanError::NoPixels)
        );
    }

    #[test]
    fn test_plan_500_by_500_view() {
        // 250_000 / 20 = 12_500, floored up to the minimum batch size
        let plan = RenderPlan::plan(250_000, hint(DEFAULT_CONCURRENCY)).unwrap();

        assert_eq!(plan.batch_size(), 25_000);
        assert_eq!(plan.batch_count(), 10);
    }

    #[test]
    fn test_plan_tiny_image_yields_single_batch() {
        let plan = RenderPlan::plan(100, hint(DEFAULT_CONCURRENCY)).unwrap();

        assert_eq!(plan.batch_count(), 1);
        assert_eq!(plan.batch_range(0), 0..100);
    }

    #[test]
    fn test_plan_large_image_respects_concurrency_hint() {
        let plan = RenderPlan::plan(2_000_000, hint(DEFAULT_CONCURRENCY)).unwrap();

        assert_eq!(plan.batch_size(), 100_000);
        assert_eq!(plan.batch_count(), 20);
    }

    #[test]
    fn test_last_batch_is_truncated_to_remainder() {
        // 60_001 pixels with hint 2 -> batch size 30_001, last batch short
        let plan = RenderPlan::plan(60_001, hint(2)).unwrap();

        assert_eq!(plan.batch_count(), 2);
        assert_eq!(plan.batch_range(0), 0..30_001);
        assert_eq!(plan.batch_range(1), 30_001..60_001);
    }

    #[test]
    fn test_batch_ranges_are_disjoint_and_cover_all_pixels() {
        for total in [1usize, 99, 25_000, 25_001, 250_000, 777_777] {
            let plan = RenderPlan::plan(total, hint(DEFAULT_CONCURRENCY)).unwrap();

            let mut next_expected = 0;
            for (_, range) in plan.batch_ranges() {
                assert_eq!(range.start, next_expected);
                assert!(range.end > range.start);
                next_expected = range.end;
            }

            assert_eq!(next_expected, total);
        }
    }

    #[test]
    fn test_out_of_plan_index_yields_empty_range() {
        let plan = RenderPlan::plan(100, hint(4)).unwrap();

        assert!(plan.batch_range(plan.batch_count()).is_empty());
    }
}
