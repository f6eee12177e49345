//! The full merge → distance → classify → rank → allocate pipeline.

use shopslot_core::Candidate;

use crate::allocate::allocate;
use crate::classify::classify;
use crate::distance::annotate_distances;
use crate::merge::merge_candidates;
use crate::types::{AllocationConfig, AllocationResult};

/// Allocate display slots from raw source lists.
///
/// `sources` must be in priority order: when two sources return the same id,
/// the earlier source's record is the one placed. Pure and synchronous; the
/// same input and config always produce the same result.
pub fn allocate_slots<I, L>(sources: I, config: &AllocationConfig) -> AllocationResult
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Candidate>,
{
    let merged = merge_candidates(sources);
    let annotated = annotate_distances(merged, config.reference);
    let buckets = classify(annotated);

    tracing::debug!(
        hero = buckets.hero.len(),
        left = buckets.left.len(),
        right = buckets.right.len(),
        basic = buckets.basic.len(),
        "classified candidates"
    );

    let result = allocate(&buckets, config.capacities);

    tracing::debug!(
        hero = result.hero.is_some(),
        left = result.left.len(),
        right = result.right.len(),
        bottom = result.bottom.len(),
        "allocated slots"
    );

    result
}
