//! Shop slot allocation engine.
//!
//! Assigns candidate businesses to a fixed layout of display sections (one
//! hero slot, a left rail, a right rail and a bottom strip) by merging source
//! lists, bucketing by plan tier, ranking each bucket and placing the ranked
//! buckets under capacity and exclusion rules. Everything here is pure: no
//! I/O, no shared state.

pub mod allocate;
pub mod classify;
pub mod distance;
pub mod merge;
pub mod pipeline;
pub mod rank;
pub mod types;

pub use allocate::{allocate, bottom_eligible, SharingRule};
pub use classify::{classify, PlanBuckets};
pub use distance::{annotate_distances, candidate_distance, distance_km};
pub use merge::merge_candidates;
pub use pipeline::allocate_slots;
pub use rank::{rank, RankOrder};
pub use types::{
    AllocationConfig, AllocationResult, Section, SlotAssignment, SlotCapacities, HERO_CAPACITY,
};
