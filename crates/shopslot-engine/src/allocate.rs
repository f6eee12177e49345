//! Capacity- and exclusion-constrained placement of ranked buckets into sections.
//!
//! Placement runs hero → left → right → bottom. Two exclusion rules apply:
//!
//! - Rail placements *consume* their ids: a candidate placed in the left rail
//!   cannot also take a right slot.
//! - Rail-tier candidates are barred from the bottom strip whether or not they
//!   won a rail slot.
//!
//! Hero-tier candidates follow [`SharingRule::SharesBottom`]: winning the hero
//! slot does not consume them, so the hero winner may reappear in the bottom
//! strip. That is the only cross-section duplicate the layout permits.

use std::collections::HashSet;

use shopslot_core::{Candidate, PlanTier};

use crate::classify::PlanBuckets;
use crate::rank::{rank, rank_refs, RankOrder};
use crate::types::{AllocationResult, Section, SlotCapacities, HERO_CAPACITY};

/// Whether a tier may appear outside its home section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingRule {
    /// Placed in the home section only.
    Exclusive,
    /// Placed in the home section and also eligible for the bottom strip.
    SharesBottom,
}

impl SharingRule {
    #[must_use]
    pub fn for_tier(tier: PlanTier) -> Self {
        match tier {
            PlanTier::Hero => SharingRule::SharesBottom,
            PlanTier::Left | PlanTier::Right | PlanTier::Basic => SharingRule::Exclusive,
        }
    }
}

/// `true` when candidates of `tier` belong in the bottom pool.
#[must_use]
pub fn bottom_eligible(tier: PlanTier) -> bool {
    Section::home_of(tier) == Section::Bottom
        || SharingRule::for_tier(tier) == SharingRule::SharesBottom
}

/// Fill all four sections from classified buckets.
///
/// Never fails: empty buckets simply leave their sections short or empty.
#[must_use]
pub fn allocate(buckets: &PlanBuckets, capacities: SlotCapacities) -> AllocationResult {
    let hero = place_hero(&buckets.hero);

    let left = place_rail(&buckets.left, capacities.left, &HashSet::new());
    let consumed: HashSet<&str> = left.iter().map(|c| c.id.as_str()).collect();
    let right = place_rail(&buckets.right, capacities.right, &consumed);

    let bottom = place_bottom(buckets, capacities.bottom);

    AllocationResult {
        hero: hero.cloned(),
        left: left.into_iter().cloned().collect(),
        right: right.into_iter().cloned().collect(),
        bottom: bottom.into_iter().cloned().collect(),
    }
}

fn place_hero(hero_bucket: &[Candidate]) -> Option<&Candidate> {
    rank(hero_bucket, RankOrder::Hero)
        .into_iter()
        .take(HERO_CAPACITY)
        .next()
}

fn place_rail<'a>(
    bucket: &'a [Candidate],
    capacity: usize,
    consumed: &HashSet<&str>,
) -> Vec<&'a Candidate> {
    rank(bucket, RankOrder::Rail)
        .into_iter()
        .filter(|c| !consumed.contains(c.id.as_str()))
        .take(capacity)
        .collect()
}

fn place_bottom(buckets: &PlanBuckets, capacity: usize) -> Vec<&Candidate> {
    let barred: HashSet<&str> = buckets
        .left
        .iter()
        .chain(&buckets.right)
        .map(|c| c.id.as_str())
        .collect();

    let mut pool: Vec<&Candidate> = PlanTier::ALL
        .into_iter()
        .filter(|&tier| bottom_eligible(tier))
        .flat_map(|tier| buckets.bucket(tier))
        .filter(|c| !barred.contains(c.id.as_str()))
        .collect();

    rank_refs(&mut pool, RankOrder::Bottom);
    pool.truncate(capacity);
    pool
}
