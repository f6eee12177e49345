//! Bucket-specific ranking.
//!
//! Every order is a stable sort over a chain of keys; the first key that is
//! not a tie decides. Candidates that tie on every key keep their merge order,
//! so the same input always ranks the same way.

use std::cmp::Ordering;

use shopslot_core::{Candidate, PlanTier};

/// Which comparator chain to rank with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// `visitor_count` desc, then `priority_rank` desc, then distance asc.
    Hero,
    /// `priority_rank` desc, then distance asc. Used for the left and right rails.
    Rail,
    /// HERO-tier before everything else. HERO-tier by `visitor_count` desc;
    /// the rest by `priority_rank` desc, then distance asc.
    Bottom,
}

impl RankOrder {
    #[must_use]
    pub fn compare(self, a: &Candidate, b: &Candidate) -> Ordering {
        match self {
            RankOrder::Hero => compare_hero(a, b),
            RankOrder::Rail => compare_rail(a, b),
            RankOrder::Bottom => compare_bottom(a, b),
        }
    }
}

/// Rank `candidates` without moving them; returns references in ranked order.
#[must_use]
pub fn rank(candidates: &[Candidate], order: RankOrder) -> Vec<&Candidate> {
    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    rank_refs(&mut ranked, order);
    ranked
}

/// Sort a list of candidate references in place. `sort_by` is stable.
pub fn rank_refs(candidates: &mut [&Candidate], order: RankOrder) {
    candidates.sort_by(|a, b| order.compare(a, b));
}

fn compare_hero(a: &Candidate, b: &Candidate) -> Ordering {
    b.visitor_count
        .cmp(&a.visitor_count)
        .then_with(|| b.priority_rank.cmp(&a.priority_rank))
        .then_with(|| nearest_first(a.distance_km, b.distance_km))
}

fn compare_rail(a: &Candidate, b: &Candidate) -> Ordering {
    b.priority_rank
        .cmp(&a.priority_rank)
        .then_with(|| nearest_first(a.distance_km, b.distance_km))
}

fn compare_bottom(a: &Candidate, b: &Candidate) -> Ordering {
    let a_hero = a.plan_type == PlanTier::Hero;
    let b_hero = b.plan_type == PlanTier::Hero;

    match (a_hero, b_hero) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => b.visitor_count.cmp(&a.visitor_count),
        (false, false) => compare_rail(a, b),
    }
}

/// Ascending distance with undefined distances after every defined one.
fn nearest_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
