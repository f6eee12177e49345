//! Partitions a merged candidate set into plan-tier buckets.

use shopslot_core::{Candidate, PlanTier};

/// Four disjoint buckets, each preserving the merge order of its members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanBuckets {
    pub hero: Vec<Candidate>,
    pub left: Vec<Candidate>,
    pub right: Vec<Candidate>,
    pub basic: Vec<Candidate>,
}

impl PlanBuckets {
    #[must_use]
    pub fn bucket(&self, tier: PlanTier) -> &[Candidate] {
        match tier {
            PlanTier::Hero => &self.hero,
            PlanTier::Left => &self.left,
            PlanTier::Right => &self.right,
            PlanTier::Basic => &self.basic,
        }
    }

    /// Total number of candidates across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hero.len() + self.left.len() + self.right.len() + self.basic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `candidates` by plan tier. Every candidate lands in exactly one bucket.
#[must_use]
pub fn classify(candidates: Vec<Candidate>) -> PlanBuckets {
    let mut buckets = PlanBuckets::default();
    for candidate in candidates {
        match candidate.plan_type {
            PlanTier::Hero => buckets.hero.push(candidate),
            PlanTier::Left => buckets.left.push(candidate),
            PlanTier::Right => buckets.right.push(candidate),
            PlanTier::Basic => buckets.basic.push(candidate),
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_by_tier_preserving_order() {
        let buckets = classify(vec![
            Candidate::new("h1", PlanTier::Hero),
            Candidate::new("b1", PlanTier::Basic),
            Candidate::new("l1", PlanTier::Left),
            Candidate::new("h2", PlanTier::Hero),
            Candidate::new("r1", PlanTier::Right),
            Candidate::new("l2", PlanTier::Left),
        ]);

        let ids = |tier| {
            buckets
                .bucket(tier)
                .iter()
                .map(|c| c.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(PlanTier::Hero), ["h1", "h2"]);
        assert_eq!(ids(PlanTier::Left), ["l1", "l2"]);
        assert_eq!(ids(PlanTier::Right), ["r1"]);
        assert_eq!(ids(PlanTier::Basic), ["b1"]);
        assert_eq!(buckets.len(), 6);
    }

    #[test]
    fn wire_tags_outside_the_paid_tiers_land_in_basic() {
        let candidates: Vec<Candidate> = serde_json::from_value(serde_json::json!([
            { "id": "a", "planType": "hero" },
            { "id": "b" },
            { "id": "c", "planType": "GOLD" },
            { "id": "d", "planType": "RIGHT" }
        ]))
        .expect("candidates");

        let buckets = classify(candidates);
        assert_eq!(buckets.basic.len(), 3);
        assert_eq!(buckets.right.len(), 1);
        assert!(buckets.hero.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_buckets() {
        let buckets = classify(Vec::new());
        assert!(buckets.is_empty());
    }
}
