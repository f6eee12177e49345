//! Merges candidate lists from several source queries into one unique set.

use std::collections::HashSet;

use shopslot_core::Candidate;

/// Concatenate `lists` in order and keep only the first candidate seen for each id.
///
/// Later duplicates are dropped whole: their field values never replace the
/// earlier record. Merging an already-merged list returns it unchanged.
pub fn merge_candidates<I, L>(lists: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Candidate>,
{
    let mut seen_ids: HashSet<String> = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|candidate| seen_ids.insert(candidate.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use shopslot_core::PlanTier;

    use super::*;

    fn ids(list: &[Candidate]) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn keeps_first_seen_order_across_lists() {
        let nearby = vec![
            Candidate::new("a", PlanTier::Basic),
            Candidate::new("b", PlanTier::Basic),
        ];
        let by_city = vec![
            Candidate::new("c", PlanTier::Basic),
            Candidate::new("a", PlanTier::Basic),
            Candidate::new("d", PlanTier::Basic),
        ];

        let merged = merge_candidates([nearby, by_city]);
        assert_eq!(ids(&merged), ["a", "b", "c", "d"]);
    }

    #[test]
    fn first_seen_fields_win() {
        let first = vec![Candidate::new("a", PlanTier::Left).with_priority_rank(1)];
        let second = vec![Candidate::new("a", PlanTier::Hero).with_priority_rank(9)];

        let merged = merge_candidates([first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].plan_type, PlanTier::Left);
        assert_eq!(merged[0].priority_rank, 1);
    }

    #[test]
    fn duplicates_within_one_list_are_removed() {
        let list = vec![
            Candidate::new("a", PlanTier::Basic),
            Candidate::new("a", PlanTier::Basic),
        ];
        assert_eq!(merge_candidates([list]).len(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let merged = merge_candidates([
            vec![
                Candidate::new("x", PlanTier::Basic),
                Candidate::new("y", PlanTier::Hero),
            ],
            vec![
                Candidate::new("y", PlanTier::Hero),
                Candidate::new("z", PlanTier::Right),
            ],
        ]);
        let again = merge_candidates([merged.clone(), merged.clone()]);
        assert_eq!(again, merged);
    }

    #[test]
    fn empty_sources_produce_empty_set() {
        let merged = merge_candidates(Vec::<Vec<Candidate>>::new());
        assert!(merged.is_empty());
        let merged = merge_candidates([Vec::new(), Vec::new()]);
        assert!(merged.is_empty());
    }
}
