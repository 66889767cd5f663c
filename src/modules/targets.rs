use crate::modules::geometry::Position;
use crate::modules::interface::Target;

/// Picks the candidate with the smallest range from `from`.
///
/// Ties keep the candidate that was enumerated first, so the result only
/// depends on the candidates and their order.
pub fn nearest(candidates: &[Target], from: Position) -> Option<&Target> {
    candidates
        .iter()
        .min_by_key(|target| from.range_to(target.position))
}

/// Orders candidates nearest first. The sort is stable: equal ranges keep their input order.
pub fn sort_nearest_first(candidates: &mut [Target], from: Position) {
    candidates.sort_by_key(|target| from.range_to(target.position));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::interface::TargetKind;

    fn site(id: u64, x: i32, y: i32) -> Target {
        Target {
            id,
            kind: TargetKind::ConstructionSite,
            position: Position::new(x, y),
        }
    }

    #[test]
    fn nearest_prefers_smallest_range() {
        let targets = [site(1, 5, 5), site(2, 1, 0), site(3, -3, 2)];
        let chosen = nearest(&targets, Position::origin()).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn nearest_breaks_ties_by_enumeration_order() {
        let targets = [site(7, 2, 0), site(4, 0, 2), site(9, -2, -2)];
        for _ in 0..3 {
            let chosen = nearest(&targets, Position::origin()).unwrap();
            assert_eq!(chosen.id, 7);
        }
    }

    #[test]
    fn nearest_of_nothing_is_none() {
        assert!(nearest(&[], Position::origin()).is_none());
    }

    #[test]
    fn sort_is_stable_for_equal_ranges() {
        let mut targets = vec![site(1, 4, 0), site(2, 0, 1), site(3, 1, 1), site(4, 0, 4)];
        sort_nearest_first(&mut targets, Position::origin());
        let ids: Vec<_> = targets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }
}
