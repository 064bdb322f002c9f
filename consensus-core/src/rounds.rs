use crate::category::{ActivityCounts, Category};

/// One planned round in a lobby's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPlan {
    /// 1-based, sequential, gapless within the lobby
    pub round_number: u32,
    pub category: Category,
}

/// Expands the requested activity counts into the ordered round sequence.
///
/// One entry per unit of count, iterated in [Category] declaration order.
/// Deterministic and side-effect free, so it can be re-derived at any time.
pub fn sequence_rounds(counts: &ActivityCounts) -> Vec<RoundPlan> {
    let mut rounds = Vec::with_capacity(counts.total() as usize);

    for (category, count) in counts.iter() {
        for _ in 0..count {
            rounds.push(RoundPlan {
                round_number: rounds.len() as u32 + 1,
                category,
            });
        }
    }

    rounds
}

pub fn total_rounds(counts: &ActivityCounts) -> u32 {
    counts.total()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_numbers_are_gapless() {
        let counts: ActivityCounts = [
            (Category::Food, 3),
            (Category::Nature, 2),
            (Category::Social, 1),
        ]
        .into_iter()
        .collect();

        let rounds = sequence_rounds(&counts);

        assert_eq!(rounds.len() as u32, total_rounds(&counts));

        let numbers: Vec<_> = rounds.iter().map(|r| r.round_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6], "1-based with no gaps");
    }

    #[test]
    fn test_category_expansion_order() {
        let counts: ActivityCounts = [
            (Category::Social, 1),
            (Category::Food, 1),
            (Category::Recreation, 2),
        ]
        .into_iter()
        .collect();

        let categories: Vec<_> = sequence_rounds(&counts)
            .iter()
            .map(|r| r.category)
            .collect();

        assert_eq!(
            categories,
            vec![
                Category::Food,
                Category::Recreation,
                Category::Recreation,
                Category::Social,
            ],
            "categories expand in declaration order"
        );
    }

    #[test]
    fn test_determinism() {
        let counts: ActivityCounts =
            [(Category::Arts, 2), (Category::Food, 1)].into_iter().collect();

        assert_eq!(
            sequence_rounds(&counts),
            sequence_rounds(&counts),
            "sequencing is stable across calls"
        );
    }

    #[test]
    fn test_empty_counts() {
        let counts = ActivityCounts::new();

        assert!(sequence_rounds(&counts).is_empty());
        assert_eq!(total_rounds(&counts), 0);
    }
}
