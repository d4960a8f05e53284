//! Target ownership ratios: protected anchor floor plus a proportional remainder

use crate::types::{ContributionScores, ContributionUnits, ContributorId, TargetRatios};
use rust_decimal::Decimal;

/// Turn contribution scores into target ownership ratios.
///
/// Pure function: identical inputs yield identical ratios.
///
/// - `total_contribution == 0`: the anchor targets 1, everyone else 0.
/// - otherwise: anchor = `floor + (anchor_score / total) × (1 − floor)`,
///   others = `(score / total) × (1 − floor)`.
///
/// The anchor always receives an entry, even if it is missing from `scores`.
pub fn target_ratios(
    scores: &ContributionScores,
    total_contribution: ContributionUnits,
    anchor_id: &ContributorId,
    anchor_floor_ratio: Decimal,
) -> TargetRatios {
    let mut ratios = TargetRatios::new();

    if total_contribution == 0 {
        for id in scores.keys() {
            ratios.insert(id.clone(), Decimal::ZERO);
        }
        ratios.insert(anchor_id.clone(), Decimal::ONE);
        return ratios;
    }

    let total = Decimal::from(total_contribution);
    let pool = Decimal::ONE - anchor_floor_ratio;

    for (id, score) in scores {
        let proportional = Decimal::from(*score) / total * pool;
        let ratio = if id == anchor_id {
            anchor_floor_ratio + proportional
        } else {
            proportional
        };
        ratios.insert(id.clone(), ratio);
    }

    ratios
        .entry(anchor_id.clone())
        .or_insert(anchor_floor_ratio);

    ratios
}

/// Σ ratios, used to check the sum-to-one tolerance
pub fn ratio_sum(ratios: &TargetRatios) -> Decimal {
    ratios.values().copied().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(entries: &[(&str, u64)]) -> ContributionScores {
        entries
            .iter()
            .map(|(id, units)| (ContributorId::new(*id), *units))
            .collect()
    }

    fn tolerance() -> Decimal {
        Decimal::new(1, 20)
    }

    #[test]
    fn test_anchor_floor_plus_remainder() {
        let anchor = ContributorId::new("anchor");
        let s = scores(&[("anchor", 0), ("A", 9)]);
        let ratios = target_ratios(&s, 9, &anchor, Decimal::new(1, 1));

        assert_eq!(ratios[&anchor], Decimal::new(1, 1));
        assert_eq!(ratios[&ContributorId::new("A")], Decimal::new(9, 1));
    }

    #[test]
    fn test_anchor_in_pool_gets_floor_and_share() {
        let anchor = ContributorId::new("anchor");
        let s = scores(&[("anchor", 12), ("A", 12)]);
        let ratios = target_ratios(&s, 24, &anchor, Decimal::new(2, 1));

        // 0.2 + 0.5 × 0.8
        assert_eq!(ratios[&anchor], Decimal::new(6, 1));
        assert_eq!(ratios[&ContributorId::new("A")], Decimal::new(4, 1));
    }

    #[test]
    fn test_zero_contribution_gives_anchor_everything() {
        let anchor = ContributorId::new("anchor");
        let s = scores(&[("anchor", 0), ("A", 0), ("B", 0)]);
        let ratios = target_ratios(&s, 0, &anchor, Decimal::new(1, 1));

        assert_eq!(ratios[&anchor], Decimal::ONE);
        assert_eq!(ratios[&ContributorId::new("A")], Decimal::ZERO);
        assert_eq!(ratios[&ContributorId::new("B")], Decimal::ZERO);
    }

    #[test]
    fn test_ratios_sum_to_one() {
        let anchor = ContributorId::new("anchor");
        let s = scores(&[("anchor", 0), ("A", 7), ("B", 11), ("C", 3)]);
        let ratios = target_ratios(&s, 21, &anchor, Decimal::new(15, 2));

        let diff = (ratio_sum(&ratios) - Decimal::ONE).abs();
        assert!(diff <= tolerance(), "sum drifted by {diff}");
        assert!(ratios[&anchor] >= Decimal::new(15, 2));
    }

    #[test]
    fn test_deterministic() {
        let anchor = ContributorId::new("anchor");
        let s = scores(&[("anchor", 4), ("A", 7), ("B", 11)]);
        let first = target_ratios(&s, 22, &anchor, Decimal::new(1, 1));
        let second = target_ratios(&s, 22, &anchor, Decimal::new(1, 1));
        assert_eq!(first, second);
    }
}
