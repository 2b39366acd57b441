//! Which categories pulled a final score up and which dragged it down.

use serde::{Deserialize, Serialize};

use screener_core::numeric::round_to;
use screener_core::{Category, CategoryScores, LensWeights};

/// At most this many contributors are reported on each side
pub const MAX_CONTRIBUTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub category: Category,
    pub score: f64,
    pub weight: f64,
    /// `(score - final) * weight / total weight` over the scored categories
    pub contribution: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributors {
    /// Largest first
    pub positive: Vec<Contribution>,
    /// Most negative first
    pub negative: Vec<Contribution>,
}

impl Contributors {
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

/// Split the scored categories into the top positive and top negative
/// contributors relative to `final_score`. A zero contribution counts as
/// positive.
pub fn contributors(
    scores: &CategoryScores,
    weights: &LensWeights,
    final_score: Option<f64>,
) -> Contributors {
    let Some(final_score) = final_score.filter(|s| s.is_finite()) else {
        return Contributors::default();
    };

    let used: Vec<(Category, f64, f64)> = scores
        .iter()
        .filter_map(|(category, score)| {
            let score = score.filter(|s| s.is_finite())?;
            let weight = weights.get(category).filter(|w| w.is_finite() && *w > 0.0)?;
            Some((category, score, weight))
        })
        .collect();

    let total: f64 = used.iter().map(|(_, _, w)| w).sum();
    if total <= 0.0 {
        return Contributors::default();
    }

    let mut all: Vec<Contribution> = used
        .into_iter()
        .map(|(category, score, weight)| Contribution {
            category,
            score: round_to(score, 3),
            weight,
            contribution: round_to((score - final_score) * weight / total, 4),
        })
        .collect();

    all.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let positive: Vec<Contribution> = all
        .iter()
        .filter(|c| c.contribution >= 0.0)
        .take(MAX_CONTRIBUTORS)
        .copied()
        .collect();
    let negative: Vec<Contribution> = all
        .iter()
        .rev()
        .filter(|c| c.contribution < 0.0)
        .take(MAX_CONTRIBUTORS)
        .copied()
        .collect();

    Contributors { positive, negative }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_final_score;
    use approx::assert_relative_eq;

    fn even_weights() -> LensWeights {
        let mut w = LensWeights::default();
        for category in Category::ALL {
            w.set(category, Some(10.0));
        }
        w
    }

    #[test]
    fn test_contribution_formula() {
        let mut scores = CategoryScores::default();
        scores.valuation = Some(9.0);
        scores.risk = Some(3.0);
        let mut weights = LensWeights::default();
        weights.valuation = Some(30.0);
        weights.risk = Some(10.0);
        weights.growth = Some(60.0);

        let final_score = compute_final_score(&scores, &weights);
        assert_relative_eq!(final_score, 7.5);

        let c = contributors(&scores, &weights, Some(final_score));
        assert_eq!(c.positive.len(), 1);
        assert_eq!(c.positive[0].category, Category::Valuation);
        assert_relative_eq!(c.positive[0].contribution, 1.125);
        assert_eq!(c.negative.len(), 1);
        assert_eq!(c.negative[0].category, Category::Risk);
        assert_relative_eq!(c.negative[0].contribution, -1.125);
    }

    #[test]
    fn test_ordering_and_cap() {
        let mut scores = CategoryScores::default();
        for (category, score) in Category::ALL.iter().zip([9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]) {
            scores.set(*category, Some(score));
        }
        let weights = even_weights();
        let final_score = compute_final_score(&scores, &weights);
        assert_relative_eq!(final_score, 5.0);

        let c = contributors(&scores, &weights, Some(final_score));
        let pos: Vec<Category> = c.positive.iter().map(|c| c.category).collect();
        let neg: Vec<Category> = c.negative.iter().map(|c| c.category).collect();
        assert_eq!(pos, vec![Category::Valuation, Category::Quality, Category::CapitalAllocation]);
        assert_eq!(neg, vec![Category::Dilution, Category::Narrative, Category::Macro]);
    }

    #[test]
    fn test_no_final_score_or_weight() {
        let mut scores = CategoryScores::default();
        scores.moat = Some(7.0);
        assert!(contributors(&scores, &even_weights(), None).is_empty());
        assert!(contributors(&scores, &LensWeights::default(), Some(7.0)).is_empty());
    }

    #[test]
    fn test_zero_weight_category_is_not_listed() {
        let mut scores = CategoryScores::default();
        scores.moat = Some(9.0);
        scores.macro_ = Some(1.0);
        let mut weights = LensWeights::default();
        weights.moat = Some(50.0);
        weights.macro_ = Some(0.0);

        let c = contributors(&scores, &weights, Some(9.0));
        assert_eq!(c.positive.len(), 1);
        assert_eq!(c.positive[0].category, Category::Moat);
        assert!(c.negative.is_empty());
    }
}
