use screener_core::{CategoryScores, LensWeights};

/// Lens-weighted mean of the category scores.
///
/// Only categories with both a finite score and a finite, non-negative weight
/// take part, and the result is divided by the weight actually used. A record
/// missing whole categories is therefore judged on what it has. Returns 0.0
/// when nothing can be used.
pub fn compute_final_score(scores: &CategoryScores, weights: &LensWeights) -> f64 {
    let mut weighted = 0.0;
    let mut used = 0.0;

    for (category, score) in scores.iter() {
        let Some(score) = score.filter(|s| s.is_finite()) else {
            continue;
        };
        let Some(weight) = weights.get(category).filter(|w| w.is_finite() && *w >= 0.0) else {
            continue;
        };
        weighted += score * weight;
        used += weight;
    }

    if used > 0.0 {
        weighted / used
    } else {
        0.0
    }
}
