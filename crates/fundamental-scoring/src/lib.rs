pub mod aggregate;
pub mod buckets;
pub mod confidence;
pub mod contributions;
pub mod lenses;
pub mod recommendation;
pub mod scorers;

pub use aggregate::compute_final_score;
pub use confidence::{compute_confidence, Confidence, ConfidenceGrade};
pub use contributions::{contributors, Contribution, Contributors};
pub use lenses::{builtin_lenses, find_lens, load_lenses_json, merge_lenses, DEFAULT_LENS};
pub use recommendation::{
    classify, mos_signal, Thresholds, Verdict, DEFAULT_BUY_THRESHOLD, DEFAULT_MOS_BAND,
    DEFAULT_WATCH_THRESHOLD,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use screener_core::{CategoryScorer, CategoryScores, LensPreset, MetricRecord};

/// Category scores and the lens-weighted final score for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub ticker: String,
    pub lens: String,
    pub scores: CategoryScores,
    /// `None` when no category produced a score
    pub final_score: Option<f64>,
    pub contributors: Contributors,
}

pub struct FundamentalScoringEngine {
    scorers: Vec<&'static dyn CategoryScorer>,
}

impl FundamentalScoringEngine {
    pub fn new() -> Self {
        Self {
            scorers: scorers::SCORERS.to_vec(),
        }
    }

    pub fn compute_category_scores(&self, metrics: &MetricRecord) -> CategoryScores {
        let mut scores = CategoryScores::default();
        for scorer in &self.scorers {
            let score = scorer.score(metrics);
            if score.is_none() {
                debug!(ticker = %metrics.ticker, category = %scorer.category(), "No usable signal");
            }
            scores.set(scorer.category(), score);
        }
        scores
    }

    pub fn score(&self, metrics: &MetricRecord, lens: &LensPreset) -> ScoreCard {
        let scores = self.compute_category_scores(metrics);
        let final_score = if scores.is_empty() {
            None
        } else {
            Some(compute_final_score(&scores, &lens.weights))
        };

        ScoreCard {
            ticker: metrics.ticker.clone(),
            lens: lens.name.clone(),
            contributors: contributors(&scores, &lens.weights, final_score),
            scores,
            final_score,
        }
    }
}

impl Default for FundamentalScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Score every category with the default scorer set
pub fn compute_category_scores(metrics: &MetricRecord) -> CategoryScores {
    FundamentalScoringEngine::new().compute_category_scores(metrics)
}
