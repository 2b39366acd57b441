use screener_core::numeric::{cap10, numeric};
use screener_core::{Category, CategoryScorer, MetricRecord};

/// Analyst-supplied macro fit rating, passed through
pub struct MacroScorer;

/// Analyst-supplied narrative rating, passed through
pub struct NarrativeScorer;

impl CategoryScorer for MacroScorer {
    fn category(&self) -> Category {
        Category::Macro
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        numeric(&metrics.macrofit_score_0_10).map(cap10)
    }
}

impl CategoryScorer for NarrativeScorer {
    fn category(&self) -> Category {
        Category::Narrative
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        numeric(&metrics.narrative_score_0_10).map(cap10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::MetricField;

    #[test]
    fn test_pass_through_ratings() {
        let record = MetricRecord::new("AAA")
            .with(MetricField::MacrofitScore, "6.5")
            .with(MetricField::NarrativeScore, -2.0);
        assert_eq!(MacroScorer.score(&record), Some(6.5));
        assert_eq!(NarrativeScorer.score(&record), Some(0.0));
        assert_eq!(MacroScorer.score(&MetricRecord::new("AAA")), None);
    }
}
