use screener_core::numeric::{cap10, flag, numeric, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use super::growth::recurring_revenue;
use crate::buckets::weighted_mean;

/// Insider ownership above this share earns no extra credit
const INSIDER_CAP_PCT: f64 = 5.0;
const INSIDER_MAX_POINTS: f64 = 5.0;
const FOUNDER_BONUS: f64 = 2.0;

pub struct MoatScorer;

impl MoatScorer {
    /// Skin in the game: insider stake scaled onto 0-5, plus a founder bonus.
    /// Without an insider stake there is nothing to score.
    pub(crate) fn ownership(metrics: &MetricRecord) -> Option<f64> {
        let insider = points(&metrics.insider_own_pct)?;
        let stake = insider.clamp(0.0, INSIDER_CAP_PCT) / INSIDER_CAP_PCT * INSIDER_MAX_POINTS;
        let bonus = if flag(&metrics.founder_led_bool).unwrap_or(false) {
            FOUNDER_BONUS
        } else {
            0.0
        };
        Some(cap10(stake + bonus))
    }
}

impl CategoryScorer for MoatScorer {
    fn category(&self) -> Category {
        Category::Moat
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (numeric(&metrics.moat_score_0_10).map(cap10), 0.55),
            (recurring_revenue(metrics), 0.30),
            (Self::ownership(metrics), 0.15),
        ])
        .map(cap10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use screener_core::MetricField;

    #[test]
    fn test_ownership_scaling() {
        let small = MetricRecord::new("AAA").with(MetricField::InsiderOwnPct, 2.0);
        assert_relative_eq!(MoatScorer::ownership(&small).unwrap(), 2.0);

        let founder = small.with(MetricField::FounderLed, true);
        assert_relative_eq!(MoatScorer::ownership(&founder).unwrap(), 4.0);

        let whale = MetricRecord::new("AAA")
            .with(MetricField::InsiderOwnPct, 40.0)
            .with(MetricField::FounderLed, "yes");
        assert_relative_eq!(MoatScorer::ownership(&whale).unwrap(), 7.0);
    }

    #[test]
    fn test_founder_flag_alone_is_not_an_ownership_signal() {
        let record = MetricRecord::new("AAA").with(MetricField::FounderLed, true);
        assert_eq!(MoatScorer::ownership(&record), None);
        assert_eq!(MoatScorer.score(&record), None);
    }

    #[test]
    fn test_base_rating_passes_through() {
        let record = MetricRecord::new("AAA").with(MetricField::MoatScore, 8.0);
        assert_relative_eq!(MoatScorer.score(&record).unwrap(), 8.0);

        let out_of_range = MetricRecord::new("AAA").with(MetricField::MoatScore, 14.0);
        assert_relative_eq!(MoatScorer.score(&out_of_range).unwrap(), 10.0);
    }
}
