use screener_core::numeric::{cap10, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use crate::buckets::{weighted_mean, BucketTable};

const EPS_CAGR: BucketTable = BucketTable::at_least(
    &[(20.0, 10.0), (15.0, 8.0), (10.0, 6.0), (5.0, 4.0), (0.0, 2.0)],
    0.0,
);
const REVENUE_CAGR: BucketTable = BucketTable::at_least(
    &[(15.0, 10.0), (10.0, 8.0), (7.0, 6.0), (4.0, 4.0), (0.0, 2.0)],
    0.0,
);

/// Neutral acceleration score, and the damping applied to the 3y-vs-5y delta
const ACCELERATION_CENTER: f64 = 7.0;
const ACCELERATION_DAMPING: f64 = 0.3;

pub struct GrowthScorer;

impl GrowthScorer {
    /// Recent (3y) growth against the longer (5y) trend. Revenue is preferred
    /// because it is steadier; EPS is used when revenue history is missing.
    pub(crate) fn acceleration(metrics: &MetricRecord) -> Option<f64> {
        let revenue = points(&metrics.revenue_cagr_3y_pct)
            .zip(points(&metrics.revenue_cagr_5y_pct))
            .map(|(recent, long)| recent - long);
        let eps = || {
            points(&metrics.eps_cagr_3y_pct)
                .zip(points(&metrics.eps_cagr_5y_pct))
                .map(|(recent, long)| recent - long)
        };

        let delta = revenue.or_else(eps)?;
        Some(cap10(ACCELERATION_CENTER + ACCELERATION_DAMPING * delta))
    }
}

/// Recurring revenue share, 10% per point of score. Also feeds the moat.
pub(crate) fn recurring_revenue(metrics: &MetricRecord) -> Option<f64> {
    points(&metrics.recurring_revenue_pct).map(|pct| cap10(pct / 10.0))
}

impl CategoryScorer for GrowthScorer {
    fn category(&self) -> Category {
        Category::Growth
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (EPS_CAGR.score_opt(points(&metrics.eps_cagr_5y_pct)), 0.40),
            (REVENUE_CAGR.score_opt(points(&metrics.revenue_cagr_5y_pct)), 0.30),
            (Self::acceleration(metrics), 0.15),
            (recurring_revenue(metrics), 0.15),
        ])
        .map(cap10)
    }
}
