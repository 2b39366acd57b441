use screener_core::numeric::{cap10, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use crate::buckets::{weighted_mean, BucketTable};

/// Positive change means the share count shrank over five years
const SHARECOUNT_CHANGE: BucketTable = BucketTable::at_least(
    &[(5.0, 10.0), (2.0, 8.0), (0.0, 6.0), (-2.0, 4.0), (-5.0, 2.0)],
    0.0,
);
const SBC_TO_SALES: BucketTable = BucketTable::at_most(
    &[(1.0, 10.0), (2.0, 8.0), (4.0, 6.0), (6.0, 4.0), (10.0, 2.0)],
    0.0,
);

pub struct DilutionScorer;

impl CategoryScorer for DilutionScorer {
    fn category(&self) -> Category {
        Category::Dilution
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (SHARECOUNT_CHANGE.score_opt(points(&metrics.sharecount_change_5y_pct)), 0.60),
            (SBC_TO_SALES.score_opt(points(&metrics.sbc_to_sales_pct)), 0.40),
        ])
        .map(cap10)
    }
}
