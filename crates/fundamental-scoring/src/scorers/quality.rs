use screener_core::numeric::{cap10, numeric, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use crate::buckets::{mean_present, weighted_mean, BucketTable};

/// Shared with the ROIIC signal in capital allocation
pub(crate) const ROIC: BucketTable = BucketTable::at_least(
    &[(25.0, 10.0), (20.0, 9.0), (15.0, 7.0), (10.0, 5.0), (5.0, 3.0)],
    1.0,
);
const FCF_MARGIN: BucketTable = BucketTable::at_least(
    &[(25.0, 10.0), (20.0, 9.0), (15.0, 7.0), (10.0, 5.0), (5.0, 3.0), (0.0, 1.0)],
    0.0,
);
const CASH_CONVERSION: BucketTable = BucketTable::at_least(
    &[(1.2, 10.0), (1.0, 8.0), (0.8, 6.0), (0.6, 4.0), (0.4, 2.0)],
    0.0,
);

/// Accrual ratios at or beyond this magnitude score zero
const ACCRUALS_BAND: f64 = 0.10;

pub struct QualityScorer;

impl QualityScorer {
    /// Mean of CFO/NI and FCF/EBIT, whichever are present
    pub(crate) fn cash_conversion(metrics: &MetricRecord) -> Option<f64> {
        let ratio = mean_present(&[numeric(&metrics.cfo_to_ni), numeric(&metrics.fcf_to_ebit)])?;
        Some(CASH_CONVERSION.score(ratio))
    }

    pub(crate) fn accruals(metrics: &MetricRecord) -> Option<f64> {
        let ratio = numeric(&metrics.accruals_ratio)?;
        Some(cap10(10.0 * (1.0 - ratio.abs() / ACCRUALS_BAND)))
    }

    /// One point lost per point of five-year margin standard deviation
    pub(crate) fn margin_stability(metrics: &MetricRecord) -> Option<f64> {
        let stdev = points(&metrics.margin_stdev_5y_pct)?;
        Some(cap10(10.0 - stdev.abs()))
    }
}

impl CategoryScorer for QualityScorer {
    fn category(&self) -> Category {
        Category::Quality
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (ROIC.score_opt(points(&metrics.roic_pct)), 0.35),
            (FCF_MARGIN.score_opt(points(&metrics.fcf_margin_pct)), 0.25),
            (Self::cash_conversion(metrics), 0.20),
            (Self::accruals(metrics), 0.10),
            (Self::margin_stability(metrics), 0.10),
        ])
        .map(cap10)
    }
}
