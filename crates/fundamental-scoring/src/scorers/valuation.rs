use screener_core::numeric::{cap10, numeric, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use crate::buckets::{weighted_mean, BucketTable};

const PE_FWD: BucketTable = BucketTable::at_most(
    &[(10.0, 10.0), (15.0, 9.0), (20.0, 7.0), (25.0, 5.0), (35.0, 3.0)],
    1.0,
);
const PEG: BucketTable = BucketTable::at_most(&[(1.0, 9.0), (1.5, 7.0), (2.0, 5.0), (3.0, 3.0)], 1.0);
const EV_EBITDA: BucketTable =
    BucketTable::at_most(&[(7.0, 10.0), (10.0, 8.0), (14.0, 6.0), (20.0, 4.0)], 2.0);
const FCF_YIELD: BucketTable =
    BucketTable::at_least(&[(8.0, 10.0), (5.0, 8.0), (3.0, 6.0), (1.0, 3.0)], 1.0);

/// Cheapness: forward P/E, PEG, EV/EBITDA, FCF yield and where today's P/E
/// sits inside its own five-year range.
pub struct ValuationScorer;

impl ValuationScorer {
    /// Multiples at or below zero mean losses or negative EBITDA and score 0
    fn multiple(table: &BucketTable, value: Option<f64>) -> Option<f64> {
        value.map(|v| if v <= 0.0 { 0.0 } else { table.score(v) })
    }

    /// 10 at the five-year low, 0 at the five-year high
    pub(crate) fn pe_percentile(metrics: &MetricRecord) -> Option<f64> {
        let pe = numeric(&metrics.pe_ttm)?;
        let low = numeric(&metrics.pe_5y_low)?;
        let high = numeric(&metrics.pe_5y_high)?;

        if low <= 0.0 || high <= low || pe <= 0.0 {
            return None;
        }

        let position = (pe - low) / (high - low);
        Some(cap10(10.0 * (1.0 - position)))
    }
}

impl CategoryScorer for ValuationScorer {
    fn category(&self) -> Category {
        Category::Valuation
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (Self::multiple(&PE_FWD, numeric(&metrics.pe_fwd)), 0.35),
            (Self::multiple(&PEG, numeric(&metrics.peg_5y)), 0.15),
            (Self::multiple(&EV_EBITDA, numeric(&metrics.ev_ebitda)), 0.20),
            (FCF_YIELD.score_opt(points(&metrics.fcf_yield_pct)), 0.15),
            (Self::pe_percentile(metrics), 0.15),
        ])
        .map(cap10)
    }
}
