use screener_core::numeric::{cap10, numeric, points};
use screener_core::{Category, CategoryScorer, MetricRecord};

use super::quality::ROIC;
use crate::buckets::{weighted_mean, BucketTable};

const BUYBACK_YIELD: BucketTable = BucketTable::at_least(
    &[(5.0, 10.0), (3.0, 8.0), (1.0, 6.0), (0.0, 4.0), (-2.0, 2.0)],
    0.0,
);

/// Buybacks, balance-sheet coverage and returns on incremental capital.
///
/// Every input is null-guarded on its own: a company that reports no buyback
/// data is not scored as a zero-yield buyer.
pub struct CapitalAllocationScorer;

impl CapitalAllocationScorer {
    /// 5 points per decade of coverage: 1x -> 0, 10x -> 5, 100x -> 10
    pub(crate) fn interest_coverage(metrics: &MetricRecord) -> Option<f64> {
        let coverage = numeric(&metrics.interest_coverage_x)?;
        if coverage <= 0.0 {
            return Some(0.0);
        }
        Some(cap10(5.0 * coverage.log10()))
    }

    /// ΔEBIT / ΔInvested capital, in points, bucketed like ROIC.
    /// Shrinking or flat invested capital has no meaningful incremental return.
    pub(crate) fn roiic(metrics: &MetricRecord) -> Option<f64> {
        let ebit = numeric(&metrics.ebit_ttm)?;
        let ebit_prior = numeric(&metrics.ebit_prior)?;
        let capital = numeric(&metrics.invested_capital)?;
        let capital_prior = numeric(&metrics.invested_capital_prior)?;

        let delta_capital = capital - capital_prior;
        if delta_capital <= 0.0 {
            return None;
        }

        let roiic_pct = 100.0 * (ebit - ebit_prior) / delta_capital;
        Some(ROIC.score(roiic_pct))
    }
}

impl CategoryScorer for CapitalAllocationScorer {
    fn category(&self) -> Category {
        Category::CapitalAllocation
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (BUYBACK_YIELD.score_opt(points(&metrics.buyback_yield_pct)), 0.40),
            (Self::interest_coverage(metrics), 0.40),
            (Self::roiic(metrics), 0.20),
        ])
        .map(cap10)
    }
}
