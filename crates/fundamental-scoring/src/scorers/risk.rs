use screener_core::numeric::{cap10, numeric, points, text};
use screener_core::{Category, CategoryScorer, MetricRecord};

use crate::buckets::{weighted_mean, BucketTable};

const NET_CASH: BucketTable = BucketTable::at_least(
    &[(20.0, 10.0), (10.0, 8.0), (0.0, 6.0), (-10.0, 4.0), (-25.0, 2.0)],
    0.0,
);
const MAX_DRAWDOWN: BucketTable = BucketTable::at_most(
    &[(15.0, 10.0), (25.0, 8.0), (35.0, 6.0), (50.0, 4.0), (65.0, 2.0)],
    0.0,
);

/// Leverage at which the net-debt signal reaches zero
const NET_DEBT_ZERO_AT: f64 = 3.0;

/// Higher is safer throughout.
pub struct RiskScorer;

impl RiskScorer {
    pub(crate) fn net_debt(metrics: &MetricRecord) -> Option<f64> {
        let leverage = numeric(&metrics.netdebt_to_ebitda)?;
        if leverage <= 0.0 {
            return Some(10.0);
        }
        Some(cap10(10.0 * (1.0 - leverage / NET_DEBT_ZERO_AT)))
    }

    /// Beta 0.5 -> 10, 1.0 -> 7.5, 2.5 -> 0
    pub(crate) fn beta(metrics: &MetricRecord) -> Option<f64> {
        numeric(&metrics.beta_5y).map(|beta| cap10(12.5 - 5.0 * beta))
    }

    pub(crate) fn drawdown(metrics: &MetricRecord) -> Option<f64> {
        points(&metrics.maxdrawdown_5y_pct).map(|dd| MAX_DRAWDOWN.score(dd.abs()))
    }

    pub(crate) fn cyclicality(metrics: &MetricRecord) -> Option<f64> {
        text(&metrics.sector_cyc_tag).map(|tag| cyclicality_score(&tag))
    }
}

/// Sector cyclicality tag lookup; unrecognised tags are treated as average
pub fn cyclicality_score(tag: &str) -> f64 {
    match tag.trim().to_ascii_lowercase().as_str() {
        "defensive" => 8.0,
        "secular" => 7.0,
        "growth" => 6.0,
        "cyclical" => 4.0,
        "deep-cyclical" => 3.0,
        _ => 6.0,
    }
}

impl CategoryScorer for RiskScorer {
    fn category(&self) -> Category {
        Category::Risk
    }

    fn score(&self, metrics: &MetricRecord) -> Option<f64> {
        weighted_mean(&[
            (numeric(&metrics.risk_score_0_10).map(cap10), 0.35),
            (Self::net_debt(metrics), 0.20),
            (NET_CASH.score_opt(points(&metrics.netcash_to_mktcap_pct)), 0.10),
            (Self::beta(metrics), 0.15),
            (Self::drawdown(metrics), 0.10),
            (Self::cyclicality(metrics), 0.10),
        ])
        .map(cap10)
    }
}
