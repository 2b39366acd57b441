use crate::{Category, MetricRecord};

/// One of the nine category scorers.
///
/// Implementations are pure: the same record always yields the same score,
/// and a record with none of the scorer's inputs yields `None`.
pub trait CategoryScorer: Send + Sync {
    fn category(&self) -> Category;

    /// Score in [0, 10], or `None` when no sub-signal could be computed
    fn score(&self, metrics: &MetricRecord) -> Option<f64>;
}

/// Latest margin of safety per ticker, written by the projection flow and
/// read by the screener.
pub trait MarginOfSafetyStore: Send + Sync {
    fn set(&self, ticker: &str, mos: f64);
    fn get(&self, ticker: &str) -> Option<f64>;
    /// Forget a ticker whose latest projection produced no margin of safety
    fn remove(&self, ticker: &str);
    fn clear(&self);
}
