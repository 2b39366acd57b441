use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use screener_core::numeric::{numeric, points};
use screener_core::{MarginOfSafetyStore, MetricRecord};
use valuation_projection::{build_paths, derive_band, PeBand, ProjectionParams, ProjectionPaths, Scenario};

/// Projection inputs derived from a metric record, with the band they used
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub params: ProjectionParams,
    pub band: PeBand,
}

impl Assumptions {
    /// Needs a trailing EPS and a price; everything else degrades to
    /// defaults (no growth, no band).
    pub fn from_metrics(metrics: &MetricRecord, target_cagr: Option<f64>, years: u32) -> Option<Self> {
        let eps0 = numeric(&metrics.eps_ttm)?;
        let price_today = numeric(&metrics.price_current)?;

        let pe_now = numeric(&metrics.pe_ttm)
            .filter(|pe| *pe > 0.0)
            .or_else(|| (eps0 > 0.0).then(|| price_today / eps0));
        let growth = points(&metrics.eps_cagr_5y_pct)
            .or_else(|| points(&metrics.revenue_cagr_5y_pct))
            .map(|pct| pct / 100.0)
            .unwrap_or(0.0);
        let band = derive_band(metrics);

        Some(Self {
            params: ProjectionParams {
                eps0,
                growth,
                years,
                price_today,
                pe_bear: band.bear.value,
                pe_mid: band.mid.value,
                pe_bull: band.bull.value,
                pe_trend: None,
                pe_custom_terminal: None,
                target_cagr,
                pe_now,
                band: band.bounds(),
            },
            band,
        })
    }
}

/// Runs projections and publishes the chosen scenario's margin of safety
/// to the shared store for the screener to pick up.
pub struct ProjectionService {
    store: Arc<dyn MarginOfSafetyStore>,
    mos_scenario: Scenario,
}

impl ProjectionService {
    pub fn new(store: Arc<dyn MarginOfSafetyStore>) -> Self {
        Self {
            store,
            mos_scenario: Scenario::Custom,
        }
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.mos_scenario = scenario;
        self
    }

    pub fn mos_scenario(&self) -> Scenario {
        self.mos_scenario
    }

    pub fn project(&self, ticker: &str, params: &ProjectionParams) -> ProjectionPaths {
        let paths = build_paths(params);
        if paths.is_empty() {
            debug!(ticker, "Projection is empty, clearing cached MOS");
            self.store.remove(ticker);
            return paths;
        }

        match paths.terminal(self.mos_scenario).and_then(|t| t.margin_of_safety) {
            Some(mos) => {
                info!(ticker, scenario = %self.mos_scenario, mos, "Publishing margin of safety");
                self.store.set(ticker, mos);
            }
            None => {
                debug!(ticker, scenario = %self.mos_scenario, "No margin of safety for scenario, clearing cached MOS");
                self.store.remove(ticker);
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarginOfSafetyCache;
    use approx::assert_relative_eq;
    use screener_core::MetricField;
    use valuation_projection::BandSource;

    fn record() -> MetricRecord {
        MetricRecord::new("KO")
            .with(MetricField::EpsTtm, 2.5)
            .with(MetricField::PriceCurrent, 60.0)
            .with(MetricField::PeTtm, 24.0)
            .with(MetricField::Pe5yLow, 18.0)
            .with(MetricField::Pe5yHigh, 30.0)
            .with(MetricField::EpsCagr5yPct, "6%")
    }

    #[test]
    fn test_assumptions_from_metrics() {
        let assumptions = Assumptions::from_metrics(&record(), Some(0.10), 5).unwrap();
        let p = &assumptions.params;
        assert_eq!(p.eps0, 2.5);
        assert_eq!(p.pe_now, Some(24.0));
        assert_relative_eq!(p.growth, 0.06);
        assert_eq!(p.pe_mid, Some(24.0));
        assert_eq!(assumptions.band.bear.source, BandSource::Auto);

        let no_price = MetricRecord::new("KO").with(MetricField::EpsTtm, 2.5);
        assert!(Assumptions::from_metrics(&no_price, None, 5).is_none());
    }

    #[test]
    fn test_pe_now_falls_back_to_price_over_eps() {
        let record = MetricRecord::new("KO")
            .with(MetricField::EpsTtm, 2.5)
            .with(MetricField::PriceCurrent, 60.0);
        let assumptions = Assumptions::from_metrics(&record, None, 5).unwrap();
        assert_eq!(assumptions.params.pe_now, Some(24.0));
        assert_eq!(assumptions.params.growth, 0.0);
    }

    #[test]
    fn test_project_publishes_custom_mos() {
        let cache = Arc::new(MarginOfSafetyCache::new());
        let service = ProjectionService::new(cache.clone());
        let assumptions = Assumptions::from_metrics(&record(), Some(0.10), 5).unwrap();

        let paths = service.project("ko", &assumptions.params);
        let expected = paths.terminal(Scenario::Custom).unwrap().margin_of_safety.unwrap();
        assert_eq!(cache.get("KO"), Some(expected));
    }

    #[test]
    fn test_project_without_target_clears_stale_mos() {
        let cache = Arc::new(MarginOfSafetyCache::new());
        cache.set("KO", 0.4);
        let service = ProjectionService::new(cache.clone()).with_scenario(Scenario::Constant);
        let assumptions = Assumptions::from_metrics(&record(), None, 5).unwrap();

        assert!(!service.project("KO", &assumptions.params).is_empty());
        assert_eq!(cache.get("KO"), None);
    }

    #[test]
    fn test_recompute_with_losses_clears_previous_mos() {
        let cache = Arc::new(MarginOfSafetyCache::new());
        let service = ProjectionService::new(cache.clone());
        let assumptions = Assumptions::from_metrics(&record(), Some(0.10), 5).unwrap();
        service.project("KO", &assumptions.params);
        assert!(cache.get("KO").is_some());

        let losing = record().with(MetricField::EpsTtm, -1.0);
        let assumptions = Assumptions::from_metrics(&losing, Some(0.10), 5).unwrap();
        let paths = service.project("KO", &assumptions.params);
        assert!(paths
            .terminal(Scenario::Custom)
            .map_or(true, |t| t.margin_of_safety.is_none()));
        assert_eq!(cache.get("KO"), None);
    }
}
