pub mod cache;
pub mod config;
pub mod export;
pub mod import;
pub mod projection;
pub mod screener;

pub use cache::MarginOfSafetyCache;
pub use config::ScreenerConfig;
pub use export::export_results_csv;
pub use projection::{Assumptions, ProjectionService};
pub use screener::{ScreenedTicker, Screener, ScreenerResult};

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use fundamental_scoring::{builtin_lenses, find_lens, load_lenses_json, merge_lenses};
use screener_core::{LensPreset, MarginOfSafetyStore};

/// Composition root: one shared MOS store wired into both the projection
/// service and the screener.
pub struct ScreenerApp {
    pub config: ScreenerConfig,
    pub lenses: Vec<LensPreset>,
    pub store: Arc<dyn MarginOfSafetyStore>,
}

impl ScreenerApp {
    pub fn new(config: ScreenerConfig) -> Result<Self> {
        let lenses = match &config.lenses_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read lens file {}", path.display()))?;
                let custom = load_lenses_json(&json)
                    .with_context(|| format!("Invalid lens file {}", path.display()))?;
                merge_lenses(custom)
            }
            None => builtin_lenses(),
        };

        Ok(Self {
            config,
            lenses,
            store: Arc::new(MarginOfSafetyCache::new()),
        })
    }

    /// The named lens, or the configured one when `name` is `None`
    pub fn lens(&self, name: Option<&str>) -> Result<LensPreset> {
        let wanted = name.unwrap_or(self.config.lens.as_str());
        match find_lens(&self.lenses, wanted) {
            Some(lens) => Ok(lens.clone()),
            None => {
                warn!(lens = wanted, "Unknown lens");
                let known: Vec<&str> = self.lenses.iter().map(|l| l.name.as_str()).collect();
                anyhow::bail!("Unknown lens '{}'. Known lenses: {}", wanted, known.join(", "))
            }
        }
    }

    pub fn projection_service(&self) -> ProjectionService {
        ProjectionService::new(Arc::clone(&self.store))
    }

    pub fn screener(&self, lens: LensPreset) -> Screener {
        Screener::new(lens, Arc::clone(&self.store), self.config.mos_band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_app_resolves_lenses() {
        let app = ScreenerApp::new(ScreenerConfig::default()).unwrap();
        assert_eq!(app.lens(None).unwrap().name, "Conservative");
        assert_eq!(app.lens(Some("benjamin graham")).unwrap().name, "Benjamin Graham");
        assert!(app.lens(Some("Nobody")).is_err());
    }

    #[test]
    fn test_app_merges_lens_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Cash Cow", "weights": {{"valuation": 50, "quality": 50,
                "capital_allocation": 0, "growth": 0, "moat": 0, "risk": 0,
                "macro": 0, "narrative": 0, "dilution": 0}}}}]"#
        )
        .unwrap();

        let config = ScreenerConfig {
            lens: "cash cow".into(),
            lenses_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let app = ScreenerApp::new(config).unwrap();
        assert_eq!(app.lenses.len(), 10);
        assert_eq!(app.lens(None).unwrap().weights.quality, Some(50.0));
    }

    #[test]
    fn test_projection_feeds_screener() {
        use screener_core::MetricField;
        use screener_core::MetricRecord;

        let app = ScreenerApp::new(ScreenerConfig::default()).unwrap();
        let record = MetricRecord::new("KO")
            .with(MetricField::EpsTtm, 2.5)
            .with(MetricField::PriceCurrent, 40.0)
            .with(MetricField::Pe5yLow, 20.0)
            .with(MetricField::Pe5yHigh, 30.0)
            .with(MetricField::EpsCagr5yPct, 8.0);

        let assumptions = Assumptions::from_metrics(&record, Some(app.config.target_cagr), 5).unwrap();
        app.projection_service().project("KO", &assumptions.params);

        let screened = app.screener(app.lens(None).unwrap()).evaluate(&record);
        assert!(screened.verdict.margin_of_safety.is_some());
        assert_eq!(screened.verdict.margin_of_safety, app.store.get("KO"));
    }
}
