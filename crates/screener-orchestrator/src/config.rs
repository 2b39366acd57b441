use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use fundamental_scoring::{DEFAULT_LENS, DEFAULT_MOS_BAND};
pub use valuation_projection::MAX_HORIZON_YEARS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub lens: String,                  // Conservative
    pub mos_band: f64,                 // 0.05
    pub target_cagr: f64,              // 0.12
    pub horizon_years: u32,            // 5
    pub lenses_file: Option<PathBuf>,  // JSON presets merged over the built-ins
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            lens: DEFAULT_LENS.to_string(),
            mos_band: DEFAULT_MOS_BAND,
            target_cagr: 0.12,
            horizon_years: 5,
            lenses_file: None,
        }
    }
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys take the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            lens: lookup("SCREENER_LENS").unwrap_or(defaults.lens),
            mos_band: match lookup("SCREENER_MOS_BAND") {
                Some(v) => v.trim().parse().context("SCREENER_MOS_BAND must be a number")?,
                None => defaults.mos_band,
            },
            target_cagr: match lookup("SCREENER_TARGET_CAGR") {
                Some(v) => v.trim().parse().context("SCREENER_TARGET_CAGR must be a number")?,
                None => defaults.target_cagr,
            },
            horizon_years: match lookup("SCREENER_HORIZON_YEARS") {
                Some(v) => v
                    .trim()
                    .parse()
                    .context("SCREENER_HORIZON_YEARS must be a whole number")?,
                None => defaults.horizon_years,
            },
            lenses_file: lookup("SCREENER_LENSES_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            bail!(
                "horizon must be between 1 and {} years, got {}",
                MAX_HORIZON_YEARS,
                self.horizon_years
            );
        }
        if !self.mos_band.is_finite() || self.mos_band < 0.0 {
            bail!("MOS band must be a non-negative number, got {}", self.mos_band);
        }
        if !self.target_cagr.is_finite() || self.target_cagr <= -1.0 {
            bail!("target CAGR must be above -100%, got {}", self.target_cagr);
        }
        Ok(())
    }
}
