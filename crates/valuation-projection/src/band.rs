use serde::{Deserialize, Serialize};
use tracing::debug;

use screener_core::numeric::{numeric, round_to};
use screener_core::MetricRecord;

/// Historical 5y P/E lows above this are treated as bad data
pub const MAX_PE_LOW: f64 = 200.0;
/// Historical 5y P/E highs above this are treated as bad data
pub const MAX_PE_HIGH: f64 = 400.0;

pub const BEAR_ESTIMATE_FACTOR: f64 = 0.7;
pub const BULL_ESTIMATE_FACTOR: f64 = 1.3;

/// Output of [`clean_band`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanBand {
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub ttm: Option<f64>,
}

/// Sanitize a historical P/E range.
///
/// A low outside (0, 200], a high outside (0, 400] or an inverted pair
/// resets *both* bounds rather than keeping half a band. `ttm` is only
/// filtered for finiteness.
pub fn clean_band(low: Option<f64>, high: Option<f64>, ttm: Option<f64>) -> CleanBand {
    let low = low.filter(|v| v.is_finite());
    let high = high.filter(|v| v.is_finite());
    let ttm = ttm.filter(|v| v.is_finite());

    let bad_low = low.is_some_and(|l| l <= 0.0 || l > MAX_PE_LOW);
    let bad_high = high.is_some_and(|h| h <= 0.0 || h > MAX_PE_HIGH);
    let inverted = matches!((low, high), (Some(l), Some(h)) if l > h);

    if bad_low || bad_high || inverted {
        debug!(?low, ?high, "Discarding invalid P/E band");
        return CleanBand { low: None, high: None, ttm };
    }

    CleanBand { low, high, ttm }
}

pub fn band_mid(low: Option<f64>, high: Option<f64>) -> Option<f64> {
    match (low, high) {
        (Some(l), Some(h)) => Some((l + h) / 2.0),
        _ => None,
    }
}

/// Where a band bound came from. Callers should surface it: an estimated
/// bound is a weaker anchor than a historical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandSource {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "auto:estimated")]
    Estimated,
    #[serde(rename = "manual")]
    Manual,
}

impl BandSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandSource::Auto => "auto",
            BandSource::Estimated => "auto:estimated",
            BandSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for BandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandBound {
    pub value: Option<f64>,
    pub source: BandSource,
}

impl BandBound {
    pub fn auto(value: f64) -> Self {
        Self { value: Some(value), source: BandSource::Auto }
    }

    pub fn estimated(value: f64) -> Self {
        Self { value: Some(value), source: BandSource::Estimated }
    }

    pub fn manual(value: Option<f64>) -> Self {
        Self { value, source: BandSource::Manual }
    }
}

/// The bear and bull edges that the trend scenario is clamped between
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandEdges {
    pub bear: Option<f64>,
    pub bull: Option<f64>,
}

impl BandEdges {
    /// Each edge clamps only when it is known
    pub fn clamp(&self, pe: f64) -> f64 {
        let mut pe = pe;
        if let Some(bear) = self.bear {
            pe = pe.max(bear);
        }
        if let Some(bull) = self.bull {
            pe = pe.min(bull);
        }
        pe
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeBand {
    pub bear: BandBound,
    pub mid: BandBound,
    pub bull: BandBound,
}

impl PeBand {
    /// User-entered values replace the derived bounds and are tagged manual.
    /// The mid is recomputed when it was derived and is not overridden.
    pub fn with_overrides(self, bear: Option<f64>, mid: Option<f64>, bull: Option<f64>) -> Self {
        let bear = bear
            .filter(|v| v.is_finite())
            .map_or(self.bear, |v| BandBound::manual(Some(v)));
        let bull = bull
            .filter(|v| v.is_finite())
            .map_or(self.bull, |v| BandBound::manual(Some(v)));
        let mid = match mid.filter(|v| v.is_finite()) {
            Some(v) => BandBound::manual(Some(v)),
            None if self.mid.source == BandSource::Manual && self.mid.value.is_some() => self.mid,
            None => match band_mid(bear.value, bull.value) {
                Some(m) => BandBound::auto(m),
                None => BandBound::manual(None),
            },
        };
        Self { bear, mid, bull }
    }

    /// True when either edge came from the trailing P/E fallback
    pub fn is_estimated(&self) -> bool {
        self.bear.source == BandSource::Estimated || self.bull.source == BandSource::Estimated
    }

    /// One tag for the whole band: estimated if either edge is, auto only
    /// when both edges are historical, otherwise manual
    pub fn source(&self) -> BandSource {
        if self.is_estimated() {
            BandSource::Estimated
        } else if self.bear.source == BandSource::Auto && self.bull.source == BandSource::Auto {
            BandSource::Auto
        } else {
            BandSource::Manual
        }
    }

    pub fn bounds(&self) -> BandEdges {
        BandEdges {
            bear: self.bear.value,
            bull: self.bull.value,
        }
    }
}

/// Bear/mid/bull P/E from the historical five-year range, falling back to
/// the trailing P/E scaled by 0.7 and 1.3 for a missing edge.
pub fn derive_band(metrics: &MetricRecord) -> PeBand {
    let clean = clean_band(
        numeric(&metrics.pe_5y_low),
        numeric(&metrics.pe_5y_high),
        numeric(&metrics.pe_ttm),
    );
    let ttm = clean.ttm.filter(|t| *t > 0.0);

    let bear = match (clean.low, ttm) {
        (Some(low), _) => BandBound::auto(low),
        (None, Some(ttm)) => {
            let estimate = round_to(ttm * BEAR_ESTIMATE_FACTOR, 1);
            if clean.high.is_some_and(|high| estimate > high) {
                debug!(ticker = %metrics.ticker, estimate, "Estimated bear P/E crosses historical high");
                BandBound::manual(None)
            } else {
                BandBound::estimated(estimate)
            }
        }
        (None, None) => BandBound::manual(None),
    };

    let bull = match (clean.high, ttm) {
        (Some(high), _) => BandBound::auto(high),
        (None, Some(ttm)) => {
            let estimate = round_to(ttm * BULL_ESTIMATE_FACTOR, 1);
            if clean.low.is_some_and(|low| estimate < low) {
                debug!(ticker = %metrics.ticker, estimate, "Estimated bull P/E crosses historical low");
                BandBound::manual(None)
            } else {
                BandBound::estimated(estimate)
            }
        }
        (None, None) => BandBound::manual(None),
    };

    let mid = match band_mid(bear.value, bull.value) {
        Some(m) => BandBound::auto(m),
        None => BandBound::manual(None),
    };

    PeBand { bear, mid, bull }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use screener_core::MetricField;

    #[test]
    fn test_clean_band_keeps_valid_range() {
        let band = clean_band(Some(10.0), Some(50.0), Some(20.0));
        assert_eq!(band, CleanBand { low: Some(10.0), high: Some(50.0), ttm: Some(20.0) });
    }

    #[test]
    fn test_clean_band_inverted_resets_both() {
        let band = clean_band(Some(60.0), Some(50.0), Some(20.0));
        assert_eq!(band, CleanBand { low: None, high: None, ttm: Some(20.0) });
    }

    #[test]
    fn test_clean_band_out_of_range() {
        assert_eq!(clean_band(Some(0.0), Some(50.0), None).high, None);
        assert_eq!(clean_band(Some(201.0), None, None).low, None);
        assert_eq!(clean_band(Some(200.0), None, None).low, Some(200.0));
        assert_eq!(clean_band(Some(10.0), Some(401.0), None).low, None);
        assert_eq!(clean_band(Some(10.0), Some(400.0), None).high, Some(400.0));
        assert_eq!(clean_band(Some(f64::NAN), Some(30.0), Some(f64::INFINITY)).high, Some(30.0));
        assert_eq!(clean_band(None, None, Some(f64::INFINITY)).ttm, None);
    }

    #[test]
    fn test_band_mid() {
        assert_eq!(band_mid(Some(10.0), Some(30.0)), Some(20.0));
        assert_eq!(band_mid(Some(10.0), None), None);
    }

    #[test]
    fn test_derive_band_historical() {
        let record = MetricRecord::new("AAA")
            .with(MetricField::Pe5yLow, 12.0)
            .with(MetricField::Pe5yHigh, 28.0)
            .with(MetricField::PeTtm, 20.0);
        let band = derive_band(&record);
        assert_eq!(band.bear, BandBound::auto(12.0));
        assert_eq!(band.bull, BandBound::auto(28.0));
        assert_eq!(band.mid, BandBound::auto(20.0));
        assert!(!band.is_estimated());
        assert_eq!(band.source(), BandSource::Auto);
    }

    #[test]
    fn test_derive_band_estimates_from_ttm() {
        let record = MetricRecord::new("AAA").with(MetricField::PeTtm, 23.0);
        let band = derive_band(&record);
        assert_eq!(band.bear.source, BandSource::Estimated);
        assert_relative_eq!(band.bear.value.unwrap(), 16.1);
        assert_eq!(band.bull.source, BandSource::Estimated);
        assert_relative_eq!(band.bull.value.unwrap(), 29.9);
        assert_eq!(band.mid.source, BandSource::Auto);
        assert_relative_eq!(band.mid.value.unwrap(), 23.0, epsilon = 1e-9);
        assert!(band.is_estimated());
    }

    #[test]
    fn test_derive_band_fills_one_edge() {
        let record = MetricRecord::new("AAA")
            .with(MetricField::Pe5yHigh, 40.0)
            .with(MetricField::PeTtm, 30.0);
        let band = derive_band(&record);
        assert_relative_eq!(band.bear.value.unwrap(), 21.0);
        assert_eq!(band.bear.source, BandSource::Estimated);
        assert_eq!(band.bull, BandBound::auto(40.0));
        assert_eq!(band.source(), BandSource::Estimated);
    }

    #[test]
    fn test_derive_band_drops_crossing_estimate() {
        // 0.7 x 100 = 70 would sit above the historical high of 40
        let record = MetricRecord::new("AAA")
            .with(MetricField::Pe5yHigh, 40.0)
            .with(MetricField::PeTtm, 100.0);
        let band = derive_band(&record);
        assert_eq!(band.bear, BandBound::manual(None));
        assert_eq!(band.mid, BandBound::manual(None));
    }

    #[test]
    fn test_derive_band_no_data() {
        let band = derive_band(&MetricRecord::new("AAA").with(MetricField::PeTtm, -5.0));
        assert_eq!(band.bear, BandBound::manual(None));
        assert_eq!(band.mid, BandBound::manual(None));
        assert_eq!(band.bull, BandBound::manual(None));
        assert_eq!(band.bounds(), BandEdges::default());
        assert_eq!(band.source(), BandSource::Manual);
    }

    #[test]
    fn test_overrides_are_manual() {
        let record = MetricRecord::new("AAA").with(MetricField::PeTtm, 20.0);
        let band = derive_band(&record).with_overrides(Some(10.0), None, None);
        assert_eq!(band.bear, BandBound::manual(Some(10.0)));
        assert_eq!(band.bull.source, BandSource::Estimated);
        assert_relative_eq!(band.mid.value.unwrap(), 18.0);
        assert_eq!(band.mid.source, BandSource::Auto);

        let pinned = band.with_overrides(None, Some(15.0), None);
        assert_eq!(pinned.mid, BandBound::manual(Some(15.0)));
    }

    #[test]
    fn test_edges_clamp_independently() {
        let edges = BandEdges { bear: Some(10.0), bull: None };
        assert_eq!(edges.clamp(5.0), 10.0);
        assert_eq!(edges.clamp(500.0), 500.0);
        assert_eq!(BandEdges::default().clamp(42.0), 42.0);
    }
}
