use serde::{Deserialize, Serialize};

use screener_core::{LensPreset, MosSignal, Recommendation};

pub const DEFAULT_BUY_THRESHOLD: f64 = 6.5;
pub const DEFAULT_WATCH_THRESHOLD: f64 = 4.5;
/// Half-width of the neutral margin-of-safety band (fraction)
pub const DEFAULT_MOS_BAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub buy: f64,
    pub watch: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            buy: DEFAULT_BUY_THRESHOLD,
            watch: DEFAULT_WATCH_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Lens thresholds with the defaults filling any gap
    pub fn from_lens(lens: &LensPreset) -> Self {
        let defaults = Self::default();
        Self {
            buy: lens.thresholds.buy.unwrap_or(defaults.buy),
            watch: lens.thresholds.watch.unwrap_or(defaults.watch),
        }
    }
}

/// Score-only classification. Margin of safety and coverage never gate it.
pub fn classify(final_score: Option<f64>, thresholds: &Thresholds) -> Recommendation {
    match final_score.filter(|s| s.is_finite()) {
        None => Recommendation::InsufficientData,
        Some(score) if score >= thresholds.buy => Recommendation::Buy,
        Some(score) if score >= thresholds.watch => Recommendation::Watch,
        Some(_) => Recommendation::Avoid,
    }
}

/// `+` strictly above `band`, `-` strictly below `-band`, `0` otherwise
pub fn mos_signal(mos: Option<f64>, band: f64) -> Option<MosSignal> {
    let mos = mos.filter(|m| m.is_finite())?;
    Some(if mos > band {
        MosSignal::Positive
    } else if mos < -band {
        MosSignal::Negative
    } else {
        MosSignal::Neutral
    })
}

/// A recommendation together with the advisory signals shown next to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub recommendation: Recommendation,
    pub final_score: Option<f64>,
    pub margin_of_safety: Option<f64>,
    pub mos_signal: Option<MosSignal>,
    pub confidence_pct: Option<f64>,
    /// `None` when either the lens sets no MOS threshold or no MOS is known
    pub meets_mos: Option<bool>,
    pub meets_confidence: Option<bool>,
}

impl Verdict {
    pub fn annotate(
        final_score: Option<f64>,
        margin_of_safety: Option<f64>,
        confidence_pct: Option<f64>,
        lens: &LensPreset,
        mos_band: f64,
    ) -> Self {
        let recommendation = classify(final_score, &Thresholds::from_lens(lens));
        let meets_mos = match (margin_of_safety, lens.thresholds.mos) {
            (Some(mos), Some(required)) if mos.is_finite() => Some(mos >= required),
            _ => None,
        };
        let meets_confidence = match (confidence_pct, lens.thresholds.confidence) {
            (Some(pct), Some(required)) => Some(pct >= required),
            _ => None,
        };

        Self {
            recommendation,
            final_score,
            margin_of_safety,
            mos_signal: mos_signal(margin_of_safety, mos_band),
            confidence_pct,
            meets_mos,
            meets_confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{LensThresholds, LensWeights};

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::default();
        assert_eq!(classify(Some(6.5), &t), Recommendation::Buy);
        assert_eq!(classify(Some(6.49), &t), Recommendation::Watch);
        assert_eq!(classify(Some(4.5), &t), Recommendation::Watch);
        assert_eq!(classify(Some(4.49), &t), Recommendation::Avoid);
        assert_eq!(classify(Some(0.0), &t), Recommendation::Avoid);
        assert_eq!(classify(None, &t), Recommendation::InsufficientData);
        assert_eq!(classify(Some(f64::NAN), &t), Recommendation::InsufficientData);
    }

    #[test]
    fn test_mos_signal_band() {
        assert_eq!(mos_signal(Some(0.05), DEFAULT_MOS_BAND), Some(MosSignal::Neutral));
        assert_eq!(mos_signal(Some(0.051), DEFAULT_MOS_BAND), Some(MosSignal::Positive));
        assert_eq!(mos_signal(Some(-0.05), DEFAULT_MOS_BAND), Some(MosSignal::Neutral));
        assert_eq!(mos_signal(Some(-0.051), DEFAULT_MOS_BAND), Some(MosSignal::Negative));
        assert_eq!(mos_signal(Some(0.0), DEFAULT_MOS_BAND), Some(MosSignal::Neutral));
        assert_eq!(mos_signal(None, DEFAULT_MOS_BAND), None);
    }

    fn lens(thresholds: LensThresholds) -> LensPreset {
        LensPreset {
            name: "Test".into(),
            weights: LensWeights::default(),
            thresholds,
        }
    }

    #[test]
    fn test_negative_mos_never_downgrades() {
        let strict = lens(LensThresholds {
            mos: Some(0.30),
            confidence: Some(90.0),
            ..Default::default()
        });
        let verdict = Verdict::annotate(Some(8.0), Some(-0.40), Some(40.0), &strict, DEFAULT_MOS_BAND);
        assert_eq!(verdict.recommendation, Recommendation::Buy);
        assert_eq!(verdict.mos_signal, Some(MosSignal::Negative));
        assert_eq!(verdict.meets_mos, Some(false));
        assert_eq!(verdict.meets_confidence, Some(false));
    }

    #[test]
    fn test_lens_thresholds_override_defaults() {
        let picky = lens(LensThresholds {
            buy: Some(8.0),
            ..Default::default()
        });
        let t = Thresholds::from_lens(&picky);
        assert_eq!(t.buy, 8.0);
        assert_eq!(t.watch, DEFAULT_WATCH_THRESHOLD);

        let verdict = Verdict::annotate(Some(7.0), None, None, &picky, DEFAULT_MOS_BAND);
        assert_eq!(verdict.recommendation, Recommendation::Watch);
        assert_eq!(verdict.meets_mos, None);
        assert_eq!(verdict.mos_signal, None);
    }
}
