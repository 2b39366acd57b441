//! Lens-weighted coverage confidence.
//!
//! Each lens names the metric columns it leans on and how heavily. Confidence
//! is the share of that weight whose columns are actually present. It is
//! display and audit only and never changes a recommendation.

use serde::{Deserialize, Serialize};

use screener_core::numeric::round_to;
use screener_core::{MetricField, MetricRecord, MetricValue};

use MetricField::*;

const CONSERVATIVE: &[(MetricField, f64)] = &[
    (PeFwd, 1.5),
    (PeTtm, 1.0),
    (EvEbitda, 1.2),
    (FcfYieldPct, 1.2),
    (Peg5y, 0.8),
    (Pe5yLow, 0.8),
    (Pe5yHigh, 0.8),
    (RoicPct, 1.5),
    (FcfMarginPct, 1.2),
    (CfoToNi, 1.0),
    (FcfToEbit, 0.8),
    (AccrualsRatio, 0.8),
    (MarginStdev5yPct, 0.8),
    (BuybackYieldPct, 1.0),
    (InterestCoverageX, 1.2),
    (NetdebtToEbitda, 1.0),
    (EpsCagr5yPct, 1.0),
    (RevenueCagr5yPct, 1.0),
    (EpsCagr3yPct, 0.8),
    (Beta5y, 0.8),
    (Maxdrawdown5yPct, 0.8),
];

const VALUE_PURIST: &[(MetricField, f64)] = &[
    (PeFwd, 2.0),
    (PeTtm, 1.5),
    (EvEbitda, 1.5),
    (FcfYieldPct, 2.0),
    (Peg5y, 1.0),
    (RoicPct, 1.5),
    (FcfMarginPct, 1.5),
    (CfoToNi, 1.2),
    (NetdebtToEbitda, 1.5),
    (InterestCoverageX, 1.2),
    (EpsCagr5yPct, 1.0),
    (RevenueCagr5yPct, 1.0),
    (MoatScore, 1.0),
    (BuybackYieldPct, 1.0),
    (Beta5y, 0.8),
];

const GROWTH_MOMENTUM: &[(MetricField, f64)] = &[
    (EpsCagr5yPct, 2.0),
    (RevenueCagr5yPct, 2.0),
    (EpsCagr3yPct, 1.5),
    (RevenueCagr3yPct, 1.5),
    (RecurringRevenuePct, 1.2),
    (PeFwd, 1.0),
    (Peg5y, 1.5),
    (RoicPct, 1.0),
    (FcfMarginPct, 0.8),
    (MoatScore, 0.8),
    (Beta5y, 0.8),
    (Maxdrawdown5yPct, 0.8),
];

const ASYMMETRY_HUNTER: &[(MetricField, f64)] = &[
    (PeFwd, 1.0),
    (FcfYieldPct, 1.5),
    (EpsCagr5yPct, 1.0),
    (MoatScore, 1.5),
    (Maxdrawdown5yPct, 1.5),
    (Beta5y, 1.0),
    (NetcashToMktcapPct, 1.5),
    (InsiderOwnPct, 1.0),
    (FounderLed, 1.0),
    (NarrativeScore, 1.5),
];

const MACRO_THEMATIC: &[(MetricField, f64)] = &[
    (MacrofitScore, 2.0),
    (NarrativeScore, 2.0),
    (Beta5y, 1.0),
    (RevenueCagr5yPct, 1.0),
    (EpsCagr5yPct, 1.0),
    (PeFwd, 1.0),
    (SectorCycTag, 1.0),
    (MoatScore, 0.8),
];

const QUALITY_COMPOUNDER: &[(MetricField, f64)] = &[
    (RoicPct, 2.0),
    (FcfMarginPct, 1.5),
    (CfoToNi, 1.2),
    (FcfToEbit, 1.0),
    (AccrualsRatio, 1.0),
    (MarginStdev5yPct, 1.0),
    (EpsCagr5yPct, 1.5),
    (RevenueCagr5yPct, 1.0),
    (MoatScore, 1.5),
    (InsiderOwnPct, 0.8),
    (BuybackYieldPct, 0.8),
    (NetdebtToEbitda, 1.0),
    (InterestCoverageX, 1.0),
    (PeFwd, 1.0),
    (Peg5y, 0.8),
];

const WARREN_BUFFETT: &[(MetricField, f64)] = &[
    (MoatScore, 2.5),
    (RoicPct, 2.0),
    (FcfMarginPct, 1.5),
    (FcfToEbit, 1.0),
    (CfoToNi, 1.0),
    (MarginStdev5yPct, 1.0),
    (BuybackYieldPct, 1.2),
    (InterestCoverageX, 1.2),
    (NetdebtToEbitda, 1.0),
    (EpsCagr5yPct, 1.0),
    (RevenueCagr5yPct, 0.8),
    (FcfYieldPct, 1.5),
    (PeFwd, 1.0),
    (PeTtm, 0.8),
    (Pe5yLow, 0.8),
    (Pe5yHigh, 0.8),
];

const BENJAMIN_GRAHAM: &[(MetricField, f64)] = &[
    (PeFwd, 2.0),
    (PeTtm, 1.5),
    (FcfYieldPct, 2.0),
    (EvEbitda, 1.5),
    (Pe5yLow, 1.2),
    (Pe5yHigh, 1.2),
    (NetdebtToEbitda, 2.0),
    (InterestCoverageX, 1.5),
    (Beta5y, 1.0),
    (Maxdrawdown5yPct, 1.0),
    (NetcashToMktcapPct, 1.0),
    (MarginStdev5yPct, 1.5),
    (AccrualsRatio, 1.2),
    (CfoToNi, 1.0),
    (RoicPct, 1.0),
    (SharecountChange5yPct, 0.8),
];

const PETER_LYNCH: &[(MetricField, f64)] = &[
    (EpsCagr5yPct, 2.0),
    (RevenueCagr5yPct, 1.5),
    (EpsCagr3yPct, 1.5),
    (RevenueCagr3yPct, 1.0),
    (RecurringRevenuePct, 1.0),
    (Peg5y, 2.0),
    (PeFwd, 1.2),
    (FcfYieldPct, 1.0),
    (RoicPct, 1.0),
    (FcfMarginPct, 0.8),
    (CfoToNi, 0.8),
    (NetdebtToEbitda, 1.0),
    (InterestCoverageX, 0.8),
    (MoatScore, 0.8),
    (NarrativeScore, 1.0),
];

const LENS_REQUIRED_FIELDS: &[(&str, &[(MetricField, f64)])] = &[
    ("Conservative", CONSERVATIVE),
    ("Value Purist", VALUE_PURIST),
    ("Growth/Momentum", GROWTH_MOMENTUM),
    ("Asymmetry Hunter", ASYMMETRY_HUNTER),
    ("Macro-Thematic", MACRO_THEMATIC),
    ("Quality Compounder", QUALITY_COMPOUNDER),
    ("Warren Buffett", WARREN_BUFFETT),
    ("Benjamin Graham", BENJAMIN_GRAHAM),
    ("Peter Lynch", PETER_LYNCH),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceGrade {
    A,
    B,
    C,
    D,
}

impl ConfidenceGrade {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= 85.0 {
            ConfidenceGrade::A
        } else if pct >= 70.0 {
            ConfidenceGrade::B
        } else if pct >= 50.0 {
            ConfidenceGrade::C
        } else {
            ConfidenceGrade::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceGrade::A => "A",
            ConfidenceGrade::B => "B",
            ConfidenceGrade::C => "C",
            ConfidenceGrade::D => "D",
        }
    }
}

impl std::fmt::Display for ConfidenceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    /// 0-100, one decimal
    pub pct: f64,
    pub grade: ConfidenceGrade,
    pub present_fields: Vec<MetricField>,
    pub missing_fields: Vec<MetricField>,
    pub total_weight: f64,
    pub present_weight: f64,
}

/// Required fields and weights for a lens; unknown lenses use Conservative
pub fn required_fields(lens_name: &str) -> &'static [(MetricField, f64)] {
    let wanted = lens_name.trim();
    LENS_REQUIRED_FIELDS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, fields)| *fields)
        .unwrap_or(CONSERVATIVE)
}

fn is_present(value: Option<&MetricValue>) -> bool {
    match value {
        Some(MetricValue::Number(n)) => n.is_finite(),
        Some(MetricValue::Text(s)) => !s.trim().is_empty(),
        Some(MetricValue::Flag(_)) => true,
        None => false,
    }
}

pub fn compute_confidence(metrics: &MetricRecord, lens_name: &str) -> Confidence {
    let required = required_fields(lens_name);

    let mut total_weight = 0.0;
    let mut present_weight = 0.0;
    let mut present_fields = Vec::new();
    let mut missing_fields = Vec::new();

    for (field, weight) in required {
        total_weight += weight;
        if is_present(field.get(metrics).as_ref()) {
            present_weight += weight;
            present_fields.push(*field);
        } else {
            missing_fields.push(*field);
        }
    }

    let pct = if total_weight > 0.0 {
        present_weight / total_weight * 100.0
    } else {
        0.0
    };

    Confidence {
        pct: round_to(pct, 1),
        grade: ConfidenceGrade::from_pct(pct),
        present_fields,
        missing_fields,
        total_weight: round_to(total_weight, 4),
        present_weight: round_to(present_weight, 4),
    }
}
