//! The nine category scorers and their registry.

mod capital;
mod dilution;
mod growth;
mod moat;
mod quality;
mod ratings;
mod risk;
mod valuation;

pub use capital::CapitalAllocationScorer;
pub use dilution::DilutionScorer;
pub use growth::GrowthScorer;
pub use moat::MoatScorer;
pub use quality::QualityScorer;
pub use ratings::{MacroScorer, NarrativeScorer};
pub use risk::{cyclicality_score, RiskScorer};
pub use valuation::ValuationScorer;

use screener_core::CategoryScorer;

/// One scorer per category, in [`screener_core::Category::ALL`] order
pub static SCORERS: [&dyn CategoryScorer; 9] = [
    &ValuationScorer,
    &QualityScorer,
    &CapitalAllocationScorer,
    &GrowthScorer,
    &MoatScorer,
    &RiskScorer,
    &MacroScorer,
    &NarrativeScorer,
    &DilutionScorer,
];
