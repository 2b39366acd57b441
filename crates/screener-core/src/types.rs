use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A raw metric cell as it arrives from an import or provider collaborator.
///
/// Percent-like values may be a fraction (`0.21`), whole points (`21`) or a
/// string with a trailing `%`; normalization happens at read time in
/// [`crate::numeric`], never at ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        MetricValue::Flag(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

/// An optional metric cell. `None` means the provider had no value.
pub type Field = Option<MetricValue>;

macro_rules! metric_fields {
    ($( $(#[$doc:meta])* $field:ident $(| $alias:literal)* => $variant:ident ),+ $(,)?) => {
        /// One row of fundamental data for a ticker at a point in time.
        ///
        /// Every metric is optional. Unknown keys are ignored on deserialize.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct MetricRecord {
            pub ticker: String,
            pub as_of_date: Option<NaiveDate>,
            $( $(#[$doc])* $(#[serde(alias = $alias)])* pub $field: Field, )+
        }

        /// Typed name of every metric column of a [`MetricRecord`].
        ///
        /// Serializes as its column name, see [`MetricField::as_str`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MetricField {
            $( $variant, )+
        }

        impl MetricField {
            pub const ALL: &'static [MetricField] = &[ $( MetricField::$variant, )+ ];

            /// Column name used in CSV headers and JSON keys
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( MetricField::$variant => stringify!($field), )+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let key = name.trim().to_ascii_lowercase();
                $(
                    if key == stringify!($field) $(|| key == $alias)* {
                        return Some(MetricField::$variant);
                    }
                )+
                None
            }

            pub fn get<'a>(&self, record: &'a MetricRecord) -> &'a Field {
                match self {
                    $( MetricField::$variant => &record.$field, )+
                }
            }

            pub fn set(&self, record: &mut MetricRecord, value: Field) {
                match self {
                    $( MetricField::$variant => record.$field = value, )+
                }
            }
        }
    };
}

metric_fields! {
    price_current => PriceCurrent,
    eps_ttm => EpsTtm,
    /// Consensus next-twelve-month EPS, see [`crate::resolver::validate_eps_forward`]
    eps_forward => EpsForward,
    pe_ttm => PeTtm,
    pe_fwd => PeFwd,
    peg_5y => Peg5y,
    ev_ebitda => EvEbitda,
    fcf_yield_pct => FcfYieldPct,
    pe_5y_low => Pe5yLow,
    pe_5y_high => Pe5yHigh,
    roic_pct => RoicPct,
    fcf_margin_pct => FcfMarginPct,
    cfo_to_ni => CfoToNi,
    fcf_to_ebit => FcfToEbit,
    accruals_ratio => AccrualsRatio,
    margin_stdev_5y_pct => MarginStdev5yPct,
    buyback_yield_pct => BuybackYieldPct,
    interest_coverage_x => InterestCoverageX,
    ebit_ttm => EbitTtm,
    ebit_prior => EbitPrior,
    invested_capital => InvestedCapital,
    invested_capital_prior => InvestedCapitalPrior,
    eps_cagr_5y_pct => EpsCagr5yPct,
    eps_cagr_3y_pct => EpsCagr3yPct,
    revenue_cagr_5y_pct => RevenueCagr5yPct,
    revenue_cagr_3y_pct => RevenueCagr3yPct,
    recurring_revenue_pct => RecurringRevenuePct,
    moat_score_0_10 => MoatScore,
    insider_own_pct => InsiderOwnPct,
    founder_led_bool => FounderLed,
    risk_score_0_10 | "riskdownside_score_0_10" => RiskScore,
    netdebt_to_ebitda => NetdebtToEbitda,
    netcash_to_mktcap_pct => NetcashToMktcapPct,
    beta_5y => Beta5y,
    maxdrawdown_5y_pct => Maxdrawdown5yPct,
    /// Free-form cyclicality tag: defensive, secular, growth, cyclical, deep-cyclical
    sector_cyc_tag => SectorCycTag,
    macrofit_score_0_10 => MacrofitScore,
    narrative_score_0_10 => NarrativeScore,
    /// Signed like buyback yield: positive means the share count shrank
    sharecount_change_5y_pct => SharecountChange5yPct,
    sbc_to_sales_pct => SbcToSalesPct,
}

impl Serialize for MetricField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        MetricField::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown metric field: {}", name)))
    }
}

impl MetricRecord {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter, mostly for tests and fixtures
    pub fn with(mut self, field: MetricField, value: impl Into<MetricValue>) -> Self {
        field.set(&mut self, Some(value.into()));
        self
    }
}

/// The nine fixed scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Valuation,
    Quality,
    CapitalAllocation,
    Growth,
    Moat,
    Risk,
    Macro,
    Narrative,
    Dilution,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Valuation,
        Category::Quality,
        Category::CapitalAllocation,
        Category::Growth,
        Category::Moat,
        Category::Risk,
        Category::Macro,
        Category::Narrative,
        Category::Dilution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Valuation => "valuation",
            Category::Quality => "quality",
            Category::CapitalAllocation => "capital_allocation",
            Category::Growth => "growth",
            Category::Moat => "moat",
            Category::Risk => "risk",
            Category::Macro => "macro",
            Category::Narrative => "narrative",
            Category::Dilution => "dilution",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! per_category {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub valuation: Option<f64>,
            pub quality: Option<f64>,
            pub capital_allocation: Option<f64>,
            pub growth: Option<f64>,
            pub moat: Option<f64>,
            pub risk: Option<f64>,
            #[serde(rename = "macro")]
            pub macro_: Option<f64>,
            pub narrative: Option<f64>,
            pub dilution: Option<f64>,
        }

        impl $name {
            pub fn get(&self, category: Category) -> Option<f64> {
                match category {
                    Category::Valuation => self.valuation,
                    Category::Quality => self.quality,
                    Category::CapitalAllocation => self.capital_allocation,
                    Category::Growth => self.growth,
                    Category::Moat => self.moat,
                    Category::Risk => self.risk,
                    Category::Macro => self.macro_,
                    Category::Narrative => self.narrative,
                    Category::Dilution => self.dilution,
                }
            }

            pub fn set(&mut self, category: Category, value: Option<f64>) {
                let slot = match category {
                    Category::Valuation => &mut self.valuation,
                    Category::Quality => &mut self.quality,
                    Category::CapitalAllocation => &mut self.capital_allocation,
                    Category::Growth => &mut self.growth,
                    Category::Moat => &mut self.moat,
                    Category::Risk => &mut self.risk,
                    Category::Macro => &mut self.macro_,
                    Category::Narrative => &mut self.narrative,
                    Category::Dilution => &mut self.dilution,
                };
                *slot = value;
            }

            pub fn iter(&self) -> impl Iterator<Item = (Category, Option<f64>)> + '_ {
                Category::ALL.iter().map(move |c| (*c, self.get(*c)))
            }
        }
    };
}

per_category! {
    /// Per-category 0-10 scores; `None` when a category had no usable signal.
    CategoryScores
}

per_category! {
    /// Per-category lens weights. By convention they sum to 100, checked only
    /// by [`LensPreset::validate`].
    LensWeights
}

impl CategoryScores {
    /// True when no category produced a score
    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, s)| s.is_none())
    }

    pub fn present_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.is_some()).count()
    }
}

impl LensWeights {
    /// Sum of the present, finite weights
    pub fn total(&self) -> f64 {
        self.iter()
            .filter_map(|(_, w)| w)
            .filter(|w| w.is_finite())
            .sum()
    }
}

/// Optional recommendation thresholds carried by a lens
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensThresholds {
    pub buy: Option<f64>,
    pub watch: Option<f64>,
    /// Advisory margin-of-safety threshold (fraction, 0.15 = 15%)
    pub mos: Option<f64>,
    /// Advisory coverage-confidence threshold (percent, 0-100)
    pub confidence: Option<f64>,
}

/// A named weighting scheme over the nine categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensPreset {
    pub name: String,
    pub weights: LensWeights,
    #[serde(default)]
    pub thresholds: LensThresholds,
}

/// Weight sums within this distance of 100 are accepted by the editor boundary
pub const LENS_WEIGHT_TOLERANCE: f64 = 0.01;

impl LensPreset {
    /// Edit-boundary check: every weight present, finite and non-negative,
    /// summing to 100 within [`LENS_WEIGHT_TOLERANCE`].
    pub fn validate(&self) -> Result<(), crate::ScreenerError> {
        for (category, weight) in self.weights.iter() {
            match weight {
                Some(w) if w.is_finite() && w >= 0.0 => {}
                Some(w) => {
                    return Err(crate::ScreenerError::InvalidLens(format!(
                        "{}: weight for {} must be a non-negative number, got {}",
                        self.name, category, w
                    )))
                }
                None => {
                    return Err(crate::ScreenerError::InvalidLens(format!(
                        "{}: missing weight for {}",
                        self.name, category
                    )))
                }
            }
        }

        let total = self.weights.total();
        if (total - 100.0).abs() > LENS_WEIGHT_TOLERANCE {
            return Err(crate::ScreenerError::InvalidLens(format!(
                "{}: weights sum to {:.2}, expected 100",
                self.name, total
            )));
        }

        if let (Some(buy), Some(watch)) = (self.thresholds.buy, self.thresholds.watch) {
            if watch > buy {
                return Err(crate::ScreenerError::InvalidLens(format!(
                    "{}: watch threshold {} is above buy threshold {}",
                    self.name, watch, buy
                )));
            }
        }

        Ok(())
    }
}

/// Final verdict of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Buy,
    Watch,
    Avoid,
    InsufficientData,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WATCH",
            Recommendation::Avoid => "AVOID",
            Recommendation::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only annotation of a margin of safety relative to a neutral band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MosSignal {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "0")]
    Neutral,
    #[serde(rename = "-")]
    Negative,
}

impl MosSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            MosSignal::Positive => "+",
            MosSignal::Neutral => "0",
            MosSignal::Negative => "-",
        }
    }
}

impl std::fmt::Display for MosSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
