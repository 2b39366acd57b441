use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::band::BandEdges;

/// P/E paths a projection can follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Linear glide to the bear multiple
    Bear,
    /// Linear glide to the bull multiple
    Bull,
    /// Today's multiple held flat
    Constant,
    /// Today's multiple compounding at the trend rate, held inside the band
    Current,
    /// Linear glide to a user terminal multiple, defaulting to the band mid
    Custom,
}

impl Scenario {
    pub const ALL: [Scenario; 5] = [
        Scenario::Bear,
        Scenario::Bull,
        Scenario::Constant,
        Scenario::Current,
        Scenario::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Bear => "bear",
            Scenario::Bull => "bull",
            Scenario::Constant => "constant",
            Scenario::Current => "current",
            Scenario::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == key)
            .ok_or_else(|| format!("unknown scenario '{}'", s))
    }
}

/// Longest horizon [`build_paths`] will project
pub const MAX_HORIZON_YEARS: u32 = 50;

/// Inputs to [`build_paths`]. Rates are fractions (0.15 = 15%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub eps0: f64,
    pub growth: f64,
    pub years: u32,
    pub price_today: f64,
    pub pe_bear: Option<f64>,
    pub pe_mid: Option<f64>,
    pub pe_bull: Option<f64>,
    /// Yearly compounding applied to today's multiple in the current scenario
    pub pe_trend: Option<f64>,
    pub pe_custom_terminal: Option<f64>,
    pub target_cagr: Option<f64>,
    pub pe_now: Option<f64>,
    pub band: BandEdges,
}

/// End-of-horizon values for one scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub scenario: Scenario,
    pub price_n: f64,
    pub eps_n: f64,
    pub pe_n: f64,
    pub implied_cagr: f64,
    /// Price today that would still earn the target CAGR
    pub required_entry: Option<f64>,
    /// Positive when today's price sits below the required entry
    pub margin_of_safety: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPaths {
    pub years: u32,
    /// `years + 1` points, t = 0..=years
    pub eps_path: Vec<f64>,
    pub pe_paths: BTreeMap<Scenario, Vec<f64>>,
    pub price_today: f64,
    pub target_cagr: Option<f64>,
}

impl ProjectionPaths {
    /// No projection could be built. Callers check this instead of an error.
    pub fn is_empty(&self) -> bool {
        self.eps_path.is_empty()
    }

    pub fn scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        self.pe_paths.keys().copied()
    }

    pub fn pe_path(&self, scenario: Scenario) -> Option<&[f64]> {
        self.pe_paths.get(&scenario).map(Vec::as_slice)
    }

    /// `price[0]` is today's price exactly; later years are EPS x P/E.
    pub fn price_path(&self, scenario: Scenario) -> Option<Vec<f64>> {
        let pe = self.pe_path(scenario)?;
        Some(
            self.eps_path
                .iter()
                .zip(pe)
                .enumerate()
                .map(|(t, (eps, pe))| if t == 0 { self.price_today } else { eps * pe })
                .collect(),
        )
    }

    pub fn terminal(&self, scenario: Scenario) -> Option<Terminal> {
        let prices = self.price_path(scenario)?;
        let n = self.years as usize;
        let price_n = *prices.get(n)?;
        let eps_n = *self.eps_path.get(n)?;
        let pe_n = *self.pe_path(scenario)?.get(n)?;
        let years = f64::from(self.years);

        let implied_cagr = if !(self.price_today > 0.0) {
            0.0
        } else if price_n <= 0.0 {
            -1.0
        } else {
            (price_n / self.price_today).powf(1.0 / years) - 1.0
        };

        let required_entry = self
            .target_cagr
            .filter(|r| r.is_finite() && *r > -1.0)
            .map(|r| price_n / (1.0 + r).powf(years));
        let margin_of_safety = required_entry
            .filter(|entry| *entry > 0.0)
            .map(|entry| (entry - self.price_today) / entry);

        Some(Terminal {
            scenario,
            price_n,
            eps_n,
            pe_n,
            implied_cagr,
            required_entry,
            margin_of_safety,
        })
    }

    /// Price compounding at the target CAGR from today
    pub fn target_path(&self) -> Option<Vec<f64>> {
        let r = self.target_cagr.filter(|r| r.is_finite())?;
        if self.is_empty() {
            return None;
        }
        Some(
            (0..=self.years)
                .map(|t| self.price_today * (1.0 + r).powi(t as i32))
                .collect(),
        )
    }
}

/// UI warning helper: bear multiple entered above the bull multiple
pub fn has_inverted_band(bear: Option<f64>, bull: Option<f64>) -> bool {
    matches!((bear, bull), (Some(b), Some(u)) if b > u)
}

/// Reorder bear/mid/bull so bear <= mid <= bull. Bear takes the lowest
/// present value and bull the highest; a slot missing on input stays missing.
fn ordered_band(
    bear: Option<f64>,
    mid: Option<f64>,
    bull: Option<f64>,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    let (bear, mid, bull) = (
        bear.filter(|v| v.is_finite()),
        mid.filter(|v| v.is_finite()),
        bull.filter(|v| v.is_finite()),
    );
    let present = [bear, mid, bull].into_iter().flatten();
    let (Some(low), Some(high)) = (
        present.clone().reduce(f64::min),
        present.reduce(f64::max),
    ) else {
        return (None, None, None);
    };
    (
        bear.map(|_| low),
        mid.map(|m| m.clamp(low, high)),
        bull.map(|_| high),
    )
}

fn glide(from: f64, to: f64, years: u32) -> Vec<f64> {
    let n = f64::from(years);
    (0..=years)
        .map(|t| from + (to - from) * f64::from(t) / n)
        .collect()
}

/// Build every scenario path for a horizon of `years`.
///
/// Degrades to empty paths when there is no usable anchor P/E, EPS or horizon.
/// Scenarios whose terminal multiple is unknown are left out.
pub fn build_paths(params: &ProjectionParams) -> ProjectionPaths {
    let Some(pe_now) = params.pe_now.filter(|pe| pe.is_finite()) else {
        debug!("No anchor P/E, skipping projection");
        return ProjectionPaths::default();
    };
    if params.years == 0 || params.years > MAX_HORIZON_YEARS || !params.eps0.is_finite() {
        debug!(years = params.years, eps0 = params.eps0, "Unusable projection horizon or EPS");
        return ProjectionPaths::default();
    }

    let years = params.years;
    let growth = if params.growth.is_finite() { params.growth } else { 0.0 };
    let eps_path: Vec<f64> = (0..=years)
        .map(|t| params.eps0 * (1.0 + growth).powi(t as i32))
        .collect();

    let (bear, mid, bull) = ordered_band(params.pe_bear, params.pe_mid, params.pe_bull);
    let trend = params.pe_trend.filter(|t| t.is_finite()).unwrap_or(0.0);
    let custom = params
        .pe_custom_terminal
        .filter(|pe| pe.is_finite())
        .or(mid);

    let mut pe_paths = BTreeMap::new();
    if let Some(bear) = bear {
        pe_paths.insert(Scenario::Bear, glide(pe_now, bear, years));
    }
    if let Some(bull) = bull {
        pe_paths.insert(Scenario::Bull, glide(pe_now, bull, years));
    }
    pe_paths.insert(Scenario::Constant, vec![pe_now; years as usize + 1]);
    pe_paths.insert(
        Scenario::Current,
        (0..=years)
            .map(|t| params.band.clamp(pe_now * (1.0 + trend).powi(t as i32)))
            .collect(),
    );
    if let Some(custom) = custom {
        pe_paths.insert(Scenario::Custom, glide(pe_now, custom, years));
    }

    ProjectionPaths {
        years,
        eps_path,
        pe_paths,
        price_today: params.price_today,
        target_cagr: params.target_cagr.filter(|r| r.is_finite()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base_params() -> ProjectionParams {
        ProjectionParams {
            eps0: 5.0,
            growth: 0.15,
            years: 5,
            price_today: 100.0,
            pe_now: Some(20.0),
            pe_bear: Some(15.0),
            pe_bull: Some(25.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_bear_glides_linearly() {
        let paths = build_paths(&base_params());
        let bear = paths.pe_path(Scenario::Bear).unwrap();
        let expected = [20.0, 19.0, 18.0, 17.0, 16.0, 15.0];
        assert_eq!(bear.len(), 6);
        for (got, want) in bear.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_price_anchor_is_exact() {
        let mut params = base_params();
        params.eps0 = 5.1;
        let paths = build_paths(&params);
        for scenario in paths.scenarios() {
            assert_eq!(paths.price_path(scenario).unwrap()[0], 100.0);
        }
    }

    #[test]
    fn test_eps_compounds() {
        let paths = build_paths(&base_params());
        assert_eq!(paths.eps_path.len(), 6);
        assert_relative_eq!(paths.eps_path[5], 5.0 * 1.15f64.powi(5), epsilon = 1e-12);
    }

    #[test]
    fn test_guards_return_empty() {
        let mut no_pe = base_params();
        no_pe.pe_now = None;
        assert!(build_paths(&no_pe).is_empty());

        let mut nan_pe = base_params();
        nan_pe.pe_now = Some(f64::NAN);
        assert!(build_paths(&nan_pe).is_empty());

        let mut zero_years = base_params();
        zero_years.years = 0;
        assert!(build_paths(&zero_years).is_empty());

        let mut longest = base_params();
        longest.years = MAX_HORIZON_YEARS;
        assert_eq!(build_paths(&longest).years, MAX_HORIZON_YEARS);
        longest.years = MAX_HORIZON_YEARS + 1;
        assert!(build_paths(&longest).is_empty());
        longest.years = u32::MAX;
        assert!(build_paths(&longest).is_empty());

        let mut bad_eps = base_params();
        bad_eps.eps0 = f64::INFINITY;
        let empty = build_paths(&bad_eps);
        assert!(empty.is_empty());
        assert!(empty.terminal(Scenario::Constant).is_none());
        assert!(empty.target_path().is_none());
    }

    #[test]
    fn test_implied_cagr_round_trip() {
        let r: f64 = 0.11;
        let params = ProjectionParams {
            eps0: 5.0,
            growth: r,
            years: 7,
            price_today: 100.0,
            pe_now: Some(20.0),
            ..Default::default()
        };
        let terminal = build_paths(&params).terminal(Scenario::Constant).unwrap();
        assert_relative_eq!(terminal.price_n, 100.0 * (1.0 + r).powi(7), epsilon = 1e-9);
        assert_relative_eq!(terminal.implied_cagr, r, epsilon = 1e-12);
    }

    #[test]
    fn test_required_entry_and_margin_of_safety() {
        let mut params = base_params();
        params.growth = 0.0;
        params.target_cagr = Some(0.0);
        // constant: price_n = 5 x 20 = 100, required entry 100, MOS 0
        let paths = build_paths(&params);
        let flat = paths.terminal(Scenario::Constant).unwrap();
        assert_relative_eq!(flat.required_entry.unwrap(), 100.0);
        assert_relative_eq!(flat.margin_of_safety.unwrap(), 0.0);

        // bull: price_n = 125, required entry 125, price 100 sits 20% below it
        let bull = paths.terminal(Scenario::Bull).unwrap();
        assert_relative_eq!(bull.margin_of_safety.unwrap(), 0.2, epsilon = 1e-12);

        // bear: price_n = 75, today's price is above the required entry
        let bear = paths.terminal(Scenario::Bear).unwrap();
        assert!(bear.margin_of_safety.unwrap() < 0.0);
    }

    #[test]
    fn test_no_target_means_no_required_entry() {
        let terminal = build_paths(&base_params()).terminal(Scenario::Bull).unwrap();
        assert_eq!(terminal.required_entry, None);
        assert_eq!(terminal.margin_of_safety, None);
    }

    #[test]
    fn test_implied_cagr_edge_cases() {
        let mut params = base_params();
        params.price_today = 0.0;
        let terminal = build_paths(&params).terminal(Scenario::Constant).unwrap();
        assert_eq!(terminal.implied_cagr, 0.0);

        let mut losses = base_params();
        losses.eps0 = -2.0;
        let terminal = build_paths(&losses).terminal(Scenario::Constant).unwrap();
        assert_eq!(terminal.implied_cagr, -1.0);
    }

    #[test]
    fn test_inverted_inputs_are_reordered() {
        let mut params = base_params();
        params.pe_bear = Some(30.0);
        params.pe_mid = Some(40.0);
        params.pe_bull = Some(12.0);
        assert!(has_inverted_band(params.pe_bear, params.pe_bull));

        let paths = build_paths(&params);
        assert_eq!(paths.pe_path(Scenario::Bear).unwrap()[5], 12.0);
        assert_eq!(paths.pe_path(Scenario::Bull).unwrap()[5], 40.0);
        // mid was already the max, custom defaults to it
        assert_eq!(paths.pe_path(Scenario::Custom).unwrap()[5], 40.0);
    }

    #[test]
    fn test_unknown_endpoints_are_omitted() {
        let params = ProjectionParams {
            eps0: 2.0,
            years: 3,
            price_today: 30.0,
            pe_now: Some(15.0),
            ..Default::default()
        };
        let paths = build_paths(&params);
        let scenarios: Vec<Scenario> = paths.scenarios().collect();
        assert_eq!(scenarios, vec![Scenario::Constant, Scenario::Current]);
        assert!(paths.price_path(Scenario::Bear).is_none());
    }

    #[test]
    fn test_current_trend_clamps_to_band() {
        let mut params = base_params();
        params.pe_trend = Some(0.10);
        params.band = BandEdges { bear: Some(15.0), bull: Some(25.0) };
        let paths = build_paths(&params);
        let current = paths.pe_path(Scenario::Current).unwrap();
        assert_relative_eq!(current[1], 22.0, epsilon = 1e-12);
        assert_eq!(current[5], 25.0);

        params.band = BandEdges::default();
        let unclamped = build_paths(&params);
        assert!(unclamped.pe_path(Scenario::Current).unwrap()[5] > 25.0);
    }

    #[test]
    fn test_custom_terminal_overrides_mid() {
        let mut params = base_params();
        params.pe_mid = Some(20.0);
        params.pe_custom_terminal = Some(30.0);
        let paths = build_paths(&params);
        assert_eq!(paths.pe_path(Scenario::Custom).unwrap()[5], 30.0);
    }

    #[test]
    fn test_target_path() {
        let mut params = base_params();
        params.target_cagr = Some(0.10);
        let target = build_paths(&params).target_path().unwrap();
        assert_eq!(target[0], 100.0);
        assert_relative_eq!(target[2], 121.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scenario_parse() {
        assert_eq!(" Bear ".parse::<Scenario>(), Ok(Scenario::Bear));
        assert!("sideways".parse::<Scenario>().is_err());
    }
}
