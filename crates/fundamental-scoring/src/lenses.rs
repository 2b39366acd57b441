use tracing::warn;

use screener_core::{Category, LensPreset, LensThresholds, LensWeights, ScreenerError};

pub const DEFAULT_LENS: &str = "Conservative";

// valuation, quality, capital allocation, growth, moat, risk, macro, narrative, dilution
struct Builtin {
    name: &'static str,
    weights: [f64; 9],
    mos: f64,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "Conservative",
        weights: [25.0, 20.0, 10.0, 15.0, 10.0, 10.0, 5.0, 5.0, 0.0],
        mos: 0.15,
    },
    Builtin {
        name: "Value Purist",
        weights: [40.0, 20.0, 10.0, 5.0, 10.0, 10.0, 0.0, 0.0, 5.0],
        mos: 0.25,
    },
    Builtin {
        name: "Growth/Momentum",
        weights: [10.0, 15.0, 5.0, 35.0, 10.0, 10.0, 5.0, 5.0, 5.0],
        mos: 0.05,
    },
    Builtin {
        name: "Asymmetry Hunter",
        weights: [20.0, 10.0, 5.0, 10.0, 15.0, 15.0, 5.0, 15.0, 5.0],
        mos: 0.20,
    },
    Builtin {
        name: "Macro-Thematic",
        weights: [10.0, 10.0, 5.0, 15.0, 10.0, 10.0, 25.0, 15.0, 0.0],
        mos: 0.10,
    },
    Builtin {
        name: "Quality Compounder",
        weights: [10.0, 30.0, 15.0, 15.0, 20.0, 5.0, 0.0, 0.0, 5.0],
        mos: 0.10,
    },
    Builtin {
        name: "Warren Buffett",
        weights: [15.0, 25.0, 15.0, 10.0, 25.0, 5.0, 0.0, 0.0, 5.0],
        mos: 0.25,
    },
    Builtin {
        name: "Benjamin Graham",
        weights: [40.0, 15.0, 5.0, 5.0, 0.0, 30.0, 0.0, 0.0, 5.0],
        mos: 0.33,
    },
    Builtin {
        name: "Peter Lynch",
        weights: [20.0, 15.0, 5.0, 30.0, 10.0, 10.0, 0.0, 5.0, 5.0],
        mos: 0.15,
    },
];

impl Builtin {
    fn preset(&self) -> LensPreset {
        let mut weights = LensWeights::default();
        for (category, weight) in Category::ALL.iter().zip(self.weights) {
            weights.set(*category, Some(weight));
        }
        LensPreset {
            name: self.name.to_string(),
            weights,
            thresholds: LensThresholds {
                buy: Some(crate::DEFAULT_BUY_THRESHOLD),
                watch: Some(crate::DEFAULT_WATCH_THRESHOLD),
                mos: Some(self.mos),
                confidence: Some(70.0),
            },
        }
    }
}

pub fn builtin_lenses() -> Vec<LensPreset> {
    BUILTINS.iter().map(Builtin::preset).collect()
}

/// Case-insensitive lookup by lens name
pub fn find_lens<'a>(lenses: &'a [LensPreset], name: &str) -> Option<&'a LensPreset> {
    let wanted = name.trim();
    lenses.iter().find(|l| l.name.trim().eq_ignore_ascii_case(wanted))
}

/// Parse a JSON array of lens presets, rejecting the whole file if any
/// preset fails validation.
pub fn load_lenses_json(json: &str) -> Result<Vec<LensPreset>, ScreenerError> {
    let lenses: Vec<LensPreset> = serde_json::from_str(json)?;
    for lens in &lenses {
        if let Err(e) = lens.validate() {
            warn!(lens = %lens.name, error = %e, "Rejecting lens file");
            return Err(e);
        }
    }
    Ok(lenses)
}

/// Built-ins with any same-named (case-insensitive) custom preset replacing
/// its built-in, and new names appended.
pub fn merge_lenses(custom: Vec<LensPreset>) -> Vec<LensPreset> {
    let mut merged = builtin_lenses();
    for lens in custom {
        let existing = merged
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(lens.name.trim()));
        match existing {
            Some(i) => merged[i] = lens,
            None => merged.push(lens),
        }
    }
    merged
}
