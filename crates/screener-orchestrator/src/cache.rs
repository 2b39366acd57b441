use dashmap::DashMap;

use screener_core::MarginOfSafetyStore;

/// In-process margin-of-safety store keyed by upper-cased ticker.
///
/// Last write wins and entries never expire. Every projection replaces the
/// previous value, or removes it when no margin of safety came out.
#[derive(Debug, Default)]
pub struct MarginOfSafetyCache {
    entries: DashMap<String, f64>,
}

fn key(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

impl MarginOfSafetyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MarginOfSafetyStore for MarginOfSafetyCache {
    fn set(&self, ticker: &str, mos: f64) {
        if mos.is_finite() {
            self.entries.insert(key(ticker), mos);
        } else {
            self.remove(ticker);
        }
    }

    fn remove(&self, ticker: &str) {
        self.entries.remove(&key(ticker));
    }

    fn get(&self, ticker: &str) -> Option<f64> {
        self.entries.get(&key(ticker)).map(|entry| *entry.value())
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
