use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use fundamental_scoring::{
    compute_confidence, Confidence, Contributors, FundamentalScoringEngine, Verdict,
};
use screener_core::resolver::fill_pe_fwd;
use screener_core::{CategoryScores, LensPreset, MarginOfSafetyStore, MetricRecord, Recommendation};
use valuation_projection::{derive_band, PeBand};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenedTicker {
    pub ticker: String,
    pub scores: CategoryScores,
    pub contributors: Contributors,
    pub verdict: Verdict,
    pub confidence: Confidence,
    /// Derived P/E band with the provenance of each bound
    pub band: PeBand,
}

impl ScreenedTicker {
    /// Sort key; unscored tickers rank last
    pub fn rank_score(&self) -> f64 {
        self.verdict.final_score.unwrap_or(f64::NEG_INFINITY)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerResult {
    pub lens: String,
    pub results: Vec<ScreenedTicker>,
    pub total_screened: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ScreenerResult {
    pub fn count(&self, recommendation: Recommendation) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict.recommendation == recommendation)
            .count()
    }
}

/// Scores records under one lens and annotates each with the cached
/// margin of safety. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct Screener {
    engine: Arc<FundamentalScoringEngine>,
    lens: Arc<LensPreset>,
    store: Arc<dyn MarginOfSafetyStore>,
    mos_band: f64,
}

impl Screener {
    pub fn new(lens: LensPreset, store: Arc<dyn MarginOfSafetyStore>, mos_band: f64) -> Self {
        Self {
            engine: Arc::new(FundamentalScoringEngine::new()),
            lens: Arc::new(lens),
            store,
            mos_band,
        }
    }

    pub fn lens(&self) -> &LensPreset {
        &self.lens
    }

    pub fn evaluate(&self, metrics: &MetricRecord) -> ScreenedTicker {
        let mut metrics = metrics.clone();
        fill_pe_fwd(&mut metrics);

        let card = self.engine.score(&metrics, &self.lens);
        let confidence = compute_confidence(&metrics, &self.lens.name);
        let mos = self.store.get(&metrics.ticker);
        let verdict = Verdict::annotate(
            card.final_score,
            mos,
            Some(confidence.pct),
            &self.lens,
            self.mos_band,
        );

        tracing::debug!(
            "{}: score={:?} verdict={} confidence={}",
            metrics.ticker,
            card.final_score,
            verdict.recommendation,
            confidence.grade
        );

        ScreenedTicker {
            band: derive_band(&metrics),
            ticker: metrics.ticker,
            scores: card.scores,
            contributors: card.contributors,
            verdict,
            confidence,
        }
    }

    /// Evaluate every record concurrently, best score first
    pub async fn screen(&self, records: Vec<MetricRecord>) -> ScreenerResult {
        let total_screened = records.len();
        tracing::info!("📊 Screening {} tickers with lens {}", total_screened, self.lens.name);

        let mut tasks = JoinSet::new();
        for record in records {
            let screener = self.clone();
            tasks.spawn(async move { screener.evaluate(&record) });
        }

        let mut results = Vec::with_capacity(total_screened);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(screened) => results.push(screened),
                Err(e) => tracing::error!("Task error: {}", e),
            }
        }

        results.sort_by(|a, b| {
            b.rank_score()
                .partial_cmp(&a.rank_score())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.ticker.cmp(&b.ticker))
        });

        let result = ScreenerResult {
            lens: self.lens.name.clone(),
            results,
            total_screened,
            timestamp: chrono::Utc::now(),
        };

        tracing::info!(
            "✅ Screen complete: {} BUY, {} WATCH, {} AVOID, {} insufficient",
            result.count(Recommendation::Buy),
            result.count(Recommendation::Watch),
            result.count(Recommendation::Avoid),
            result.count(Recommendation::InsufficientData)
        );

        result
    }
}
