use anyhow::{Context, Result};
use csv::Writer;

use crate::ScreenedTicker;

fn opt_cell(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

/// One row per screened ticker. Text cells (ticker, lens) are quoted by the
/// writer whenever they contain a delimiter or quote.
pub fn export_results_csv(lens: &str, results: &[ScreenedTicker]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        "ticker",
        "lens",
        "final_score",
        "recommendation",
        "margin_of_safety",
        "mos_signal",
        "confidence_pct",
        "confidence_grade",
        "pe_bear",
        "pe_bull",
        "band_source",
    ])?;

    for r in results {
        writer.write_record([
            r.ticker.clone(),
            lens.to_string(),
            opt_cell(r.verdict.final_score, 2),
            r.verdict.recommendation.to_string(),
            opt_cell(r.verdict.margin_of_safety, 4),
            r.verdict.mos_signal.map(|s| s.to_string()).unwrap_or_default(),
            format!("{:.1}", r.confidence.pct),
            r.confidence.grade.to_string(),
            opt_cell(r.band.bear.value, 1),
            opt_cell(r.band.bull.value, 1),
            r.band.source().to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush screen results")?;
    String::from_utf8(bytes).context("Screen results are not UTF-8")
}
