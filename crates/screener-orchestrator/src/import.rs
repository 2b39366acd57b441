//! Metric record import from CSV exports and JSON arrays.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use screener_core::{MetricField, MetricRecord, MetricValue};

const TICKER_HEADERS: &[&str] = &["ticker", "ticker_symbol", "symbol"];

/// Raw cell to a metric value. Numbers and booleans are typed here; anything
/// else (`"21%"`, `"yes"`, tags) stays text for the readers to interpret.
fn parse_cell(raw: &str) -> Option<MetricValue> {
    let cell = raw.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(n) = cell.parse::<f64>() {
        if n.is_finite() {
            return Some(MetricValue::Number(n));
        }
    }
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(MetricValue::Flag(true)),
        "false" => Some(MetricValue::Flag(false)),
        _ => Some(MetricValue::Text(cell.to_string())),
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Ticker,
    AsOf,
    Metric(MetricField),
    Ignored,
}

/// Parse a CSV with one row per ticker.
///
/// Headers are matched case-insensitively against metric names. Unknown
/// columns are ignored, blank cells are absent and rows without a ticker are
/// skipped. Only a structurally broken file is an error.
pub fn parse_metrics_csv(input: &str) -> Result<Vec<MetricRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let columns: Vec<Column> = headers
        .iter()
        .map(|h| {
            let name = h.trim().to_ascii_lowercase();
            if TICKER_HEADERS.contains(&name.as_str()) {
                Column::Ticker
            } else if name == "as_of_date" {
                Column::AsOf
            } else if let Some(field) = MetricField::from_name(&name) {
                Column::Metric(field)
            } else {
                debug!(column = %h, "Ignoring unknown column");
                Column::Ignored
            }
        })
        .collect();

    if !columns.iter().any(|c| matches!(c, Column::Ticker)) {
        anyhow::bail!("CSV has no ticker column (expected one of {:?})", TICKER_HEADERS);
    }

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Malformed CSV row {}", line + 2))?;
        let mut record = MetricRecord::default();

        for (column, cell) in columns.iter().zip(row.iter()) {
            match column {
                Column::Ticker => record.ticker = cell.trim().to_uppercase(),
                Column::AsOf => {
                    if !cell.is_empty() {
                        match NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
                            Ok(date) => record.as_of_date = Some(date),
                            Err(e) => warn!(row = line + 2, value = %cell, "Bad as_of_date: {}", e),
                        }
                    }
                }
                Column::Metric(field) => field.set(&mut record, parse_cell(cell)),
                Column::Ignored => {}
            }
        }

        if record.ticker.is_empty() {
            warn!(row = line + 2, "Skipping row without ticker");
            continue;
        }
        records.push(record);
    }

    info!("Imported {} metric records from CSV", records.len());
    Ok(records)
}

/// Parse a JSON array of metric records
pub fn parse_metrics_json(input: &str) -> Result<Vec<MetricRecord>> {
    let records: Vec<MetricRecord> =
        serde_json::from_str(input).context("Failed to parse metrics JSON")?;
    let total = records.len();
    let records: Vec<MetricRecord> = records
        .into_iter()
        .filter(|r| !r.ticker.trim().is_empty())
        .map(|mut r| {
            r.ticker = r.ticker.trim().to_uppercase();
            r
        })
        .collect();
    if records.len() < total {
        warn!("Skipped {} JSON records without ticker", total - records.len());
    }
    Ok(records)
}

/// Pick the parser from the file extension; anything but `.json` is CSV
pub fn load_metrics(path: &std::path::Path) -> Result<Vec<MetricRecord>> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_metrics_json(&input)
    } else {
        parse_metrics_csv(&input)
    }
}
