//! screener: score metric files under a lens and project valuation scenarios.
//!
//! Usage:
//!   screener lenses
//!   screener score --metrics metrics.csv --lens "Warren Buffett"
//!   screener project --eps 5 --price 100 --pe-now 20 --growth 0.15 --pe-bear 15 --pe-bull 25 --target 0.12
//!   screener screen --metrics metrics.csv --target 0.10 --years 7 --csv ranked.csv

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use fundamental_scoring::Thresholds;
use screener_core::{Category, LensPreset};
use screener_orchestrator::import::load_metrics;
use screener_orchestrator::{
    export_results_csv, Assumptions, ScreenedTicker, ScreenerApp, ScreenerConfig,
};
use valuation_projection::{
    export_csv, export_summary_csv, has_inverted_band, BandEdges, PeBand,
    ProjectionParams, Scenario,
};

#[derive(Parser)]
#[command(name = "screener")]
#[command(about = "Lens-weighted stock scoring and valuation projections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available lens presets
    Lenses {
        #[arg(long)]
        json: bool,
    },

    /// Score every record in a CSV or JSON metrics file
    Score {
        #[arg(short, long)]
        metrics: PathBuf,

        /// Lens name (default: SCREENER_LENS)
        #[arg(short, long)]
        lens: Option<String>,

        /// Extra lens presets, merged over the built-ins
        #[arg(long)]
        lenses: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Project EPS x P/E scenarios for a single ticker
    Project {
        #[arg(long, default_value = "TICKER")]
        ticker: String,

        #[arg(long)]
        eps: f64,

        #[arg(long)]
        price: f64,

        #[arg(long)]
        pe_now: f64,

        /// Yearly EPS growth as a fraction (0.15 = 15%)
        #[arg(long, default_value_t = 0.0)]
        growth: f64,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        years: Option<u32>,

        #[arg(long)]
        pe_bear: Option<f64>,

        #[arg(long)]
        pe_mid: Option<f64>,

        #[arg(long)]
        pe_bull: Option<f64>,

        /// Yearly drift of the current multiple (fraction)
        #[arg(long)]
        pe_trend: Option<f64>,

        #[arg(long)]
        pe_custom: Option<f64>,

        /// Target CAGR as a fraction (default: SCREENER_TARGET_CAGR)
        #[arg(long)]
        target: Option<f64>,

        #[arg(long, default_value = "custom")]
        scenario: Scenario,

        /// Write the year-by-year rows of `--scenario` here
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Project every record, then screen them with the resulting margins of safety
    Screen {
        #[arg(short, long)]
        metrics: PathBuf,

        #[arg(short, long)]
        lens: Option<String>,

        #[arg(long)]
        lenses: Option<PathBuf>,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        years: Option<u32>,

        #[arg(long)]
        json: bool,

        /// Also write the ranked results to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener=info,screener_orchestrator=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ScreenerConfig::from_env().context("Invalid SCREENER_* configuration")?;

    match cli.command {
        Commands::Lenses { json } => {
            let app = ScreenerApp::new(config)?;
            print_lenses(&app.lenses, json)?;
        }
        Commands::Score { metrics, lens, lenses, json } => {
            if lenses.is_some() {
                config.lenses_file = lenses;
            }
            let app = ScreenerApp::new(config)?;
            let lens = app.lens(lens.as_deref())?;
            let records = load_metrics(&metrics)?;
            let screener = app.screener(lens);
            let results: Vec<ScreenedTicker> = records.iter().map(|r| screener.evaluate(r)).collect();
            print_results(screener.lens(), &results, json)?;
        }
        Commands::Project {
            ticker,
            eps,
            price,
            pe_now,
            growth,
            years,
            pe_bear,
            pe_mid,
            pe_bull,
            pe_trend,
            pe_custom,
            target,
            scenario,
            csv,
        } => {
            let edges = if has_inverted_band(pe_bear, pe_bull) {
                tracing::warn!("Bear P/E {:?} is above bull P/E {:?}, using them swapped", pe_bear, pe_bull);
                BandEdges { bear: pe_bull, bull: pe_bear }
            } else {
                BandEdges { bear: pe_bear, bull: pe_bull }
            };
            let params = ProjectionParams {
                eps0: eps,
                growth,
                years: years.unwrap_or(config.horizon_years),
                price_today: price,
                pe_bear,
                pe_mid,
                pe_bull,
                pe_trend,
                pe_custom_terminal: pe_custom,
                target_cagr: Some(target.unwrap_or(config.target_cagr)),
                pe_now: Some(pe_now),
                band: edges,
            };

            let app = ScreenerApp::new(config)?;
            let paths = app.projection_service().with_scenario(scenario).project(&ticker, &params);
            if paths.is_empty() {
                anyhow::bail!("Nothing to project: check EPS, P/E and horizon");
            }

            print!("{}", export_summary_csv(&paths)?);
            if let Some(path) = csv {
                let rows = export_csv(&paths, scenario)?;
                std::fs::write(&path, rows)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} projection to {}", scenario, path.display());
            }
        }
        Commands::Screen { metrics, lens, lenses, target, years, json, csv } => {
            if lenses.is_some() {
                config.lenses_file = lenses;
            }
            let target = target.unwrap_or(config.target_cagr);
            let years = years.unwrap_or(config.horizon_years);

            let app = ScreenerApp::new(config)?;
            let lens = app.lens(lens.as_deref())?;
            let records = load_metrics(&metrics)?;

            let projector = app.projection_service();
            let mut projected = 0;
            for record in &records {
                if let Some(assumptions) = Assumptions::from_metrics(record, Some(target), years) {
                    if !projector.project(&record.ticker, &assumptions.params).is_empty() {
                        projected += 1;
                    }
                }
            }
            info!("Projected {}/{} tickers over {} years", projected, records.len(), years);

            let result = app.screener(lens.clone()).screen(records).await;
            print_results(&lens, &result.results, json)?;
            if let Some(path) = csv {
                let rows = export_results_csv(&result.lens, &result.results)?;
                std::fs::write(&path, rows)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Wrote {} results to {}", result.results.len(), path.display());
            }
        }
    }

    Ok(())
}

fn print_lenses(lenses: &[LensPreset], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(lenses)?);
        return Ok(());
    }

    print!("{:<20}", "lens");
    for category in Category::ALL {
        print!(" {:>6}", short_name(category));
    }
    println!(" {:>5} {:>5}", "buy", "watch");

    for lens in lenses {
        let thresholds = Thresholds::from_lens(lens);
        print!("{:<20}", lens.name);
        for category in Category::ALL {
            print!(" {:>6}", fmt_opt(lens.weights.get(category), 0));
        }
        println!(" {:>5.1} {:>5.1}", thresholds.buy, thresholds.watch);
    }
    Ok(())
}

fn print_results(lens: &LensPreset, results: &[ScreenedTicker], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("lens: {}", lens.name);
    print!(
        "{:<8} {:>6} {:<18} {:>7} {:>4} {:>5} {:<16}",
        "ticker", "score", "verdict", "mos", "sig", "conf", "pe band"
    );
    for category in Category::ALL {
        print!(" {:>6}", short_name(category));
    }
    println!();

    for r in results {
        print!(
            "{:<8} {:>6} {:<18} {:>7} {:>4} {:>5} {:<16}",
            r.ticker,
            fmt_opt(r.verdict.final_score, 2),
            r.verdict.recommendation.as_str(),
            r.verdict
                .margin_of_safety
                .map(|m| format!("{:.1}%", m * 100.0))
                .unwrap_or_else(|| "-".into()),
            r.verdict.mos_signal.map(|s| s.as_str()).unwrap_or("-"),
            format!("{:.0}{}", r.confidence.pct, r.confidence.grade),
            fmt_band(&r.band),
        );
        for (_, score) in r.scores.iter() {
            print!(" {:>6}", fmt_opt(score, 1));
        }
        println!();
    }
    Ok(())
}

fn short_name(category: Category) -> &'static str {
    match category {
        Category::Valuation => "val",
        Category::Quality => "qual",
        Category::CapitalAllocation => "cap",
        Category::Growth => "growth",
        Category::Moat => "moat",
        Category::Risk => "risk",
        Category::Macro => "macro",
        Category::Narrative => "narr",
        Category::Dilution => "dil",
    }
}

/// `bear-bull source`, flagging a band that leans on the trailing P/E estimate
fn fmt_band(band: &PeBand) -> String {
    format!(
        "{}-{} {}",
        fmt_opt(band.bear.value, 1),
        fmt_opt(band.bull.value, 1),
        band.source()
    )
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}
