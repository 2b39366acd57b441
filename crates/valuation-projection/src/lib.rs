//! Multi-year EPS x P/E price projections over bear, bull and steady-state
//! scenarios, plus the P/E band those scenarios glide toward.

pub mod band;
pub mod error;
pub mod export;
pub mod projection;

pub use band::{band_mid, clean_band, derive_band, BandBound, BandEdges, BandSource, CleanBand, PeBand};
pub use error::ProjectionError;
pub use export::{export_csv, export_summary_csv};
pub use projection::{
    build_paths, has_inverted_band, ProjectionParams, ProjectionPaths, Scenario, Terminal,
    MAX_HORIZON_YEARS,
};
