use thiserror::Error;

use crate::Scenario;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("No {0} path in this projection")]
    MissingScenario(Scenario),
}
