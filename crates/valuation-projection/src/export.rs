use csv::Writer;

use crate::{ProjectionError, ProjectionPaths, Scenario};

fn cell(value: f64) -> String {
    format!("{:.2}", value)
}

fn opt_cell(value: Option<f64>) -> String {
    value.map(cell).unwrap_or_default()
}

fn pct_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ProjectionError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ProjectionError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Year-by-year rows for one scenario: `year,eps,pe,price,target`.
/// The target column is blank when the projection has no target CAGR.
pub fn export_csv(paths: &ProjectionPaths, scenario: Scenario) -> Result<String, ProjectionError> {
    let pe = paths
        .pe_path(scenario)
        .ok_or(ProjectionError::MissingScenario(scenario))?;
    let prices = paths
        .price_path(scenario)
        .ok_or(ProjectionError::MissingScenario(scenario))?;
    let target = paths.target_path();

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(["year", "eps", "pe", "price", "target"])?;
    for t in 0..=paths.years as usize {
        writer.write_record([
            t.to_string(),
            cell(paths.eps_path[t]),
            cell(pe[t]),
            cell(prices[t]),
            opt_cell(target.as_ref().map(|path| path[t])),
        ])?;
    }
    finish(writer)
}

/// One row of terminal values per scenario present in the projection
pub fn export_summary_csv(paths: &ProjectionPaths) -> Result<String, ProjectionError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record([
        "scenario",
        "price_n",
        "implied_cagr",
        "required_entry",
        "margin_of_safety",
    ])?;
    for scenario in paths.scenarios() {
        let Some(terminal) = paths.terminal(scenario) else {
            continue;
        };
        writer.write_record([
            scenario.to_string(),
            cell(terminal.price_n),
            pct_cell(Some(terminal.implied_cagr)),
            opt_cell(terminal.required_entry),
            pct_cell(terminal.margin_of_safety),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_paths, ProjectionParams};

    fn paths(target: Option<f64>) -> ProjectionPaths {
        build_paths(&ProjectionParams {
            eps0: 5.0,
            growth: 0.0,
            years: 2,
            price_today: 100.0,
            pe_now: Some(20.0),
            pe_bear: Some(10.0),
            target_cagr: target,
            ..Default::default()
        })
    }

    #[test]
    fn test_export_csv_rows() {
        let csv = export_csv(&paths(Some(0.10)), Scenario::Bear).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "year,eps,pe,price,target");
        assert_eq!(lines[1], "0,5.00,20.00,100.00,100.00");
        assert_eq!(lines[2], "1,5.00,15.00,75.00,110.00");
        assert_eq!(lines[3], "2,5.00,10.00,50.00,121.00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_export_csv_blank_target() {
        let csv = export_csv(&paths(None), Scenario::Constant).unwrap();
        assert_eq!(csv.lines().nth(1), Some("0,5.00,20.00,100.00,"));
    }

    #[test]
    fn test_export_missing_scenario() {
        let err = export_csv(&paths(None), Scenario::Bull).unwrap_err();
        assert!(matches!(err, ProjectionError::MissingScenario(Scenario::Bull)));
    }

    #[test]
    fn test_summary_has_row_per_scenario() {
        let csv = export_summary_csv(&paths(Some(0.0))).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        // no bull, mid or custom terminal was given
        let names: Vec<&str> = rows.iter().map(|r| &r[0]).collect();
        assert_eq!(names, vec!["bear", "constant", "current"]);
        assert_eq!(&rows[0][4], "-1.0000");
    }
}
