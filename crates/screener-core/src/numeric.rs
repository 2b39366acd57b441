//! Numeric normalization helpers shared by the scorers and the projection model.
//!
//! None of these functions fail: anything that cannot be read as a finite
//! number comes back as `None` and is excluded downstream.

use crate::{Field, MetricValue};

/// Parse a cell as a finite number. Strings are trimmed; `%` suffixes are
/// rejected here (see [`to_points`]). Flags are not numbers.
pub fn to_numeric(value: &MetricValue) -> Option<f64> {
    match value {
        MetricValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
        MetricValue::Text(s) => parse_finite(s.trim()),
        MetricValue::Flag(_) => None,
    }
}

/// [`to_numeric`] over an optional field
pub fn numeric(field: &Field) -> Option<f64> {
    field.as_ref().and_then(to_numeric)
}

/// Read a percent-like cell in "points" (21.0 means 21%).
///
/// Accepts `21`, `0.21` and `"21%"`. Magnitudes strictly inside (-1, 1),
/// other than zero, are treated as fractions and multiplied by 100.
/// Exactly `1` and `-1` stay as one point.
pub fn to_points(value: &MetricValue) -> Option<f64> {
    let n = match value {
        MetricValue::Text(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            parse_finite(digits)?
        }
        other => to_numeric(other)?,
    };

    if n > -1.0 && n < 1.0 && n != 0.0 {
        Some(n * 100.0)
    } else {
        Some(n)
    }
}

/// [`to_points`] over an optional field
pub fn points(field: &Field) -> Option<f64> {
    field.as_ref().and_then(to_points)
}

/// Read a yes/no cell. Numbers are true when non-zero.
pub fn to_flag(value: &MetricValue) -> Option<bool> {
    match value {
        MetricValue::Flag(b) => Some(*b),
        MetricValue::Number(n) if n.is_finite() => Some(*n != 0.0),
        MetricValue::Number(_) => None,
        MetricValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
    }
}

pub fn flag(field: &Field) -> Option<bool> {
    field.as_ref().and_then(to_flag)
}

/// Trimmed, lower-cased text of a cell; blank strings are absent
pub fn text(field: &Field) -> Option<String> {
    match field {
        Some(MetricValue::Text(s)) => {
            let t = s.trim().to_ascii_lowercase();
            if t.is_empty() {
                None
            } else {
                Some(t)
            }
        }
        _ => None,
    }
}

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}

/// Clamp to the 0-10 score scale
pub fn cap10(x: f64) -> f64 {
    clamp(x, 0.0, 10.0)
}

/// Round half away from zero to `decimals` places
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (x * factor).round() / factor
}

fn parse_finite(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
