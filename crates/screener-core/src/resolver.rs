//! Guards for derived valuation inputs.

use crate::numeric::numeric;
use crate::{MetricRecord, MetricValue};

/// Forward EPS above this multiple of trailing EPS is treated as a bad feed value
pub const MAX_FORWARD_TO_TRAILING_EPS: f64 = 3.0;

/// Validate a consensus forward EPS against trailing EPS.
///
/// Returns `None` for non-positive values, and for values more than
/// [`MAX_FORWARD_TO_TRAILING_EPS`] times a positive trailing EPS.
pub fn validate_eps_forward(eps_forward: Option<f64>, eps_ttm: Option<f64>, ticker: &str) -> Option<f64> {
    let eps_forward = match eps_forward {
        Some(v) if v.is_finite() && v > 0.0 => v,
        other => {
            tracing::debug!("{}: eps_forward={:?} is not a positive number, dropping", ticker, other);
            return None;
        }
    };

    if let Some(ttm) = eps_ttm.filter(|v| v.is_finite() && *v > 0.0) {
        if eps_forward > MAX_FORWARD_TO_TRAILING_EPS * ttm {
            tracing::warn!(
                "{}: eps_forward={:.4} is more than {}x eps_ttm={:.4}, treating as invalid",
                ticker,
                eps_forward,
                MAX_FORWARD_TO_TRAILING_EPS,
                ttm
            );
            return None;
        }
    }

    Some(eps_forward)
}

/// Forward P/E from a price and an already validated forward EPS
pub fn compute_pe_fwd(price_current: Option<f64>, eps_forward: Option<f64>) -> Option<f64> {
    match (price_current, eps_forward) {
        (Some(price), Some(eps)) if price.is_finite() && eps.is_finite() && eps > 0.0 => {
            Some(price / eps).filter(|pe| pe.is_finite())
        }
        _ => None,
    }
}

/// Fill a missing `pe_fwd` from price and validated forward EPS.
/// A provider-supplied `pe_fwd` is left alone. Returns true when filled.
pub fn fill_pe_fwd(metrics: &mut MetricRecord) -> bool {
    if numeric(&metrics.pe_fwd).is_some() {
        return false;
    }
    let eps_forward = validate_eps_forward(
        numeric(&metrics.eps_forward),
        numeric(&metrics.eps_ttm),
        &metrics.ticker,
    );
    match compute_pe_fwd(numeric(&metrics.price_current), eps_forward) {
        Some(pe) => {
            metrics.pe_fwd = Some(MetricValue::Number(pe));
            true
        }
        None => false,
    }
}
