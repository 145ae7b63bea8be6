//! Adaptive price impact.
//!
//! `base_impact` is fixed once per engine from the reference series' return
//! volatility. Every tick it is scaled down by the trailing realized
//! volatility of the synthetic path:
//!
//! ```text
//! impact = base / (1 + recent_vol * VOL_SENSITIVITY)
//! ```
//!
//! so a turbulent market absorbs the same order flow with smaller moves.

use crate::data::stats::pct_change_std;
use crate::data::ReferencePriceSeries;

/// Aggregate demand is clamped to `[-DEMAND_LIMIT, DEMAND_LIMIT]`.
pub const DEMAND_LIMIT: f64 = 50.0;
/// Number of trailing prices used for realized volatility.
pub const VOL_WINDOW: usize = 20;
/// Sensitivity of impact to trailing volatility.
pub const VOL_SENSITIVITY: f64 = 100.0;
/// Scale from reference return volatility to base impact.
pub const IMPACT_SCALE: f64 = 0.01;

/// Base impact for a reference series: `std(pct_change) * IMPACT_SCALE`.
///
/// A series too short to estimate volatility yields zero impact, which leaves
/// only the noise term moving the price.
pub fn base_impact(reference: &ReferencePriceSeries) -> f64 {
    let impact = reference.return_volatility() * IMPACT_SCALE;
    if impact.is_finite() && impact >= 0.0 {
        impact
    } else {
        tracing::warn!(
            reference_len = reference.len(),
            "reference series too short to estimate volatility; using zero base impact"
        );
        0.0
    }
}

/// Realized volatility over the last `VOL_WINDOW` prices.
///
/// `None` until the history holds more than `VOL_WINDOW` prices.
pub fn trailing_volatility(history: &[f64]) -> Option<f64> {
    if history.len() <= VOL_WINDOW {
        return None;
    }
    Some(pct_change_std(&history[history.len() - VOL_WINDOW..]))
}

/// Impact factor for the next price update.
///
/// Falls back to `base` when trailing volatility is unavailable, zero, or not
/// finite. The result never exceeds `base` for non-negative `base`.
pub fn recalibrate(base: f64, history: &[f64]) -> f64 {
    match trailing_volatility(history) {
        Some(vol) if vol.is_finite() && vol > 0.0 => base / (1.0 + vol * VOL_SENSITIVITY),
        Some(vol) => {
            tracing::debug!(vol, "degenerate trailing volatility; impact stays at base");
            base
        }
        None => base,
    }
}

/// Clamp aggregate demand to the allowed range. NaN maps to zero.
pub fn clamp_demand(demand: f64) -> f64 {
    if demand.is_nan() {
        return 0.0;
    }
    demand.clamp(-DEMAND_LIMIT, DEMAND_LIMIT)
}

/// Multiplicative price factor `exp(demand * impact)`, or `None` if it is
/// not finite and positive.
pub fn price_factor(total_demand: f64, impact: f64) -> Option<f64> {
    let factor = (total_demand * impact).exp();
    (factor.is_finite() && factor > 0.0).then_some(factor)
}
