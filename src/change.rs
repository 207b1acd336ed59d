//! Percent-change calculation between a baseline and a current price

use crate::error::ChangeError;

/// Percent change from `start` to `current`
///
/// A zero baseline has no meaningful change, so it is reported as
/// [`ChangeError::DivideByZero`] rather than infinity or NaN. Callers leave
/// the entry's change absent in that case.
pub fn percent_change(start: f64, current: f64) -> Result<f64, ChangeError> {
    if start == 0.0 {
        return Err(ChangeError::DivideByZero { start, current });
    }

    let change = (current - start) * 100.0 / start;
    if !change.is_finite() {
        return Err(ChangeError::DivideByZero { start, current });
    }

    Ok(change)
}
