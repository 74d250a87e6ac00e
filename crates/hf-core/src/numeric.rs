use crate::HfError;

/// Floating point type used for every flow quantity.
pub type Real = f64;

/// Absolute/relative tolerance pair for flow comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, HfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(HfError::NonFinite { what, value: v })
    }
}

/// Flows, thresholds and proportions are all nonnegative quantities.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, HfError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(HfError::Negative { what, value: v });
    }
    Ok(v)
}
