//! Mapping from the smoothed scroll percentage to clip time.

/// Wrap any finite real into `[0, 1)`.
///
/// Negative inputs wrap around (`-0.25` maps to `0.75`). Non-finite inputs
/// map to `0.0`.
#[inline]
pub fn wrap_unit(p: f64) -> f64 {
    if !p.is_finite() {
        return 0.0;
    }
    let w = p.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// Clip time for scroll percentage `p`, always in `[0, duration)`.
///
/// Returns `None` for a zero, negative or non-finite duration so callers
/// skip the update instead of evaluating a degenerate clip.
#[inline]
pub fn map_time(p: f64, duration: f32) -> Option<f32> {
    if !(duration.is_finite() && duration > 0.0) {
        return None;
    }
    let t = (f64::from(duration) * wrap_unit(p)) as f32;
    // f32 rounding can land on the upper bound
    Some(if t >= duration { 0.0 } else { t })
}
