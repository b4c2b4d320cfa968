//! Interval arithmetic on probe timestamps.

use tokio::time::Instant;

/// Elapsed time `later - earlier` in fractional seconds.
///
/// The result is negative when `later` precedes `earlier`.
pub fn interval(later: Instant, earlier: Instant) -> f64 {
    match later.checked_duration_since(earlier) {
        Some(d) => d.as_secs_f64(),
        None => -earlier.duration_since(later).as_secs_f64(),
    }
}
