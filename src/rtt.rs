//! Smoothed round-trip latency.

use tokio::time::Instant;

use crate::clock;

/// Weight kept from the previous estimate on every update.
const HISTORY_WEIGHT: f64 = 0.8;
/// Weight given to the new sample.
const SAMPLE_WEIGHT: f64 = 0.2;

/// Exponentially weighted round-trip latency, in seconds.
///
/// Spans the whole session: it is never reset between rounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RttEstimator {
    estimate: Option<f64>,
}

impl RttEstimator {
    /// Create an estimator with no samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the time from `request_sent` to `first_byte` into the estimate.
    pub fn update(&mut self, request_sent: Instant, first_byte: Instant) -> f64 {
        let sample = clock::interval(first_byte, request_sent);
        let next = match self.estimate {
            None => sample,
            Some(prev) => HISTORY_WEIGHT * prev + SAMPLE_WEIGHT * sample,
        };
        self.estimate = Some(next);
        next
    }

    /// Current estimate in seconds.
    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn first_sample_is_estimate() {
        let sent = Instant::now();
        let mut rtt = RttEstimator::new();

        assert_eq!(rtt.estimate(), None);
        assert_eq!(rtt.update(sent, sent + Duration::from_millis(40)), 0.04);
        assert_eq!(rtt.estimate(), Some(0.04));
    }

    #[test]
    fn later_samples_are_smoothed() {
        let sent = Instant::now();
        let mut rtt = RttEstimator::new();

        let e0 = rtt.update(sent, sent + Duration::from_millis(100));
        let e1 = rtt.update(sent, sent + Duration::from_millis(600));

        assert_eq!(e1, 0.8 * e0 + 0.2 * 0.6);
        assert!((e1 - 0.2).abs() < 1e-12);
    }
}
