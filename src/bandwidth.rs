//! Harmonic-mean bandwidth estimation.
//!
//! Each update computes the instantaneous rate as the cumulative byte count
//! divided by the time since the anchor, then folds it into the running
//! estimate with a harmonic mean. Slow intervals pull the harmonic mean down
//! harder than an arithmetic mean would, which tracks the bottleneck rate.

use tokio::time::Instant;

use crate::clock;
use crate::params;

/// Running bandwidth estimate for one anchor choice, in MiB/s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandwidthEstimator {
    total_bytes: u64,
    samples: u32,
    estimate: Option<f64>,
}

impl BandwidthEstimator {
    /// Create an estimator with no bytes and no estimate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account `bytes` read at `now` against an interval starting at `start`.
    ///
    /// Returns the current estimate, or `None` if none has been produced yet.
    /// The bytes are always accumulated; an update whose elapsed time or rate
    /// is not positive leaves the estimate untouched.
    pub fn update(&mut self, start: Instant, now: Instant, bytes: u64) -> Option<f64> {
        self.total_bytes += bytes;

        let elapsed = clock::interval(now, start);
        if elapsed <= 0.0 {
            return self.estimate;
        }

        let current = (self.total_bytes as f64 / params::MIB) / elapsed;
        if !current.is_finite() || current <= 0.0 {
            return self.estimate;
        }

        let n = self.samples as f64;
        self.estimate = Some(match self.estimate {
            None => current,
            Some(prev) => (n + 1.0) / (n / prev + 1.0 / current),
        });
        self.samples += 1;

        self.estimate
    }

    /// Current estimate in MiB/s.
    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }

    /// Bytes accumulated since the last reset.
    #[cfg(test)]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Number of samples folded into the estimate.
    #[cfg(test)]
    pub fn samples(&self) -> u32 {
        self.samples
    }
}
