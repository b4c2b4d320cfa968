//! A measurement session: several rounds over one connection.

use tracing::debug;

use crate::client::ProbeConfig;
use crate::emitter::Emitter;
use crate::error::{ProbeError, Result};
use crate::round::{self, RoundResult, RoundSettings};
use crate::rtt::RttEstimator;
use crate::summary::{RoundReport, SessionSummary};
use crate::transport::Transport;

/// State that survives round boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Reads still to skip before the steady-state estimator anchors.
    pub warmup_remaining: u32,
    /// Round-trip latency, smoothed over the whole session.
    pub rtt: RttEstimator,
}

impl SessionState {
    /// Fresh state with `warmup_skips` reads to skip.
    pub fn new(warmup_skips: u32) -> Self {
        SessionState {
            warmup_remaining: warmup_skips,
            rtt: RttEstimator::new(),
        }
    }
}

/// Running sums over completed rounds.
///
/// A round without a bandwidth or RTT estimate contributes zero to the
/// corresponding sum but still counts towards the divisor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTotals {
    rounds: u32,
    bytes: u64,
    steady_bandwidth: f64,
    bandwidth: f64,
    rtt: f64,
}

impl SessionTotals {
    /// Add a completed round.
    pub fn add(&mut self, result: &RoundResult) {
        self.rounds += 1;
        self.bytes += result.bytes;
        self.steady_bandwidth += result.steady_bandwidth.unwrap_or(0.0);
        self.bandwidth += result.bandwidth.unwrap_or(0.0);
        self.rtt += result.rtt.unwrap_or(0.0);
    }

    /// Rounds added so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Bytes read over all rounds.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Average steady-state bandwidth in MiB/s.
    pub fn avg_steady_bandwidth(&self) -> f64 {
        self.average(self.steady_bandwidth)
    }

    /// Average end-to-end bandwidth in MiB/s.
    pub fn avg_bandwidth(&self) -> f64 {
        self.average(self.bandwidth)
    }

    /// Average RTT in seconds.
    pub fn avg_rtt(&self) -> f64 {
        self.average(self.rtt)
    }

    fn average(&self, sum: f64) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            sum / self.rounds as f64
        }
    }
}

/// Run `config.rounds` rounds over `transport`.
///
/// The warm-up counter and the RTT estimate carry over between rounds;
/// everything else starts afresh. The session stops at the first fatal
/// error, or before the next request once the server has closed the
/// connection.
pub async fn run<T: Transport>(
    transport: &mut T,
    config: &ProbeConfig,
    emitter: &mut dyn Emitter,
) -> Result<SessionSummary> {
    let request = config.target.request();
    let mut buf = vec![0u8; config.read_buffer_size];
    let mut state = SessionState::new(config.warmup_skips);
    let mut totals = SessionTotals::default();
    let mut closed = false;

    for round in 1..=config.rounds {
        if closed {
            return Err(ProbeError::ConnectionClosed);
        }
        emitter.on_round_starting(round)?;

        let settings = RoundSettings {
            round,
            idle_timeout: config.idle_timeout,
            progress: config.progress,
        };
        let outcome =
            round::run(transport, &request, &mut buf, &mut state, settings, emitter).await?;
        closed = outcome.closed;

        totals.add(&outcome.result);
        debug!(
            round,
            warmup_remaining = state.warmup_remaining,
            rtt = ?state.rtt.estimate(),
            "session state after round"
        );
        emitter.on_round_complete(&RoundReport::new(round, &outcome.result))?;
    }

    Ok(SessionSummary::new(config, &totals))
}
