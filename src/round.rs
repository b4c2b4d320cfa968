//! One measurement round.
//!
//! A round sends the request, then alternates between a bounded readability
//! wait and a single read until the wait elapses with nothing to read. The
//! end of the response is never parsed: silence for longer than the idle
//! timeout is what ends a round, so a server pausing mid-response ends it
//! early.
//!
//! Every chunk is routed to two bandwidth estimators:
//! - the steady-state estimator, anchored at the first read after the
//!   session-wide warm-up skips run out;
//! - the end-to-end estimator, anchored at the first read of the round.
//!
//! The anchoring read itself only sets the anchor and is not folded in.

use std::io;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::bandwidth::BandwidthEstimator;
use crate::emitter::Emitter;
use crate::error::{ProbeError, Result};
use crate::params;
use crate::session::SessionState;
use crate::transport::{Readiness, Transport};

/// What a round measured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundResult {
    /// Bytes read during the round.
    pub bytes: u64,
    /// Number of reads that returned data.
    pub reads: u64,
    /// Steady-state bandwidth in MiB/s.
    pub steady_bandwidth: Option<f64>,
    /// End-to-end bandwidth in MiB/s.
    pub bandwidth: Option<f64>,
    /// Session RTT estimate after this round, in seconds.
    pub rtt: Option<f64>,
}

/// Per-round routing state. A fresh driver is created for every round.
#[derive(Debug, Clone)]
pub struct RoundDriver {
    request_sent: Instant,
    first_byte: Option<Instant>,
    steady_anchor: Option<Instant>,
    bytes: u64,
    reads: u64,
    steady: BandwidthEstimator,
    end_to_end: BandwidthEstimator,
}

impl RoundDriver {
    /// Start a round whose request was sent at `request_sent`.
    pub fn new(request_sent: Instant) -> Self {
        RoundDriver {
            request_sent,
            first_byte: None,
            steady_anchor: None,
            bytes: 0,
            reads: 0,
            steady: BandwidthEstimator::new(),
            end_to_end: BandwidthEstimator::new(),
        }
    }

    /// Route a chunk of `bytes` read at `now`.
    pub fn ingest(&mut self, session: &mut SessionState, now: Instant, bytes: u64) {
        self.bytes += bytes;
        self.reads += 1;

        if session.warmup_remaining > 0 {
            session.warmup_remaining -= 1;
        } else if let Some(anchor) = self.steady_anchor {
            self.steady.update(anchor, now, bytes);
        } else {
            self.steady_anchor = Some(now);
        }

        match self.first_byte {
            Some(anchor) => {
                self.end_to_end.update(anchor, now, bytes);
            }
            None => {
                session.rtt.update(self.request_sent, now);
                self.first_byte = Some(now);
            }
        }
    }

    /// Bytes read so far this round.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Reads that returned data so far this round.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Time the first byte of the round arrived.
    #[cfg(test)]
    pub fn first_byte(&self) -> Option<Instant> {
        self.first_byte
    }

    /// Anchor of the steady-state estimator.
    #[cfg(test)]
    pub fn steady_anchor(&self) -> Option<Instant> {
        self.steady_anchor
    }

    /// Close the round.
    pub fn finish(self, session: &SessionState) -> RoundResult {
        RoundResult {
            bytes: self.bytes,
            reads: self.reads,
            steady_bandwidth: self.steady.estimate(),
            bandwidth: self.end_to_end.estimate(),
            rtt: session.rtt.estimate(),
        }
    }
}

/// How a round ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    /// Measurements of the round.
    pub result: RoundResult,
    /// The server closed the connection during the round.
    pub closed: bool,
}

/// Knobs of a single round.
#[derive(Debug, Clone, Copy)]
pub struct RoundSettings {
    /// Round index, starting at 1. Only used for reporting.
    pub round: u32,
    /// Silence that ends the round.
    pub idle_timeout: Duration,
    /// Emit a progress tick every [`params::PROGRESS_INTERVAL`] reads.
    pub progress: bool,
}

/// Run one round over `transport`.
///
/// Send and read failures are fatal. A zero-length read ends the round and
/// is reported through [`RoundOutcome::closed`].
pub async fn run<T: Transport>(
    transport: &mut T,
    request: &[u8],
    buf: &mut [u8],
    session: &mut SessionState,
    settings: RoundSettings,
    emitter: &mut dyn Emitter,
) -> Result<RoundOutcome> {
    let request_sent = Instant::now();
    transport
        .send_all(request)
        .await
        .map_err(ProbeError::Send)?;
    debug!(round = settings.round, "request sent");

    let mut driver = RoundDriver::new(request_sent);
    let mut closed = false;

    loop {
        let readiness = transport
            .wait_readable(settings.idle_timeout)
            .await
            .map_err(ProbeError::Read)?;
        if readiness == Readiness::Idle {
            break;
        }

        let n = match transport.read_chunk(buf).await {
            Ok(0) => {
                warn!(round = settings.round, "server closed the connection");
                closed = true;
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!(round = settings.round, "spurious wake-up");
                continue;
            }
            Err(e) => return Err(ProbeError::Read(e)),
        };

        driver.ingest(session, Instant::now(), n as u64);

        if settings.progress && driver.reads().is_multiple_of(params::PROGRESS_INTERVAL) {
            emitter.on_progress(settings.round, driver.reads())?;
        }
    }

    debug!(
        round = settings.round,
        bytes = driver.bytes(),
        reads = driver.reads(),
        "round complete"
    );

    Ok(RoundOutcome {
        result: driver.finish(session),
        closed,
    })
}
