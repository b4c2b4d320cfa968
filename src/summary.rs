use serde::Serialize;

use crate::client::ProbeConfig;
use crate::round::RoundResult;
use crate::session::SessionTotals;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub bytes: u64,
    pub reads: u64,
    pub steady_bandwidth_mib_s: Option<f64>,
    pub bandwidth_mib_s: Option<f64>,
    pub rtt_ms: Option<f64>,
}

impl RoundReport {
    pub fn new(round: u32, result: &RoundResult) -> Self {
        RoundReport {
            round,
            bytes: result.bytes,
            reads: result.reads,
            steady_bandwidth_mib_s: result.steady_bandwidth,
            bandwidth_mib_s: result.bandwidth,
            rtt_ms: result.rtt.map(|s| s * 1000.0),
        }
    }

    pub fn kbytes(&self) -> f64 {
        self.bytes as f64 / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub target: String,
    pub rounds: u32,
    pub warmup_skips: u32,
    pub total_bytes: u64,
    pub avg_steady_bandwidth_mib_s: f64,
    pub avg_bandwidth_mib_s: f64,
    pub avg_rtt_ms: f64,
}

impl SessionSummary {
    pub fn new(config: &ProbeConfig, totals: &SessionTotals) -> Self {
        SessionSummary {
            target: config.target.to_string(),
            rounds: totals.rounds(),
            warmup_skips: config.warmup_skips,
            total_bytes: totals.bytes(),
            avg_steady_bandwidth_mib_s: totals.avg_steady_bandwidth(),
            avg_bandwidth_mib_s: totals.avg_bandwidth(),
            avg_rtt_ms: totals.avg_rtt() * 1000.0,
        }
    }
}
