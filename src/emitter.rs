//! Output formatting for probe events.
//!
//! The [`Emitter`] trait defines callbacks for each stage of a probe run.
//! Two implementations are provided:
//! - [`HumanReadableEmitter`] — live progress and formatted per-round results on a terminal.
//! - [`JsonEmitter`] — one JSON object per line, suitable for machine consumption.

use std::io::Write;
use std::net::SocketAddr;

use serde::Serialize;

use crate::error::Result;
use crate::summary::{RoundReport, SessionSummary};
use crate::target::Target;

#[derive(Serialize)]
#[serde(tag = "type")]
enum Event<'a> {
    Connecting { target: String },
    Connected { target: String, peer: SocketAddr },
    RoundStarting { round: u32 },
    Progress { round: u32, reads: u64 },
    RoundComplete { report: &'a RoundReport },
    Error { error: &'a str },
    Summary { summary: &'a SessionSummary },
}

/// Callbacks for probe lifecycle events.
pub trait Emitter {
    /// Called before connecting to the target.
    fn on_connecting(&mut self, target: &Target) -> Result<()>;
    /// Called once the connection is established.
    fn on_connected(&mut self, target: &Target, peer: SocketAddr) -> Result<()>;
    /// Called before a round's request is sent.
    fn on_round_starting(&mut self, round: u32) -> Result<()>;
    /// Called periodically while a round is reading.
    fn on_progress(&mut self, round: u32, reads: u64) -> Result<()>;
    /// Called with the results of a finished round.
    fn on_round_complete(&mut self, report: &RoundReport) -> Result<()>;
    /// Called when the run aborts.
    fn on_error(&mut self, err: &str) -> Result<()>;
    /// Called after all rounds, with the session averages.
    fn on_summary(&mut self, s: &SessionSummary) -> Result<()>;
}

/// Emits human-readable progress and results to a writer.
pub struct HumanReadableEmitter<W: Write> {
    out: W,
}

impl<W: Write> HumanReadableEmitter<W> {
    /// Create a new emitter writing to `out`.
    pub fn new(out: W) -> Self {
        HumanReadableEmitter { out }
    }
}

fn or_dash(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:>9.3}"),
        None => format!("{:>9}", "-"),
    }
}

impl<W: Write> Emitter for HumanReadableEmitter<W> {
    fn on_connecting(&mut self, target: &Target) -> Result<()> {
        write!(self.out, "\rconnecting to {target}")?;
        self.out.flush()?;
        Ok(())
    }

    fn on_connected(&mut self, target: &Target, peer: SocketAddr) -> Result<()> {
        writeln!(self.out, "\rconnected to {} ({peer})", target.host)?;
        Ok(())
    }

    fn on_round_starting(&mut self, round: u32) -> Result<()> {
        write!(self.out, "\nRound {round}: reading")?;
        self.out.flush()?;
        Ok(())
    }

    fn on_progress(&mut self, _round: u32, _reads: u64) -> Result<()> {
        write!(self.out, ".")?;
        self.out.flush()?;
        Ok(())
    }

    fn on_round_complete(&mut self, r: &RoundReport) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{:>18}: {:>9.1} KB", "Read", r.kbytes())?;
        writeln!(
            self.out,
            "{:>18}: {} MB/s",
            "Steady bandwidth",
            or_dash(r.steady_bandwidth_mib_s)
        )?;
        writeln!(
            self.out,
            "{:>18}: {} MB/s",
            "Bandwidth",
            or_dash(r.bandwidth_mib_s)
        )?;
        writeln!(
            self.out,
            "{:>18}: {} ms",
            "Round-trip latency",
            or_dash(r.rtt_ms)
        )?;
        Ok(())
    }

    fn on_error(&mut self, err: &str) -> Result<()> {
        write!(self.out, "\nprobe failed: {err}\n")?;
        Ok(())
    }

    fn on_summary(&mut self, s: &SessionSummary) -> Result<()> {
        writeln!(self.out, "\nProbe results\n")?;
        writeln!(self.out, "{:>10}: {}", "Target", s.target)?;
        writeln!(self.out, "{:>10}: {}", "Rounds", s.rounds)?;
        writeln!(self.out, "{:>10}: {}", "Skips", s.warmup_skips)?;

        writeln!(self.out, "\n{:>22}", "Averages")?;
        writeln!(
            self.out,
            "{:>18}: {:>9.3} MB/s",
            "Steady bandwidth", s.avg_steady_bandwidth_mib_s
        )?;
        writeln!(
            self.out,
            "{:>18}: {:>9.3} MB/s",
            "Bandwidth", s.avg_bandwidth_mib_s
        )?;
        writeln!(
            self.out,
            "{:>18}: {:>9.3} ms",
            "Round-trip latency", s.avg_rtt_ms
        )?;

        Ok(())
    }
}

/// Emits one JSON object per line for each event.
pub struct JsonEmitter<W: Write> {
    out: W,
}

impl<W: Write> JsonEmitter<W> {
    /// Create a new JSON emitter writing to `out`.
    pub fn new(out: W) -> Self {
        JsonEmitter { out }
    }

    fn emit(&mut self, event: &Event) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.out, "{}", json)?;
        Ok(())
    }
}

impl<W: Write> Emitter for JsonEmitter<W> {
    fn on_connecting(&mut self, target: &Target) -> Result<()> {
        self.emit(&Event::Connecting {
            target: target.to_string(),
        })
    }

    fn on_connected(&mut self, target: &Target, peer: SocketAddr) -> Result<()> {
        self.emit(&Event::Connected {
            target: target.to_string(),
            peer,
        })
    }

    fn on_round_starting(&mut self, round: u32) -> Result<()> {
        self.emit(&Event::RoundStarting { round })
    }

    fn on_progress(&mut self, round: u32, reads: u64) -> Result<()> {
        self.emit(&Event::Progress { round, reads })
    }

    fn on_round_complete(&mut self, report: &RoundReport) -> Result<()> {
        self.emit(&Event::RoundComplete { report })
    }

    fn on_error(&mut self, err: &str) -> Result<()> {
        self.emit(&Event::Error { error: err })
    }

    fn on_summary(&mut self, s: &SessionSummary) -> Result<()> {
        self.emit(&Event::Summary { summary: s })
    }
}
