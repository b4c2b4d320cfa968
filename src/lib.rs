//! A single-connection HTTP bandwidth and latency probe.
//!
//! The probe opens one TCP connection to a server and repeatedly requests the
//! same resource over it. The response is never parsed: every raw read is
//! timed, and a round ends once no data arrives within an idle timeout. From
//! those timings it derives two harmonic-mean bandwidth estimates (one that
//! skips the initial slow-start reads, one that covers the whole response)
//! and a smoothed round-trip latency.
//!
//! # Quick start
//!
//! ```no_run
//! use http_probe::client::{Client, ProbeConfig};
//! use http_probe::emitter::HumanReadableEmitter;
//! use http_probe::target::Target;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ProbeConfig {
//!     target: Target::from_url("http://mirror.local/big.iso")?,
//!     ..Default::default()
//! };
//! let client = Client::new(config)?;
//! let mut emitter = HumanReadableEmitter::new(std::io::stdout());
//! let summary = client.run(&mut emitter).await?;
//! println!("{:.3} MB/s", summary.avg_bandwidth_mib_s);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod bandwidth;
pub mod client;
pub mod clock;
pub mod emitter;
pub mod error;
pub mod params;
pub mod round;
pub mod rtt;
pub mod session;
pub mod summary;
pub mod target;
pub mod transport;
