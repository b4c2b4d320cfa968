//! Default probe configuration and tuning parameters.

use std::time::Duration;

/// Default server host name.
pub const SERVER_NAME: &str = "server-dev";

/// Default resource requested on every round.
pub const RESOURCE: &str = "/debs/stable/dls-legacy-pods_4.0.0.deb";

/// Default server port.
pub const PORT: u16 = 80;

/// Bytes in one MiB. Bandwidth estimates are expressed in MiB/s.
pub const MIB: f64 = (1 << 20) as f64;

/// Size of the buffer handed to every socket read (2 MiB).
pub const READ_BUFFER_SIZE: usize = 2 << 20;

/// Reads skipped before the steady-state estimator starts anchoring.
/// Counted once per process, not per round.
pub const WARMUP_SKIPS: u32 = 10;

/// Number of request/response rounds in a session.
pub const ROUNDS: u32 = 4;

/// A round ends when no data arrives within this window.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(200);

/// Number of reads between two progress ticks.
pub const PROGRESS_INTERVAL: u64 = 200;
