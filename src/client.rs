use std::time::Duration;

use crate::emitter::Emitter;
use crate::error::{ProbeError, Result};
use crate::params;
use crate::session;
use crate::summary::SessionSummary;
use crate::target::Target;
use crate::transport::TcpTransport;

/// Everything a probe run needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Server and resource fetched on every round.
    pub target: Target,
    /// Number of rounds.
    pub rounds: u32,
    /// Reads skipped once per session before steady-state accounting starts.
    pub warmup_skips: u32,
    /// Silence that ends a round.
    pub idle_timeout: Duration,
    /// Size of the buffer handed to every read.
    pub read_buffer_size: usize,
    /// Emit progress ticks while reading.
    pub progress: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            target: Target::default(),
            rounds: params::ROUNDS,
            warmup_skips: params::WARMUP_SKIPS,
            idle_timeout: params::IDLE_TIMEOUT,
            read_buffer_size: params::READ_BUFFER_SIZE,
            progress: true,
        }
    }
}

impl ProbeConfig {
    /// Reject configurations that cannot produce a measurement.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(ProbeError::InvalidConfig(
                "rounds must be at least 1".into(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(ProbeError::InvalidConfig(
                "read buffer size must be at least 1 byte".into(),
            ));
        }
        if self.idle_timeout.is_zero() {
            return Err(ProbeError::InvalidConfig(
                "idle timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub struct Client {
    config: ProbeConfig,
}

impl Client {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Client { config })
    }

    /// Connect to the target and run a full session, reporting to `emitter`.
    ///
    /// Any connection failure aborts the run before the first round.
    pub async fn run(&self, emitter: &mut dyn Emitter) -> Result<SessionSummary> {
        let target = &self.config.target;
        emitter.on_connecting(target)?;
        let mut transport = TcpTransport::connect(target).await?;
        emitter.on_connected(target, transport.peer())?;

        let summary = session::run(&mut transport, &self.config, emitter).await?;
        emitter.on_summary(&summary)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::emitter::JsonEmitter;

    use super::*;

    #[test]
    fn defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.target.host, "server-dev");
        assert_eq!(config.target.port, 80);
        assert_eq!(config.rounds, 4);
        assert_eq!(config.warmup_skips, 10);
        assert_eq!(config.idle_timeout, Duration::from_millis(200));
        assert_eq!(config.read_buffer_size, 2 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_rounds() {
        let config = ProbeConfig {
            rounds: 0,
            ..Default::default()
        };
        assert!(matches!(
            Client::new(config).err().unwrap(),
            ProbeError::InvalidConfig(_)
        ));
    }

    #[tokio::test]
    async fn probe_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // answers each request with 64 KiB, keeping the connection open
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let body = vec![7u8; 64 * 1024];
            let mut req = [0u8; 256];
            for _ in 0..2 {
                let n = sock.read(&mut req).await.unwrap();
                assert!(req[..n].starts_with(b"GET /blob HTTP/1.1\r\n"));
                sock.write_all(&body).await.unwrap();
            }
            let _ = sock.read(&mut req).await;
        });

        let config = ProbeConfig {
            target: Target::new("127.0.0.1", port, "/blob"),
            rounds: 2,
            warmup_skips: 0,
            idle_timeout: Duration::from_millis(300),
            read_buffer_size: 4096,
            progress: false,
        };
        let client = Client::new(config).unwrap();
        let mut out = Vec::new();
        let mut emitter = JsonEmitter::new(&mut out);

        let summary = client.run(&mut emitter).await.unwrap();

        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.total_bytes, 2 * 64 * 1024);
        assert!(summary.avg_rtt_ms >= 0.0);

        let out = String::from_utf8(out).unwrap();
        let last: serde_json::Value = serde_json::from_str(out.lines().last().unwrap()).unwrap();
        assert_eq!(last["type"], "Summary");
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_target_fails_before_any_round() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ProbeConfig {
            target: Target::new("127.0.0.1", port, "/"),
            ..Default::default()
        };
        let client = Client::new(config).unwrap();
        let mut out = Vec::new();
        let mut emitter = JsonEmitter::new(&mut out);

        let err = client.run(&mut emitter).await.unwrap_err();
        assert!(matches!(err, ProbeError::Connect { .. }));

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("RoundStarting"));
    }

    #[tokio::test]
    async fn unresolvable_target_fails_before_any_round() {
        let config = ProbeConfig {
            target: Target::new("no-such-host.invalid", 80, "/"),
            ..Default::default()
        };
        let client = Client::new(config).unwrap();
        let mut out = Vec::new();
        let mut emitter = JsonEmitter::new(&mut out);

        let err = client.run(&mut emitter).await.unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }));

        let out = String::from_utf8(out).unwrap();
        let events: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "Connecting");
    }
}
