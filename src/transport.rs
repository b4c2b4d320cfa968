//! Byte-stream transport used by the round driver.
//!
//! [`Transport`] is the seam between the measurement engine and the socket:
//! the engine only ever sends a whole request, waits a bounded time for
//! readability and reads one chunk. [`TcpTransport`] is the real
//! implementation over a tokio [`TcpStream`].

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::info;

use crate::error::{ProbeError, Result};
use crate::target::Target;

/// Outcome of a bounded readability wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Data (or end of stream) can be read.
    Ready,
    /// Nothing arrived within the wait.
    Idle,
}

/// A connected, bidirectional byte stream.
pub trait Transport {
    /// Write all of `buf`.
    fn send_all(&mut self, buf: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Wait at most `idle` for the stream to become readable.
    fn wait_readable(
        &mut self,
        idle: Duration,
    ) -> impl Future<Output = io::Result<Readiness>> + Send;

    /// Read one chunk into `buf`, returning its length. Zero means the peer
    /// closed the stream; [`io::ErrorKind::WouldBlock`] means the readiness
    /// was spurious.
    fn read_chunk(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

/// [`Transport`] over a TCP connection.
pub struct TcpTransport {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpTransport {
    /// Resolve `target.host` and connect to the first reachable address.
    pub async fn connect(target: &Target) -> Result<Self> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|source| ProbeError::Resolve {
                host: target.host.clone(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(ProbeError::NoAddress(target.host.clone()));
        }

        let stream = match TcpStream::connect(&addrs[..]).await {
            Ok(stream) => stream,
            Err(source) => return Err(ProbeError::Connect { addrs, source }),
        };
        let peer = stream.peer_addr()?;
        info!(%peer, host = %target.host, "connected");

        Ok(TcpTransport { stream, peer })
    }

    /// Address of the connected server.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for TcpTransport {
    async fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf).await
    }

    async fn wait_readable(&mut self, idle: Duration) -> io::Result<Readiness> {
        match timeout(idle, self.stream.readable()).await {
            Ok(Ok(())) => Ok(Readiness::Ready),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Ok(Readiness::Idle),
        }
    }

    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }
}

/// Transport that replays a fixed arrival schedule against the tokio clock.
#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use tokio::time::{Instant, sleep, sleep_until};

    use super::*;

    /// One scripted read: a chunk of `len` bytes (or a spurious wake-up,
    /// end of stream or error) ready `at` after the round's request.
    #[derive(Debug, Clone)]
    pub enum Event {
        Chunk { at: Duration, len: usize },
        Spurious { at: Duration },
        Eof { at: Duration },
        Fail { at: Duration },
    }

    impl Event {
        fn at(&self) -> Duration {
            match self {
                Event::Chunk { at, .. }
                | Event::Spurious { at }
                | Event::Eof { at }
                | Event::Fail { at } => *at,
            }
        }
    }

    pub fn chunk(at_ms: u64, len: usize) -> Event {
        Event::Chunk {
            at: Duration::from_millis(at_ms),
            len,
        }
    }

    /// Schedules are consumed one per request sent.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        rounds: VecDeque<Vec<Event>>,
        current: VecDeque<Event>,
        sent_at: Option<Instant>,
        pub requests: Vec<Vec<u8>>,
        pub fail_send: bool,
    }

    impl ScriptedTransport {
        pub fn new(rounds: Vec<Vec<Event>>) -> Self {
            ScriptedTransport {
                rounds: rounds.into(),
                ..Default::default()
            }
        }

        pub fn failing_send() -> Self {
            ScriptedTransport {
                fail_send: true,
                ..Default::default()
            }
        }
    }

    impl Transport for ScriptedTransport {
        async fn send_all(&mut self, buf: &[u8]) -> io::Result<()> {
            if self.fail_send {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted"));
            }
            self.requests.push(buf.to_vec());
            self.sent_at = Some(Instant::now());
            self.current = self.rounds.pop_front().unwrap_or_default().into();
            Ok(())
        }

        async fn wait_readable(&mut self, idle: Duration) -> io::Result<Readiness> {
            let Some(next) = self.current.front() else {
                sleep(idle).await;
                return Ok(Readiness::Idle);
            };
            let due = self.sent_at.unwrap_or_else(Instant::now) + next.at();
            if due <= Instant::now() + idle {
                sleep_until(due).await;
                Ok(Readiness::Ready)
            } else {
                sleep(idle).await;
                Ok(Readiness::Idle)
            }
        }

        async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.current.pop_front() {
                Some(Event::Chunk { len, .. }) => Ok(len.min(buf.len())),
                Some(Event::Spurious { .. }) | None => {
                    Err(io::Error::from(io::ErrorKind::WouldBlock))
                }
                Some(Event::Eof { .. }) => Ok(0),
                Some(Event::Fail { .. }) => {
                    Err(io::Error::new(io::ErrorKind::ConnectionReset, "scripted"))
                }
            }
        }
    }
}
