// src/probe/tcp.rs
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use super::{Probe, ProbeError, ProbeOutcome, ProbeTarget};

/// Round trip of a TCP handshake with the game server port.
pub struct TcpProbe {
    pub timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
        let addr = match timeout(self.timeout, lookup_host((target.host.as_str(), target.port))).await {
            Ok(Ok(mut addrs)) => addrs
                .next()
                .ok_or_else(|| ProbeError::Resolve(format!("no address for {}", target.host)))?,
            Ok(Err(e)) => return Err(ProbeError::Resolve(e.to_string())),
            Err(_) => return Err(ProbeError::Timeout(self.timeout)),
        };

        let started = Instant::now();
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(started.elapsed()),
            Ok(Err(e)) => Err(ProbeError::Unreachable(e.to_string())),
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}
