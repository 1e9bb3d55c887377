//! Bounded localhost port sweep.
//!
//! This is a local-exposure auditor, not a network scanner: the port list
//! is fixed and only 127.0.0.1 is probed. Ports are checked strictly
//! sequentially with a short per-port timeout and a fixed pause between
//! probes, which caps the total sweep at roughly two seconds and keeps the
//! output cadence predictable.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;

use crate::core::sink::EventSink;

/// Well-known ports checked on every sweep, in probe order.
pub const SCAN_PORTS: [u16; 7] = [21, 22, 80, 443, 3306, 8080, 8000];

/// Configuration for a port sweep.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub ports: Vec<u16>,
    pub connect_timeout: Duration,
    pub probe_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: SCAN_PORTS.to_vec(),
            connect_timeout: Duration::from_millis(200),
            probe_delay: Duration::from_millis(100),
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortProbeResult {
    pub port: u16,
    pub open: bool,
}

impl PortProbeResult {
    /// Log line for this result: open ports are tagged as a risk marker,
    /// closed ports are informational.
    pub fn log_line(&self) -> String {
        if self.open {
            format!("[!] PORT {} OPEN (RISK)", self.port)
        } else {
            format!("PORT {} CLOSED", self.port)
        }
    }
}

/// Connection attempt seam so tests can fake the network.
///
/// The scanner applies its own timeout around `dial`, so the per-port
/// bound holds no matter how the dialer behaves.
pub trait Dialer: Send + Sync {
    /// Attempt a TCP connect to `127.0.0.1:port`. True means connected.
    fn dial(&self, port: u16) -> impl Future<Output = bool> + Send;
}

/// Real dialer over tokio TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpDialer;

impl Dialer for TcpDialer {
    fn dial(&self, port: u16) -> impl Future<Output = bool> + Send {
        async move { TcpStream::connect(("127.0.0.1", port)).await.is_ok() }
    }
}

/// Sequential localhost port scanner.
pub struct PortScanner<D = TcpDialer> {
    dialer: D,
    config: ScanConfig,
}

impl PortScanner<TcpDialer> {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_dialer(TcpDialer, config)
    }
}

impl<D: Dialer> PortScanner<D> {
    pub fn with_dialer(dialer: D, config: ScanConfig) -> Self {
        Self { dialer, config }
    }

    /// Probe every configured port in order, emitting one line per port.
    ///
    /// A timeout, a refusal and any other connect error are all reported
    /// identically as closed; nothing here ever surfaces as an error to the
    /// caller. Re-entrancy is the runtime's concern, not this function's.
    pub async fn scan(&self, sink: &dyn EventSink) {
        for &port in &self.config.ports {
            let result = self.probe(port).await;
            sink.emit(&result.log_line());
            tokio::time::sleep(self.config.probe_delay).await;
        }
    }

    async fn probe(&self, port: u16) -> PortProbeResult {
        let open = matches!(
            tokio::time::timeout(self.config.connect_timeout, self.dialer.dial(port)).await,
            Ok(true)
        );
        PortProbeResult { port, open }
    }
}

impl Default for PortScanner<TcpDialer> {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
