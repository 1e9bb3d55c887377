//! Tokio runtime and orchestrator for the monitoring core.
//!
//! Owns the periodic sampler tick loop and dispatches the on-demand
//! operations (scan, audit, repair) as one-shot background tasks. A single
//! in-flight gate covers all three interactive triggers: overlapping
//! triggers are rejected, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};

use crate::core::metrics::MetricSample;
use crate::core::port_scan::{PortScanner, ScanConfig};
use crate::core::process_audit::{AuditConfig, ProcessAuditor, SystemProcessTable};
use crate::core::sampler::{repair_counters, Sampler, SamplerConfig};
use crate::core::sink::EventSink;
use crate::core::whitelist::Whitelist;
use crate::error::Result;

/// Configuration for the monitor runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Sampler cadence.
    pub tick_interval: Duration,
    pub sampler: SamplerConfig,
    pub scan: ScanConfig,
    pub audit: AuditConfig,
    pub whitelist: Whitelist,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(450),
            sampler: SamplerConfig::default(),
            scan: ScanConfig::default(),
            audit: AuditConfig::default(),
            whitelist: Whitelist::default(),
        }
    }
}

/// Single in-flight token shared by the interactive triggers.
///
/// At most one scan, audit or repair runs at a time; the permit releases
/// the gate when dropped.
#[derive(Debug, Default)]
pub struct OpGate {
    busy: AtomicBool,
}

impl OpGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the gate. Returns None if an operation is already in flight.
    pub fn try_acquire(self: &Arc<Self>) -> Option<OpPermit> {
        if self.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(OpPermit {
                gate: Arc::clone(self),
            })
        }
    }
}

/// Held for the duration of one in-flight operation.
pub struct OpPermit {
    gate: Arc<OpGate>,
}

impl Drop for OpPermit {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Wrapper around the Tokio runtime driving the monitoring core.
///
/// The tick task owns the sampler outright, so the smoothing state is never
/// touched from more than one place. The host reads smoothed samples from
/// the watch channel and renders log lines from the shared sink.
pub struct MonitorRuntime {
    sample_rx: watch::Receiver<MetricSample>,
    sink: Arc<dyn EventSink>,
    gate: Arc<OpGate>,
    config: RuntimeConfig,
    shutdown_tx: broadcast::Sender<()>,
    runtime: tokio::runtime::Runtime,
}

impl MonitorRuntime {
    /// Build the runtime and spawn the sampler tick task.
    pub fn new(config: RuntimeConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("netsentry-worker")
            .build()?;

        let (sample_tx, sample_rx) = watch::channel(MetricSample::default());
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        runtime.spawn(sampler_task(
            config.clone(),
            Arc::clone(&sink),
            sample_tx,
            shutdown_tx.subscribe(),
        ));

        log::info!("monitor runtime started, tick every {:?}", config.tick_interval);

        Ok(Self {
            sample_rx,
            sink,
            gate: Arc::new(OpGate::new()),
            config,
            shutdown_tx,
            runtime,
        })
    }

    /// Receiver for smoothed metric samples, one per tick.
    pub fn sample_rx(&self) -> watch::Receiver<MetricSample> {
        self.sample_rx.clone()
    }

    /// Whether an interactive operation is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Start a port sweep. Returns false if another operation is in flight.
    pub fn trigger_scan(&self) -> bool {
        let Some(permit) = self.gate.try_acquire() else {
            return false;
        };

        let sink = Arc::clone(&self.sink);
        let scanner = PortScanner::new(self.config.scan.clone());
        self.runtime.spawn(async move {
            let _permit = permit;
            sink.emit("INITIATING NETWORK SCAN...");
            scanner.scan(sink.as_ref()).await;
            sink.emit("SCAN COMPLETE.");
        });
        true
    }

    /// Start a process audit. Returns false if another operation is in flight.
    pub fn trigger_audit(&self) -> bool {
        let Some(permit) = self.gate.try_acquire() else {
            return false;
        };

        let sink = Arc::clone(&self.sink);
        let auditor = ProcessAuditor::new(self.config.whitelist.clone(), self.config.audit.clone());
        self.runtime.spawn_blocking(move || {
            let _permit = permit;
            sink.emit("INITIATING PROCESS AUDIT...");
            let mut table = SystemProcessTable::new();
            auditor.audit(&mut table, sink.as_ref());
            sink.emit("AUDIT COMPLETE.");
        });
        true
    }

    /// Start the counter repair action. Returns false if another operation
    /// is in flight.
    pub fn trigger_repair(&self) -> bool {
        let Some(permit) = self.gate.try_acquire() else {
            return false;
        };

        let sink = Arc::clone(&self.sink);
        self.runtime.spawn_blocking(move || {
            let _permit = permit;
            repair_counters(sink.as_ref());
        });
        true
    }

    /// Stop the tick loop. In-flight operations run to completion.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Periodic tick task owning the sampler.
async fn sampler_task(
    config: RuntimeConfig,
    sink: Arc<dyn EventSink>,
    sample_tx: watch::Sender<MetricSample>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut sampler = Sampler::new(config.sampler);

    sink.emit("SYSTEM INITIALIZED...");
    if sampler.initialize() {
        sink.emit("SENSORS ONLINE.");
    } else {
        sink.emit("[ERROR] CPU SENSORS CORRUPTED.");
        log::warn!("metric sources unavailable, readings degrade to zero");
    }

    // First CPU delta needs a baseline measurement.
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;

    let mut ticker = interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sample = sampler.tick();
                // send() only fails with no receivers, which is fine.
                let _ = sample_tx.send(sample);
            }
            _ = shutdown.recv() => {
                log::info!("sampler task shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_rejects_while_held() {
        let gate = Arc::new(OpGate::new());

        let permit = gate.try_acquire();
        assert!(permit.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_gate_starts_free() {
        let gate = Arc::new(OpGate::new());
        assert!(!gate.is_busy());
    }
}
