//! Telemetry and anomaly-detection core.
//!
//! Three stateless-per-call services (sampler, port scanner, process auditor)
//! composed by a runtime that owns the tick loop and the in-flight gating.
//! All user-visible output flows through the [`sink::EventSink`] abstraction;
//! the host decides how to render it.

pub mod metrics;
pub mod port_scan;
pub mod process_audit;
pub mod runtime;
pub mod sampler;
pub mod sink;
pub mod whitelist;

pub use metrics::{MetricSample, SmoothingState, ThreatBand};
pub use port_scan::{Dialer, PortProbeResult, PortScanner, ScanConfig, TcpDialer, SCAN_PORTS};
pub use process_audit::{AuditConfig, ProcessAuditor, ProcessRecord, ProcessTable, SystemProcessTable};
pub use runtime::{MonitorRuntime, OpGate, RuntimeConfig};
pub use sampler::{repair_counters, Sampler, SamplerConfig};
pub use sink::{EventSink, LogBuffer};
pub use whitelist::Whitelist;
