//! Fixed-interval host metrics sampler.
//!
//! Pulls raw CPU and RAM readings from the OS on each tick, smooths them
//! with an exponential moving average and derives the threat band from the
//! smoothed CPU value. Thread count and uptime are more expensive to
//! compute, so they are refreshed only every Nth tick.

use std::io;
use std::time::Duration;

use sysinfo::{
    CpuRefreshKind, MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System,
};

use crate::core::metrics::{MetricSample, SmoothingState, DEFAULT_ALPHA};
use crate::core::sink::EventSink;
use crate::platform;

/// Configuration for the sampler.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// EMA smoothing factor, in (0, 1].
    pub alpha: f64,
    /// Refresh thread count and uptime every this many ticks.
    pub slow_refresh_every: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            slow_refresh_every: 10,
        }
    }
}

/// Smoothed CPU/RAM sampler over the sysinfo system table.
///
/// A read failure never stops the loop: readings degrade to zero and the
/// tick still produces a sample. [`Sampler::initialize`] reports whether the
/// OS sources could be acquired at all so the host can show a degraded
/// state indicator.
pub struct Sampler {
    system: System,
    smoothing: SmoothingState,
    available: bool,
    ticks: u64,
    cached_thread_count: usize,
    cached_uptime: Duration,
    config: SamplerConfig,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything())
            .with_processes(ProcessRefreshKind::nothing().with_memory());

        Self {
            system: System::new_with_specifics(refresh_kind),
            smoothing: SmoothingState::new(config.alpha),
            available: false,
            ticks: 0,
            cached_thread_count: 0,
            cached_uptime: Duration::ZERO,
            config,
        }
    }

    /// Acquire the OS-level CPU and memory sources.
    ///
    /// Returns false (never panics) when the platform exposes no usable
    /// counters; the sampler then runs in degraded mode and every tick
    /// reads as zero until a repair succeeds and the host restarts.
    pub fn initialize(&mut self) -> bool {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        self.available = !self.system.cpus().is_empty() && self.system.total_memory() > 0;
        if self.available {
            self.refresh_slow();
        }
        self.available
    }

    /// Whether [`Sampler::initialize`] found usable metric sources.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Read one raw CPU/RAM pair, fold it into the running averages and
    /// return the smoothed sample.
    pub fn tick(&mut self) -> MetricSample {
        let (raw_cpu, raw_ram) = self.read_raw();
        self.smoothing.update(raw_cpu, raw_ram);

        self.ticks += 1;
        if self.available && self.ticks % self.config.slow_refresh_every == 0 {
            self.refresh_slow();
        }

        MetricSample {
            cpu_percent: self.smoothing.ema_cpu,
            ram_percent: self.smoothing.ema_ram,
            thread_count: self.cached_thread_count,
            uptime: self.cached_uptime,
        }
    }

    /// Current thread count across the process table.
    ///
    /// Refreshes the process list, so it is noticeably more expensive than
    /// a tick; the driver polls it at a coarser cadence.
    pub fn thread_count(&mut self) -> usize {
        if !self.available {
            return 0;
        }
        self.system
            .refresh_processes(ProcessesToUpdate::All, true);
        platform::count_threads(&self.system)
    }

    /// Host uptime as reported by the OS.
    pub fn uptime(&self) -> Duration {
        Duration::from_secs(System::uptime())
    }

    fn refresh_slow(&mut self) {
        self.cached_thread_count = self.thread_count();
        self.cached_uptime = self.uptime();
    }

    fn read_raw(&mut self) -> (f64, f64) {
        if !self.available {
            return (0.0, 0.0);
        }

        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let raw_cpu = f64::from(self.system.global_cpu_usage());
        let total = self.system.total_memory();
        let raw_ram = if total > 0 {
            self.system.used_memory() as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        // NaN or out-of-range readings degrade to a sane value instead of
        // poisoning the averages.
        (sanitize(raw_cpu), sanitize(raw_ram))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Rebuild the OS performance counters via a single elevated command.
///
/// Fire and forget: the outcome is reported only through the sink, as
/// exactly one of success, permission-denied or failure-with-reason.
pub fn repair_counters(sink: &dyn EventSink) {
    repair_counters_with(sink, platform::rebuild_performance_counters)
}

/// Repair with an injected command runner. Seam for tests.
pub fn repair_counters_with<F>(sink: &dyn EventSink, run: F)
where
    F: FnOnce() -> io::Result<()>,
{
    sink.emit("[ADMIN] REQUESTING ELEVATED PERMISSIONS...");
    match run() {
        Ok(()) => sink.emit("[SUCCESS] COMMAND EXECUTED. RESTART APP."),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            sink.emit("[ERROR] PERMISSION DENIED.")
        }
        Err(e) => sink.emit(&format!("[ERROR] FAILED: {e}")),
    }
}
