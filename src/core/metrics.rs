//! Value types produced by the sampler.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One smoothed telemetry snapshot, produced on each sampler tick.
///
/// CPU and RAM are exponential-moving-average values, not raw readings.
/// A sample is immutable once emitted; the next tick supersedes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSample {
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub thread_count: usize,
    pub uptime: Duration,
}

/// Exponential moving-average state for the CPU and RAM series.
///
/// Owned exclusively by the sampler; updated once per tick with
/// `ema' = ema * (1 - alpha) + raw * alpha`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingState {
    pub ema_cpu: f64,
    pub ema_ram: f64,
    pub alpha: f64,
}

/// Default smoothing factor. Small enough to keep the chart visually
/// stable, large enough not to lag real trend changes.
pub const DEFAULT_ALPHA: f64 = 0.05;

impl SmoothingState {
    pub fn new(alpha: f64) -> Self {
        Self {
            ema_cpu: 0.0,
            ema_ram: 0.0,
            alpha,
        }
    }

    /// Fold one pair of raw readings into the running averages.
    pub fn update(&mut self, raw_cpu: f64, raw_ram: f64) {
        self.ema_cpu = self.ema_cpu * (1.0 - self.alpha) + raw_cpu * self.alpha;
        self.ema_ram = self.ema_ram * (1.0 - self.alpha) + raw_ram * self.alpha;
    }
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

/// Coarse severity classification derived from smoothed CPU load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatBand {
    Low,
    Medium,
    High,
}

impl ThreatBand {
    /// Classify a smoothed CPU percentage. Thresholds are fixed at 40 and 80.
    pub fn for_cpu(cpu_percent: f64) -> Self {
        if cpu_percent < 40.0 {
            ThreatBand::Low
        } else if cpu_percent < 80.0 {
            ThreatBand::Medium
        } else {
            ThreatBand::High
        }
    }

    /// Accent color the reference dashboard theme uses for this band.
    pub fn color_hex(&self) -> &'static str {
        match self {
            ThreatBand::Low => "#00f2ff",
            ThreatBand::Medium => "#ffea00",
            ThreatBand::High => "#ff0055",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ThreatBand::for_cpu(39.9), ThreatBand::Low);
        assert_eq!(ThreatBand::for_cpu(40.0), ThreatBand::Medium);
        assert_eq!(ThreatBand::for_cpu(79.9), ThreatBand::Medium);
        assert_eq!(ThreatBand::for_cpu(80.0), ThreatBand::High);
    }

    #[test]
    fn test_band_extremes() {
        assert_eq!(ThreatBand::for_cpu(0.0), ThreatBand::Low);
        assert_eq!(ThreatBand::for_cpu(100.0), ThreatBand::High);
    }

    #[test]
    fn test_ema_stays_in_range() {
        let mut state = SmoothingState::new(0.05);
        let readings = [0.0, 100.0, 37.5, 99.9, 0.1, 50.0, 100.0, 100.0];
        for raw in readings {
            state.update(raw, 100.0 - raw);
            assert!((0.0..=100.0).contains(&state.ema_cpu));
            assert!((0.0..=100.0).contains(&state.ema_ram));
        }
    }

    #[test]
    fn test_ema_converges_monotonically() {
        let mut state = SmoothingState::new(0.05);
        let target = 75.0;
        let mut previous_gap = target - state.ema_cpu;
        for _ in 0..500 {
            state.update(target, target);
            let gap = target - state.ema_cpu;
            assert!(gap >= 0.0, "ema must not overshoot a constant input");
            assert!(gap <= previous_gap, "ema must approach a constant input");
            previous_gap = gap;
        }
        assert!(previous_gap < 0.01);
    }

    #[test]
    fn test_ema_with_unit_alpha_tracks_raw() {
        let mut state = SmoothingState::new(1.0);
        state.update(63.0, 21.0);
        assert_eq!(state.ema_cpu, 63.0);
        assert_eq!(state.ema_ram, 21.0);
    }
}
