// NetSentry Library - Public API

// Re-export error types
pub mod error;
pub use error::{Result, SentryError};

// Module declarations
pub mod core;
pub mod platform;

// Re-export commonly used types
pub use crate::core::metrics::{MetricSample, SmoothingState, ThreatBand};
pub use crate::core::runtime::{MonitorRuntime, RuntimeConfig};
pub use crate::core::sink::{EventSink, LogBuffer};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
