// Platform-specific code module

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{count_threads, rebuild_performance_counters, visible_window_pids};

#[cfg(not(windows))]
mod unix;
#[cfg(not(windows))]
pub use unix::{count_threads, rebuild_performance_counters, visible_window_pids};
