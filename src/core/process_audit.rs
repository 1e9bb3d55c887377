//! Process snapshot ranking and ghost-process detection.
//!
//! One audit takes a single snapshot of the process table, reports the
//! top consumers of resident memory and separately flags "ghost" processes:
//! hidden-window, high-memory processes whose name is not on the curated
//! whitelist. The top list is informational; the ghost set is the anomaly
//! signal.

use serde::{Deserialize, Serialize};
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use crate::core::sink::EventSink;
use crate::core::whitelist::Whitelist;
use crate::platform;

const MIB: u64 = 1024 * 1024;

/// One process captured at audit time. Stale immediately after the
/// snapshot; the process may already have exited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub working_set_bytes: u64,
    pub has_visible_window: bool,
}

/// Source of process snapshots. Seam so tests can inject fixed tables.
pub trait ProcessTable: Send {
    fn snapshot(&mut self) -> Vec<ProcessRecord>;
}

/// Live process table backed by sysinfo plus the platform window probe.
pub struct SystemProcessTable {
    system: System,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        let refresh_kind =
            RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing().with_memory());
        Self {
            system: System::new_with_specifics(refresh_kind),
        }
    }
}

impl ProcessTable for SystemProcessTable {
    fn snapshot(&mut self) -> Vec<ProcessRecord> {
        self.system
            .refresh_processes(ProcessesToUpdate::All, true);

        // Platforms without window enumeration report None; treating the
        // window state as visible there suppresses false positives.
        let visible_pids = platform::visible_window_pids();

        self.system
            .processes()
            .values()
            .filter_map(|proc| {
                let name = proc.name().to_str()?;
                if name.is_empty() {
                    // Entry went away between enumeration and read; skip it.
                    return None;
                }
                let pid = proc.pid().as_u32();
                Some(ProcessRecord {
                    pid,
                    name: name.to_string(),
                    working_set_bytes: proc.memory(),
                    has_visible_window: visible_pids
                        .as_ref()
                        .map_or(true, |pids| pids.contains(&pid)),
                })
            })
            .collect()
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Thresholds and caps for one audit.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// How many top memory consumers to report.
    pub top_count: usize,
    /// Above this resident size a top entry is tagged HEAVY.
    pub heavy_threshold_bytes: u64,
    /// Minimum resident size for a process to qualify as a ghost.
    pub ghost_min_bytes: u64,
    /// Maximum number of ghost lines per audit.
    pub max_ghosts: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            top_count: 5,
            heavy_threshold_bytes: 500 * MIB,
            ghost_min_bytes: 50 * MIB,
            max_ghosts: 5,
        }
    }
}

/// Ranks processes by resident memory and flags ghost processes.
pub struct ProcessAuditor {
    whitelist: Whitelist,
    config: AuditConfig,
}

impl ProcessAuditor {
    pub fn new(whitelist: Whitelist, config: AuditConfig) -> Self {
        Self { whitelist, config }
    }

    /// Run one audit over a fresh snapshot, emitting all findings to the sink.
    ///
    /// The sink always receives either at least one ghost line or exactly
    /// one all-clear line, never silence.
    pub fn audit(&self, table: &mut dyn ProcessTable, sink: &dyn EventSink) {
        let snapshot = table.snapshot();
        log::debug!("process audit over {} entries", snapshot.len());

        let mut by_memory: Vec<&ProcessRecord> = snapshot.iter().collect();
        by_memory.sort_by(|a, b| b.working_set_bytes.cmp(&a.working_set_bytes));

        for record in by_memory.iter().take(self.config.top_count) {
            let level = if record.working_set_bytes > self.config.heavy_threshold_bytes {
                "[HEAVY]"
            } else {
                "[NORMAL]"
            };
            sink.emit(&format!(
                "{} {} : {:.0} MB",
                level,
                record.name.to_uppercase(),
                mib(record.working_set_bytes)
            ));
        }

        let ghosts: Vec<&ProcessRecord> = snapshot
            .iter()
            .filter(|p| self.is_ghost(p))
            .take(self.config.max_ghosts)
            .collect();

        if ghosts.is_empty() {
            sink.emit("NO SUSPICIOUS GHOST PROCESSES DETECTED.");
        } else {
            sink.emit("--- DETECTED GHOST PROCESSES (NON-SYSTEM) ---");
            for ghost in ghosts {
                sink.emit(&format!(
                    "[SUSPICIOUS] {} : {:.0} MB (Hidden Window)",
                    ghost.name,
                    mib(ghost.working_set_bytes)
                ));
            }
        }
    }

    fn is_ghost(&self, record: &ProcessRecord) -> bool {
        !record.has_visible_window
            && record.working_set_bytes > self.config.ghost_min_bytes
            && !self.whitelist.contains(&record.name)
    }
}

impl Default for ProcessAuditor {
    fn default() -> Self {
        Self::new(Whitelist::default(), AuditConfig::default())
    }
}

fn mib(bytes: u64) -> f64 {
    bytes as f64 / MIB as f64
}
