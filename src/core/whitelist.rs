//! Curated set of known-benign process names.
//!
//! The ghost-process heuristic flags hidden-window, high-memory processes;
//! this list suppresses the ones that legitimately run that way (OS
//! components, shell hosts, security agents, driver helpers, IDE daemons,
//! multi-process browsers). Membership is by process name only, not path or
//! signature, so anything can evade detection by reusing a listed name.
//! That is a known limitation of the heuristic, not something this module
//! tries to fix.

use std::collections::HashSet;

/// Hand-curated benign names, matched case-insensitively.
const DEFAULT_BENIGN: &[&str] = &[
    // Windows core
    "registry",
    "memory compression",
    "system",
    "smss",
    "csrss",
    "wininit",
    "services",
    "lsass",
    "svchost",
    "fontdrvhost",
    "winlogon",
    "dwm",
    "spoolsv",
    "sihost",
    "taskhostw",
    "runtimebroker",
    "explorer",
    "presentationfontcache",
    // UWP shell hosts
    "startmenuexperiencehost",
    "searchapp",
    "searchhost",
    "phoneexperiencehost",
    "applicationframehost",
    "textinputhost",
    "shellexperiencehost",
    "mousocoreworker",
    // Security agents
    "msmpeng",
    "nissrv",
    "securityhealthservice",
    // GPU / driver helpers
    "igcctray",
    "igfxem",
    "nvidia web helper",
    "radeonsoftware",
    "amdrsserv",
    // Visual Studio tooling
    "devenv",
    "servicehub.roslyncodeanalysisservice",
    "servicehub.intellicodemodelservice",
    "servicehub.identityhost",
    "servicehub.host.clr",
    "copilot-language-server",
    "perfwatson2",
    "devhub",
    "vbcscompiler",
    "msbuild",
    "standardcollector.service",
    // Multi-process browsers
    "msedge",
    "chrome",
    "firefox",
    "brave",
    "opera",
    "operagx",
];

/// Swappable set of process names exempt from ghost flagging.
///
/// Stored lowercase; lookups are case-insensitive exact matches.
#[derive(Debug, Clone)]
pub struct Whitelist {
    names: HashSet<String>,
}

impl Whitelist {
    /// Empty whitelist (every process is a ghost candidate).
    pub fn empty() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn insert<S: AsRef<str>>(&mut self, name: S) {
        self.names.insert(name.as_ref().to_lowercase());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        DEFAULT_BENIGN.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Whitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::empty();
        for name in iter {
            list.insert(name);
        }
        list
    }
}
