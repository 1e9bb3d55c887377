//! Windows implementations: window enumeration, thread counting and the
//! performance-counter rebuild command.

use std::collections::HashSet;
use std::io;
use std::process::Command;

use sysinfo::System;
use windows_sys::Win32::Foundation::{HWND, LPARAM};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, IsWindowVisible,
};

/// Pids owning at least one visible top-level window.
pub fn visible_window_pids() -> Option<HashSet<u32>> {
    unsafe extern "system" fn enum_windows_cb(hwnd: HWND, lparam: LPARAM) -> i32 {
        let pids = unsafe { &mut *(lparam as *mut HashSet<u32>) };
        if unsafe { IsWindowVisible(hwnd) } != 0 {
            let mut pid: u32 = 0;
            unsafe { GetWindowThreadProcessId(hwnd, &mut pid) };
            if pid != 0 {
                pids.insert(pid);
            }
        }
        1 // continue enumeration
    }

    let mut pids: HashSet<u32> = HashSet::new();
    unsafe {
        EnumWindows(Some(enum_windows_cb), &mut pids as *mut _ as LPARAM);
    }
    Some(pids)
}

/// Rebuild the performance counter registry via `lodctr /R`.
///
/// Requires elevation; a refusal surfaces as a PermissionDenied IO error.
pub fn rebuild_performance_counters() -> io::Result<()> {
    let status = Command::new("cmd").args(["/C", "lodctr", "/R"]).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "lodctr exited with status {status}"
        )))
    }
}

/// sysinfo does not expose per-process thread counts here; the process
/// count is the documented approximation.
pub fn count_threads(system: &System) -> usize {
    system.processes().len()
}
