//! Target resolution: process name → live top-level window

use tracing::{debug, warn};
use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, IsWindowVisible,
};
use windows::core::BOOL;

use crate::error::GuardianError;
use crate::window;

/// Live target: recomputed whenever guarding turns on or the cached handle
/// fails validation. Never persisted.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTarget {
    pub hwnd: HWND,
    pub pid: u32,
}

/// Resolve a process name to its main window.
///
/// Process enumeration is the expensive part; callers only invoke this on
/// (re)activation and on handle invalidation, never per notification.
pub fn resolve(identifier: &str) -> Result<ResolvedTarget, GuardianError> {
    let pids = pids_by_name(identifier);
    if pids.is_empty() {
        return Err(GuardianError::NotFound {
            identifier: identifier.to_string(),
        });
    }

    for &pid in &pids {
        if let Some(hwnd) = main_window(pid) {
            debug!(identifier, pid, hwnd = ?hwnd, "Target resolved");
            return Ok(ResolvedTarget { hwnd, pid });
        }
    }

    Err(GuardianError::NoWindow {
        identifier: identifier.to_string(),
    })
}

/// Snapshot live processes and collect the ids whose exe name matches
fn pids_by_name(identifier: &str) -> Vec<u32> {
    let mut pids = Vec::new();

    let snapshot = match unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) } {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "Process snapshot failed");
            return pids;
        }
    };

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut more = unsafe { Process32FirstW(snapshot, &mut entry) }.is_ok();
    while more {
        let exe = utf16_until_nul(&entry.szExeFile);
        if name_matches(&exe, identifier) {
            pids.push(entry.th32ProcessID);
        }
        more = unsafe { Process32NextW(snapshot, &mut entry) }.is_ok();
    }

    unsafe {
        let _ = CloseHandle(snapshot);
    }

    pids
}

/// First visible, titled top-level window owned by `pid`
fn main_window(pid: u32) -> Option<HWND> {
    struct FindCtx {
        pid: u32,
        hwnd: HWND,
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let ctx = unsafe { &mut *(lparam.0 as *mut FindCtx) };
        unsafe {
            if IsWindowVisible(hwnd).as_bool()
                && GetWindowTextLengthW(hwnd) > 0
                && window::window_pid(hwnd) == Some(ctx.pid)
            {
                ctx.hwnd = hwnd;
                return BOOL(0); // stop enumeration
            }
        }
        BOOL(1)
    }

    let mut ctx = FindCtx {
        pid,
        hwnd: HWND::default(),
    };

    unsafe {
        // EnumWindows reports an error when the callback halts it early
        let _ = EnumWindows(Some(enum_callback), LPARAM(&mut ctx as *mut FindCtx as isize));
    }

    window::is_valid(ctx.hwnd).then_some(ctx.hwnd)
}

/// Case-insensitive process-name match; the .exe suffix is optional on
/// either side
pub(crate) fn name_matches(exe_file: &str, identifier: &str) -> bool {
    base_name(exe_file).eq_ignore_ascii_case(base_name(identifier))
}

fn base_name(name: &str) -> &str {
    match name.len().checked_sub(4) {
        Some(i) if name.is_char_boundary(i) && name[i..].eq_ignore_ascii_case(".exe") => {
            &name[..i]
        }
        _ => name,
    }
}

fn utf16_until_nul(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Name Matching Tests ==========

    #[test]
    fn test_name_matches_case_insensitive() {
        assert!(name_matches("POWERPNT.EXE", "powerpnt"));
        assert!(name_matches("notepad.exe", "NOTEPAD"));
    }

    #[test]
    fn test_name_matches_suffix_optional_both_sides() {
        assert!(name_matches("notepad.exe", "notepad.exe"));
        assert!(name_matches("notepad", "notepad.exe"));
        assert!(name_matches("notepad", "notepad"));
    }

    #[test]
    fn test_name_matches_rejects_different_process() {
        assert!(!name_matches("notepad.exe", "POWERPNT"));
        assert!(!name_matches("notepad2.exe", "notepad"));
    }

    #[test]
    fn test_base_name_short_names() {
        assert_eq!(base_name("a"), "a");
        assert_eq!(base_name(".exe"), "");
        assert_eq!(base_name("exe"), "exe");
    }

    #[test]
    fn test_base_name_non_ascii() {
        // Multi-byte chars near the suffix boundary must not panic
        assert_eq!(base_name("メモ帳.exe"), "メモ帳");
        assert_eq!(base_name("メモ帳"), "メモ帳");
    }

    #[test]
    fn test_utf16_until_nul() {
        let buf = ['a' as u16, 'b' as u16, 0, 'x' as u16];
        assert_eq!(utf16_until_nul(&buf), "ab");

        let no_nul = ['a' as u16, 'b' as u16];
        assert_eq!(utf16_until_nul(&no_nul), "ab");
    }

    // ========== Resolution Tests ==========

    #[test]
    fn test_resolve_unknown_process_not_found() {
        let err = resolve("no-such-process-1fd3").unwrap_err();
        assert!(matches!(err, GuardianError::NotFound { .. }));
    }
}
