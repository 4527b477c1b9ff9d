//! Window handle queries: validity, owning process, title

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsWindow,
};

/// Check a handle still refers to a live window.
/// Safe on handles whose owning process has exited.
pub fn is_valid(hwnd: HWND) -> bool {
    hwnd != HWND::default() && unsafe { IsWindow(Some(hwnd)) }.as_bool()
}

/// Process id owning `hwnd`, or None for a null/dead handle
pub fn window_pid(hwnd: HWND) -> Option<u32> {
    let mut pid = 0u32;
    unsafe {
        GetWindowThreadProcessId(hwnd, Some(&mut pid));
    }
    (pid != 0).then_some(pid)
}

/// Get window title for logging
pub fn window_title(hwnd: HWND) -> String {
    if hwnd == HWND::default() {
        return String::new();
    }

    unsafe {
        let len = GetWindowTextLengthW(hwnd);
        if len == 0 {
            return String::new();
        }

        let mut buf = vec![0u16; (len + 1) as usize];
        let copied = GetWindowTextW(hwnd, &mut buf);
        if copied == 0 {
            return String::new();
        }

        String::from_utf16_lossy(&buf[..copied as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle_invalid() {
        assert!(!is_valid(HWND::default()));
    }

    #[test]
    fn test_null_handle_has_no_pid() {
        assert_eq!(window_pid(HWND::default()), None);
    }

    #[test]
    fn test_window_title_null_hwnd() {
        assert!(window_title(HWND::default()).is_empty());
    }
}
