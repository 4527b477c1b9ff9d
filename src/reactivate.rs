//! Reactivation actuator: non-blocking foreground requests

use std::thread;
use std::time::Duration;
use tracing::debug;
use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_ACTIVATE};

use crate::window;

/// Delay before the follow-up request; stealing windows often re-assert
/// focus a few milliseconds after the first request lands
pub const FOLLOW_UP_DELAY: Duration = Duration::from_millis(50);

// Win32 constant (not exported by windows-rs feature)
const WA_ACTIVE: usize = 1;

/// Ask the OS to bring `hwnd` to the foreground, then schedule exactly one
/// delayed follow-up of the same request.
///
/// PostMessageW returns without waiting on the target process, so this is
/// safe to call from the notification path even mid focus transition. The
/// follow-up is fire-and-forget: it re-validates the handle before posting
/// and is unaffected by guardian state changes in between.
pub fn reactivate(hwnd: HWND) {
    if !window::is_valid(hwnd) {
        debug!(hwnd = ?hwnd, "Reactivation skipped: handle invalid");
        return;
    }

    post_activate(hwnd);

    // HWND is a raw pointer; carry it across the thread as usize
    let raw = hwnd.0 as usize;
    thread::spawn(move || {
        thread::sleep(FOLLOW_UP_DELAY);
        let hwnd = HWND(raw as *mut _);
        if window::is_valid(hwnd) {
            post_activate(hwnd);
        }
    });
}

fn post_activate(hwnd: HWND) {
    unsafe {
        let _ = PostMessageW(Some(hwnd), WM_ACTIVATE, WPARAM(WA_ACTIVE), LPARAM(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reactivate_null_handle_is_noop() {
        reactivate(HWND::default());
    }

    #[test]
    fn test_reactivate_dead_handle_is_noop() {
        // Arbitrary non-null pointer: IsWindow rejects it, nothing is posted
        reactivate(HWND(0x4a5a6a as *mut _));
    }
}
