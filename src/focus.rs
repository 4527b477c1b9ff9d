//! Foreground-change subscription via SetWinEventHook

use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
use windows::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows::Win32::UI::WindowsAndMessaging::{PostMessageW, WM_USER};

use crate::error::FocusError;

/// Posted to the installing thread's queue on every foreground change;
/// wParam carries the newly focused window handle
pub const WM_FOCUS_CHANGED: u32 = WM_USER + 1;

// Win32 constants (not exported by windows-rs feature)
const EVENT_SYSTEM_FOREGROUND: u32 = 0x0003;
const WINEVENT_OUTOFCONTEXT: u32 = 0x0000;
const WINEVENT_SKIPOWNPROCESS: u32 = 0x0002;

/// Active foreground-change subscription.
///
/// Unhooks on drop, so the subscription can never outlive its owner;
/// release is idempotent (the handle is cleared after the first unhook).
pub struct FocusHook {
    handle: HWINEVENTHOOK,
}

impl FocusHook {
    /// Install the system-wide foreground event hook.
    /// Events are delivered through the installing thread's message queue.
    pub fn install() -> Result<Self, FocusError> {
        let hook = unsafe {
            SetWinEventHook(
                EVENT_SYSTEM_FOREGROUND,
                EVENT_SYSTEM_FOREGROUND,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };

        if hook.is_invalid() {
            return Err(FocusError::HookInstall);
        }

        Ok(Self { handle: hook })
    }
}

impl Drop for FocusHook {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            unsafe {
                let _ = UnhookWinEvent(self.handle);
            }
            self.handle = HWINEVENTHOOK::default();
        }
    }
}

/// Win event callback: fired on the installing thread whenever the
/// foreground window changes. Must return quickly and never panic, so it
/// only forwards the handle to the message queue; all guardian logic runs
/// in the main loop.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _id_event_thread: u32,
    _dwms_event_time: u32,
) {
    if hwnd == HWND::default() {
        return;
    }

    // NULL hwnd posts to the thread's message queue
    unsafe {
        let _ = PostMessageW(None, WM_FOCUS_CHANGED, WPARAM(hwnd.0 as usize), LPARAM(0));
    }
}
