//! Guardian state machine: keep the guarded window in the foreground

use tracing::{debug, info, warn};
use windows::Win32::Foundation::HWND;

use crate::error::GuardianError;
use crate::focus::FocusHook;
use crate::reactivate;
use crate::resolver::{self, ResolvedTarget};
use crate::window;

/// On/off lifecycle for focus guarding.
///
/// The `On` state owns the resolved target and the event-hook subscription,
/// so a subscription exists exactly while guarding is enabled: dropping the
/// state on any exit path releases the hook.
pub struct Guardian {
    state: GuardState,
}

enum GuardState {
    Off,
    On(ActiveGuard),
}

struct ActiveGuard {
    identifier: String,
    target: ResolvedTarget,
    hook: FocusHook,
}

impl Guardian {
    pub fn new() -> Self {
        Self {
            state: GuardState::Off,
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self.state, GuardState::On(_))
    }

    /// Resolve the target and subscribe to foreground changes.
    ///
    /// On any failure the state stays `Off` with no hook installed. Calling
    /// while already on re-arms against the given identifier.
    pub fn turn_on(&mut self, identifier: &str) -> Result<(), GuardianError> {
        if identifier.trim().is_empty() {
            return Err(GuardianError::NoTargetSelected);
        }

        self.turn_off();

        let target = resolver::resolve(identifier)?;
        let hook = FocusHook::install()?;
        info!(identifier, pid = target.pid, hwnd = ?target.hwnd, "Guarding on");

        // Pull the target forward right away rather than waiting for the
        // first steal
        reactivate::reactivate(target.hwnd);

        self.state = GuardState::On(ActiveGuard {
            identifier: identifier.to_string(),
            target,
            hook,
        });
        Ok(())
    }

    /// Release the subscription and forget the target.
    /// Idempotent: calling while already `Off` is a no-op.
    pub fn turn_off(&mut self) {
        if let GuardState::On(guard) = std::mem::replace(&mut self.state, GuardState::Off) {
            drop(guard.hook);
            info!("Guarding off");
        }
    }

    /// React to one foreground-change notification.
    ///
    /// Runs on the message-loop thread; every failure is handled locally so
    /// nothing escapes the notification path. A stale cached handle triggers
    /// one re-resolution; if the target process is gone, guarding stays
    /// armed and idles until it reappears.
    pub fn handle_focus_change(&mut self, focused: HWND) {
        let GuardState::On(guard) = &mut self.state else {
            // Late notification racing a turn_off; skip
            return;
        };

        if focused == HWND::default() {
            return;
        }

        if !window::is_valid(guard.target.hwnd) {
            warn!(identifier = %guard.identifier, "{}", GuardianError::InvalidHandle);
            match resolver::resolve(&guard.identifier) {
                Ok(target) => {
                    info!(pid = target.pid, hwnd = ?target.hwnd, "Target re-resolved");
                    guard.target = target;
                }
                Err(e) => {
                    warn!(error = %e, "Re-resolution failed, guarding stays armed");
                    return;
                }
            }
        }

        // Handles get reused; compare by owning process instead
        let Some(pid) = window::window_pid(focused) else {
            return;
        };

        if pid == guard.target.pid {
            debug!(pid, "Guarded window focused");
            return;
        }

        info!(
            pid,
            title = %window::window_title(focused),
            "Focus stolen, reclaiming"
        );
        reactivate::reactivate(guard.target.hwnd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_off_when_off_is_noop() {
        let mut guardian = Guardian::new();
        guardian.turn_off();
        guardian.turn_off();
        assert!(!guardian.is_on());
    }

    #[test]
    fn test_turn_on_blank_identifier_rejected() {
        let mut guardian = Guardian::new();
        let err = guardian.turn_on("   ").unwrap_err();
        assert!(matches!(err, GuardianError::NoTargetSelected));
        assert!(!guardian.is_on());
    }

    #[test]
    fn test_turn_on_unknown_process_stays_off() {
        let mut guardian = Guardian::new();
        let err = guardian.turn_on("no-such-process-77af").unwrap_err();
        assert!(matches!(err, GuardianError::NotFound { .. }));
        assert!(!guardian.is_on());
    }

    #[test]
    fn test_focus_change_while_off_is_ignored() {
        let mut guardian = Guardian::new();
        guardian.handle_focus_change(HWND::default());
        guardian.handle_focus_change(HWND(0x5150 as *mut _));
        assert!(!guardian.is_on());
    }
}
