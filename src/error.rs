//! Error types for always-in-focus

use thiserror::Error;

/// Focus hook errors (graceful degradation)
#[derive(Debug, Error)]
pub enum FocusError {
    #[error("SetWinEventHook → invalid handle")]
    HookInstall,
}

/// Guardian errors surfaced to the user
#[derive(Debug, Error)]
pub enum GuardianError {
    #[error("no target selected")]
    NoTargetSelected,

    #[error("no process named \"{identifier}\"")]
    NotFound { identifier: String },

    #[error("\"{identifier}\" has no visible window")]
    NoWindow { identifier: String },

    #[error("target window handle went stale")]
    InvalidHandle,

    #[error("event hook registration failed: {0}")]
    Subscription(#[from] FocusError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_error_display() {
        let err = FocusError::HookInstall;
        assert_eq!(err.to_string(), "SetWinEventHook → invalid handle");
    }

    #[test]
    fn test_not_found_display() {
        let err = GuardianError::NotFound {
            identifier: "POWERPNT".to_string(),
        };
        assert_eq!(err.to_string(), "no process named \"POWERPNT\"");
    }

    #[test]
    fn test_no_window_display() {
        let err = GuardianError::NoWindow {
            identifier: "notepad".to_string(),
        };
        assert_eq!(err.to_string(), "\"notepad\" has no visible window");
    }

    #[test]
    fn test_subscription_wraps_focus_error() {
        let err = GuardianError::from(FocusError::HookInstall);
        assert!(err.to_string().contains("SetWinEventHook"));
    }
}
