//! Start with Windows via the HKCU Run registry key

use std::env;
use thiserror::Error;
use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, KEY_READ, KEY_WRITE};

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
const APP_NAME: &str = "Always In Focus";

#[derive(Debug, Error)]
pub enum AutoLaunchError {
    #[error("Registry access failed: {0}")]
    Registry(#[from] std::io::Error),

    #[error("Executable path not found")]
    ExePath,
}

/// Check if auto-launch enabled in registry
pub fn is_enabled() -> bool {
    RegKey::predef(HKEY_CURRENT_USER)
        .open_subkey_with_flags(RUN_KEY, KEY_READ)
        .ok()
        .and_then(|key| key.get_value::<String, _>(APP_NAME).ok())
        .is_some()
}

/// Write or remove the Run entry for this executable
pub fn set_enabled(enabled: bool) -> Result<(), AutoLaunchError> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    if enabled {
        let exe_path = env::current_exe().map_err(|_| AutoLaunchError::ExePath)?;
        let (key, _) = hkcu.create_subkey(RUN_KEY)?;
        key.set_value(APP_NAME, &format!("\"{}\"", exe_path.display()))?;
    } else {
        let key = hkcu.open_subkey_with_flags(RUN_KEY, KEY_WRITE)?;
        // Ignore error if the value doesn't exist
        let _ = key.delete_value(APP_NAME);
    }
    Ok(())
}

/// Toggle auto-launch state, returns new state
pub fn toggle() -> Result<bool, AutoLaunchError> {
    let next = !is_enabled();
    set_enabled(next)?;
    Ok(next)
}
