//! CSV-backed persistence for target options and guard state

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const OPTIONS_FILE: &str = "window_options.csv";
pub const STATE_FILE: &str = "window_state.csv";

/// Cap on user-defined targets
pub const MAX_OPTIONS: usize = 5;

const DEFAULT_ID: &str = "POWERPNT";
const DEFAULT_LABEL: &str = "PowerPoint Presentation View";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("option store write failed: {0}")]
    Write(#[from] io::Error),
}

/// A guardable target as shown in the picker: display label + process name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOption {
    pub label: String,
    pub id: String,
}

/// Directory holding the CSV files (next to the executable)
pub fn store_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load the option list; a missing or unreadable file yields an empty list.
/// Lines are `label,id`; malformed lines are skipped.
pub fn load_options(dir: &Path) -> Vec<WindowOption> {
    let path = dir.join(OPTIONS_FILE);
    let Ok(text) = fs::read_to_string(&path) else {
        debug!(path = %path.display(), "No options file");
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() >= 2 && !parts[1].trim().is_empty() {
                Some(WindowOption {
                    label: parts[0].trim().to_string(),
                    id: parts[1].trim().to_string(),
                })
            } else {
                None
            }
        })
        .take(MAX_OPTIONS)
        .collect()
}

pub fn save_options(dir: &Path, options: &[WindowOption]) -> Result<(), StoreError> {
    let mut text = String::new();
    for option in options {
        text.push_str(&format!("{},{}\n", option.label, option.id));
    }
    fs::write(dir.join(OPTIONS_FILE), text)?;
    Ok(())
}

/// Insert the built-in PowerPoint entry when missing; it always sits first
pub fn ensure_default(options: &mut Vec<WindowOption>) {
    if !options.iter().any(|o| o.id == DEFAULT_ID) {
        options.insert(
            0,
            WindowOption {
                label: DEFAULT_LABEL.to_string(),
                id: DEFAULT_ID.to_string(),
            },
        );
        options.truncate(MAX_OPTIONS);
    }
}

/// Persisted toggle state: (guarding enabled, selected target id).
/// The id may be empty when nothing was selected.
pub fn load_state(dir: &Path) -> Option<(bool, String)> {
    let text = fs::read_to_string(dir.join(STATE_FILE)).ok()?;
    let mut lines = text.lines();
    let on = lines.next()?.trim().to_ascii_lowercase().parse::<bool>().ok()?;
    let id = lines.next().unwrap_or("").trim().to_string();
    Some((on, id))
}

pub fn save_state(dir: &Path, on: bool, selected_id: &str) -> Result<(), StoreError> {
    fs::write(dir.join(STATE_FILE), format!("{on}\n{selected_id}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn opt(label: &str, id: &str) -> WindowOption {
        WindowOption {
            label: label.to_string(),
            id: id.to_string(),
        }
    }

    // ========== Option List Tests ==========

    #[test]
    fn test_load_options_missing_file() {
        let dir = tempdir().unwrap();
        assert!(load_options(dir.path()).is_empty());
    }

    #[test]
    fn test_options_roundtrip() {
        let dir = tempdir().unwrap();
        let options = vec![
            opt("PowerPoint Presentation View", "POWERPNT"),
            opt("Kiosk Browser", "kiosk"),
        ];

        save_options(dir.path(), &options).unwrap();
        assert_eq!(load_options(dir.path()), options);
    }

    #[test]
    fn test_load_options_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(OPTIONS_FILE),
            "Notepad,notepad\nno-comma-here\nBlank Id,\n",
        )
        .unwrap();

        let options = load_options(dir.path());
        assert_eq!(options, vec![opt("Notepad", "notepad")]);
    }

    #[test]
    fn test_load_options_caps_at_max() {
        let dir = tempdir().unwrap();
        let mut text = String::new();
        for i in 0..(MAX_OPTIONS + 3) {
            text.push_str(&format!("Option {i},proc{i}\n"));
        }
        fs::write(dir.path().join(OPTIONS_FILE), text).unwrap();

        assert_eq!(load_options(dir.path()).len(), MAX_OPTIONS);
    }

    #[test]
    fn test_ensure_default_inserts_first() {
        let mut options = vec![opt("Notepad", "notepad")];
        ensure_default(&mut options);
        assert_eq!(options[0].id, "POWERPNT");
        assert_eq!(options.len(), 2);

        // Already present: unchanged
        ensure_default(&mut options);
        assert_eq!(options.len(), 2);
    }

    // ========== State Tests ==========

    #[test]
    fn test_load_state_missing_file() {
        let dir = tempdir().unwrap();
        assert!(load_state(dir.path()).is_none());
    }

    #[test]
    fn test_state_roundtrip() {
        let dir = tempdir().unwrap();
        save_state(dir.path(), true, "POWERPNT").unwrap();
        assert_eq!(load_state(dir.path()), Some((true, "POWERPNT".to_string())));

        save_state(dir.path(), false, "").unwrap();
        assert_eq!(load_state(dir.path()), Some((false, String::new())));
    }

    #[test]
    fn test_load_state_tolerates_case() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "True\nPOWERPNT\n").unwrap();
        assert_eq!(load_state(dir.path()), Some((true, "POWERPNT".to_string())));
    }

    #[test]
    fn test_load_state_garbage_is_none() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STATE_FILE), "maybe\nPOWERPNT\n").unwrap();
        assert!(load_state(dir.path()).is_none());
    }
}
