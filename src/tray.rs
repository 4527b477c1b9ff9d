//! System tray integration using tray-icon crate

use muda::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use thiserror::Error;
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::options::WindowOption;

#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Tray icon creation failed: {0}")]
    Creation(String),

    #[error("Menu operation failed: {0}")]
    Menu(String),
}

/// System tray state: status line, target picker, toggle, autolaunch, exit
pub struct TrayState {
    _icon: TrayIcon,
    status_item: MenuItem,
    toggle_item: MenuItem,
    autolaunch_item: CheckMenuItem,
    target_items: Vec<(String, CheckMenuItem)>,
    menu_toggle: MenuId,
    menu_autolaunch: MenuId,
    menu_exit: MenuId,
}

impl TrayState {
    /// Create tray icon with menu; one check item per guardable target
    pub fn new(options: &[WindowOption], selected_id: Option<&str>) -> Result<Self, TrayError> {
        let status_item = MenuItem::with_id("status", "Not guarding", false, None);
        let toggle_item = MenuItem::with_id("toggle", "Turn On", true, None);
        let autolaunch_item =
            CheckMenuItem::with_id("autolaunch", "Start with Windows", true, false, None);
        let exit_item = MenuItem::with_id("exit", "Exit", true, None);

        let menu_toggle = toggle_item.id().clone();
        let menu_autolaunch = autolaunch_item.id().clone();
        let menu_exit = exit_item.id().clone();

        let menu = Menu::new();
        menu.append(&status_item)
            .map_err(|e| TrayError::Menu(e.to_string()))?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        let mut target_items = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            let checked = selected_id == Some(option.id.as_str());
            let item = CheckMenuItem::with_id(
                format!("target-{i}"),
                truncate_label(&option.label, 40),
                true,
                checked,
                None,
            );
            menu.append(&item)
                .map_err(|e| TrayError::Menu(e.to_string()))?;
            target_items.push((option.id.clone(), item));
        }

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;
        menu.append(&toggle_item)
            .map_err(|e| TrayError::Menu(e.to_string()))?;
        menu.append(&autolaunch_item)
            .map_err(|e| TrayError::Menu(e.to_string()))?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;
        menu.append(&exit_item)
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        let icon = load_icon()?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip("Always In Focus")
            .with_icon(icon)
            .build()
            .map_err(|e| TrayError::Creation(e.to_string()))?;

        Ok(Self {
            _icon: tray,
            status_item,
            toggle_item,
            autolaunch_item,
            target_items,
            menu_toggle,
            menu_autolaunch,
            menu_exit,
        })
    }

    /// Update status line and toggle label for the current guard state
    pub fn set_guarding(&self, target_label: Option<&str>) {
        match target_label {
            Some(label) => {
                let text = format!("Guarding: {}", truncate_label(label, 30));
                self.status_item.set_text(&text);
                self.toggle_item.set_text("Turn Off");
            }
            None => {
                self.status_item.set_text("Not guarding");
                self.toggle_item.set_text("Turn On");
            }
        }
    }

    /// Move the selection check mark to the given target id
    pub fn select_target(&self, id: &str) {
        for (option_id, item) in &self.target_items {
            item.set_checked(option_id == id);
        }
    }

    /// Target id behind a menu event, if it was a picker item
    pub fn target_for(&self, id: &MenuId) -> Option<String> {
        self.target_items
            .iter()
            .find(|(_, item)| item.id() == id)
            .map(|(option_id, _)| option_id.clone())
    }

    /// Set autolaunch checkbox state
    pub fn set_autolaunch_checked(&self, checked: bool) {
        self.autolaunch_item.set_checked(checked);
    }

    /// Check if event matches toggle menu
    pub fn is_toggle(&self, id: &MenuId) -> bool {
        *id == self.menu_toggle
    }

    /// Check if event matches autolaunch menu
    pub fn is_autolaunch(&self, id: &MenuId) -> bool {
        *id == self.menu_autolaunch
    }

    /// Check if event matches exit menu
    pub fn is_exit(&self, id: &MenuId) -> bool {
        *id == self.menu_exit
    }
}

/// Get menu event receiver
pub fn menu_receiver() -> &'static muda::MenuEventReceiver {
    MenuEvent::receiver()
}

/// Load icon from embedded Windows resource
fn load_icon() -> Result<Icon, TrayError> {
    // Resource ordinal 1 = icon set by winres in build.rs
    Icon::from_resource(1, None).map_err(|e| TrayError::Creation(e.to_string()))
}

/// Truncate label with ellipsis if too long (char-based, UTF-8 safe)
fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let end = s
            .char_indices()
            .nth(max_chars.saturating_sub(3))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_label_short() {
        assert_eq!(truncate_label("Kiosk", 10), "Kiosk");
    }

    #[test]
    fn test_truncate_label_exact() {
        assert_eq!(truncate_label("KioskShell", 10), "KioskShell");
    }

    #[test]
    fn test_truncate_label_long() {
        assert_eq!(
            truncate_label("PowerPoint Presentation View", 10),
            "PowerPo..."
        );
    }

    #[test]
    fn test_truncate_label_multibyte_boundary() {
        // Truncation point must land on a char boundary
        let s = "プレゼンテーション表示モード設定画面";
        let result = truncate_label(s, 10);
        assert!(result.ends_with("..."));
        assert!(result.chars().count() <= 10);
    }
}
