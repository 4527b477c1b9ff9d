// Hide console in release builds (background mode)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod autolaunch;
mod error;
mod focus;
mod guardian;
mod notification;
mod options;
mod reactivate;
mod resolver;
mod tray;
mod window;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};

use error::GuardianError;
use global_hotkey::hotkey::{Code, HotKey};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use guardian::Guardian;
use options::WindowOption;
use tray::TrayState;
use windows::Win32::Foundation::HWND;
use windows::Win32::System::Console::{
    CTRL_BREAK_EVENT, CTRL_C_EVENT, CTRL_CLOSE_EVENT, SetConsoleCtrlHandler,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, MSG, MWMO_INPUTAVAILABLE, MsgWaitForMultipleObjectsEx, PM_REMOVE,
    PeekMessageW, QS_ALLINPUT, TranslateMessage, WM_ENDSESSION, WM_QUERYENDSESSION, WM_QUIT,
};
use windows::core::BOOL;

/// Shutdown requested via signal (Ctrl-C, console close, etc.)
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Console control handler: signal shutdown via atomic flag.
/// Teardown happens on the loop thread; nothing here may block.
unsafe extern "system" fn ctrl_handler(ctrl_type: u32) -> BOOL {
    match ctrl_type {
        x if x == CTRL_C_EVENT || x == CTRL_BREAK_EVENT => {
            SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
            BOOL(1)
        }
        x if x == CTRL_CLOSE_EVENT => {
            // Console closing - process terminates once this returns (5s
            // timeout), so give the loop thread a beat to drop the hook
            SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(200));
            BOOL(1)
        }
        _ => BOOL(0),
    }
}

struct App {
    guardian: Guardian,
    tray: TrayState,
    store_dir: PathBuf,
    options: Vec<WindowOption>,
    selected: Option<String>,
}

impl App {
    fn selected_option(&self) -> Option<&WindowOption> {
        let id = self.selected.as_deref()?;
        self.options.iter().find(|o| o.id == id)
    }

    /// Tray/hotkey toggle: Off → resolve + arm, On → disarm
    fn toggle_guard(&mut self) {
        if self.guardian.is_on() {
            self.guardian.turn_off();
            self.tray.set_guarding(None);
        } else {
            let Some(option) = self.selected_option().cloned() else {
                self.report(&GuardianError::NoTargetSelected);
                return;
            };
            match self.guardian.turn_on(&option.id) {
                Ok(()) => {
                    self.tray.set_guarding(Some(&option.label));
                    notification::show_guarding(&option.label);
                }
                Err(e) => self.report(&e),
            }
        }
        self.persist_state();
    }

    /// Picker selection; an active guard re-arms against the new target
    fn select_target(&mut self, id: String) {
        self.tray.select_target(&id);
        if self.selected.as_deref() == Some(id.as_str()) {
            return;
        }
        self.selected = Some(id);

        if self.guardian.is_on() {
            if let Some(option) = self.selected_option().cloned() {
                match self.guardian.turn_on(&option.id) {
                    Ok(()) => self.tray.set_guarding(Some(&option.label)),
                    Err(e) => {
                        self.tray.set_guarding(None);
                        self.report(&e);
                    }
                }
            }
        }
        self.persist_state();
    }

    fn persist_state(&self) {
        let selected = self.selected.as_deref().unwrap_or("");
        if let Err(e) = options::save_state(&self.store_dir, self.guardian.is_on(), selected) {
            warn!("State save failed: {e}");
        }
    }

    fn report(&self, err: &GuardianError) {
        error!("{err}");
        notification::show_error(&err.to_string());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let store_dir = options::store_dir();
    let mut opts = options::load_options(&store_dir);
    options::ensure_default(&mut opts);
    let state = options::load_state(&store_dir);

    // Restore the last selection when it still exists, else pick the first
    let selected = state
        .as_ref()
        .map(|(_, id)| id.clone())
        .filter(|id| opts.iter().any(|o| &o.id == id))
        .or_else(|| opts.first().map(|o| o.id.clone()));

    let tray = TrayState::new(&opts, selected.as_deref())
        .map_err(|e| anyhow::anyhow!("TrayState: {e}"))?;
    tray.set_autolaunch_checked(autolaunch::is_enabled());
    info!("System tray initialized");

    let manager =
        GlobalHotKeyManager::new().map_err(|e| anyhow::anyhow!("GlobalHotKeyManager: {e}"))?;

    // Toggle hotkey: F9
    let hotkey_toggle = HotKey::new(None, Code::F9);
    manager
        .register(hotkey_toggle)
        .map_err(|e| anyhow::anyhow!("Toggle hotkey register: {e}"))?;
    info!("Hotkey registered: F9 (toggle guarding)");

    // Install Ctrl-C handler for graceful shutdown
    unsafe { SetConsoleCtrlHandler(Some(ctrl_handler), true) }
        .map_err(|e| anyhow::anyhow!("SetConsoleCtrlHandler: {e}"))?;

    let mut app = App {
        guardian: Guardian::new(),
        tray,
        store_dir,
        options: opts,
        selected,
    };

    // Re-engage guarding persisted from the previous session
    if state.map(|(on, _)| on).unwrap_or(false) {
        app.toggle_guard();
    }

    run_event_loop(&mut app, hotkey_toggle.id())?;

    // Forced Off on every exit path: no subscription survives the process
    let was_on = app.guardian.is_on();
    app.guardian.turn_off();
    let selected = app.selected.as_deref().unwrap_or("");
    if let Err(e) = options::save_state(&app.store_dir, was_on, selected) {
        warn!("State save failed: {e}");
    }
    if let Err(e) = options::save_options(&app.store_dir, &app.options) {
        warn!("Options save failed: {e}");
    }

    Ok(())
}

fn run_event_loop(app: &mut App, toggle_id: u32) -> anyhow::Result<()> {
    let hotkey_rx = GlobalHotKeyEvent::receiver();
    let menu_rx = tray::menu_receiver();
    let mut msg = MSG::default();

    loop {
        // Check shutdown flag (set by ctrl_handler)
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown requested");
            return Ok(());
        }

        // Wait for message OR 16ms timeout
        unsafe {
            MsgWaitForMultipleObjectsEx(None, 16, QS_ALLINPUT, MWMO_INPUTAVAILABLE);
        }

        // Check hotkey events (non-blocking)
        while let Ok(event) = hotkey_rx.try_recv() {
            if event.state() == HotKeyState::Pressed && event.id() == toggle_id {
                app.toggle_guard();
            }
        }

        // Check menu events (non-blocking)
        while let Ok(event) = menu_rx.try_recv() {
            let id = event.id();
            if app.tray.is_exit(id) {
                info!("Exit requested via tray menu");
                SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
            } else if app.tray.is_toggle(id) {
                app.toggle_guard();
            } else if app.tray.is_autolaunch(id) {
                match autolaunch::toggle() {
                    Ok(enabled) => {
                        app.tray.set_autolaunch_checked(enabled);
                        info!(enabled, "Auto-launch toggled");
                    }
                    Err(e) => {
                        error!("Auto-launch toggle failed: {e}");
                    }
                }
            } else if let Some(target_id) = app.tray.target_for(id) {
                app.select_target(target_id);
            }
        }

        // Process Win32 messages
        while unsafe { PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE) }.as_bool() {
            match msg.message {
                WM_QUIT => return Ok(()),
                WM_QUERYENDSESSION => {
                    // Allow system to proceed with logoff/shutdown
                }
                WM_ENDSESSION if msg.wParam.0 != 0 => {
                    info!("Session ending");
                    return Ok(());
                }
                m if m == focus::WM_FOCUS_CHANGED => {
                    app.guardian
                        .handle_focus_change(HWND(msg.wParam.0 as *mut _));
                }
                _ => unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }
}
