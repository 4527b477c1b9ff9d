//! Desktop notification support

use notify_rust::Notification;

/// Show toast notification when guarding engages
pub fn show_guarding(label: &str) {
    show(&format!("Guarding: {}", label));
}

/// Surface a guardian error to the user
pub fn show_error(message: &str) {
    show(message);
}

fn show(body: &str) {
    if let Err(e) = Notification::new()
        .summary("Always In Focus")
        .body(body)
        .show()
    {
        tracing::warn!("Notification failed: {e}");
    }
}
