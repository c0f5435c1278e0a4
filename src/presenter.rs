use std::sync::Mutex;
use std::time::Duration;

use tracing::info;

use crate::drafts::types::ItemId;
use crate::workflow::gate::GateView;

/// Transient banner shown at the top of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub background: String,
    pub text_color: String,
    pub duration: Duration,
}

impl Notification {
    /// Banner for a successfully stored item.
    pub fn saved(duration: Duration) -> Self {
        Self {
            message: "Saved!".to_string(),
            background: "#4c77ce".to_string(),
            text_color: "#ffffff".to_string(),
            duration,
        }
    }
}

/// Everything the workflow changes on the page goes through here.
pub trait Presenter: Send + Sync {
    fn show_overlay(&self, visible: bool);
    fn show_scroll_hint(&self, visible: bool);
    /// Success marker on one recommendation's feedback section.
    fn mark_saved(&self, id: &ItemId);
    /// Replaces any banner still on screen.
    fn notify(&self, notification: &Notification);
    fn show_progress(&self, view: &GateView);
    fn show_navigation(&self, prev_visible: bool, next_visible: bool);
    fn navigate(&self, route: &str);
}

/// Renders page updates as terminal lines for the console host.
#[derive(Default)]
pub struct ConsolePresenter {
    pending_route: Mutex<Option<String>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requested by the last `navigate`, if the host has not taken it yet.
    pub fn take_route(&self) -> Option<String> {
        self.pending_route
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

impl Presenter for ConsolePresenter {
    fn show_overlay(&self, visible: bool) {
        if visible {
            println!("[welcome] Before you start, tell us where you work: company <name>");
        } else {
            println!("[welcome] dismissed");
        }
    }

    fn show_scroll_hint(&self, visible: bool) {
        if visible {
            println!("[hint] Scroll down to see the recommended articles (type `scrolled`)");
        }
    }

    fn mark_saved(&self, id: &ItemId) {
        println!("[saved] {}", id);
    }

    fn notify(&self, notification: &Notification) {
        info!(
            duration_ms = notification.duration.as_millis() as u64,
            "{}", notification.message
        );
    }

    fn show_progress(&self, view: &GateView) {
        println!("[progress] {}", view.status_text());
        println!(
            "[questionnaire] {} ({})",
            view.button_label(),
            if view.proceed_enabled() { "enabled" } else { "disabled" }
        );
    }

    fn show_navigation(&self, prev_visible: bool, next_visible: bool) {
        let mut controls = Vec::new();
        if prev_visible {
            controls.push("prev");
        }
        if next_visible {
            controls.push("next");
        }
        if !controls.is_empty() {
            println!("[nav] {}", controls.join(" | "));
        }
    }

    fn navigate(&self, route: &str) {
        info!(route, "navigating");
        *self.pending_route.lock().unwrap_or_else(|e| e.into_inner()) = Some(route.to_string());
    }
}
