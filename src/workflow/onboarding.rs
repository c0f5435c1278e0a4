use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info};

use crate::api::FeedbackApi;
use crate::drafts::OnboardingFlags;
use crate::presenter::Presenter;

/// Host-side view of the page geometry.
pub trait ViewportProbe: Send + Sync {
    /// True once the bottom of the small-articles section is inside the
    /// viewport.
    fn small_articles_in_view(&self) -> bool;
}

/// One-time nudge to scroll down to the recommendations.
pub struct ScrollHint {
    flags: OnboardingFlags,
    presenter: Arc<dyn Presenter>,
    viewport: Arc<dyn ViewportProbe>,
    delay: Duration,
    /// Scroll listener attached.
    listening: AtomicBool,
}

impl ScrollHint {
    pub fn new(
        flags: OnboardingFlags,
        presenter: Arc<dyn Presenter>,
        viewport: Arc<dyn ViewportProbe>,
        delay: Duration,
    ) -> Self {
        Self {
            flags,
            presenter,
            viewport,
            delay,
            listening: AtomicBool::new(false),
        }
    }

    /// Arm the hint timer and scroll listener, unless the hint already ran
    /// its course in an earlier session.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.flags.scroll_hint_shown() {
            debug!("scroll hint already shown, not arming");
            return None;
        }

        self.listening.store(true, Ordering::SeqCst);
        let hint = Arc::clone(self);
        Some(tokio::spawn(async move {
            tokio::time::sleep(hint.delay).await;
            if hint.flags.scroll_hint_shown() || hint.viewport.small_articles_in_view() {
                return;
            }
            debug!("showing scroll hint");
            hint.presenter.show_scroll_hint(true);
        }))
    }

    /// Scroll event from the host. Detaches itself once the section is
    /// reached.
    pub fn on_scroll(&self) {
        if !self.listening.load(Ordering::SeqCst) || !self.viewport.small_articles_in_view() {
            return;
        }
        self.presenter.show_scroll_hint(false);
        self.flags.mark_scroll_hint_shown();
        self.listening.store(false, Ordering::SeqCst);
        debug!("small articles reached, scroll hint retired");
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }
}

/// Welcome overlay with the company form.
///
/// Owns the scroll hint timer it arms: the timer is aborted when the page is
/// left or this value is dropped, so it can never fire on another page.
pub struct Onboarding {
    api: Arc<dyn FeedbackApi>,
    flags: OnboardingFlags,
    presenter: Arc<dyn Presenter>,
    hint: Arc<ScrollHint>,
    timer: OnceLock<AbortHandle>,
}

impl Onboarding {
    pub fn new(
        api: Arc<dyn FeedbackApi>,
        flags: OnboardingFlags,
        presenter: Arc<dyn Presenter>,
        hint: Arc<ScrollHint>,
    ) -> Self {
        Self {
            api,
            flags,
            presenter,
            hint,
            timer: OnceLock::new(),
        }
    }

    /// Show the overlay if it was never dismissed. Returns whether it is up.
    pub fn on_load(&self) -> bool {
        if self.flags.overlay_shown() {
            return false;
        }
        self.presenter.show_overlay(true);
        true
    }

    /// Company form submit: store the answer, then dismiss the overlay and
    /// arm the scroll hint whether or not the backend accepted it.
    ///
    /// Once the overlay has been dismissed the form is gone, so later
    /// submits do nothing and return `None`.
    pub async fn submit_company(&self, company: &str) -> Option<JoinHandle<()>> {
        if self.flags.overlay_shown() {
            debug!("overlay already dismissed, ignoring company form");
            return None;
        }
        let company = company.trim();
        match self.api.store_company(company).await {
            Ok(ack) => info!(ack = %ack, "Company info saved"),
            Err(e) => error!("Error storing company info: {:#}", e),
        }
        self.dismiss()
    }

    fn dismiss(&self) -> Option<JoinHandle<()>> {
        self.presenter.show_overlay(false);
        self.flags.mark_overlay_shown();
        let timer = self.hint.start()?;
        if self.timer.set(timer.abort_handle()).is_err() {
            // Only reachable if dismissal raced itself; keep one timer.
            timer.abort();
            return None;
        }
        Some(timer)
    }

    /// Stop a pending scroll hint timer. Called when the page is left.
    pub fn cancel_hint(&self) {
        if let Some(timer) = self.timer.get() {
            if !timer.is_finished() {
                debug!("cancelling pending scroll hint");
            }
            timer.abort();
        }
    }

    pub fn on_scroll(&self) {
        self.hint.on_scroll();
    }

    pub fn hint(&self) -> &Arc<ScrollHint> {
        &self.hint
    }
}

impl Drop for Onboarding {
    fn drop(&mut self) {
        self.cancel_hint();
    }
}
