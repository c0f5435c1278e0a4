use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::api::FeedbackApi;
use crate::presenter::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// What the progress area shows for one observed rating count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub count: u64,
    pub threshold: u64,
}

impl GateView {
    pub fn new(count: u64, threshold: u64) -> Self {
        Self { count, threshold }
    }

    pub fn state(&self) -> GateState {
        if self.count >= self.threshold {
            GateState::Unlocked
        } else {
            GateState::Locked
        }
    }

    pub fn remaining(&self) -> u64 {
        self.threshold.saturating_sub(self.count)
    }

    pub fn proceed_enabled(&self) -> bool {
        self.state() == GateState::Unlocked
    }

    pub fn status_text(&self) -> String {
        match self.state() {
            GateState::Unlocked => format!(
                "Thank you! You have rated {} recommendations. Keep rating, or continue to the questionnaire.",
                self.count
            ),
            GateState::Locked => format!(
                "Please rate {} more recommendations to unlock the questionnaire",
                self.remaining()
            ),
        }
    }

    pub fn button_label(&self) -> String {
        match self.state() {
            GateState::Unlocked => "Continue to the questionnaire".to_string(),
            GateState::Locked => format!("{} remaining", self.remaining()),
        }
    }
}

/// Locks the questionnaire until the backend reports enough ratings.
pub struct ProgressGate {
    api: Arc<dyn FeedbackApi>,
    presenter: Arc<dyn Presenter>,
    threshold: u64,
    /// Last successfully observed view; `None` until the first refresh lands.
    current: RwLock<Option<GateView>>,
}

impl ProgressGate {
    pub fn new(api: Arc<dyn FeedbackApi>, presenter: Arc<dyn Presenter>, threshold: u64) -> Self {
        Self {
            api,
            presenter,
            threshold,
            current: RwLock::new(None),
        }
    }

    /// Re-poll the rating count and redraw the progress area.
    ///
    /// On failure the previous view stays on screen and `None` is returned.
    pub async fn refresh(&self) -> Option<u64> {
        let count = match self.api.rating_count().await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to fetch rating count: {:#}", e);
                return None;
            }
        };

        let view = GateView::new(count, self.threshold);
        let previous = self.current.write().await.replace(view.clone());
        let was_unlocked = previous.is_some_and(|v| v.state() == GateState::Unlocked);

        match (was_unlocked, view.state()) {
            (false, GateState::Unlocked) => info!(count, "Rating threshold reached"),
            (true, GateState::Locked) => warn!(
                count,
                threshold = self.threshold,
                "Rating count dropped below threshold, locking questionnaire"
            ),
            _ => {}
        }

        self.presenter.show_progress(&view);
        Some(count)
    }

    pub async fn view(&self) -> Option<GateView> {
        self.current.read().await.clone()
    }

    pub async fn state(&self) -> GateState {
        self.current
            .read()
            .await
            .as_ref()
            .map_or(GateState::Locked, GateView::state)
    }

    pub async fn is_unlocked(&self) -> bool {
        self.state().await == GateState::Unlocked
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }
}
