//! In-process doubles for the backend, the page and the viewport.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::api::{FeedbackApi, FeedbackPayload, RemoteFeedback, UserFeedback};
use crate::drafts::types::ItemId;
use crate::presenter::{Notification, Presenter};
use crate::workflow::gate::GateView;
use crate::workflow::onboarding::ViewportProbe;

/// Backend double. The rating count is the number of distinct items
/// accepted so far unless pinned with `set_count`.
#[derive(Default)]
pub struct FakeApi {
    submitted: Mutex<Vec<FeedbackPayload>>,
    accepted: Mutex<HashSet<ItemId>>,
    failing: Mutex<HashSet<ItemId>>,
    delays: Mutex<HashMap<ItemId, Duration>>,
    remote: Mutex<HashMap<String, HashMap<String, RemoteFeedback>>>,
    companies: Mutex<Vec<String>>,
    pinned_count: Mutex<Option<u64>>,
    count_calls: AtomicUsize,
    count_fails: AtomicBool,
    user_feedback_fails: AtomicBool,
    company_fails: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&self, count: u64) {
        *self.pinned_count.lock().unwrap() = Some(count);
    }

    pub fn fail_count(&self, fail: bool) {
        self.count_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_user_feedback(&self, fail: bool) {
        self.user_feedback_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_company(&self, fail: bool) {
        self.company_fails.store(fail, Ordering::SeqCst);
    }

    pub fn fail_item(&self, id: &ItemId) {
        self.failing.lock().unwrap().insert(id.clone());
    }

    pub fn recover_item(&self, id: &ItemId) {
        self.failing.lock().unwrap().remove(id);
    }

    pub fn delay_item(&self, id: &ItemId, delay: Duration) {
        self.delays.lock().unwrap().insert(id.clone(), delay);
    }

    pub fn set_remote_rating(&self, id: &ItemId, rating: &str) {
        self.remote
            .lock()
            .unwrap()
            .entry(id.article_id.clone())
            .or_default()
            .insert(
                id.recommendation_id.clone(),
                RemoteFeedback {
                    rating: serde_json::Value::String(rating.to_string()),
                    comment: None,
                },
            );
    }

    pub fn submitted(&self) -> Vec<FeedbackPayload> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn companies(&self) -> Vec<String> {
        self.companies.lock().unwrap().clone()
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedbackApi for FakeApi {
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<serde_json::Value> {
        let id = ItemId::new(&payload.article_id, &payload.recommendation_id);
        self.submitted.lock().unwrap().push(payload.clone());

        let delay = self.delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&id) {
            bail!("connection reset while sending {}", id);
        }
        self.accepted.lock().unwrap().insert(id);
        Ok(serde_json::json!({ "status": "success" }))
    }

    async fn user_feedback(&self) -> Result<UserFeedback> {
        if self.user_feedback_fails.load(Ordering::SeqCst) {
            bail!("user feedback unavailable");
        }
        Ok(UserFeedback(self.remote.lock().unwrap().clone()))
    }

    async fn rating_count(&self) -> Result<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.count_fails.load(Ordering::SeqCst) {
            bail!("rating count unavailable");
        }
        let pinned = *self.pinned_count.lock().unwrap();
        Ok(pinned.unwrap_or_else(|| self.accepted.lock().unwrap().len() as u64))
    }

    async fn store_company(&self, company: &str) -> Result<serde_json::Value> {
        self.companies.lock().unwrap().push(company.to_string());
        if self.company_fails.load(Ordering::SeqCst) {
            bail!("store company unavailable");
        }
        Ok(serde_json::json!({ "status": "success" }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Overlay(bool),
    ScrollHint(bool),
    Saved(ItemId),
    Notified(String),
    Progress(GateView),
    Navigation { prev: bool, next: bool },
    Navigate(String),
}

/// Presenter that records every call in order.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PageEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: PageEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn saved_ids(&self) -> Vec<ItemId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PageEvent::Saved(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PageEvent::Notified(_)))
            .count()
    }

    pub fn last_progress(&self) -> Option<GateView> {
        self.events().into_iter().rev().find_map(|e| match e {
            PageEvent::Progress(view) => Some(view),
            _ => None,
        })
    }

    pub fn progress_draws(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, PageEvent::Progress(_)))
            .count()
    }

    pub fn routes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PageEvent::Navigate(route) => Some(route),
                _ => None,
            })
            .collect()
    }

    /// Visibility after the last scroll-hint toggle.
    pub fn hint_visible(&self) -> bool {
        self.events()
            .into_iter()
            .rev()
            .find_map(|e| match e {
                PageEvent::ScrollHint(visible) => Some(visible),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Presenter for RecordingPresenter {
    fn show_overlay(&self, visible: bool) {
        self.push(PageEvent::Overlay(visible));
    }

    fn show_scroll_hint(&self, visible: bool) {
        self.push(PageEvent::ScrollHint(visible));
    }

    fn mark_saved(&self, id: &ItemId) {
        self.push(PageEvent::Saved(id.clone()));
    }

    fn notify(&self, notification: &Notification) {
        self.push(PageEvent::Notified(notification.message.clone()));
    }

    fn show_progress(&self, view: &GateView) {
        self.push(PageEvent::Progress(view.clone()));
    }

    fn show_navigation(&self, prev_visible: bool, next_visible: bool) {
        self.push(PageEvent::Navigation {
            prev: prev_visible,
            next: next_visible,
        });
    }

    fn navigate(&self, route: &str) {
        self.push(PageEvent::Navigate(route.to_string()));
    }
}

#[derive(Default)]
pub struct FakeViewport {
    in_view: AtomicBool,
}

impl FakeViewport {
    pub fn set_in_view(&self, in_view: bool) {
        self.in_view.store(in_view, Ordering::SeqCst);
    }
}

impl ViewportProbe for FakeViewport {
    fn small_articles_in_view(&self) -> bool {
        self.in_view.load(Ordering::SeqCst)
    }
}
