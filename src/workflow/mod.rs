pub mod form;
pub mod gate;
pub mod navigation;
pub mod onboarding;
pub mod sync;

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::FeedbackApi;
use crate::config::Config;
use crate::drafts::storage::KeyValueStore;
use crate::drafts::types::{ItemId, Rating};
use crate::drafts::{DraftStore, OnboardingFlags};
use crate::presenter::{Notification, Presenter};

use form::FeedbackForm;
use gate::ProgressGate;
use navigation::ArticleNavigator;
use onboarding::{Onboarding, ScrollHint, ViewportProbe};
use sync::{BatchReport, FeedbackSynchronizer};

/// What the host renders for one article page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageLayout {
    /// Participant's reading order.
    pub articles: Vec<String>,
    /// Position of this page in `articles`, as tracked by the host. An id
    /// may appear more than once in the reading order, so it is not derived
    /// from the article id.
    pub current_index: Option<usize>,
    /// Rendered recommendations, in document order.
    pub items: Vec<ItemId>,
}

/// Collaborators supplied by the host.
#[derive(Clone)]
pub struct PageServices {
    pub api: Arc<dyn FeedbackApi>,
    pub storage: Arc<dyn KeyValueStore>,
    pub presenter: Arc<dyn Presenter>,
    pub viewport: Arc<dyn ViewportProbe>,
}

/// One loaded article page: drafts, submission, progress gate, onboarding
/// and prev/next controls.
pub struct ArticlePage {
    form: FeedbackForm,
    sync: FeedbackSynchronizer,
    gate: Arc<ProgressGate>,
    onboarding: Onboarding,
    nav: ArticleNavigator,
    presenter: Arc<dyn Presenter>,
    follow_up_route: String,
}

impl ArticlePage {
    /// Page load: overlay check, draft hydration, navigation controls,
    /// already-rated markers and the first progress poll.
    pub async fn load(config: &Config, layout: PageLayout, services: PageServices) -> Result<Self> {
        let PageServices {
            api,
            storage,
            presenter,
            viewport,
        } = services;

        let flags = OnboardingFlags::new(storage.clone());
        let hint = Arc::new(ScrollHint::new(
            flags.clone(),
            presenter.clone(),
            viewport,
            config.scroll_hint_delay,
        ));
        let onboarding = Onboarding::new(api.clone(), flags, presenter.clone(), hint);
        let gate = Arc::new(ProgressGate::new(
            api.clone(),
            presenter.clone(),
            config.rating_threshold,
        ));
        let sync = FeedbackSynchronizer::new(
            api,
            presenter.clone(),
            gate.clone(),
            Notification::saved(config.notification_duration),
        );

        let form = FeedbackForm::hydrate(DraftStore::new(storage), layout.items)?;
        let nav = ArticleNavigator::new(layout.articles, layout.current_index);

        let page = Self {
            form,
            sync,
            gate,
            onboarding,
            nav,
            presenter,
            follow_up_route: config.follow_up_route.clone(),
        };

        let overlay = page.onboarding.on_load();
        page.presenter
            .show_navigation(page.nav.has_prev(), page.nav.has_next());
        page.sync.mark_already_rated(page.form.ids()).await;
        page.gate.refresh().await;

        info!(
            article = page.nav.current_article().unwrap_or("?"),
            index = ?page.nav.current_index(),
            items = page.form.items().len(),
            overlay,
            "Article page loaded"
        );
        Ok(page)
    }

    pub fn set_rating(&mut self, id: &ItemId, rating: Option<Rating>) -> Result<()> {
        self.form.set_rating(id, rating)
    }

    pub fn set_comment(&mut self, id: &ItemId, comment: &str) -> Result<()> {
        self.form.set_comment(id, comment)
    }

    /// Submit every rated item and refresh progress.
    pub async fn submit(&self) -> BatchReport {
        self.sync.flush(&self.form).await
    }

    /// Flush feedback, then go to the previous article if there is one.
    pub async fn go_prev(&self) -> Option<String> {
        self.submit().await;
        self.open(self.nav.prev_route())
    }

    /// Flush feedback, then go to the next article if there is one.
    pub async fn go_next(&self) -> Option<String> {
        self.submit().await;
        self.open(self.nav.next_route())
    }

    /// The questionnaire button. Does nothing while locked; once unlocked it
    /// flushes feedback and only then leaves for the follow-up route.
    pub async fn proceed(&self) -> bool {
        if !self.gate.is_unlocked().await {
            debug!("questionnaire still locked, ignoring proceed");
            return false;
        }
        self.submit().await;
        self.onboarding.cancel_hint();
        self.presenter.navigate(&self.follow_up_route);
        true
    }

    pub async fn submit_company(&self, company: &str) -> Option<JoinHandle<()>> {
        self.onboarding.submit_company(company).await
    }

    pub fn on_scroll(&self) {
        self.onboarding.on_scroll();
    }

    pub fn form(&self) -> &FeedbackForm {
        &self.form
    }

    pub fn gate(&self) -> &ProgressGate {
        &self.gate
    }

    fn open(&self, route: Option<String>) -> Option<String> {
        let route = route?;
        self.onboarding.cancel_hint();
        self.presenter.navigate(&route);
        Some(route)
    }
}
