use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, error, info};

use super::form::FeedbackForm;
use super::gate::ProgressGate;
use crate::api::{FeedbackApi, FeedbackPayload};
use crate::drafts::types::{FeedbackItem, ItemId};
use crate::presenter::{Notification, Presenter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Accepted,
    Failed(String),
}

/// Outcome of one item's request within a batch.
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub id: ItemId,
    pub status: SubmissionStatus,
    pub settled_at: DateTime<Utc>,
}

impl SubmissionResult {
    pub fn is_accepted(&self) -> bool {
        self.status == SubmissionStatus::Accepted
    }
}

/// Every attempt of a batch, settled, plus the count seen by the refresh
/// that followed it.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub results: Vec<SubmissionResult>,
    pub progress: Option<u64>,
}

impl BatchReport {
    /// When the last request of the batch settled. `None` for an empty batch.
    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.results.iter().map(|r| r.settled_at).max()
    }

    /// Wall time from sending the batch until its last request settled.
    pub fn elapsed(&self) -> chrono::Duration {
        self.settled_at()
            .map(|t| t - self.started_at)
            .unwrap_or_else(chrono::Duration::zero)
    }

    pub fn accepted(&self) -> impl Iterator<Item = &ItemId> {
        self.results.iter().filter(|r| r.is_accepted()).map(|r| &r.id)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemId> {
        self.results.iter().filter(|r| !r.is_accepted()).map(|r| &r.id)
    }
}

/// Pushes rated form items to the backend and reflects the outcome.
pub struct FeedbackSynchronizer {
    api: Arc<dyn FeedbackApi>,
    presenter: Arc<dyn Presenter>,
    gate: Arc<ProgressGate>,
    saved_notification: Notification,
}

impl FeedbackSynchronizer {
    pub fn new(
        api: Arc<dyn FeedbackApi>,
        presenter: Arc<dyn Presenter>,
        gate: Arc<ProgressGate>,
        saved_notification: Notification,
    ) -> Self {
        Self {
            api,
            presenter,
            gate,
            saved_notification,
        }
    }

    pub fn collect_pending(&self, form: &FeedbackForm) -> Vec<FeedbackItem> {
        form.pending()
    }

    /// Send every item concurrently and wait until all of them settled,
    /// then refresh the progress gate once.
    ///
    /// A failed item does not affect the others; it stays in the form and
    /// goes out again with the next batch.
    pub async fn submit_all(&self, items: Vec<FeedbackItem>) -> BatchReport {
        let batch_size = items.len();
        let started_at = Utc::now();
        let results = join_all(items.into_iter().map(|item| self.submit_one(item))).await;
        let mut report = BatchReport {
            started_at,
            results,
            progress: None,
        };

        let accepted = report.accepted().count();
        info!(
            batch_size,
            accepted,
            failed = batch_size - accepted,
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Feedback batch settled"
        );

        report.progress = self.gate.refresh().await;
        report
    }

    /// `collect_pending` followed by `submit_all`.
    pub async fn flush(&self, form: &FeedbackForm) -> BatchReport {
        self.submit_all(self.collect_pending(form)).await
    }

    /// Mark items the backend already holds a rating for.
    pub async fn mark_already_rated<'a>(&self, ids: impl IntoIterator<Item = &'a ItemId>) {
        let remote = match self.api.user_feedback().await {
            Ok(remote) => remote,
            Err(e) => {
                error!("Failed to fetch user feedback: {:#}", e);
                return;
            }
        };

        let mut marked = 0usize;
        for id in ids {
            if remote.is_rated(id) {
                self.presenter.mark_saved(id);
                marked += 1;
            }
        }
        debug!(marked, "already-rated items marked");
    }

    async fn submit_one(&self, item: FeedbackItem) -> SubmissionResult {
        let payload = FeedbackPayload::from(&item);
        let status = match self.api.submit_feedback(&payload).await {
            Ok(ack) => {
                info!(item = %item.id, ack = %ack, "Feedback submitted");
                self.presenter.mark_saved(&item.id);
                self.presenter.notify(&self.saved_notification);
                SubmissionStatus::Accepted
            }
            Err(e) => {
                error!(item = %item.id, "Feedback submission failed: {:#}", e);
                SubmissionStatus::Failed(format!("{:#}", e))
            }
        };

        SubmissionResult {
            id: item.id,
            status,
            settled_at: Utc::now(),
        }
    }
}
