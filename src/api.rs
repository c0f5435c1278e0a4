use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::drafts::types::{FeedbackItem, ItemId, Rating};

/// Body of `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub article_id: String,
    pub recommendation_id: String,
    pub rating: Rating,
    pub comment: String,
}

impl From<&FeedbackItem> for FeedbackPayload {
    fn from(item: &FeedbackItem) -> Self {
        Self {
            article_id: item.id.article_id.clone(),
            recommendation_id: item.id.recommendation_id.clone(),
            rating: item.rating,
            comment: item.comment.clone(),
        }
    }
}

/// One entry of `GET /get_user_feedback`. Only `rating` is relied on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteFeedback {
    #[serde(default)]
    pub rating: serde_json::Value,
    #[serde(default)]
    pub comment: Option<String>,
}

impl RemoteFeedback {
    /// Whether the backend holds any rating for this entry. Any non-empty
    /// string, non-zero number or `true` counts, even outside the scale.
    pub fn is_rated(&self) -> bool {
        use serde_json::Value;

        match &self.rating {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// `{article_id: {recommendation_id: RemoteFeedback}}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct UserFeedback(pub HashMap<String, HashMap<String, RemoteFeedback>>);

impl UserFeedback {
    pub fn is_rated(&self, id: &ItemId) -> bool {
        self.0
            .get(&id.article_id)
            .and_then(|recs| recs.get(&id.recommendation_id))
            .is_some_and(RemoteFeedback::is_rated)
    }
}

#[derive(Debug, Deserialize)]
struct RatingCount {
    #[serde(default)]
    count: u64,
}

/// The survey backend as seen by the page.
#[async_trait]
pub trait FeedbackApi: Send + Sync {
    /// `POST /feedback`; returns the acknowledgement body.
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<serde_json::Value>;
    /// `GET /get_user_feedback`.
    async fn user_feedback(&self) -> Result<UserFeedback>;
    /// `GET /get_rating_count`.
    async fn rating_count(&self) -> Result<u64>;
    /// `POST /store_company`.
    async fn store_company(&self, company: &str) -> Result<serde_json::Value>;
}

/// [`FeedbackApi`] over HTTP. Keeps a cookie jar so every call shares the
/// backend session.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let resp = resp
            .error_for_status()
            .with_context(|| format!("{} rejected", what))?;
        let text = resp
            .text()
            .await
            .with_context(|| format!("Failed to read {} response", what))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {} JSON", what))
    }
}

#[async_trait]
impl FeedbackApi for HttpBackend {
    async fn submit_feedback(&self, payload: &FeedbackPayload) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(self.endpoint("/feedback"))
            .json(payload)
            .send()
            .await
            .context("Feedback request failed")?;
        let ack = Self::read_json(resp, "feedback").await?;
        debug!(
            article_id = %payload.article_id,
            recommendation_id = %payload.recommendation_id,
            "feedback acknowledged"
        );
        Ok(ack)
    }

    async fn user_feedback(&self) -> Result<UserFeedback> {
        let resp = self
            .client
            .get(self.endpoint("/get_user_feedback"))
            .send()
            .await
            .context("User feedback request failed")?;
        Self::read_json(resp, "user feedback").await
    }

    async fn rating_count(&self) -> Result<u64> {
        let resp = self
            .client
            .get(self.endpoint("/get_rating_count"))
            .send()
            .await
            .context("Rating count request failed")?;
        let body: RatingCount = Self::read_json(resp, "rating count").await?;
        Ok(body.count)
    }

    async fn store_company(&self, company: &str) -> Result<serde_json::Value> {
        let body = serde_json::json!({ "company": company });
        let resp = self
            .client
            .post(self.endpoint("/store_company"))
            .json(&body)
            .send()
            .await
            .context("Store company request failed")?;
        Self::read_json(resp, "store company").await
    }
}
