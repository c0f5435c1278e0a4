pub mod storage;
pub mod types;

use std::sync::Arc;

use tracing::{debug, warn};

use storage::KeyValueStore;
use types::{DraftRecord, ItemId, Rating};

// Storage keys shared with the page script's localStorage layout.
const DRAFT_PREFIX: &str = "feedback";
pub const OVERLAY_SHOWN_KEY: &str = "shownOverlay";
pub const SCROLL_HINT_SHOWN_KEY: &str = "scrollHintShown";

fn draft_key(id: &ItemId) -> String {
    format!("{}_{}_{}", DRAFT_PREFIX, id.article_id, id.recommendation_id)
}

/// Per-item rating/comment drafts on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Last persisted draft for `id`. Malformed records count as absent.
    pub fn load(&self, id: &ItemId) -> Option<DraftRecord> {
        let key = draft_key(id);
        let raw = self.storage.get_item(&key)?;
        match serde_json::from_str::<DraftRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %key, "Discarding unreadable draft: {}", e);
                None
            }
        }
    }

    /// Overwrite the draft for `id`. Write failures are logged, not returned.
    pub fn save(&self, id: &ItemId, rating: Option<Rating>, comment: &str) {
        let key = draft_key(id);
        let record = DraftRecord {
            rating,
            comment: comment.to_string(),
        };
        let result = serde_json::to_string(&record)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.storage.set_item(&key, &value));
        match result {
            Ok(()) => debug!(key = %key, "draft saved"),
            Err(e) => warn!(key = %key, "Failed to persist draft: {}", e),
        }
    }
}

/// The two one-shot onboarding flags. Presence of the key is the flag.
#[derive(Clone)]
pub struct OnboardingFlags {
    storage: Arc<dyn KeyValueStore>,
}

impl OnboardingFlags {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn overlay_shown(&self) -> bool {
        self.storage.get_item(OVERLAY_SHOWN_KEY).is_some()
    }

    pub fn mark_overlay_shown(&self) {
        self.set(OVERLAY_SHOWN_KEY);
    }

    pub fn scroll_hint_shown(&self) -> bool {
        self.storage.get_item(SCROLL_HINT_SHOWN_KEY).is_some()
    }

    pub fn mark_scroll_hint_shown(&self) {
        self.set(SCROLL_HINT_SHOWN_KEY);
    }

    fn set(&self, key: &str) {
        if let Err(e) = self.storage.set_item(key, "true") {
            warn!(key = %key, "Failed to persist flag: {}", e);
        }
    }
}
