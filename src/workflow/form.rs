use std::collections::HashSet;

use anyhow::{bail, Result};
use tracing::debug;

use crate::drafts::types::{FeedbackItem, ItemId, Rating};
use crate::drafts::DraftStore;

/// Current value of one recommendation's rating select and comment box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormItem {
    pub id: ItemId,
    pub rating: Option<Rating>,
    pub comment: String,
}

/// The rendered recommendations, in document order. Every edit is written
/// through to the draft store before the edit call returns.
pub struct FeedbackForm {
    items: Vec<FormItem>,
    drafts: DraftStore,
}

impl FeedbackForm {
    /// Build the form for `ids` and fill each field from its saved draft.
    pub fn hydrate(drafts: DraftStore, ids: impl IntoIterator<Item = ItemId>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for id in ids {
            if !seen.insert(id.clone()) {
                bail!("recommendation {} is rendered twice", id);
            }

            let mut item = FormItem {
                id,
                rating: None,
                comment: String::new(),
            };
            if let Some(draft) = drafts.load(&item.id) {
                item.rating = draft.rating;
                if !draft.comment.is_empty() {
                    item.comment = draft.comment;
                }
            }
            items.push(item);
        }

        let restored = items
            .iter()
            .filter(|i| i.rating.is_some() || !i.comment.is_empty())
            .count();
        debug!(items = items.len(), restored, "form hydrated from drafts");

        Ok(Self { items, drafts })
    }

    pub fn items(&self) -> &[FormItem] {
        &self.items
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter().map(|i| &i.id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&FormItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn set_rating(&mut self, id: &ItemId, rating: Option<Rating>) -> Result<()> {
        let item = self.item_mut(id)?;
        item.rating = rating;
        let (rating, comment) = (item.rating, item.comment.clone());
        self.drafts.save(id, rating, &comment);
        Ok(())
    }

    pub fn set_comment(&mut self, id: &ItemId, comment: &str) -> Result<()> {
        let item = self.item_mut(id)?;
        item.comment = comment.to_string();
        let rating = item.rating;
        self.drafts.save(id, rating, comment);
        Ok(())
    }

    /// Rated items in document order, comments trimmed.
    pub fn pending(&self) -> Vec<FeedbackItem> {
        self.items
            .iter()
            .filter_map(|item| {
                item.rating.map(|rating| FeedbackItem {
                    id: item.id.clone(),
                    rating,
                    comment: item.comment.trim().to_string(),
                })
            })
            .collect()
    }

    fn item_mut(&mut self, id: &ItemId) -> Result<&mut FormItem> {
        match self.items.iter_mut().find(|i| &i.id == id) {
            Some(item) => Ok(item),
            None => bail!("recommendation {} is not on this page", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::drafts::storage::MemoryStore;

    fn ids(pairs: &[(&str, &str)]) -> Vec<ItemId> {
        pairs.iter().map(|(a, r)| ItemId::new(*a, *r)).collect()
    }

    fn drafts() -> DraftStore {
        DraftStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_pending_keeps_document_order_and_skips_unrated() {
        let drafts = drafts();
        let all = ids(&[("a", "1"), ("a", "2"), ("a", "3"), ("a", "4")]);
        let mut form = FeedbackForm::hydrate(drafts, all.clone()).unwrap();

        form.set_rating(&all[3], Rating::new(2)).unwrap();
        form.set_comment(&all[2], "comment but no rating").unwrap();
        form.set_rating(&all[0], Rating::new(5)).unwrap();

        let pending = form.pending();
        let pending_ids: Vec<_> = pending.iter().map(|p| p.id.clone()).collect();
        assert_eq!(pending_ids, vec![all[0].clone(), all[3].clone()]);
    }

    #[test]
    fn test_pending_trims_comments() {
        let all = ids(&[("a", "1")]);
        let mut form = FeedbackForm::hydrate(drafts(), all.clone()).unwrap();
        form.set_rating(&all[0], Rating::new(3)).unwrap();
        form.set_comment(&all[0], "  spaced out \n").unwrap();

        assert_eq!(form.pending()[0].comment, "spaced out");
        // The draft keeps exactly what was typed.
        assert_eq!(form.get(&all[0]).unwrap().comment, "  spaced out \n");
    }

    #[test]
    fn test_edits_persist_and_rehydrate() {
        let drafts = drafts();
        let all = ids(&[("a", "1"), ("b", "9")]);

        let mut form = FeedbackForm::hydrate(drafts.clone(), all.clone()).unwrap();
        form.set_rating(&all[1], Rating::new(4)).unwrap();
        form.set_comment(&all[1], "relevant").unwrap();
        form.set_comment(&all[0], "draft only").unwrap();
        drop(form);

        let reloaded = FeedbackForm::hydrate(drafts, all.clone()).unwrap();
        assert_eq!(
            reloaded.get(&all[1]),
            Some(&FormItem {
                id: all[1].clone(),
                rating: Rating::new(4),
                comment: "relevant".to_string(),
            })
        );
        assert_eq!(reloaded.get(&all[0]).unwrap().rating, None);
        assert_eq!(reloaded.get(&all[0]).unwrap().comment, "draft only");
        assert_eq!(reloaded.pending().len(), 1);
    }

    #[test]
    fn test_clearing_rating_removes_from_pending() {
        let all = ids(&[("a", "1")]);
        let mut form = FeedbackForm::hydrate(drafts(), all.clone()).unwrap();
        form.set_rating(&all[0], Rating::new(1)).unwrap();
        form.set_rating(&all[0], None).unwrap();
        assert!(form.pending().is_empty());
    }

    #[test]
    fn test_unknown_item_is_an_error() {
        let mut form = FeedbackForm::hydrate(drafts(), ids(&[("a", "1")])).unwrap();
        assert!(form
            .set_rating(&ItemId::new("zz", "1"), Rating::new(2))
            .is_err());
        assert!(form.set_comment(&ItemId::new("zz", "1"), "x").is_err());
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let result = FeedbackForm::hydrate(drafts(), ids(&[("a", "1"), ("a", "1")]));
        assert!(result.is_err());
    }
}
