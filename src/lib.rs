//! Client side of the article-recommendation feedback survey.
//!
//! A participant rates the recommendations shown under each article. Ratings
//! and comments are kept as local drafts on every edit, sent to the backend
//! in batches when the participant submits or moves between articles, and
//! the follow-up questionnaire unlocks once the backend has counted enough
//! ratings.

pub mod api;
pub mod commands;
pub mod config;
pub mod drafts;
pub mod presenter;
pub mod workflow;

#[cfg(test)]
mod test_support;
