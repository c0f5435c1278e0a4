use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::drafts::types::{ItemId, Rating};
use crate::workflow::PageLayout;

/// One article of the fixture and the recommendations rendered under it.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureArticle {
    pub id: String,
    pub recommendations: Vec<String>,
}

/// Pages the console host can render, in reading order.
#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    pub articles: Vec<FixtureArticle>,
    /// Article opened first; defaults to the first in the list.
    #[serde(default)]
    pub start: Option<String>,
}

impl PageFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read page fixture {}", path.display()))?;
        let fixture: Self = serde_json::from_slice(&bytes).context("Failed to parse page fixture")?;
        if fixture.articles.is_empty() {
            anyhow::bail!("page fixture lists no articles");
        }
        Ok(fixture)
    }

    /// Index of the article opened first.
    pub fn start_index(&self) -> Result<usize> {
        match self.start.as_deref() {
            Some(id) => self
                .articles
                .iter()
                .position(|a| a.id == id)
                .with_context(|| format!("start article {} is not in the fixture", id)),
            None => Ok(0),
        }
    }

    /// Layout of the article at `index` in the reading order.
    pub fn layout(&self, index: usize) -> Result<PageLayout> {
        let article = self
            .articles
            .get(index)
            .with_context(|| format!("no article at position {}", index))?;
        Ok(PageLayout {
            articles: self.articles.iter().map(|a| a.id.clone()).collect(),
            current_index: Some(index),
            items: article
                .recommendations
                .iter()
                .map(|rec| ItemId::new(&article.id, rec))
                .collect(),
        })
    }
}

/// A line typed into the console host. Item numbers are 1-based positions
/// on the current page.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Rate { item: usize, rating: Option<Rating> },
    Comment { item: usize, text: String },
    Submit,
    Prev,
    Next,
    Proceed,
    Company(String),
    Scrolled,
    Show,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
commands:
  rate <n> <1-5|->     set or clear the rating of item n
  comment <n> <text>   set the comment of item n
  submit               send all rated items
  prev | next          submit, then move to the previous/next article
  proceed              submit, then open the questionnaire (once unlocked)
  company <name>       answer the welcome form
  scrolled             report that the recommendations are in view
  show                 list the items on this page
  quit";

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "rate" => parse_rate(rest),
            "comment" => {
                let (item, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match parse_item(item) {
                    Some(item) => Command::Comment {
                        item,
                        text: text.trim_start().to_string(),
                    },
                    None => Command::Invalid("usage: comment <n> <text>".to_string()),
                }
            }
            "submit" => Command::Submit,
            "prev" => Command::Prev,
            "next" => Command::Next,
            "proceed" => Command::Proceed,
            "company" => Command::Company(rest.to_string()),
            "scrolled" => Command::Scrolled,
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => Command::Invalid(String::new()),
            other => Command::Invalid(format!("unknown command `{}` (try `help`)", other)),
        }
    }
}

fn parse_item(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_rate(rest: &str) -> Command {
    let mut parts = rest.split_whitespace();
    let (Some(item), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
        return Command::Invalid("usage: rate <n> <1-5|->".to_string());
    };
    let Some(item) = parse_item(item) else {
        return Command::Invalid(format!("not an item number: {}", item));
    };
    if value == "-" {
        return Command::Rate { item, rating: None };
    }
    match value.parse::<Rating>() {
        Ok(rating) => Command::Rate {
            item,
            rating: Some(rating),
        },
        Err(e) => Command::Invalid(e.to_string()),
    }
}
