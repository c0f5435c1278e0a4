use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};

use survey_feedback::api::{FeedbackApi, HttpBackend};
use survey_feedback::commands::{Command, PageFixture, HELP};
use survey_feedback::config::Config;
use survey_feedback::drafts::storage::{FileStore, KeyValueStore};
use survey_feedback::drafts::types::ItemId;
use survey_feedback::presenter::ConsolePresenter;
use survey_feedback::workflow::onboarding::ViewportProbe;
use survey_feedback::workflow::{ArticlePage, PageServices};

/// The terminal has no geometry; `scrolled` flips this.
#[derive(Default)]
struct ConsoleViewport {
    reached: AtomicBool,
}

impl ViewportProbe for ConsoleViewport {
    fn small_articles_in_view(&self) -> bool {
        self.reached.load(Ordering::SeqCst)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = Config::from_env()?;
    let fixture_path = std::env::args()
        .nth(1)
        .or_else(|| dotenv::var("SURVEY_PAGE_FIXTURE").ok())
        .map(PathBuf::from)
        .context("usage: survey-feedback <page-fixture.json> (or set SURVEY_PAGE_FIXTURE)")?;
    let fixture = PageFixture::load(&fixture_path)?;

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage_path)?);
    info!("Local storage at {:?}", config.storage_path);
    let api: Arc<dyn FeedbackApi> = Arc::new(HttpBackend::new(&config)?);
    info!(base_url = %config.base_url, "Backend client initialized");
    let presenter = Arc::new(ConsolePresenter::new());
    let viewport = Arc::new(ConsoleViewport::default());

    let services = PageServices {
        api,
        storage,
        presenter: presenter.clone(),
        viewport: viewport.clone(),
    };

    let mut index = fixture.start_index()?;
    let mut page = ArticlePage::load(&config, fixture.layout(index)?, services.clone()).await?;
    print_items(&page);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = Command::parse(&line);
        // Reading-order position the page is leaving for, if any.
        let mut target = None;
        match command {
            Command::Rate { item, rating } => match item_id(&page, item) {
                Some(id) => page.set_rating(&id, rating)?,
                None => println!("no item {} on this page", item),
            },
            Command::Comment { item, text } => match item_id(&page, item) {
                Some(id) => page.set_comment(&id, &text)?,
                None => println!("no item {} on this page", item),
            },
            Command::Submit => {
                let report = page.submit().await;
                println!(
                    "{} saved, {} failed",
                    report.accepted().count(),
                    report.failed().count()
                );
            }
            Command::Prev => {
                if page.go_prev().await.is_some() {
                    target = index.checked_sub(1);
                }
            }
            Command::Next => {
                if page.go_next().await.is_some() {
                    target = Some(index + 1);
                }
            }
            Command::Proceed => {
                if !page.proceed().await {
                    println!("the questionnaire is still locked");
                }
            }
            Command::Company(name) => {
                // The page owns the hint timer and cancels it when left.
                if page.submit_company(&name).await.is_none() {
                    println!("the welcome form was already answered");
                }
            }
            Command::Scrolled => {
                viewport.reached.store(true, Ordering::SeqCst);
                page.on_scroll();
            }
            Command::Show => print_items(&page),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Invalid(msg) if msg.is_empty() => {}
            Command::Invalid(msg) => println!("{}", msg),
        }

        let Some(route) = presenter.take_route() else {
            continue;
        };
        match target {
            Some(next) => match fixture.layout(next) {
                Ok(layout) => {
                    drop(page);
                    index = next;
                    page = ArticlePage::load(&config, layout, services.clone()).await?;
                    print_items(&page);
                }
                Err(e) => warn!("Cannot open {}: {}", route, e),
            },
            None => {
                println!(
                    "Continue in your browser: {}{}",
                    config.base_url.trim_end_matches('/'),
                    route
                );
                break;
            }
        }
    }

    info!(index, "Session finished");
    Ok(())
}

fn item_id(page: &ArticlePage, item: usize) -> Option<ItemId> {
    page.form()
        .items()
        .get(item.checked_sub(1)?)
        .map(|i| i.id.clone())
}

fn print_items(page: &ArticlePage) {
    for (n, item) in page.form().items().iter().enumerate() {
        let rating = item
            .rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}. {} rating={} comment={:?}",
            n + 1,
            item.id,
            rating,
            item.comment
        );
    }
}
