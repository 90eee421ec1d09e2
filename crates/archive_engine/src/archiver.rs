use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use archive_core::{update, CrawlState, Effect, Msg, TerminationReason};
use chrono::{DateTime, Utc};
use engine_logging::{engine_info, engine_warn};
use thiserror::Error;
use url::Url;

use crate::browser::{Browser, BrowserError};
use crate::checkpoint::{start_url, Checkpoint, CheckpointError, ProgressStore};
use crate::extract::ArticleExtractor;
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::mirror::{MirrorError, ResourceMirror, STYLESHEET_DIR};
use crate::navigate::PageNavigator;
use crate::persist::{ensure_output_dir, PersistError};
use crate::FetchError;

pub const DEFAULT_PROGRESS_FILE: &str = "progress.json";

#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    pub channel_url: Url,
    pub empty_page_limit: u32,
    pub save_dir: PathBuf,
    pub progress_file: PathBuf,
    pub fetch: FetchSettings,
    /// Pause after a listing page loads, before it is read.
    pub listing_settle: Duration,
    /// Pause after an article loads, before its source is taken.
    pub article_settle: Duration,
    /// How long pagination controls may take to appear.
    pub pagination_wait: Duration,
}

impl ArchiverConfig {
    pub fn new(channel_url: Url) -> Self {
        Self {
            channel_url,
            empty_page_limit: 100,
            save_dir: PathBuf::from("articles"),
            progress_file: PathBuf::from(DEFAULT_PROGRESS_FILE),
            fetch: FetchSettings::default(),
            listing_settle: Duration::from_millis(500),
            article_settle: Duration::from_secs(1),
            pagination_wait: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_visited: u32,
    pub articles_archived: u32,
    pub termination: TerminationReason,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("http client setup failed: {0}")]
    ClientSetup(FetchError),
    #[error("crawl stalled in phase {0}")]
    Stalled(String),
}

impl From<MirrorError> for ArchiveError {
    fn from(err: MirrorError) -> Self {
        match err {
            MirrorError::Persist(err) => ArchiveError::Persist(err),
            MirrorError::Checkpoint(err) => ArchiveError::Checkpoint(err),
        }
    }
}

/// Drives the crawl: feeds the core state machine and performs its effects, one at a time.
pub struct Archiver {
    config: ArchiverConfig,
    browser: Box<dyn Browser>,
    extractor: ArticleExtractor,
    navigator: PageNavigator,
    mirror: ResourceMirror,
}

impl Archiver {
    pub fn new(config: ArchiverConfig, browser: Box<dyn Browser>, fetcher: Arc<dyn Fetcher>) -> Self {
        let navigator = PageNavigator::new(config.channel_url.clone(), config.pagination_wait);
        let mirror = ResourceMirror::new(
            fetcher,
            config.fetch.clone(),
            config.save_dir.clone(),
            config.channel_url.clone(),
        );
        Self {
            config,
            browser,
            extractor: ArticleExtractor::default(),
            navigator,
            mirror,
        }
    }

    /// Uses the reqwest-backed fetcher built from `config.fetch`.
    pub fn with_http_fetcher(
        config: ArchiverConfig,
        browser: Box<dyn Browser>,
    ) -> Result<Self, ArchiveError> {
        let fetcher = ReqwestFetcher::new(&config.fetch).map_err(ArchiveError::ClientSetup)?;
        Ok(Self::new(config, browser, Arc::new(fetcher)))
    }

    pub async fn run(&self) -> Result<RunSummary, ArchiveError> {
        self.run_at(Utc::now()).await
    }

    /// Runs until the crawl is exhausted. `now` fixes the start filter when no checkpoint exists.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, ArchiveError> {
        ensure_output_dir(&self.config.save_dir)?;
        ensure_output_dir(&self.config.save_dir.join(STYLESHEET_DIR))?;

        let store = ProgressStore::new(self.config.progress_file.clone());
        let mut checkpoint = Checkpoint::open(store, start_url(&self.config.channel_url, now))?;
        let record = checkpoint.record().clone();

        let (mut state, effects) = update(
            CrawlState::new(self.config.empty_page_limit),
            Msg::Resumed {
                listing_url: record.last_listing_url,
                last_article_id: record.last_article_id,
            },
        );
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::LoadListing { url } => {
                    engine_info!("Crawling listing {}", url);
                    self.browser.navigate(url.as_str()).await?;
                    settle(self.config.listing_settle).await;
                    Some(Msg::ListingLoaded)
                }
                Effect::Persist {
                    listing_url,
                    last_article_id,
                } => {
                    checkpoint.set_position(listing_url, last_article_id)?;
                    None
                }
                Effect::ParseListing { url } => {
                    let articles = self.extractor.extract(self.browser.as_ref(), &url).await?;
                    engine_info!("{} admissible articles on {}", articles.len(), url);
                    Some(Msg::ListingParsed { articles })
                }
                Effect::LocateNextPage => {
                    let next = self.navigator.find_next(self.browser.as_ref()).await?;
                    Some(Msg::NextPageLocated { next })
                }
                Effect::ArchiveArticle { article } => {
                    self.browser.navigate(article.link.as_str()).await?;
                    settle(self.config.article_settle).await;
                    let source = self.browser.page_source().await?;
                    self.mirror.archive(&article, &source, &mut checkpoint).await?;
                    Some(Msg::ArticleArchived {
                        article_id: article.article_id(),
                    })
                }
                Effect::Finish { reason } => {
                    let summary = RunSummary {
                        pages_visited: state.pages_visited(),
                        articles_archived: state.articles_archived(),
                        termination: reason,
                    };
                    match reason {
                        TerminationReason::EmptyPageLimit => engine_info!(
                            "{} consecutive pages without new articles; stopping",
                            self.config.empty_page_limit
                        ),
                        TerminationReason::NoNextPage => {
                            engine_info!("No next-page control found; stopping")
                        }
                    }
                    engine_info!(
                        "Crawl finished: {} pages, {} articles",
                        summary.pages_visited,
                        summary.articles_archived
                    );
                    return Ok(summary);
                }
            };

            if let Some(msg) = msg {
                let (next, effects) = update(state, msg);
                state = next;
                queue.extend(effects);
            }
        }

        engine_warn!("Effect queue drained without termination in {:?}", state.phase());
        Err(ArchiveError::Stalled(format!("{:?}", state.phase())))
    }
}

async fn settle(pause: Duration) {
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
