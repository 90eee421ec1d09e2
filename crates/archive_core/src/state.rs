use std::collections::VecDeque;

use url::Url;

use crate::{ArticleRef, TerminationReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Init,
    Navigate,
    List,
    Archive,
    /// Transitional: entered and left within the transition that finishes a page,
    /// so `update` never returns a state in this phase.
    Checkpoint,
    Terminated(TerminationReason),
}

/// Orchestrator state. Owned by the executor and threaded through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrawlState {
    phase: Phase,
    listing_url: Option<Url>,
    last_article_id: Option<String>,
    /// Set on resume; consumed by the first parsed listing page.
    resume_after: Option<String>,
    empty_pages: u32,
    empty_page_limit: u32,
    pending: VecDeque<ArticleRef>,
    next_page: Option<Url>,
    pages_visited: u32,
    articles_archived: u32,
}

impl CrawlState {
    pub fn new(empty_page_limit: u32) -> Self {
        Self {
            empty_page_limit,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn listing_url(&self) -> Option<&Url> {
        self.listing_url.as_ref()
    }

    pub fn last_article_id(&self) -> Option<&str> {
        self.last_article_id.as_deref()
    }

    pub fn empty_pages(&self) -> u32 {
        self.empty_pages
    }

    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    pub fn articles_archived(&self) -> u32 {
        self.articles_archived
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Terminated(_))
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn resume_at(&mut self, listing_url: Url, last_article_id: Option<String>) {
        self.listing_url = Some(listing_url);
        self.resume_after = last_article_id.clone();
        self.last_article_id = last_article_id;
    }

    pub(crate) fn enter_listing(&mut self, url: Url) {
        self.listing_url = Some(url);
        self.next_page = None;
    }

    pub(crate) fn mark_page_visited(&mut self) {
        self.pages_visited += 1;
    }

    /// Counts an empty page; true once the consecutive run reaches the limit.
    pub(crate) fn register_empty_page(&mut self) -> bool {
        self.empty_pages += 1;
        self.empty_pages >= self.empty_page_limit
    }

    /// Queues the page's articles, dropping those already archived before an interruption.
    pub(crate) fn queue_articles(&mut self, articles: Vec<ArticleRef>, resume_after: Option<String>) {
        self.empty_pages = 0;
        let skip = resume_after
            .and_then(|done| articles.iter().position(|a| a.article_id() == done))
            .map_or(0, |idx| idx + 1);
        self.pending = articles.into_iter().skip(skip).collect();
    }

    /// Only the first listing page of a resumed run may skip articles.
    pub(crate) fn take_resume_marker(&mut self) -> Option<String> {
        self.resume_after.take()
    }

    pub(crate) fn pop_pending(&mut self) -> Option<ArticleRef> {
        self.pending.pop_front()
    }

    pub(crate) fn set_next_page(&mut self, next: Option<Url>) {
        self.next_page = next;
    }

    pub(crate) fn take_next_page(&mut self) -> Option<Url> {
        self.next_page.take()
    }

    pub(crate) fn record_archived(&mut self, article_id: String) {
        self.last_article_id = Some(article_id);
        self.articles_archived += 1;
    }

    /// Checkpoint contents reflecting the current position.
    pub(crate) fn persist_effect(&self) -> Option<crate::Effect> {
        self.listing_url.clone().map(|listing_url| crate::Effect::Persist {
            listing_url,
            last_article_id: self.last_article_id.clone(),
        })
    }
}
