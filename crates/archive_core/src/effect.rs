use url::Url;

use crate::ArticleRef;

/// Work the executor must perform, in order, on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadListing { url: Url },
    Persist {
        listing_url: Url,
        last_article_id: Option<String>,
    },
    ParseListing { url: Url },
    LocateNextPage,
    ArchiveArticle { article: ArticleRef },
    Finish { reason: TerminationReason },
}

/// Both reasons mean "crawl exhausted"; neither is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    EmptyPageLimit,
    NoNextPage,
}
