use url::Url;

use crate::ArticleRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Checkpoint loaded (or defaulted); crawling starts at `listing_url`.
    Resumed {
        listing_url: Url,
        last_article_id: Option<String>,
    },
    /// The browser finished loading the current listing page.
    ListingLoaded,
    /// Admissible articles extracted from the current listing page.
    ListingParsed { articles: Vec<ArticleRef> },
    /// Result of the next-page lookup on the current listing page.
    NextPageLocated { next: Option<Url> },
    /// An article directory was written in full.
    ArticleArchived { article_id: String },
}
