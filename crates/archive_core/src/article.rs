use url::Url;

/// One admissible row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub link: Url,
    pub title: String,
}

impl ArticleRef {
    pub fn new(link: Url, title: impl Into<String>) -> Self {
        Self {
            link,
            title: title.into(),
        }
    }

    /// Trailing path segment of the link, query and fragment ignored.
    pub fn article_id(&self) -> String {
        article_id_from_url(&self.link)
    }
}

/// `https://host/b/cook/101?p=1` and `https://host/b/cook/101/` both yield `101`.
pub fn article_id_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}
