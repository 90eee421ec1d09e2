//! Capability interface over the automated browser session.
//!
//! The crawl only needs four things from a browser: load a URL, hand back the
//! rendered source, find elements, and wait for elements to appear. Element
//! lookups are answered from the rendered source, so an implementation only
//! has to provide `navigate` and `page_source`.

use std::collections::BTreeMap;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },
    #[error("could not read page source: {0}")]
    PageSource(String),
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
}

#[async_trait::async_trait]
pub trait Browser: Send + Sync {
    /// Load `url` in the session's single tab.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Serialized DOM of the current page as rendered.
    async fn page_source(&self) -> Result<String, BrowserError>;

    async fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let source = self.page_source().await?;
        select_elements(&source, selector)
    }

    /// Polls until `selector` matches or `timeout` elapses. `false` means it never appeared.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if !self.query(selector).await?.is_empty() {
                return Ok(true);
            }
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

/// Owned snapshot of one element, detached from the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    text: String,
    attrs: BTreeMap<String, String>,
    outer_html: String,
}

impl Element {
    fn snapshot(element: ElementRef<'_>) -> Self {
        let value = element.value();
        Self {
            tag: value.name().to_ascii_lowercase(),
            text: visible_text(element),
            attrs: value
                .attrs()
                .map(|(name, val)| (name.to_string(), val.to_string()))
                .collect(),
            outer_html: element.html(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Text content with whitespace runs collapsed and trimmed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn outer_html(&self) -> &str {
        &self.outer_html
    }

    /// Descendants of this element matching `selector`; the element itself is never included.
    pub fn query(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let sel = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.outer_html);
        let root = fragment.root_element();
        let scope = root.children().find_map(ElementRef::wrap).unwrap_or(root);
        Ok(scope.select(&sel).map(Element::snapshot).collect())
    }
}

/// Elements of a full document matching `selector`, in document order.
pub fn select_elements(html: &str, selector: &str) -> Result<Vec<Element>, BrowserError> {
    let sel = parse_selector(selector)?;
    let doc = Html::parse_document(html);
    Ok(doc.select(&sel).map(Element::snapshot).collect())
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector).map_err(|err| BrowserError::Selector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
