#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use archive_engine::{Browser, BrowserError, FailureKind, FetchError, Fetcher};

type NavigateHook = Box<dyn Fn() + Send + Sync>;

/// In-memory browser serving fixed HTML per URL and recording every navigation.
#[derive(Default)]
pub struct FakeBrowser {
    pages: HashMap<String, String>,
    hooks: HashMap<String, NavigateHook>,
    current: Mutex<Option<String>>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Runs `hook` every time `url` is navigated to, before the page loads.
    pub fn on_navigate(mut self, url: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.insert(url.to_string(), Box::new(hook));
        self
    }

    pub fn visits(&self) -> Arc<Mutex<Vec<String>>> {
        self.visits.clone()
    }

    /// Loads `url` without going through the trait, for tests that start mid-page.
    pub fn showing(self, url: &str) -> Self {
        *self.current.lock().unwrap() = Some(url.to_string());
        self
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.visits.lock().unwrap().push(url.to_string());
        if let Some(hook) = self.hooks.get(url) {
            hook();
        }
        if !self.pages.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "no such page".into(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.pages.get(&url).cloned())
            .ok_or_else(|| BrowserError::PageSource("nothing loaded".into()))
    }
}

/// Serves canned bodies; anything unknown is a 404. Records every requested URL.
#[derive(Default)]
pub struct CountingFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait::async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or(FetchError {
            kind: FailureKind::HttpStatus(404),
            message: "404 Not Found".into(),
        })
    }
}

pub fn row(id: &str, title: &str) -> String {
    format!(
        r#"<a class="vrow column" href="/b/cook/{id}"><div class="vrow-inner"><span class="vcol col-title"><span class="title">{title}</span></span></div></a>"#
    )
}

pub fn notice_row(id: &str, title: &str) -> String {
    format!(
        r#"<a class="vrow column notice" href="/b/cook/{id}"><span class="vcol col-title"><span class="title">{title}</span></span></a>"#
    )
}

/// Listing page with the given rows; `next` adds a `+1` pagination control.
pub fn listing(rows: &[String], next: Option<&str>) -> String {
    let next_control = next
        .map(|href| {
            format!(r#"<li class="page-item"><a class="page-link" href="{href}">+1</a></li>"#)
        })
        .unwrap_or_default();
    format!(
        r##"<html><body><div class="article-list">{}</div><ul class="pagination"><li class="page-item active"><a class="page-link" href="#">1</a></li>{}</ul></body></html>"##,
        rows.concat(),
        next_control
    )
}
