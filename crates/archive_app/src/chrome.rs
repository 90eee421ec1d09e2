use archive_engine::{Browser, BrowserError};
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::Page;
use engine_logging::engine_debug;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

/// Headed Chrome driven over CDP, with a single tab reused for every page.
///
/// Dropping it kills the Chrome process.
pub struct ChromeBrowser {
    _browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    pub async fn launch() -> anyhow::Result<Self> {
        let config = BrowserConfig::builder()
            .with_head()
            .build()
            .map_err(|err| anyhow::anyhow!("invalid browser config: {err}"))?;
        let (browser, mut events) = CdpBrowser::launch(config).await?;

        // The CDP connection only makes progress while its event stream is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    engine_debug!("Browser event stream ended: {}", err);
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self {
            _browser: browser,
            page,
            handler,
        })
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl Browser for ChromeBrowser {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let navigation_error = |err: chromiumoxide::error::CdpError| BrowserError::Navigation {
            url: url.to_string(),
            message: err.to_string(),
        };
        self.page.goto(url).await.map_err(navigation_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_error)?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|err| BrowserError::PageSource(err.to_string()))
    }
}
