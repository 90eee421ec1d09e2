use std::time::Duration;

use engine_logging::engine_debug;
use url::Url;

use crate::browser::{Browser, BrowserError, Element};

const PAGINATION_SELECTOR: &str = "li.page-item";
const CONTROL_SELECTOR: &str = "li.page-item a.page-link";
const NEXT_TEXT: &str = "+1";
const CHEVRON_RIGHT_CLASS: &str = "ion-chevron-right";

/// Locates the next listing page. Site-specific heuristics, tried in order:
/// a control reading exactly `+1`, then a text-less control holding a single
/// right-chevron icon.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    channel_url: Url,
    wait: Duration,
}

impl PageNavigator {
    pub fn new(channel_url: Url, wait: Duration) -> Self {
        Self { channel_url, wait }
    }

    /// `Ok(None)` is terminal: pagination never appeared or nothing matched.
    pub async fn find_next(&self, browser: &dyn Browser) -> Result<Option<Url>, BrowserError> {
        if !browser.wait_for(PAGINATION_SELECTOR, self.wait).await? {
            engine_debug!(
                "Pagination ({}) did not appear within {:?}",
                PAGINATION_SELECTOR,
                self.wait
            );
            return Ok(None);
        }

        let controls = browser.query(CONTROL_SELECTOR).await?;
        engine_debug!("Found {} pagination controls", controls.len());
        Ok(self.select_next(&controls))
    }

    pub fn select_next(&self, controls: &[Element]) -> Option<Url> {
        if let Some(url) = controls
            .iter()
            .filter(|c| c.text() == NEXT_TEXT)
            .find_map(|c| self.resolve(c))
        {
            engine_debug!("Next page via {:?} control: {}", NEXT_TEXT, url);
            return Some(url);
        }

        for (idx, control) in controls.iter().enumerate() {
            let icons = control.query("span").unwrap_or_default();
            engine_debug!(
                "Control #{}: text={:?} icon_classes={:?} href={:?}",
                idx,
                control.text(),
                icons.iter().map(|s| s.attr("class").unwrap_or("")).collect::<Vec<_>>(),
                control.attr("href")
            );
            let single_right_icon = icons.len() == 1
                && icons[0].attr("class").unwrap_or("").contains(CHEVRON_RIGHT_CLASS);
            if single_right_icon && control.text().is_empty() {
                if let Some(url) = self.resolve(control) {
                    engine_debug!("Next page via chevron control: {}", url);
                    return Some(url);
                }
            }
        }

        engine_debug!("No next-page control found");
        None
    }

    fn resolve(&self, control: &Element) -> Option<Url> {
        control
            .attr("href")
            .and_then(|href| self.channel_url.join(href).ok())
    }
}
