use archive_core::ArticleRef;
use engine_logging::{engine_debug, engine_trace};
use thiserror::Error;
use url::Url;

use crate::browser::{Browser, BrowserError, Element};

/// Listing rows, notices/pinned rows excluded structurally.
pub const ROW_SELECTOR: &str = "a.vrow.column:not(.notice)";
const TITLE_CELL_SELECTOR: &str = ".vcol.col-title";
const TITLE_SELECTOR: &str = ".title";

/// Localized "no permission" markers the forum appends to restricted titles.
pub const RESTRICTED_MARKERS: &[&str] = &["(権限なし)", "(권한 없음)"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowParseError {
    #[error("row has no title cell")]
    MissingTitleCell,
    #[error("row has no title text element")]
    MissingTitle,
    #[error("row has no href")]
    MissingLink,
    #[error("row href {0:?} is not a valid url")]
    InvalidLink(String),
    #[error(transparent)]
    Selector(#[from] BrowserError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Admitted(ArticleRef),
    Restricted,
}

#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    restricted_markers: Vec<String>,
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self::with_markers(RESTRICTED_MARKERS.iter().copied())
    }
}

impl ArticleExtractor {
    pub fn with_markers<'a>(markers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            restricted_markers: markers.into_iter().map(str::to_string).collect(),
        }
    }

    /// Admissible articles on the browser's current listing page, in page order.
    pub async fn extract(
        &self,
        browser: &dyn Browser,
        page_url: &Url,
    ) -> Result<Vec<ArticleRef>, BrowserError> {
        let rows = browser.query(ROW_SELECTOR).await?;
        Ok(self.extract_rows(&rows, page_url))
    }

    /// Row failures are local: the row is logged and skipped.
    pub fn extract_rows(&self, rows: &[Element], page_url: &Url) -> Vec<ArticleRef> {
        let mut articles = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match self.parse_row(row, page_url) {
                Ok(RowOutcome::Admitted(article)) => articles.push(article),
                Ok(RowOutcome::Restricted) => {
                    engine_trace!("Row {} is access-restricted; skipped", idx);
                }
                Err(err) => {
                    engine_debug!("Row {} skipped: {}", idx, err);
                }
            }
        }
        engine_debug!("Extracted {} of {} rows from {}", articles.len(), rows.len(), page_url);
        articles
    }

    pub fn parse_row(&self, row: &Element, page_url: &Url) -> Result<RowOutcome, RowParseError> {
        let cell = row
            .query(TITLE_CELL_SELECTOR)?
            .into_iter()
            .next()
            .ok_or(RowParseError::MissingTitleCell)?;
        if self.is_restricted(cell.text()) {
            return Ok(RowOutcome::Restricted);
        }

        let href = row.attr("href").ok_or(RowParseError::MissingLink)?;
        let link = page_url
            .join(href)
            .map_err(|_| RowParseError::InvalidLink(href.to_string()))?;

        let title = cell
            .query(TITLE_SELECTOR)?
            .into_iter()
            .next()
            .ok_or(RowParseError::MissingTitle)?;

        Ok(RowOutcome::Admitted(ArticleRef::new(link, title.text().trim())))
    }

    fn is_restricted(&self, text: &str) -> bool {
        self.restricted_markers.iter().any(|m| text.contains(m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::select_elements;

    fn rows(html: &str) -> Vec<Element> {
        select_elements(html, ROW_SELECTOR).unwrap()
    }

    #[test]
    fn row_without_title_cell_is_a_parse_error() {
        let rows = rows(r#"<a class="vrow column" href="/b/cook/1"><span>x</span></a>"#);
        let page = Url::parse("https://arca.live/b/cook").unwrap();
        let err = ArticleExtractor::default().parse_row(&rows[0], &page).unwrap_err();
        assert_eq!(err, RowParseError::MissingTitleCell);
    }

    #[test]
    fn relative_href_is_resolved_against_page() {
        let rows = rows(
            r#"<a class="vrow column" href="/b/cook/55?p=1"><span class="vcol col-title"><span class="title"> Stew </span></span></a>"#,
        );
        let page = Url::parse("https://arca.live/b/cook?p=1").unwrap();
        let outcome = ArticleExtractor::default().parse_row(&rows[0], &page).unwrap();
        assert_eq!(
            outcome,
            RowOutcome::Admitted(ArticleRef::new(
                Url::parse("https://arca.live/b/cook/55?p=1").unwrap(),
                "Stew"
            ))
        );
    }
}
