mod common;

use archive_engine::ArticleExtractor;
use common::{listing, notice_row, row, FakeBrowser};
use url::Url;

const PAGE: &str = "https://arca.live/b/cook?p=1";

async fn extract(html: String) -> Vec<(String, String)> {
    let browser = FakeBrowser::new().with_page(PAGE, html).showing(PAGE);
    let page = Url::parse(PAGE).unwrap();
    ArticleExtractor::default()
        .extract(&browser, &page)
        .await
        .unwrap()
        .into_iter()
        .map(|a| (a.article_id(), a.title))
        .collect()
}

#[tokio::test]
async fn admissible_rows_are_returned_in_page_order() {
    let html = listing(&[row("101", "Soup Recipe"), row("102", "Bread")], None);
    assert_eq!(
        extract(html).await,
        vec![
            ("101".to_string(), "Soup Recipe".to_string()),
            ("102".to_string(), "Bread".to_string())
        ]
    );
}

#[tokio::test]
async fn notice_rows_are_excluded() {
    let html = listing(&[notice_row("1", "Channel rules"), row("101", "Soup")], None);
    assert_eq!(extract(html).await, vec![("101".to_string(), "Soup".to_string())]);
}

#[tokio::test]
async fn restricted_titles_are_excluded_for_either_marker() {
    let html = listing(
        &[
            row("201", "비밀 레시피 (권한 없음)"),
            row("202", "秘密のレシピ (権限なし)"),
            row("203", "Open recipe"),
        ],
        None,
    );
    assert_eq!(extract(html).await, vec![("203".to_string(), "Open recipe".to_string())]);
}

#[tokio::test]
async fn malformed_rows_are_skipped_not_fatal() {
    let broken_no_title = r#"<a class="vrow column" href="/b/cook/301"><span class="vcol col-title"></span></a>"#;
    let broken_no_href = r#"<a class="vrow column"><span class="vcol col-title"><span class="title">x</span></span></a>"#;
    let html = listing(
        &[
            broken_no_title.to_string(),
            broken_no_href.to_string(),
            row("303", "Kept"),
        ],
        None,
    );
    assert_eq!(extract(html).await, vec![("303".to_string(), "Kept".to_string())]);
}

#[tokio::test]
async fn empty_listing_yields_nothing() {
    assert!(extract(listing(&[], None)).await.is_empty());
}
