use archive_core::ArticleRef;
use url::Url;

const MAX_TITLE_CHARS: usize = 50;

/// `<article_id>_<sanitized_title>`, the directory an article is archived into.
pub fn article_dir_name(article: &ArticleRef) -> String {
    format!("{}_{}", article.article_id(), sanitize_title(&article.title))
}

/// Keeps alphanumerics (any script), spaces, `-` and `_`; truncates to 50 characters.
pub fn sanitize_title(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(MAX_TITLE_CHARS)
        .collect()
}

/// Extension of the URL's last path segment including the dot, or `default`.
pub fn extension_or(url: &Url, default: &str) -> String {
    let segment = last_segment(url);
    match segment.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < segment.len() => segment[idx..].to_string(),
        _ => default.to_string(),
    }
}

/// Last path segment of the URL with query and fragment dropped; `None` for directory URLs.
pub fn url_basename(url: &Url) -> Option<String> {
    let segment = last_segment(url);
    if segment.is_empty() || segment == "." || segment == ".." {
        None
    } else {
        Some(segment.to_string())
    }
}

fn last_segment(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
}
