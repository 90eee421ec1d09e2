use std::fmt;
use std::path::PathBuf;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Video,
    Stylesheet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Image => write!(f, "image"),
            ResourceKind::Video => write!(f, "video"),
            ResourceKind::Stylesheet => write!(f, "stylesheet"),
        }
    }
}

/// A resource that now lives on disk. `local_name` is the value written into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub source_url: Url,
    pub local_name: String,
}

/// A resource left pointing at the remote copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedResource {
    pub kind: ResourceKind,
    pub source_url: Url,
    pub error: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub article_dir: PathBuf,
    pub mirrored: Vec<ResourceRef>,
    /// Stylesheets relinked from the shared store without a fetch.
    pub reused: Vec<ResourceRef>,
    pub skipped: Vec<SkippedResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    /// Fetched, but the local copy could not be written.
    Write,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Write => write!(f, "local write failed"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
