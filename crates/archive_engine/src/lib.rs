//! Archive engine: browser-driven crawl, resource mirroring and checkpointing.
mod archiver;
mod browser;
mod checkpoint;
mod extract;
mod fetch;
mod filename;
mod mirror;
mod navigate;
mod persist;
mod relink;
mod types;

pub use archiver::{ArchiveError, Archiver, ArchiverConfig, RunSummary, DEFAULT_PROGRESS_FILE};
pub use browser::{select_elements, Browser, BrowserError, Element};
pub use checkpoint::{start_url, Checkpoint, CheckpointError, ProgressRecord, ProgressStore};
pub use extract::{ArticleExtractor, RowOutcome, RowParseError, RESTRICTED_MARKERS, ROW_SELECTOR};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{article_dir_name, extension_or, sanitize_title, url_basename};
pub use mirror::{MirrorError, ResourceMirror, STYLESHEET_DIR};
pub use navigate::PageNavigator;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    FailureKind, FetchError, MirrorReport, ResourceKind, ResourceRef, SkippedResource,
};
