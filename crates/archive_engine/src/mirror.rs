use std::path::PathBuf;
use std::sync::Arc;

use archive_core::ArticleRef;
use ego_tree::NodeId;
use engine_logging::{engine_debug, engine_info, engine_warn};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::fetch::{FetchSettings, Fetcher};
use crate::filename::{article_dir_name, extension_or, url_basename};
use crate::persist::{ensure_output_dir, AtomicFileWriter, PersistError};
use crate::relink::{relink, AttrOverrides};
use crate::{FailureKind, FetchError, MirrorReport, ResourceKind, ResourceRef, SkippedResource};

pub const STYLESHEET_DIR: &str = "css";
const INDEX_FILE: &str = "index.html";
const DEFAULT_IMAGE_EXT: &str = ".jpg";
const DEFAULT_VIDEO_EXT: &str = ".mp4";

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("failed to write article: {0}")]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// One attribute in the document that points at a mirrorable resource.
#[derive(Debug, Clone)]
struct Target {
    node: NodeId,
    attr: &'static str,
    kind: ResourceKind,
    url: Url,
    file_name: String,
}

/// Downloads an article's images, videos and stylesheets and relinks them locally.
///
/// Images and videos are per article, named by position. Stylesheets are shared
/// by every article under `<save_dir>/css` and fetched at most once across runs.
pub struct ResourceMirror {
    fetcher: Arc<dyn Fetcher>,
    settings: FetchSettings,
    save_dir: PathBuf,
    channel_url: Url,
}

impl ResourceMirror {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        settings: FetchSettings,
        save_dir: PathBuf,
        channel_url: Url,
    ) -> Self {
        Self {
            fetcher,
            settings,
            save_dir,
            channel_url,
        }
    }

    pub fn stylesheet_dir(&self) -> PathBuf {
        self.save_dir.join(STYLESHEET_DIR)
    }

    /// Archives the already-loaded `article` from its rendered `page_source`.
    ///
    /// Re-running against the same article id overwrites the prior output.
    pub async fn archive(
        &self,
        article: &ArticleRef,
        page_source: &str,
        checkpoint: &mut Checkpoint,
    ) -> Result<MirrorReport, MirrorError> {
        let article_dir = self.save_dir.join(article_dir_name(article));
        ensure_output_dir(&article_dir)?;
        let article_writer = AtomicFileWriter::new(article_dir.clone());
        let css_writer = AtomicFileWriter::new(self.stylesheet_dir());

        let targets = plan_targets(page_source, &article.link, &self.channel_url);
        let mut overrides = AttrOverrides::new();
        let mut report = MirrorReport {
            article_dir: article_dir.clone(),
            mirrored: Vec::new(),
            reused: Vec::new(),
            skipped: Vec::new(),
        };

        for target in targets {
            let local_name = match target.kind {
                ResourceKind::Stylesheet => format!("../{STYLESHEET_DIR}/{}", target.file_name),
                ResourceKind::Image | ResourceKind::Video => target.file_name.clone(),
            };
            let resource = ResourceRef {
                kind: target.kind,
                source_url: target.url.clone(),
                local_name: local_name.clone(),
            };

            if target.kind == ResourceKind::Stylesheet && checkpoint.has_stylesheet(&target.file_name) {
                overrides.insert(target.node, (target.attr, local_name));
                report.reused.push(resource);
                continue;
            }

            let writer = match target.kind {
                ResourceKind::Stylesheet => &css_writer,
                ResourceKind::Image | ResourceKind::Video => &article_writer,
            };
            match self.download(&target, writer).await {
                Ok(()) => {
                    overrides.insert(target.node, (target.attr, local_name));
                    if target.kind == ResourceKind::Stylesheet {
                        checkpoint.add_stylesheet(&target.file_name)?;
                    }
                    report.mirrored.push(resource);
                }
                Err(error) => {
                    engine_warn!("Keeping remote {} {}: {}", target.kind, target.url, error);
                    report.skipped.push(SkippedResource {
                        kind: target.kind,
                        source_url: target.url,
                        error,
                    });
                }
            }
        }

        let index = article_writer.write(INDEX_FILE, relink(page_source, &overrides))?;
        engine_info!(
            "Saved {:?} ({} mirrored, {} reused, {} kept remote)",
            index,
            report.mirrored.len(),
            report.reused.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    async fn download(&self, target: &Target, writer: &AtomicFileWriter) -> Result<(), FetchError> {
        let timeout = self.settings.timeout_for(target.kind);
        let bytes = self.fetcher.fetch(target.url.as_str(), timeout).await?;
        writer
            .write(&target.file_name, bytes)
            .map_err(|err| FetchError::new(FailureKind::Write, err.to_string()))?;
        engine_debug!("Fetched {} -> {:?}", target.url, writer.dir().join(&target.file_name));
        Ok(())
    }
}

/// Collects every mirrorable attribute, in processing order: images, stylesheets, videos.
fn plan_targets(page_source: &str, article_url: &Url, channel_url: &Url) -> Vec<Target> {
    let doc = Html::parse_document(page_source);
    let mut targets = Vec::new();
    plan_images(&doc, article_url, &mut targets);
    plan_stylesheets(&doc, channel_url, &mut targets);
    plan_videos(&doc, article_url, &mut targets);
    targets
}

fn plan_images(doc: &Html, article_url: &Url, targets: &mut Vec<Target>) {
    let Ok(sel) = Selector::parse("img") else {
        return;
    };
    // Position counts every <img>, with or without src.
    for (idx, img) in doc.select(&sel).enumerate() {
        let Some((src, url)) = resolved_attr(img, "src", article_url) else {
            continue;
        };
        engine_debug!("Image #{} {} -> {}", idx, src, url);
        targets.push(Target {
            node: img.id(),
            attr: "src",
            kind: ResourceKind::Image,
            file_name: format!("img_{idx}{}", extension_or(&url, DEFAULT_IMAGE_EXT)),
            url,
        });
    }
}

fn plan_stylesheets(doc: &Html, channel_url: &Url, targets: &mut Vec<Target>) {
    let Ok(sel) = Selector::parse("link[rel='stylesheet']") else {
        return;
    };
    for link in doc.select(&sel) {
        let Some((_, url)) = resolved_attr(link, "href", channel_url) else {
            continue;
        };
        let Some(name) = url_basename(&url) else {
            engine_debug!("Stylesheet {} has no basename; left remote", url);
            continue;
        };
        targets.push(Target {
            node: link.id(),
            attr: "href",
            kind: ResourceKind::Stylesheet,
            file_name: name,
            url,
        });
    }
}

fn plan_videos(doc: &Html, article_url: &Url, targets: &mut Vec<Target>) {
    let (Ok(video_sel), Ok(source_sel)) = (Selector::parse("video"), Selector::parse("source"))
    else {
        return;
    };
    for (idx, video) in doc.select(&video_sel).enumerate() {
        let sources = std::iter::once(video).chain(video.select(&source_sel));
        let with_src = sources.filter(|el| el.value().attr("src").is_some_and(|s| !s.is_empty()));
        for (sub, element) in with_src.enumerate() {
            let Some((_, url)) = resolved_attr(element, "src", article_url) else {
                continue;
            };
            targets.push(Target {
                node: element.id(),
                attr: "src",
                kind: ResourceKind::Video,
                file_name: format!("video_{idx}_{sub}{}", extension_or(&url, DEFAULT_VIDEO_EXT)),
                url,
            });
        }
    }
}

fn resolved_attr<'a>(element: ElementRef<'a>, attr: &str, base: &Url) -> Option<(&'a str, Url)> {
    let raw = element.value().attr(attr).filter(|v| !v.is_empty())?;
    match base.join(raw) {
        Ok(url) => Some((raw, url)),
        Err(err) => {
            engine_debug!("Unresolvable {} {:?}: {}", attr, raw, err);
            None
        }
    }
}
