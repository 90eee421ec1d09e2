//! Archive core: pure crawl state machine and article identity helpers.
mod article;
mod effect;
mod msg;
mod state;
mod update;

pub use article::{article_id_from_url, ArticleRef};
pub use effect::{Effect, TerminationReason};
pub use msg::Msg;
pub use state::{CrawlState, Phase};
pub use update::update;
