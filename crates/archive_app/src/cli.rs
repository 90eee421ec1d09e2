use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// Archive a forum channel, newest first, resuming from `progress.json`.
#[derive(Parser, Debug)]
#[command(name = "forum-archiver", about, version)]
pub struct Args {
    /// Channel listing root; pagination links resolve against it.
    #[arg(long, default_value = "https://arca.live/b/cook")]
    pub channel_url: Url,

    /// Consecutive listing pages without admissible articles before stopping.
    #[arg(long, default_value_t = 100)]
    pub empty_page_limit: u32,

    #[arg(long, default_value = "articles")]
    pub save_dir: PathBuf,

    /// Log pagination diagnostics and per-resource fetches.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_cook_channel() {
        let args = Args::parse_from(["forum-archiver"]);
        assert_eq!(args.channel_url.as_str(), "https://arca.live/b/cook");
        assert_eq!(args.empty_page_limit, 100);
        assert_eq!(args.save_dir, PathBuf::from("articles"));
        assert!(!args.verbose);
    }

    #[test]
    fn rejects_malformed_channel_url() {
        assert!(Args::try_parse_from(["forum-archiver", "--channel-url", "not a url"]).is_err());
    }
}
