use crate::{CrawlState, Effect, Msg, Phase, TerminationReason};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current phase are ignored.
pub fn update(mut state: CrawlState, msg: Msg) -> (CrawlState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (
            Phase::Init,
            Msg::Resumed {
                listing_url,
                last_article_id,
            },
        ) => {
            state.resume_at(listing_url.clone(), last_article_id);
            state.set_phase(Phase::Navigate);
            vec![Effect::LoadListing { url: listing_url }]
        }
        (Phase::Navigate, Msg::ListingLoaded) => {
            state.mark_page_visited();
            state.set_phase(Phase::List);
            let mut effects: Vec<Effect> = state.persist_effect().into_iter().collect();
            if let Some(url) = state.listing_url() {
                effects.push(Effect::ParseListing { url: url.clone() });
            }
            effects
        }
        (Phase::List, Msg::ListingParsed { articles }) => {
            let resume_after = state.take_resume_marker();
            if articles.is_empty() {
                if state.register_empty_page() {
                    terminate(&mut state, TerminationReason::EmptyPageLimit)
                } else {
                    vec![Effect::LocateNextPage]
                }
            } else {
                state.queue_articles(articles, resume_after);
                vec![Effect::LocateNextPage]
            }
        }
        (Phase::List, Msg::NextPageLocated { next }) => {
            state.set_next_page(next);
            match state.pop_pending() {
                Some(article) => {
                    state.set_phase(Phase::Archive);
                    vec![Effect::ArchiveArticle { article }]
                }
                None => checkpoint_and_advance(&mut state),
            }
        }
        (Phase::Archive, Msg::ArticleArchived { article_id }) => {
            state.record_archived(article_id);
            match state.pop_pending() {
                Some(article) => {
                    let mut effects: Vec<Effect> = state.persist_effect().into_iter().collect();
                    effects.push(Effect::ArchiveArticle { article });
                    effects
                }
                // The checkpoint below already carries the new article id.
                None => checkpoint_and_advance(&mut state),
            }
        }
        _ => Vec::new(),
    };

    (state, effects)
}

/// Leaves `Checkpoint` before returning, for the next listing or for termination.
fn checkpoint_and_advance(state: &mut CrawlState) -> Vec<Effect> {
    state.set_phase(Phase::Checkpoint);
    let mut effects: Vec<Effect> = state.persist_effect().into_iter().collect();
    match state.take_next_page() {
        Some(url) => {
            state.enter_listing(url.clone());
            state.set_phase(Phase::Navigate);
            effects.push(Effect::LoadListing { url });
        }
        None => effects.extend(terminate(state, TerminationReason::NoNextPage)),
    }
    effects
}

fn terminate(state: &mut CrawlState, reason: TerminationReason) -> Vec<Effect> {
    state.set_phase(Phase::Terminated(reason));
    vec![Effect::Finish { reason }]
}
