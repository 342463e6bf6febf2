//! Stream reconciliation
//!
//! Matches a metadata-catalog title to the streaming catalog and resolves a
//! playable source. This is a chain of best-effort heuristics over two
//! independently-keyed catalogs, modeled as a short pipeline of typed stages:
//!
//! 1. search the primary streaming catalog by title
//! 2. select a candidate (MAL cross-reference beats rank order)
//! 3. fetch episodes; fall back to the secondary provider when empty
//! 4. filter by audio variant
//! 5. fetch sources for one episode/server; fall back to the secondary
//! 6. pick an adaptive-manifest URL, else the first source
//!
//! No stage ever turns a no-match into a hard error: a missing title, an
//! empty episode list, or an exhausted source fallback all degrade to an
//! empty result the caller renders as "unavailable".

use std::collections::VecDeque;

use crate::api::consumet::{ConsumetClient, SourceBundle};
use crate::models::{
    pick_source, AudioVariant, MirrorServer, PlayableSource, StreamCandidate, StreamEpisode,
    SubtitleTrack,
};

/// Which provider supplied an episode set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamProvider {
    Anilist,
    Gogo,
}

/// Episode list resolved for one title, with its dub availability
#[derive(Debug, Clone, Default)]
pub struct EpisodeSet {
    pub provider: Option<StreamProvider>,
    pub episodes: Vec<StreamEpisode>,
    pub has_dub: bool,
}

impl EpisodeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Episodes matching the requested audio variant
    pub fn filtered(&self, variant: AudioVariant) -> Vec<StreamEpisode> {
        filter_variant(&self.episodes, variant)
    }
}

/// Source resolution outcome for one episode/server pair.
///
/// `source: None` means both providers came back empty; the player shows a
/// "no source" affordance instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSource {
    pub source: Option<PlayableSource>,
    pub subtitles: Vec<SubtitleTrack>,
}

/// Candidate selection: prefer the hit whose MAL cross-reference matches the
/// detail record's id, else take the upstream's first-ranked hit.
///
/// A title collision can still select an unrelated entry; the cross-reference
/// is the only correctness signal available.
pub fn select_candidate(hits: &[StreamCandidate], mal_id: u64) -> Option<&StreamCandidate> {
    hits.iter()
        .find(|h| h.mal_id == Some(mal_id))
        .or_else(|| hits.first())
}

/// Filter an episode list down to one audio variant
pub fn filter_variant(episodes: &[StreamEpisode], variant: AudioVariant) -> Vec<StreamEpisode> {
    episodes
        .iter()
        .filter(|e| e.is_dub == variant.is_dub())
        .cloned()
        .collect()
}

/// Bounded per-title dub-availability memo with recency eviction.
///
/// Advisory UI decoration only; a stale entry is acceptable, an unbounded
/// one is not.
#[derive(Debug)]
pub struct DubMemo {
    cap: usize,
    entries: VecDeque<(String, bool)>,
}

impl DubMemo {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Look up a title, refreshing its recency on hit
    pub fn get(&mut self, title: &str) -> Option<bool> {
        let pos = self.entries.iter().position(|(t, _)| t == title)?;
        let entry = self.entries.remove(pos)?;
        let has_dub = entry.1;
        self.entries.push_back(entry);
        Some(has_dub)
    }

    pub fn insert(&mut self, title: &str, has_dub: bool) {
        if let Some(pos) = self.entries.iter().position(|(t, _)| t == title) {
            self.entries.remove(pos);
        }
        self.entries.push_back((title.to_string(), has_dub));
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DubMemo {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Reconciliation driver owning the streaming client and the dub memo
pub struct StreamResolver {
    client: ConsumetClient,
    dub_memo: DubMemo,
}

impl StreamResolver {
    pub fn new(client: ConsumetClient) -> Self {
        Self {
            client,
            dub_memo: DubMemo::default(),
        }
    }

    /// Memoized dub availability for a title, if already determined
    pub fn dub_hint(&mut self, title: &str) -> Option<bool> {
        self.dub_memo.get(title)
    }

    /// Stages 1-3: search, candidate selection, episode fetch with
    /// secondary-provider fallback.
    ///
    /// Zero hits or zero episodes from both providers is a legitimate empty
    /// state, not an error.
    pub async fn episodes_for(&mut self, title: &str, mal_id: u64) -> EpisodeSet {
        let hits = match self.client.search(title).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, title, "stream search failed");
                Vec::new()
            }
        };

        let mut set = EpisodeSet::empty();

        if let Some(candidate) = select_candidate(&hits, mal_id) {
            match self.client.episodes(&candidate.id).await {
                Ok(eps) => {
                    if !eps.is_empty() {
                        set = EpisodeSet {
                            provider: Some(StreamProvider::Anilist),
                            episodes: eps,
                            has_dub: false,
                        };
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, candidate = %candidate.id, "primary episode fetch failed");
                }
            }
        } else {
            // Zero hits: playback is unavailable for this title, full stop
            return set;
        }

        // Strict priority order: the secondary provider is consulted only
        // when the primary produced a candidate with no episodes. No merging.
        if set.is_empty() {
            set = self.gogo_episodes_for(title).await;
        }

        set.has_dub = set.episodes.iter().any(|e| e.is_dub);
        self.dub_memo.insert(title, set.has_dub);
        set
    }

    /// Secondary-provider episode lookup: search by the same title, take the
    /// first hit's episodes
    async fn gogo_episodes_for(&self, title: &str) -> EpisodeSet {
        let hits = match self.client.gogo_search(title).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, title, "secondary stream search failed");
                return EpisodeSet::empty();
            }
        };

        let Some(first) = hits.first() else {
            return EpisodeSet::empty();
        };

        match self.client.gogo_episodes(&first.id).await {
            Ok(episodes) if !episodes.is_empty() => EpisodeSet {
                provider: Some(StreamProvider::Gogo),
                episodes,
                has_dub: false,
            },
            Ok(_) => EpisodeSet::empty(),
            Err(e) => {
                tracing::warn!(error = %e, candidate = %first.id, "secondary episode fetch failed");
                EpisodeSet::empty()
            }
        }
    }

    /// Stages 5-6: source fetch with secondary fallback, then URL selection.
    ///
    /// The same episode id and server are retried against the secondary
    /// provider when the primary returns no sources.
    pub async fn sources_for(&self, episode_id: &str, server: MirrorServer) -> ResolvedSource {
        let primary = match self.client.watch(episode_id, server).await {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(error = %e, episode_id, "primary source fetch failed");
                SourceBundle::default()
            }
        };

        let bundle = if primary.is_empty() {
            match self.client.gogo_watch(episode_id, server).await {
                Ok(bundle) => bundle,
                Err(e) => {
                    tracing::warn!(error = %e, episode_id, "secondary source fetch failed");
                    SourceBundle::default()
                }
            }
        } else {
            primary
        };

        ResolvedSource {
            source: pick_source(&bundle.sources).cloned(),
            subtitles: bundle.subtitles,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, mal_id: Option<u64>) -> StreamCandidate {
        StreamCandidate {
            id: id.to_string(),
            title: None,
            mal_id,
            is_adult: false,
        }
    }

    fn ep(id: &str, number: u32, is_dub: bool) -> StreamEpisode {
        StreamEpisode {
            id: id.to_string(),
            number,
            title: None,
            is_dub,
        }
    }

    #[test]
    fn test_select_candidate_prefers_mal_cross_reference() {
        let hits = vec![hit("x1", Some(99)), hit("x2", Some(20))];
        assert_eq!(select_candidate(&hits, 20).unwrap().id, "x2");
    }

    #[test]
    fn test_select_candidate_falls_back_to_first() {
        let hits = vec![hit("x1", Some(99)), hit("x2", None)];
        assert_eq!(select_candidate(&hits, 20).unwrap().id, "x1");
    }

    #[test]
    fn test_select_candidate_empty() {
        assert!(select_candidate(&[], 20).is_none());
    }

    #[test]
    fn test_filter_variant_splits_sub_and_dub() {
        let eps = vec![
            ep("e1", 1, false),
            ep("e1-dub", 1, true),
            ep("e2", 2, false),
        ];
        let subs = filter_variant(&eps, AudioVariant::Sub);
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|e| !e.is_dub));

        let dubs = filter_variant(&eps, AudioVariant::Dub);
        assert_eq!(dubs.len(), 1);
        assert_eq!(dubs[0].id, "e1-dub");
    }

    #[test]
    fn test_dub_memo_bounded() {
        let mut memo = DubMemo::new(3);
        memo.insert("a", true);
        memo.insert("b", false);
        memo.insert("c", true);
        memo.insert("d", false);
        assert_eq!(memo.len(), 3);
        // Oldest entry evicted
        assert_eq!(memo.get("a"), None);
        assert_eq!(memo.get("d"), Some(false));
    }

    #[test]
    fn test_dub_memo_recency_refresh() {
        let mut memo = DubMemo::new(2);
        memo.insert("a", true);
        memo.insert("b", false);
        // Touch "a" so "b" becomes the eviction victim
        assert_eq!(memo.get("a"), Some(true));
        memo.insert("c", true);
        assert_eq!(memo.get("b"), None);
        assert_eq!(memo.get("a"), Some(true));
        assert_eq!(memo.get("c"), Some(true));
    }

    #[test]
    fn test_dub_memo_overwrite_does_not_grow() {
        let mut memo = DubMemo::new(2);
        memo.insert("a", false);
        memo.insert("a", true);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get("a"), Some(true));
    }

    #[test]
    fn test_episode_set_filtered() {
        let set = EpisodeSet {
            provider: Some(StreamProvider::Anilist),
            episodes: vec![ep("e1", 1, false), ep("e1-dub", 1, true)],
            has_dub: true,
        };
        assert_eq!(set.filtered(AudioVariant::Dub).len(), 1);
        assert_eq!(set.filtered(AudioVariant::Sub).len(), 1);
    }
}
