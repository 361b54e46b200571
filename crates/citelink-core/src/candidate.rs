//! Loose lexical-overlap test: the widest stage of the funnel.

use crate::normalize::char_len;
use crate::{EditDistance, MatchSet, NormalizedCorpus, ProgressEvent, Stage};

/// Title tokens shorter than this are "short words" and not counted.
pub const SHORT_WORD_LEN: usize = 4;

/// Minimum number of long title words that must appear in the block.
pub const MIN_MATCHED_WORDS: usize = 2;

/// Long title words allowed to go unmatched is strictly less than this.
pub const MAX_UNMATCHED_WORDS: usize = 3;

/// Edit distance must be strictly below this for the short-title fallback.
pub const SHORT_TITLE_MAX_DISTANCE: usize = 3;

/// Decide whether `references` loosely contains `title`.
///
/// Titles of one or two tokens are too short for overlap counting and fall
/// back to edit-distance comparison.
pub fn is_candidate(title: &[String], references: &[String], dist: &impl EditDistance) -> bool {
    match title {
        [] => false,
        [word] => references
            .iter()
            .any(|r| dist.distance(word, r) < SHORT_TITLE_MAX_DISTANCE),
        [first, second] => references.windows(2).any(|pair| {
            dist.distance(first, &pair[0]) < SHORT_TITLE_MAX_DISTANCE
                && dist.distance(second, &pair[1]) < SHORT_TITLE_MAX_DISTANCE
        }),
        _ => overlap_accepts(title, references),
    }
}

fn overlap_accepts(title: &[String], references: &[String]) -> bool {
    let mut eligible = 0;
    let mut matched = 0;

    for word in title {
        if char_len(word) < SHORT_WORD_LEN {
            continue;
        }
        eligible += 1;
        if references.iter().any(|r| r == word) {
            matched += 1;
        }
    }

    matched >= MIN_MATCHED_WORDS && eligible - matched < MAX_UNMATCHED_WORDS
}

/// Compare every title against every other paper's reference block.
///
/// Keys and lists follow corpus order. Self-pairs are never compared.
pub fn potential_matches(
    normalized: &NormalizedCorpus,
    dist: &impl EditDistance,
    progress: &dyn Fn(ProgressEvent),
) -> MatchSet {
    let total = normalized.len();
    progress(ProgressEvent::StageStarted {
        stage: Stage::Candidate,
        total,
    });

    let mut matches = MatchSet::default();
    for (index, cited) in normalized.iter().enumerate() {
        for citing in normalized.iter() {
            if cited.id == citing.id {
                continue;
            }
            if is_candidate(&cited.title, &citing.references, dist) {
                matches.insert(cited.id, citing.id);
            }
        }
        progress(ProgressEvent::TitleScanned { index, total });
    }
    matches
}
