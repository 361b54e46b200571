//! Anchor search: two long tokens that match exactly at the same relative
//! offset in both the title and the reference block.

use crate::normalize::char_len;
use crate::{MatchSet, NormalizedCorpus, ProgressEvent, Stage};

/// Tokens must be strictly longer than this to serve as an anchor.
pub const ANCHOR_MIN_LEN: usize = 3;

/// Position of the first anchor pair found in a title/reference alignment.
///
/// `title[i] == references[j]` and `title[i + k] == references[j + k]`, both
/// tokens longer than [`ANCHOR_MIN_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

fn is_long(token: &str) -> bool {
    char_len(token) > ANCHOR_MIN_LEN
}

/// Find the first anchor in scan order: title index `i` ascending, then
/// reference index `j` ascending, then offset `k` ascending from 1.
///
/// Only the first hit is ever reported; later anchors are not considered.
pub fn find_anchor(title: &[String], references: &[String]) -> Option<Anchor> {
    for (i, word) in title.iter().enumerate() {
        if !is_long(word) {
            continue;
        }
        for (j, candidate) in references.iter().enumerate() {
            if word != candidate {
                continue;
            }
            let mut k = 1;
            while i + k < title.len() && j + k < references.len() {
                let next = &title[i + k];
                if is_long(next) && *next == references[j + k] {
                    return Some(Anchor { i, j, k });
                }
                k += 1;
            }
        }
    }
    None
}

/// Whether `title` (3+ tokens) has an anchor in `references`.
pub fn is_adjacent_match(title: &[String], references: &[String]) -> bool {
    title.len() > 2 && find_anchor(title, references).is_some()
}

/// Narrow candidate pairs to those with an anchor.
///
/// Each cited paper's title is paired with the citing paper's reference block.
pub fn reduce_matches(
    normalized: &NormalizedCorpus,
    candidates: &MatchSet,
    progress: &dyn Fn(ProgressEvent),
) -> MatchSet {
    progress(ProgressEvent::StageStarted {
        stage: Stage::Adjacency,
        total: candidates.total_relations(),
    });
    candidates.filter(|cited, citing| {
        is_adjacent_match(normalized.title(cited), normalized.references(citing))
    })
}
