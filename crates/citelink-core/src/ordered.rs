//! Ordered fuzzy alignment of a whole title against a reference block.
//!
//! The alignment is seeded by the first anchor from [`find_anchor`]. Every
//! other title token must then match the reference token at the same offset
//! from the anchor within a small edit distance. Only the first anchor is
//! tried: if it sits too late in the reference block (or too early), the pair
//! is rejected even when another anchor would have aligned. That precision
//! gap is kept so results stay comparable with earlier runs.

use crate::adjacency::{Anchor, find_anchor};
use crate::{EditDistance, MatchSet, NormalizedCorpus, ProgressEvent, Stage};

/// Edit distance per non-anchor token must be strictly below this.
pub const TOKEN_MAX_DISTANCE: usize = 2;

/// Check that every non-anchor title token aligns with the reference block.
///
/// Returns `false` rather than indexing out of range when the anchor leaves
/// no room for a full alignment.
pub fn index_match(
    anchor: Anchor,
    title: &[String],
    references: &[String],
    dist: &impl EditDistance,
) -> bool {
    let Anchor { i, j, k } = anchor;

    // The title would start before the reference block does.
    if j < i {
        return false;
    }
    // Not enough reference tokens left for the tail of the title.
    if references.len().saturating_sub(j) < title.len().saturating_sub(i) {
        return false;
    }

    let shift = j - i;
    let matched = title
        .iter()
        .enumerate()
        .filter(|&(u, _)| u != i && u != i + k)
        .filter(|&(u, word)| dist.distance(word, &references[u + shift]) < TOKEN_MAX_DISTANCE)
        .count();

    title.len().saturating_sub(2) == matched
}

/// Whether `title` (3+ tokens) aligns in order with `references`.
pub fn is_exact_match(title: &[String], references: &[String], dist: &impl EditDistance) -> bool {
    if title.len() <= 2 {
        return false;
    }
    match find_anchor(title, references) {
        Some(anchor) => index_match(anchor, title, references, dist),
        None => false,
    }
}

/// Narrow adjacency survivors to full ordered alignments.
pub fn exact_matches(
    normalized: &NormalizedCorpus,
    reduced: &MatchSet,
    dist: &impl EditDistance,
    progress: &dyn Fn(ProgressEvent),
) -> MatchSet {
    progress(ProgressEvent::StageStarted {
        stage: Stage::Ordered,
        total: reduced.total_relations(),
    });
    reduced.filter(|cited, citing| {
        is_exact_match(
            normalized.title(cited),
            normalized.references(citing),
            dist,
        )
    })
}
