//! Finds reference blocks that mention an author by initial and surname.
//!
//! Independent of the title funnel: patterns are matched against the raw,
//! unnormalized reference text, so punctuation such as the period after an
//! initial is still present.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::{Author, AuthorId, AuthorRegistry, CoreError, Corpus, PaperId};

/// One piece of a parsed author-name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// First letter of the given name.
    Initial(char),
    /// Text matched as-is (case-insensitively).
    Literal(String),
    /// Exactly one arbitrary character, from a `?` in the source name.
    Wildcard,
}

/// A structured `"j. doe"`-style pattern built from an author's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionPattern {
    segments: Vec<Segment>,
}

impl MentionPattern {
    /// Parse a `"First [Middle…] Last"` name.
    ///
    /// Multi-token names become the first initial, a literal `". "`, and the
    /// last token; middle tokens are dropped. A single-token name is used
    /// whole. `?` in the name (a common stand-in for characters lost in
    /// transcoding) becomes a single-character wildcard. Returns `None` for a
    /// blank name.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        let mut pattern = MentionPattern {
            segments: Vec::new(),
        };

        match tokens.as_slice() {
            [] => return None,
            [only] => pattern.push_text(only),
            [first, .., last] => {
                let initial = first.chars().next()?;
                if initial == '?' {
                    pattern.segments.push(Segment::Wildcard);
                } else {
                    pattern.segments.push(Segment::Initial(initial));
                }
                pattern.push_text(". ");
                pattern.push_text(last);
            }
        }
        Some(pattern)
    }

    fn push_text(&mut self, text: &str) {
        for (n, piece) in text.split('?').enumerate() {
            if n > 0 {
                self.segments.push(Segment::Wildcard);
            }
            if piece.is_empty() {
                continue;
            }
            match self.segments.last_mut() {
                Some(Segment::Literal(existing)) => existing.push_str(piece),
                _ => self.segments.push(Segment::Literal(piece.to_string())),
            }
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Regex source for this pattern, literals escaped.
    pub fn regex_source(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Initial(c) => regex::escape(c.encode_utf8(&mut [0; 4])),
                Segment::Literal(text) => regex::escape(text),
                Segment::Wildcard => ".".to_string(),
            })
            .collect()
    }

    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.regex_source())
            .case_insensitive(true)
            .build()
    }
}

impl fmt::Display for MentionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Initial(c) => write!(f, "{c}")?,
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Wildcard => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

/// An author's name pattern was found in a paper's reference block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AuthorMention {
    pub author_id: AuthorId,
    pub paper_id: PaperId,
}

/// Find every reference block mentioning each author.
///
/// Authors are processed in registry order; `limit` caps how many are
/// processed (`None` processes all). Edges come out grouped by author, papers
/// in corpus order. Authors with blank names are skipped.
pub fn match_authors(
    corpus: &Corpus,
    registry: &AuthorRegistry,
    limit: Option<usize>,
) -> Result<Vec<AuthorMention>, CoreError> {
    let mut edges = Vec::new();

    for author in registry.iter().take(limit.unwrap_or(usize::MAX)) {
        let Some(pattern) = MentionPattern::parse(&author.name) else {
            tracing::debug!(author_id = author.id, "skipping author with blank name");
            continue;
        };
        let regex = pattern.compile().map_err(|source| CoreError::Pattern {
            name: author.name.clone(),
            source,
        })?;

        let before = edges.len();
        edges.extend(
            corpus
                .iter()
                .filter(|paper| regex.is_match(&paper.references))
                .map(|paper| AuthorMention {
                    author_id: author.id,
                    paper_id: paper.id,
                }),
        );
        tracing::trace!(
            author_id = author.id,
            pattern = %pattern,
            mentions = edges.len() - before,
            "author scanned"
        );
    }

    tracing::info!(
        authors = limit.map_or(registry.len(), |l| l.min(registry.len())),
        edges = edges.len(),
        "author mentions"
    );
    Ok(edges)
}

/// Papers whose reference block mentions `author_id`, in edge order.
pub fn mentions_of(edges: &[AuthorMention], author_id: AuthorId) -> Vec<PaperId> {
    edges
        .iter()
        .filter(|e| e.author_id == author_id)
        .map(|e| e.paper_id)
        .collect()
}

/// Reference blocks attributed to one author, for eyeballing the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfCheck {
    pub author: Author,
    /// `(citing paper, raw reference block)` pairs.
    pub blocks: Vec<(PaperId, String)>,
}

/// Collect the reference blocks the edges attribute to the first author in
/// registry order. `None` for an empty registry.
pub fn self_check(
    edges: &[AuthorMention],
    registry: &AuthorRegistry,
    corpus: &Corpus,
) -> Result<Option<SelfCheck>, CoreError> {
    let Some(author) = registry.first() else {
        return Ok(None);
    };

    let mut blocks = Vec::new();
    for paper_id in mentions_of(edges, author.id) {
        let paper = corpus.paper(paper_id)?;
        blocks.push((paper.id, paper.references.clone()));
    }
    tracing::debug!(
        author = %author.name,
        blocks = blocks.len(),
        "{} occurs in the following references",
        author.name
    );

    Ok(Some(SelfCheck {
        author: author.clone(),
        blocks,
    }))
}
