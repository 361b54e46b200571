use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod adjacency;
pub mod authors;
pub mod candidate;
pub mod config_file;
pub mod corpus;
pub mod distance;
pub mod funnel;
pub mod mention;
pub mod normalize;
pub mod ordered;

// Re-export for convenience
pub use corpus::{AuthorRegistry, Corpus, NormalizedCorpus, NormalizedPaper};
pub use distance::{EditDistance, Levenshtein};
pub use funnel::{CitationEntry, Funnel, FunnelReport, MatchSet, Stage, StageReport, run_funnel};
pub use mention::{AuthorMention, MentionPattern, SelfCheck, match_authors, mentions_of, self_check};

/// Identifier of a paper in the corpus.
pub type PaperId = u64;

/// Identifier of an author in the registry.
pub type AuthorId = u64;

/// A paper as supplied by the corpus loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub id: PaperId,
    pub title: String,
    /// Free-text bibliography listing every work the paper cites.
    pub references: String,
    /// Semicolon-separated `"First Last"` entries.
    pub authors: String,
}

impl Paper {
    pub fn new(
        id: PaperId,
        title: impl Into<String>,
        references: impl Into<String>,
        authors: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            references: references.into(),
            authors: authors.into(),
        }
    }
}

/// An author as supplied by the author registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

impl Author {
    pub fn new(id: AuthorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown paper id {0}")]
    UnknownPaper(PaperId),
    #[error("unknown author id {0}")]
    UnknownAuthor(AuthorId),
    #[error("duplicate paper id {0}")]
    DuplicatePaper(PaperId),
    #[error("duplicate author id {0}")]
    DuplicateAuthor(AuthorId),
    #[error("invalid mention pattern for {name:?}: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Progress events emitted while the funnel runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
        /// Number of titles (candidate stage) or pairs (later stages) to examine.
        total: usize,
    },
    /// One title has been compared against every reference block.
    TitleScanned {
        index: usize,
        total: usize,
    },
    StageFinished {
        stage: Stage,
        papers: usize,
        relations: usize,
    },
}
