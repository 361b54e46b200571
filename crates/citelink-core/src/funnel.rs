//! The title-matching funnel: candidate → adjacency → ordered → author.
//!
//! Titles and reference blocks are normalized once per [`Funnel`] and every
//! stage narrows the previous stage's [`MatchSet`], so each stage's result is
//! a subset of the one before it.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::adjacency::reduce_matches;
use crate::authors::author_and_paper_matches;
use crate::candidate::potential_matches;
use crate::ordered::exact_matches;
use crate::{Corpus, EditDistance, Levenshtein, NormalizedCorpus, PaperId, ProgressEvent};

/// Funnel stages, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Candidate,
    Adjacency,
    Ordered,
    AuthorValidated,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Candidate,
        Stage::Adjacency,
        Stage::Ordered,
        Stage::AuthorValidated,
    ];

    /// Heading used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Candidate => "Potential matches",
            Stage::Adjacency => "Reduced matches",
            Stage::Ordered => "Exact matches",
            Stage::AuthorValidated => "Exact matches with author",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Candidate => "candidate",
            Stage::Adjacency => "adjacency",
            Stage::Ordered => "ordered",
            Stage::AuthorValidated => "author",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "candidate" | "potential" => Ok(Stage::Candidate),
            "adjacency" | "reduced" => Ok(Stage::Adjacency),
            "ordered" | "exact" => Ok(Stage::Ordered),
            "author" | "author_validated" => Ok(Stage::AuthorValidated),
            other => Err(format!("unknown stage: {other}")),
        }
    }
}

/// Papers citing one cited paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationEntry {
    pub cited: PaperId,
    pub citing: Vec<PaperId>,
}

/// Cited paper → papers whose reference block appears to cite it.
///
/// Keys keep first-insertion order and each list keeps insertion order, so a
/// set built by scanning the corpus in order reproduces that order exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchSet {
    entries: Vec<CitationEntry>,
    #[serde(skip)]
    index: HashMap<PaperId, usize>,
}

impl MatchSet {
    /// Record that `citing` cites `cited`. Self-citations are ignored.
    pub fn insert(&mut self, cited: PaperId, citing: PaperId) {
        if cited == citing {
            return;
        }
        let pos = match self.index.get(&cited) {
            Some(&pos) => pos,
            None => {
                self.entries.push(CitationEntry {
                    cited,
                    citing: Vec::new(),
                });
                self.index.insert(cited, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[pos].citing.push(citing);
    }

    /// Papers citing `cited`, empty when there are none.
    pub fn citing(&self, cited: PaperId) -> &[PaperId] {
        self.index
            .get(&cited)
            .map(|&pos| self.entries[pos].citing.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, cited: PaperId, citing: PaperId) -> bool {
        self.citing(cited).contains(&citing)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CitationEntry> {
        self.entries.iter()
    }

    /// All `(cited, citing)` pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (PaperId, PaperId)> + '_ {
        self.entries
            .iter()
            .flat_map(|e| e.citing.iter().map(move |&c| (e.cited, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cited papers with at least one citing paper.
    pub fn papers_with_citations(&self) -> usize {
        self.entries.len()
    }

    /// Number of `(cited, citing)` pairs.
    pub fn total_relations(&self) -> usize {
        self.entries.iter().map(|e| e.citing.len()).sum()
    }

    /// Keep the pairs accepted by `keep`, preserving order. Cited papers left
    /// with no citing papers are dropped.
    pub fn filter(&self, mut keep: impl FnMut(PaperId, PaperId) -> bool) -> MatchSet {
        let mut out = MatchSet::default();
        for (cited, citing) in self.pairs() {
            if keep(cited, citing) {
                out.insert(cited, citing);
            }
        }
        out
    }

    /// Whether every pair in `self` is also in `other`.
    pub fn is_subset_of(&self, other: &MatchSet) -> bool {
        self.pairs().all(|(cited, citing)| other.contains(cited, citing))
    }
}

/// Output of one funnel stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub papers_with_citations: usize,
    pub total_relations: usize,
    pub matches: MatchSet,
}

impl StageReport {
    pub fn new(stage: Stage, matches: MatchSet) -> Self {
        Self {
            stage,
            papers_with_citations: matches.papers_with_citations(),
            total_relations: matches.total_relations(),
            matches,
        }
    }
}

/// Every stage's output, loosest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelReport {
    pub candidate: StageReport,
    pub adjacency: StageReport,
    pub ordered: StageReport,
    pub author_validated: StageReport,
}

impl FunnelReport {
    pub fn stage(&self, stage: Stage) -> &StageReport {
        match stage {
            Stage::Candidate => &self.candidate,
            Stage::Adjacency => &self.adjacency,
            Stage::Ordered => &self.ordered,
            Stage::AuthorValidated => &self.author_validated,
        }
    }

    pub fn stages(&self) -> impl Iterator<Item = &StageReport> {
        Stage::ALL.into_iter().map(|s| self.stage(s))
    }

    /// The final, strictest match set.
    pub fn final_matches(&self) -> &MatchSet {
        &self.author_validated.matches
    }
}

/// Runs the funnel over one corpus.
pub struct Funnel<'a, D: EditDistance = Levenshtein> {
    corpus: &'a Corpus,
    normalized: NormalizedCorpus,
    dist: D,
}

impl<'a> Funnel<'a, Levenshtein> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self::with_distance(corpus, Levenshtein)
    }
}

impl<'a, D: EditDistance> Funnel<'a, D> {
    pub fn with_distance(corpus: &'a Corpus, dist: D) -> Self {
        Self {
            corpus,
            normalized: corpus.normalize(),
            dist,
        }
    }

    pub fn normalized(&self) -> &NormalizedCorpus {
        &self.normalized
    }

    pub fn potential_matches(&self, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let matches = potential_matches(&self.normalized, &self.dist, progress);
        finish(Stage::Candidate, matches, progress)
    }

    pub fn reduce_matches(&self, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let candidates = self.potential_matches(progress);
        self.reduce(&candidates, progress)
    }

    pub fn exact_matches(&self, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let reduced = self.reduce_matches(progress);
        self.exact(&reduced, progress)
    }

    pub fn author_and_paper_matches(&self, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let exact = self.exact_matches(progress);
        self.validate(&exact, progress)
    }

    /// Run all four stages, keeping every intermediate result.
    pub fn run(&self, progress: &dyn Fn(ProgressEvent)) -> FunnelReport {
        let candidate = self.potential_matches(progress);
        let adjacency = self.reduce(&candidate, progress);
        let ordered = self.exact(&adjacency, progress);
        let author_validated = self.validate(&ordered, progress);

        FunnelReport {
            candidate: StageReport::new(Stage::Candidate, candidate),
            adjacency: StageReport::new(Stage::Adjacency, adjacency),
            ordered: StageReport::new(Stage::Ordered, ordered),
            author_validated: StageReport::new(Stage::AuthorValidated, author_validated),
        }
    }

    fn reduce(&self, candidates: &MatchSet, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let matches = reduce_matches(&self.normalized, candidates, progress);
        finish(Stage::Adjacency, matches, progress)
    }

    fn exact(&self, reduced: &MatchSet, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let matches = exact_matches(&self.normalized, reduced, &self.dist, progress);
        finish(Stage::Ordered, matches, progress)
    }

    fn validate(&self, exact: &MatchSet, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
        let matches =
            author_and_paper_matches(self.corpus, &self.normalized, exact, &self.dist, progress);
        finish(Stage::AuthorValidated, matches, progress)
    }
}

fn finish(stage: Stage, matches: MatchSet, progress: &dyn Fn(ProgressEvent)) -> MatchSet {
    let papers = matches.papers_with_citations();
    let relations = matches.total_relations();
    tracing::info!(%stage, papers, relations, "{}", stage.label());
    for (cited, citing) in matches.pairs() {
        tracing::trace!(%stage, cited, citing, "accepted");
    }
    progress(ProgressEvent::StageFinished {
        stage,
        papers,
        relations,
    });
    matches
}

/// Run the whole funnel with the default Levenshtein distance.
pub fn run_funnel(corpus: &Corpus) -> FunnelReport {
    Funnel::new(corpus).run(&|_| {})
}
