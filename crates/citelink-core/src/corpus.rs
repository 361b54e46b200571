use std::collections::HashMap;

use crate::normalize::{normalize_references, normalize_title};
use crate::{Author, AuthorId, CoreError, Paper, PaperId};

/// The papers under analysis, in loader order.
///
/// Iteration order is the order papers were supplied in; every match list the
/// funnel produces follows it.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    papers: Vec<Paper>,
    index: HashMap<PaperId, usize>,
}

impl Corpus {
    /// Build a corpus, rejecting duplicate paper ids.
    pub fn new(papers: Vec<Paper>) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(papers.len());
        for (pos, paper) in papers.iter().enumerate() {
            if index.insert(paper.id, pos).is_some() {
                return Err(CoreError::DuplicatePaper(paper.id));
            }
        }
        Ok(Self { papers, index })
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Paper> {
        self.papers.iter()
    }

    pub fn get(&self, id: PaperId) -> Option<&Paper> {
        self.index.get(&id).map(|&pos| &self.papers[pos])
    }

    /// Look up a paper, failing with [`CoreError::UnknownPaper`] if absent.
    pub fn paper(&self, id: PaperId) -> Result<&Paper, CoreError> {
        self.get(id).ok_or(CoreError::UnknownPaper(id))
    }

    /// Tokenize every title and reference block once.
    pub fn normalize(&self) -> NormalizedCorpus {
        NormalizedCorpus::build(self)
    }
}

/// The authors known to the system, in loader order.
#[derive(Debug, Clone, Default)]
pub struct AuthorRegistry {
    authors: Vec<Author>,
    index: HashMap<AuthorId, usize>,
}

impl AuthorRegistry {
    pub fn new(authors: Vec<Author>) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(authors.len());
        for (pos, author) in authors.iter().enumerate() {
            if index.insert(author.id, pos).is_some() {
                return Err(CoreError::DuplicateAuthor(author.id));
            }
        }
        Ok(Self { authors, index })
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter()
    }

    pub fn first(&self) -> Option<&Author> {
        self.authors.first()
    }

    pub fn author(&self, id: AuthorId) -> Result<&Author, CoreError> {
        self.index
            .get(&id)
            .map(|&pos| &self.authors[pos])
            .ok_or(CoreError::UnknownAuthor(id))
    }
}

/// Token sequences for one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPaper {
    pub id: PaperId,
    pub title: Vec<String>,
    pub references: Vec<String>,
}

/// Normalized titles and reference blocks for a whole corpus, computed once
/// and shared by every funnel stage.
#[derive(Debug, Clone, Default)]
pub struct NormalizedCorpus {
    papers: Vec<NormalizedPaper>,
    index: HashMap<PaperId, usize>,
}

impl NormalizedCorpus {
    fn build(corpus: &Corpus) -> Self {
        let papers: Vec<NormalizedPaper> = corpus
            .iter()
            .map(|p| NormalizedPaper {
                id: p.id,
                title: normalize_title(p),
                references: normalize_references(p),
            })
            .collect();
        let index = papers.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Self { papers, index }
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedPaper> {
        self.papers.iter()
    }

    pub fn get(&self, id: PaperId) -> Option<&NormalizedPaper> {
        self.index.get(&id).map(|&pos| &self.papers[pos])
    }

    /// Normalized title tokens, empty for an unknown id.
    pub fn title(&self, id: PaperId) -> &[String] {
        self.get(id).map(|p| p.title.as_slice()).unwrap_or(&[])
    }

    /// Normalized reference-block tokens, empty for an unknown id.
    pub fn references(&self, id: PaperId) -> &[String] {
        self.get(id).map(|p| p.references.as_slice()).unwrap_or(&[])
    }
}
