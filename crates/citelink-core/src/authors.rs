use crate::{Corpus, EditDistance, MatchSet, NormalizedCorpus, ProgressEvent, Stage};

/// Upper bound on the edit distance tolerated for any surname.
pub const MAX_SURNAME_DISTANCE: usize = 2;

/// Split a semicolon-separated author listing into surnames.
///
/// The surname is the last whitespace-delimited token of each entry,
/// lowercased. Entries with no tokens are skipped.
pub fn surnames(authors: &str) -> Vec<String> {
    authors
        .split(';')
        .filter_map(|a| a.split_whitespace().last())
        .map(str::to_lowercase)
        .collect()
}

/// Edit distance tolerated for a surname: a quarter of its length, capped at
/// [`MAX_SURNAME_DISTANCE`]. Surnames under four characters must match exactly.
pub fn surname_tolerance(surname: &str) -> usize {
    (surname.chars().count() / 4).min(MAX_SURNAME_DISTANCE)
}

/// Whether any author of the cited paper appears in the citing reference block.
pub fn validate_authors(
    cited_authors: &str,
    references: &[String],
    dist: &impl EditDistance,
) -> bool {
    surnames(cited_authors).iter().any(|surname| {
        let tolerance = surname_tolerance(surname);
        references
            .iter()
            .any(|word| dist.distance(surname, word) <= tolerance)
    })
}

/// Keep only ordered-fuzzy matches whose citing block mentions a cited author.
pub fn author_and_paper_matches(
    corpus: &Corpus,
    normalized: &NormalizedCorpus,
    exact: &MatchSet,
    dist: &impl EditDistance,
    progress: &dyn Fn(ProgressEvent),
) -> MatchSet {
    progress(ProgressEvent::StageStarted {
        stage: Stage::AuthorValidated,
        total: exact.total_relations(),
    });
    exact.filter(|cited, citing| match corpus.get(cited) {
        Some(paper) => validate_authors(&paper.authors, normalized.references(citing), dist),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Levenshtein, Paper};

    fn toks(s: &str) -> Vec<String> {
        s.split(' ').map(str::to_string).collect()
    }

    // =========================================================================
    // Surname extraction
    // =========================================================================

    #[test]
    fn test_surnames_basic() {
        assert_eq!(
            surnames("John Smith;Alice van der Berg; Bob Q. Jones"),
            vec!["smith", "berg", "jones"]
        );
    }

    #[test]
    fn test_surnames_skip_empty_entries() {
        assert_eq!(surnames("John Smith;;  ;"), vec!["smith"]);
        assert!(surnames("").is_empty());
    }

    #[test]
    fn test_surname_single_token() {
        assert_eq!(surnames("Plato"), vec!["plato"]);
    }

    #[test]
    fn test_tolerance() {
        assert_eq!(surname_tolerance("li"), 0);
        assert_eq!(surname_tolerance("ford"), 1);
        assert_eq!(surname_tolerance("smith"), 1);
        assert_eq!(surname_tolerance("johnson"), 1);
        assert_eq!(surname_tolerance("williams"), 2);
        assert_eq!(surname_tolerance("schwarzenegger"), 2);
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn test_one_edit_within_tolerance() {
        assert!(validate_authors("John Smith", &toks("smth j neural nets"), &Levenshtein));
    }

    #[test]
    fn test_far_variant_rejected() {
        assert!(!validate_authors(
            "John Smith",
            &toks("smithsonian neural nets"),
            &Levenshtein
        ));
    }

    #[test]
    fn test_any_author_suffices() {
        assert!(validate_authors(
            "Ann Lee; Maria Garcia",
            &toks("garcia m deep nets"),
            &Levenshtein
        ));
    }

    #[test]
    fn test_short_surname_needs_exact_match() {
        assert!(validate_authors("Wei Li", &toks("li w"), &Levenshtein));
        assert!(!validate_authors("Wei Li", &toks("lu w"), &Levenshtein));
    }

    #[test]
    fn test_no_authors_rejected() {
        assert!(!validate_authors("", &toks("smith"), &Levenshtein));
        assert!(!validate_authors(" ; ", &toks("smith"), &Levenshtein));
    }

    #[test]
    fn test_author_and_paper_matches_uses_cited_authors() {
        let corpus = Corpus::new(vec![
            Paper::new(1, "Neural Network Training Methods", "", "John Smith"),
            Paper::new(2, "", "smith j neural network training methods", "Ann Lee"),
            Paper::new(3, "", "lee a neural network training methods", "Bob Brown"),
        ])
        .unwrap();
        let normalized = corpus.normalize();
        let mut exact = MatchSet::default();
        exact.insert(1, 2);
        exact.insert(1, 3);

        let validated =
            author_and_paper_matches(&corpus, &normalized, &exact, &Levenshtein, &|_| {});
        assert_eq!(validated.citing(1), [2]);
    }
}
