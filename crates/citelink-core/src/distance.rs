/// String-to-string edit distance used by the fuzzy stages.
///
/// Implementations must return zero iff the strings are equal and be
/// symmetric. Callers only ever compare the result against small thresholds.
pub trait EditDistance {
    fn distance(&self, a: &str, b: &str) -> usize;
}

/// Character-level Levenshtein distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl EditDistance for Levenshtein {
    fn distance(&self, a: &str, b: &str) -> usize {
        rapidfuzz::distance::levenshtein::distance(a.chars(), b.chars())
    }
}

impl<F> EditDistance for F
where
    F: Fn(&str, &str) -> usize,
{
    fn distance(&self, a: &str, b: &str) -> usize {
        self(a, b)
    }
}
