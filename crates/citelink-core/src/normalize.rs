use crate::Paper;

/// Characters deleted outright before tokenizing.
const DELETED: [char; 8] = ['.', ';', ':', ',', '!', '\t', '\n', '"'];

/// Cleanse free text into a sequence of lowercase word tokens.
///
/// Steps (order matters):
/// 1. Replace `(` and `)` with a space, so `"model(1994)"` splits in two
/// 2. Delete `. ; : , !`, tab, newline and `"` without leaving a gap
/// 3. Lowercase
/// 4. Split on whitespace, dropping empty tokens
///
/// Other punctuation (hyphens, apostrophes, brackets) survives inside tokens.
pub fn clean(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .filter(|c| !DELETED.contains(c))
        .map(|c| if c == '(' || c == ')' { ' ' } else { c })
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Tokenize a paper's title.
pub fn normalize_title(paper: &Paper) -> Vec<String> {
    clean(&paper.title)
}

/// Tokenize a paper's reference block.
pub fn normalize_references(paper: &Paper) -> Vec<String> {
    clean(&paper.references)
}

/// Token length in characters, which is what the "short word" and
/// "long word" thresholds are measured in.
pub(crate) fn char_len(token: &str) -> usize {
    token.chars().count()
}
