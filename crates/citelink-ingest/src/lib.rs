use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

// Re-export domain types for convenience
pub use citelink_core::{Author, AuthorRegistry, Corpus, Paper};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid record in {path} (line {line}): {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported file format: {0} (expected .json, .jsonl, optionally .gz)")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Core(#[from] citelink_core::CoreError),
}

/// Record layout of a corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A single JSON array of records.
    Json,
    /// One JSON record per line; blank lines are ignored.
    JsonLines,
}

/// Detect the record layout and compression from a file name.
///
/// - `*.json` / `*.json.gz` → JSON array
/// - `*.jsonl` / `*.ndjson` (optionally `.gz`) → JSON Lines
pub fn detect_format(path: &Path) -> Option<(Format, bool)> {
    let name = path.file_name()?.to_str()?.to_lowercase();
    let (stem, gzipped) = match name.strip_suffix(".gz") {
        Some(stem) => (stem.to_string(), true),
        None => (name, false),
    };

    if stem.ends_with(".json") {
        Some((Format::Json, gzipped))
    } else if stem.ends_with(".jsonl") || stem.ends_with(".ndjson") {
        Some((Format::JsonLines, gzipped))
    } else {
        None
    }
}

/// Load papers from a corpus file. File order becomes corpus order.
pub fn load_corpus(path: &Path) -> Result<Corpus, IngestError> {
    let papers: Vec<Paper> = load_records(path)?;
    tracing::debug!(path = %path.display(), papers = papers.len(), "loaded corpus");
    Ok(Corpus::new(papers)?)
}

/// Load the author registry. File order becomes registry order.
pub fn load_authors(path: &Path) -> Result<AuthorRegistry, IngestError> {
    let authors: Vec<Author> = load_records(path)?;
    tracing::debug!(path = %path.display(), authors = authors.len(), "loaded authors");
    Ok(AuthorRegistry::new(authors)?)
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IngestError> {
    let (format, gzipped) =
        detect_format(path).ok_or_else(|| IngestError::UnsupportedFormat(path.to_path_buf()))?;

    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader: Box<dyn Read> = if gzipped {
        Box::new(flate2::read::GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let reader = BufReader::new(reader);

    match format {
        Format::Json => parse_json(reader, path),
        Format::JsonLines => parse_json_lines(reader, path),
    }
}

fn parse_json<T: DeserializeOwned>(reader: impl Read, path: &Path) -> Result<Vec<T>, IngestError> {
    serde_json::from_reader(reader).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

fn parse_json_lines<T: DeserializeOwned>(
    reader: impl BufRead,
    path: &Path,
) -> Result<Vec<T>, IngestError> {
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| IngestError::Json {
            path: path.to_path_buf(),
            line: n + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    const PAPERS_JSON: &str = r#"[
        {"id": 3, "title": "Graph Kernels", "references": "Smith, J. Nets.", "authors": "Jane Doe"},
        {"id": 1, "title": "Nets", "references": "", "authors": "John Smith"}
    ]"#;

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("papers.json")),
            Some((Format::Json, false))
        );
        assert_eq!(
            detect_format(Path::new("/data/Papers.JSON.gz")),
            Some((Format::Json, true))
        );
        assert_eq!(
            detect_format(Path::new("papers.jsonl")),
            Some((Format::JsonLines, false))
        );
        assert_eq!(
            detect_format(Path::new("papers.ndjson.gz")),
            Some((Format::JsonLines, true))
        );
        assert_eq!(detect_format(Path::new("papers.csv")), None);
    }

    #[test]
    fn test_load_json_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.json");
        std::fs::write(&path, PAPERS_JSON).unwrap();

        let corpus = load_corpus(&path).unwrap();
        let ids: Vec<u64> = corpus.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(corpus.paper(3).unwrap().authors, "Jane Doe");
    }

    #[test]
    fn test_load_gzipped_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(PAPERS_JSON.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let corpus = load_corpus(&path).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_load_json_lines_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authors.jsonl");
        std::fs::write(
            &path,
            "{\"id\": 7, \"name\": \"Jane Doe\"}\n\n{\"id\": 8, \"name\": \"John Smith\"}\n",
        )
        .unwrap();

        let registry = load_authors(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.first().unwrap().name, "Jane Doe");
    }

    #[test]
    fn test_json_lines_error_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("authors.jsonl");
        std::fs::write(&path, "{\"id\": 7, \"name\": \"Jane Doe\"}\n{\"id\": \"x\"}\n").unwrap();

        match load_authors(&path) {
            Err(IngestError::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("papers.jsonl");
        std::fs::write(
            &path,
            "{\"id\": 1, \"title\": \"a\", \"references\": \"\", \"authors\": \"\"}\n\
             {\"id\": 1, \"title\": \"b\", \"references\": \"\", \"authors\": \"\"}\n",
        )
        .unwrap();

        let err = load_corpus(&path).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Core(citelink_core::CoreError::DuplicatePaper(1))
        ));
    }

    #[test]
    fn test_unsupported_format() {
        let err = load_corpus(Path::new("papers.csv")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_corpus(Path::new("/nonexistent/papers.json")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
