use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub corpus: Option<CorpusConfig>,
    pub matching: Option<MatchingConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub papers_path: Option<String>,
    pub authors_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Process at most this many authors when scanning for mentions.
    pub mention_author_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export format name: `json`, `csv`, `markdown` or `text`.
    pub format: Option<String>,
    pub color: Option<bool>,
}

/// Platform config directory path: `<config_dir>/citelink/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citelink").join("config.toml"))
}

/// Load config by cascading CWD `.citelink.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".citelink.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        corpus: Some(CorpusConfig {
            papers_path: overlay
                .corpus
                .as_ref()
                .and_then(|c| c.papers_path.clone())
                .or_else(|| base.corpus.as_ref().and_then(|c| c.papers_path.clone())),
            authors_path: overlay
                .corpus
                .as_ref()
                .and_then(|c| c.authors_path.clone())
                .or_else(|| base.corpus.as_ref().and_then(|c| c.authors_path.clone())),
        }),
        matching: Some(MatchingConfig {
            mention_author_limit: overlay
                .matching
                .as_ref()
                .and_then(|m| m.mention_author_limit)
                .or_else(|| base.matching.as_ref().and_then(|m| m.mention_author_limit)),
        }),
        output: Some(OutputConfig {
            format: overlay
                .output
                .as_ref()
                .and_then(|o| o.format.clone())
                .or_else(|| base.output.as_ref().and_then(|o| o.format.clone())),
            color: overlay
                .output
                .as_ref()
                .and_then(|o| o.color)
                .or_else(|| base.output.as_ref().and_then(|o| o.color)),
        }),
    }
}

impl ConfigFile {
    pub fn papers_path(&self) -> Option<PathBuf> {
        self.corpus
            .as_ref()
            .and_then(|c| c.papers_path.as_deref())
            .map(PathBuf::from)
    }

    pub fn authors_path(&self) -> Option<PathBuf> {
        self.corpus
            .as_ref()
            .and_then(|c| c.authors_path.as_deref())
            .map(PathBuf::from)
    }

    pub fn mention_author_limit(&self) -> Option<usize> {
        self.matching.as_ref().and_then(|m| m.mention_author_limit)
    }

    pub fn output_format(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.format.as_deref())
    }

    pub fn color(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.color)
    }
}
