use std::io::Write;
use std::path::Path;

use citelink_core::{
    AuthorId, AuthorMention, AuthorRegistry, FunnelReport, PaperId, Stage, StageReport,
};
use serde::Serialize;

use crate::types::{ExportError, ExportFormat};

/// Export the chosen funnel stages to the given path.
pub fn export_report(
    report: &FunnelReport,
    stages: &[Stage],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = render_report(report, stages, format)?;
    write_file(path, &content)
}

/// Export author-mention edges to the given path.
pub fn export_mentions(
    edges: &[AuthorMention],
    registry: &AuthorRegistry,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = render_mentions(edges, registry, format)?;
    write_file(path, &content)
}

/// Render the chosen funnel stages, in the order given.
pub fn render_report(
    report: &FunnelReport,
    stages: &[Stage],
    format: ExportFormat,
) -> Result<String, ExportError> {
    let selected: Vec<&StageReport> = stages.iter().map(|&s| report.stage(s)).collect();
    Ok(match format {
        ExportFormat::Json => report_json(&selected)?,
        ExportFormat::Csv => report_csv(&selected),
        ExportFormat::Markdown => report_markdown(&selected),
        ExportFormat::Text => report_text(&selected),
    })
}

/// Render author-mention edges. Every edge's author must be in `registry`.
pub fn render_mentions(
    edges: &[AuthorMention],
    registry: &AuthorRegistry,
    format: ExportFormat,
) -> Result<String, ExportError> {
    let mut rows = Vec::with_capacity(edges.len());
    for edge in edges {
        rows.push(MentionRow {
            author_id: edge.author_id,
            author: &registry.author(edge.author_id)?.name,
            paper_id: edge.paper_id,
        });
    }

    Ok(match format {
        ExportFormat::Json => {
            let mut out = serde_json::to_string_pretty(&rows)?;
            out.push('\n');
            out
        }
        ExportFormat::Csv => mentions_csv(&rows),
        ExportFormat::Markdown => mentions_markdown(&rows),
        ExportFormat::Text => mentions_text(&rows),
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    Ok(())
}

#[derive(Serialize)]
struct MentionRow<'a> {
    author_id: AuthorId,
    author: &'a str,
    paper_id: PaperId,
}

fn join_ids(ids: &[PaperId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|")
}

// ── Funnel report ──────────────────────────────────────────────────

fn report_json(stages: &[&StageReport]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(stages)?;
    out.push('\n');
    Ok(out)
}

fn report_csv(stages: &[&StageReport]) -> String {
    let mut out = String::from("Stage,Cited,Citing\n");
    for report in stages {
        for (cited, citing) in report.matches.pairs() {
            out.push_str(&format!("{},{},{}\n", report.stage, cited, citing));
        }
    }
    out
}

fn report_markdown(stages: &[&StageReport]) -> String {
    let mut out = String::from("# Citation matches\n");
    for report in stages {
        out.push_str(&format!("\n## {} ({})\n\n", report.stage.label(), report.stage));
        out.push_str(&format!(
            "**{}** papers with a reference to it, **{}** total relations\n",
            report.papers_with_citations, report.total_relations
        ));
        if report.matches.is_empty() {
            continue;
        }
        out.push_str("\n| Cited | Citing |\n|------:|--------|\n");
        for entry in report.matches.iter() {
            out.push_str(&format!("| {} | {} |\n", entry.cited, join_ids(&entry.citing)));
        }
    }
    out
}

fn report_text(stages: &[&StageReport]) -> String {
    let mut out = String::from("Citation matches\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');

    for report in stages {
        let heading = format!("{} ({})", report.stage.label(), report.stage);
        out.push_str(&format!("\n{}\n", heading));
        out.push_str(&"-".repeat(heading.len()));
        out.push('\n');
        out.push_str(&format!(
            "  {} papers with a reference to it\n  {} total relations\n",
            report.papers_with_citations, report.total_relations
        ));
        if !report.matches.is_empty() {
            out.push('\n');
        }
        for entry in report.matches.iter() {
            out.push_str(&format!("  {} <- {}\n", entry.cited, join_ids(&entry.citing)));
        }
    }
    out
}

// ── Author mentions ────────────────────────────────────────────────

fn mentions_csv(rows: &[MentionRow<'_>]) -> String {
    let mut out = String::from("AuthorID,Author,PaperID\n");
    for row in rows {
        out.push_str(&format!(
            "{},{},{}\n",
            row.author_id,
            csv_escape(row.author),
            row.paper_id
        ));
    }
    out
}

fn mentions_markdown(rows: &[MentionRow<'_>]) -> String {
    let mut out = String::from("# Author mentions\n\n");
    out.push_str(&format!("{} edges\n", rows.len()));
    if rows.is_empty() {
        return out;
    }
    out.push_str("\n| Author ID | Author | Paper ID |\n|---:|---|---:|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.author_id,
            md_escape(row.author),
            row.paper_id
        ));
    }
    out
}

fn mentions_text(rows: &[MentionRow<'_>]) -> String {
    let mut out = String::from("Author mentions\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');

    let mut current = None;
    for row in rows {
        if current != Some(row.author_id) {
            out.push_str(&format!("\n{} [{}]\n", row.author, row.author_id));
            current = Some(row.author_id);
        }
        out.push_str(&format!("  paper {}\n", row.paper_id));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use citelink_core::{Author, MatchSet};

    fn report() -> FunnelReport {
        let mut candidate = MatchSet::default();
        candidate.insert(1, 2);
        candidate.insert(1, 3);
        candidate.insert(2, 1);
        let mut final_set = MatchSet::default();
        final_set.insert(1, 2);

        FunnelReport {
            candidate: StageReport::new(Stage::Candidate, candidate.clone()),
            adjacency: StageReport::new(Stage::Adjacency, candidate),
            ordered: StageReport::new(Stage::Ordered, final_set.clone()),
            author_validated: StageReport::new(Stage::AuthorValidated, final_set),
        }
    }

    fn registry() -> AuthorRegistry {
        AuthorRegistry::new(vec![
            Author::new(7, "Smith, John"),
            Author::new(8, "A|B Lee"),
        ])
        .unwrap()
    }

    fn edges() -> Vec<AuthorMention> {
        vec![
            AuthorMention {
                author_id: 7,
                paper_id: 2,
            },
            AuthorMention {
                author_id: 7,
                paper_id: 3,
            },
            AuthorMention {
                author_id: 8,
                paper_id: 1,
            },
        ]
    }

    // ── Escaping helpers ────────────────────────────────────────────

    #[test]
    fn test_csv_escape_quotes() {
        assert_eq!(csv_escape(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn test_csv_escape_comma() {
        assert_eq!(csv_escape("Smith, John"), "\"Smith, John\"");
    }

    #[test]
    fn test_csv_escape_clean() {
        assert_eq!(csv_escape("John Smith"), "John Smith");
    }

    #[test]
    fn test_md_escape_pipe() {
        assert_eq!(md_escape("a|b"), "a\\|b");
    }

    #[test]
    fn test_export_format_all() {
        let all = ExportFormat::all();
        assert_eq!(all.len(), 4);
        for fmt in all {
            assert!(!fmt.label().is_empty());
            assert_eq!(fmt.extension().parse::<ExportFormat>().unwrap(), *fmt);
        }
        assert!("html".parse::<ExportFormat>().is_err());
    }

    // ── Funnel report ───────────────────────────────────────────────

    #[test]
    fn test_report_csv_rows() {
        let out = render_report(&report(), &[Stage::Candidate], ExportFormat::Csv).unwrap();
        assert_eq!(
            out,
            "Stage,Cited,Citing\ncandidate,1,2\ncandidate,1,3\ncandidate,2,1\n"
        );
    }

    #[test]
    fn test_report_text_summary_lines() {
        let out = render_report(&report(), &[Stage::AuthorValidated], ExportFormat::Text).unwrap();
        assert!(out.contains("Exact matches with author (author)"));
        assert!(out.contains("  1 papers with a reference to it\n  1 total relations\n"));
        assert!(out.contains("  1 <- 2\n"));
    }

    #[test]
    fn test_report_markdown_table() {
        let out = render_report(&report(), &[Stage::Candidate], ExportFormat::Markdown).unwrap();
        assert!(out.contains("## Potential matches (candidate)"));
        assert!(out.contains("**2** papers with a reference to it, **3** total relations"));
        assert!(out.contains("| 1 | 2, 3 |\n"));
        assert!(out.contains("| 2 | 1 |\n"));
    }

    #[test]
    fn test_report_markdown_empty_stage_has_no_table() {
        let empty = FunnelReport {
            candidate: StageReport::new(Stage::Candidate, MatchSet::default()),
            adjacency: StageReport::new(Stage::Adjacency, MatchSet::default()),
            ordered: StageReport::new(Stage::Ordered, MatchSet::default()),
            author_validated: StageReport::new(Stage::AuthorValidated, MatchSet::default()),
        };
        let out = render_report(&empty, &Stage::ALL, ExportFormat::Markdown).unwrap();
        assert!(!out.contains("| Cited |"));
        assert_eq!(out.matches("## ").count(), 4);
    }

    #[test]
    fn test_report_json_shape() {
        let out = render_report(&report(), &Stage::ALL, ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let stages = value.as_array().unwrap();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0]["stage"], "candidate");
        assert_eq!(stages[0]["total_relations"], 3);
        assert_eq!(stages[0]["matches"][0]["cited"], 1);
        assert_eq!(stages[0]["matches"][0]["citing"], serde_json::json!([2, 3]));
        assert_eq!(stages[3]["stage"], "author_validated");
    }

    #[test]
    fn test_report_stage_order_follows_request() {
        let out = render_report(
            &report(),
            &[Stage::Ordered, Stage::Candidate],
            ExportFormat::Text,
        )
        .unwrap();
        let ordered = out.find("Exact matches (ordered)").unwrap();
        let candidate = out.find("Potential matches (candidate)").unwrap();
        assert!(ordered < candidate);
    }

    // ── Author mentions ─────────────────────────────────────────────

    #[test]
    fn test_mentions_csv_escapes_names() {
        let out = render_mentions(&edges(), &registry(), ExportFormat::Csv).unwrap();
        assert_eq!(
            out,
            "AuthorID,Author,PaperID\n7,\"Smith, John\",2\n7,\"Smith, John\",3\n8,A|B Lee,1\n"
        );
    }

    #[test]
    fn test_mentions_markdown_escapes_pipes() {
        let out = render_mentions(&edges(), &registry(), ExportFormat::Markdown).unwrap();
        assert!(out.contains("3 edges"));
        assert!(out.contains("| 8 | A\\|B Lee | 1 |"));
    }

    #[test]
    fn test_mentions_text_groups_by_author() {
        let out = render_mentions(&edges(), &registry(), ExportFormat::Text).unwrap();
        assert_eq!(out.matches("Smith, John [7]").count(), 1);
        assert!(out.contains("  paper 2\n  paper 3\n"));
    }

    #[test]
    fn test_mentions_json_includes_names() {
        let out = render_mentions(&edges(), &registry(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["author"], "Smith, John");
        assert_eq!(value[2]["paper_id"], 1);
    }

    #[test]
    fn test_mentions_unknown_author_fails() {
        let stray = [AuthorMention {
            author_id: 99,
            paper_id: 1,
        }];
        let err = render_mentions(&stray, &registry(), ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, ExportError::Core(_)));
    }

    // ── File output ─────────────────────────────────────────────────

    #[test]
    fn test_export_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        export_report(&report(), &[Stage::Ordered], ExportFormat::Csv, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Stage,Cited,Citing\nordered,1,2\n");
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let err = export_mentions(
            &edges(),
            &registry(),
            ExportFormat::Text,
            Path::new("/nonexistent/dir/mentions.txt"),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }
}
