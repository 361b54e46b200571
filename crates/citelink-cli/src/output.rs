use std::io::Write;

use citelink_core::{AuthorMention, Paper, SelfCheck, StageReport};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one stage's counters.
pub fn print_stage_summary(
    w: &mut dyn Write,
    report: &StageReport,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {}",
            report.stage.label().bold(),
            format!("({})", report.stage).dimmed()
        )?;
        writeln!(
            w,
            "  {} papers with a reference to it",
            report.papers_with_citations.cyan()
        )?;
        writeln!(w, "  {} total relations", report.total_relations.cyan())?;
    } else {
        writeln!(w, "{} ({})", report.stage.label(), report.stage)?;
        writeln!(
            w,
            "  {} papers with a reference to it",
            report.papers_with_citations
        )?;
        writeln!(w, "  {} total relations", report.total_relations)?;
    }
    Ok(())
}

/// Print the cited -> citing lists of one stage.
pub fn print_stage_matches(
    w: &mut dyn Write,
    report: &StageReport,
    color: ColorMode,
) -> std::io::Result<()> {
    for entry in report.matches.iter() {
        let citing = entry
            .citing
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if color.enabled() {
            writeln!(w, "  {} <- {}", entry.cited.green(), citing)?;
        } else {
            writeln!(w, "  {} <- {}", entry.cited, citing)?;
        }
    }
    Ok(())
}

/// Print the mention totals.
pub fn print_mention_summary(
    w: &mut dyn Write,
    edges: &[AuthorMention],
    authors: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!("{} mentions across {} authors", edges.len(), authors);
    if color.enabled() {
        writeln!(w, "{}", line.bold())?;
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Print the reference blocks attributed to the first author.
pub fn print_self_check(
    w: &mut dyn Write,
    check: &SelfCheck,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(
            w,
            "{} occurs in the following references:",
            check.author.name.yellow()
        )?;
    } else {
        writeln!(w, "{} occurs in the following references:", check.author.name)?;
    }
    if check.blocks.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for (paper_id, block) in &check.blocks {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}", format!("[paper {}]", paper_id).dimmed())?;
        } else {
            writeln!(w, "[paper {}]", paper_id)?;
        }
        writeln!(w, "{}", block.trim_end())?;
    }
    Ok(())
}

/// Print a paper and the reference blocks of every paper citing it.
pub fn print_paper(
    w: &mut dyn Write,
    paper: &Paper,
    citing: &[&Paper],
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", format!("[{}]", paper.id).dimmed(), paper.title.bold())?;
    } else {
        writeln!(w, "[{}] {}", paper.id, paper.title)?;
    }
    if !paper.authors.trim().is_empty() {
        writeln!(w, "  {}", paper.authors)?;
    }
    writeln!(w)?;

    if citing.is_empty() {
        writeln!(w, "No citing papers found.")?;
        return Ok(());
    }

    let heading = format!("Cited by {} papers", citing.len());
    if color.enabled() {
        writeln!(w, "{}", heading.green().bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }
    for other in citing {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{} {}", format!("[{}]", other.id).dimmed(), other.title.bold())?;
        } else {
            writeln!(w, "[{}] {}", other.id, other.title)?;
        }
        for line in other.references.lines().filter(|l| !l.trim().is_empty()) {
            writeln!(w, "    {}", line.trim())?;
        }
    }
    Ok(())
}
