use std::io::Write;
use std::path::{Path, PathBuf};

use citelink_core::config_file::{self, ConfigFile};
use citelink_core::{Corpus, Funnel, FunnelReport, PaperId, ProgressEvent, Stage};
use citelink_reporting::ExportFormat;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod output;

use output::ColorMode;

/// Citation linker - Resolve which papers in a corpus cite each other
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the title funnel and report which papers cite which
    Match {
        /// Corpus file (.json, .jsonl, optionally .gz). Falls back to
        /// CITELINK_CORPUS or the config file
        corpus: Option<PathBuf>,

        /// Only report this stage: candidate, adjacency, ordered or author
        #[arg(long)]
        stage: Option<Stage>,

        /// Export format: json, csv, markdown or text
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write the export to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Find reference blocks that mention registry authors
    Mentions {
        /// Corpus file. Falls back to CITELINK_CORPUS or the config file
        corpus: Option<PathBuf>,

        /// Author registry file. Falls back to CITELINK_AUTHORS or the config file
        authors: Option<PathBuf>,

        /// Process at most this many authors, in registry order
        #[arg(long)]
        limit: Option<usize>,

        /// Export format: json, csv, markdown or text
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Write the export to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Show a paper and the reference blocks of the papers citing it
    Show {
        /// Corpus file
        corpus: PathBuf,

        /// Paper id to look up
        paper_id: PaperId,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = config_file::load_config();

    match cli.command {
        Command::Match {
            corpus,
            stage,
            format,
            output,
            no_color,
        } => run_match(&config, corpus, stage, format, output, no_color),
        Command::Mentions {
            corpus,
            authors,
            limit,
            format,
            output,
            no_color,
        } => run_mentions(&config, corpus, authors, limit, format, output, no_color),
        Command::Show {
            corpus,
            paper_id,
            no_color,
        } => run_show(&config, &corpus, paper_id, no_color),
    }
}

/// Setup logging to stderr. `RUST_LOG` wins over `-v`.
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

// Resolve configuration: CLI args > env vars > config file

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).map(PathBuf::from)
}

fn resolve_corpus_path(
    arg: Option<PathBuf>,
    env: Option<PathBuf>,
    config: &ConfigFile,
) -> anyhow::Result<PathBuf> {
    arg.or(env).or_else(|| config.papers_path()).ok_or_else(|| {
        anyhow::anyhow!(
            "No corpus given. Pass a path, set CITELINK_CORPUS, or set corpus.papers_path in .citelink.toml"
        )
    })
}

fn resolve_authors_path(
    arg: Option<PathBuf>,
    env: Option<PathBuf>,
    config: &ConfigFile,
) -> anyhow::Result<PathBuf> {
    arg.or(env).or_else(|| config.authors_path()).ok_or_else(|| {
        anyhow::anyhow!(
            "No author registry given. Pass a path, set CITELINK_AUTHORS, or set corpus.authors_path in .citelink.toml"
        )
    })
}

/// Pick the export format. `--format` always wins. Without `-o` nothing
/// else applies, so the summary is printed; with `-o` the config format is
/// tried, then the output file extension.
fn resolve_format(
    flag: Option<ExportFormat>,
    config: &ConfigFile,
    output: Option<&Path>,
) -> anyhow::Result<Option<ExportFormat>> {
    let Some(output) = output.filter(|_| flag.is_none()) else {
        return Ok(flag);
    };
    if let Some(name) = config.output_format() {
        return name
            .parse()
            .map(Some)
            .map_err(|e: String| anyhow::anyhow!("Invalid output.format in config: {}", e));
    }
    Ok(output
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ExportFormat::from_extension))
}

fn color_mode(no_color: bool, config: &ConfigFile) -> ColorMode {
    ColorMode(!no_color && config.color().unwrap_or(true))
}

fn load_corpus(path: &Path) -> anyhow::Result<Corpus> {
    if !path.exists() {
        anyhow::bail!("Corpus file not found at {}", path.display());
    }
    Ok(citelink_ingest::load_corpus(path)?)
}

/// Run every funnel stage with a progress bar over the candidate scan.
fn run_funnel_with_progress(corpus: &Corpus) -> anyhow::Result<FunnelReport> {
    use indicatif::{ProgressBar, ProgressStyle};

    let style = ProgressStyle::with_template(
        "{spinner:.green} {msg:<26} [{bar:40.green/dim}] {pos}/{len} (eta {eta})",
    )?
    .progress_chars("=> ");

    let bar = ProgressBar::new(0);
    bar.set_style(style);

    let report = Funnel::new(corpus).run(&|event| match event {
        ProgressEvent::StageStarted { stage, total } => {
            bar.set_length(total as u64);
            bar.set_position(0);
            bar.set_message(stage.label());
        }
        // Only the candidate scan reports per-title progress
        ProgressEvent::TitleScanned { index, .. } => {
            bar.set_position(index as u64 + 1);
        }
        ProgressEvent::StageFinished { .. } => {
            bar.set_position(bar.length().unwrap_or(0));
        }
    });

    bar.finish_and_clear();
    Ok(report)
}

fn run_match(
    config: &ConfigFile,
    corpus: Option<PathBuf>,
    stage: Option<Stage>,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let corpus_path = resolve_corpus_path(corpus, env_path("CITELINK_CORPUS"), config)?;
    let format = resolve_format(format, config, output.as_deref())?;
    let color = color_mode(no_color, config);

    let corpus = load_corpus(&corpus_path)?;
    let report = run_funnel_with_progress(&corpus)?;

    let stages: Vec<Stage> = match stage {
        Some(s) => vec![s],
        None => Stage::ALL.to_vec(),
    };

    let mut stdout = std::io::stdout().lock();

    match (output, format) {
        (Some(path), format) => {
            let format = format.unwrap_or_default();
            citelink_reporting::export_report(&report, &stages, format, &path)?;
            print_summaries(&mut stdout, &report, &stages, stage.is_some(), color)?;
            writeln!(stdout)?;
            writeln!(stdout, "Wrote {} export to {}", format.label(), path.display())?;
        }
        (None, Some(format)) => {
            let content = citelink_reporting::render_report(&report, &stages, format)?;
            stdout.write_all(content.as_bytes())?;
        }
        (None, None) => {
            print_summaries(&mut stdout, &report, &stages, stage.is_some(), color)?;
        }
    }
    Ok(())
}

fn print_summaries(
    w: &mut dyn Write,
    report: &FunnelReport,
    stages: &[Stage],
    with_matches: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    for (i, &stage) in stages.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        let stage_report = report.stage(stage);
        output::print_stage_summary(w, stage_report, color)?;
        if with_matches && !stage_report.matches.is_empty() {
            writeln!(w)?;
            output::print_stage_matches(w, stage_report, color)?;
        }
    }
    Ok(())
}

fn run_mentions(
    config: &ConfigFile,
    corpus: Option<PathBuf>,
    authors: Option<PathBuf>,
    limit: Option<usize>,
    format: Option<ExportFormat>,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let corpus_path = resolve_corpus_path(corpus, env_path("CITELINK_CORPUS"), config)?;
    let authors_path = resolve_authors_path(authors, env_path("CITELINK_AUTHORS"), config)?;
    let format = resolve_format(format, config, output.as_deref())?;
    let color = color_mode(no_color, config);
    let limit = limit.or_else(|| config.mention_author_limit());

    let corpus = load_corpus(&corpus_path)?;
    if !authors_path.exists() {
        anyhow::bail!("Author registry not found at {}", authors_path.display());
    }
    let registry = citelink_ingest::load_authors(&authors_path)?;

    let edges = citelink_core::match_authors(&corpus, &registry, limit)?;
    let scanned = limit.map_or(registry.len(), |l| l.min(registry.len()));

    let mut stdout = std::io::stdout().lock();

    if let (None, Some(format)) = (&output, format) {
        let content = citelink_reporting::render_mentions(&edges, &registry, format)?;
        stdout.write_all(content.as_bytes())?;
        return Ok(());
    }

    output::print_mention_summary(&mut stdout, &edges, scanned, color)?;
    if let Some(check) = citelink_core::self_check(&edges, &registry, &corpus)? {
        output::print_self_check(&mut stdout, &check, color)?;
    }

    if let Some(path) = output {
        let format = format.unwrap_or_default();
        citelink_reporting::export_mentions(&edges, &registry, format, &path)?;
        writeln!(stdout)?;
        writeln!(stdout, "Wrote {} export to {}", format.label(), path.display())?;
    }
    Ok(())
}

fn run_show(
    config: &ConfigFile,
    corpus_path: &Path,
    paper_id: PaperId,
    no_color: bool,
) -> anyhow::Result<()> {
    let color = color_mode(no_color, config);
    let corpus = load_corpus(corpus_path)?;
    let paper = corpus.paper(paper_id)?;

    let report = run_funnel_with_progress(&corpus)?;
    let citing = report
        .final_matches()
        .citing(paper_id)
        .iter()
        .map(|&id| corpus.paper(id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut stdout = std::io::stdout().lock();
    output::print_paper(&mut stdout, paper, &citing, color)?;
    Ok(())
}
