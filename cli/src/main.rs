//! pdfsect CLI - segment PDF documents into titled sections and sentences

mod prompt;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsect::correct::failures;
use pdfsect::detect::collect_pdfs;
use pdfsect::render::{self, JsonFormat, TextOptions};
use pdfsect::{
    Batch, CorrectionLoop, CorrectionOutcome, CorrectionPrompt, Document, ErrorMode, PageSelection,
    ParseOptions, PdfSource, SegmentOptions, StyleMap, Unattended, DEFAULT_REFERENCE_WORD,
};

use crate::prompt::TerminalPrompt;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "pdfsect")]
#[command(author = "iyulab")]
#[command(version)]
#[command(
    about = "Segment PDF documents into titled sections and sentences",
    long_about = None
)]
struct Cli {
    /// Input PDF file or directory of PDF files
    #[arg(short, long, value_name = "PATH", env = "PDFSECT_INPUT")]
    input: PathBuf,

    /// Style map (JSON array of {"style", "type"} rules)
    #[arg(short, long, value_name = "FILE", env = "PDFSECT_MAP")]
    map: PathBuf,

    /// Output directory (one file per document) or file (JSON lines);
    /// stdout if not specified
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Never prompt; correct with --reference-word up to --max-rounds times
    #[arg(short, long)]
    silent: bool,

    /// Skip the check for documents without sections
    #[arg(long)]
    no_check: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Maximum correction rounds in silent mode
    #[arg(long, value_name = "N", default_value_t = 1)]
    max_rounds: usize,

    /// Word that starts a title span in documents without sections
    #[arg(long, value_name = "WORD", default_value = DEFAULT_REFERENCE_WORD)]
    reference_word: String,

    /// Write compact JSON files
    #[arg(long)]
    compact: bool,

    /// Write plain text instead of JSON
    #[arg(long)]
    text: bool,

    /// Drop text without a title (always on unless --no-check)
    #[arg(long)]
    drop_untitled: bool,

    /// Parse documents one after another
    #[arg(long)]
    sequential: bool,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Skip pages whose content cannot be decoded
    #[arg(long)]
    lenient: bool,
}

impl Cli {
    fn parse_options(&self) -> CliResult<ParseOptions> {
        let error_mode = if self.lenient {
            ErrorMode::Lenient
        } else {
            ErrorMode::Strict
        };
        let mut options = ParseOptions::new()
            .with_error_mode(error_mode)
            .with_segment(SegmentOptions::new().require_title(self.require_title()));

        if let Some(pages) = &self.pages {
            let selection =
                PageSelection::parse(pages).map_err(|e| format!("Invalid page range: {}", e))?;
            options = options.with_pages(selection);
        }
        if self.sequential {
            options = options.sequential();
        }
        Ok(options)
    }

    /// Untitled text is dropped while checking: a document whose title font
    /// is unmapped must come out empty for the check to report it.
    fn require_title(&self) -> bool {
        self.drop_untitled || !self.no_check
    }

    fn unattended(&self) -> Unattended {
        Unattended::new(self.max_rounds).with_reference_word(self.reference_word.as_str())
    }

    fn output_kind(&self) -> OutputKind {
        if self.text {
            OutputKind::Text
        } else if self.compact {
            OutputKind::Json(JsonFormat::Compact)
        } else {
            OutputKind::Json(JsonFormat::Pretty)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputKind {
    Json(JsonFormat),
    Text,
}

impl OutputKind {
    fn extension(self) -> &'static str {
        match self {
            OutputKind::Json(_) => "json",
            OutputKind::Text => "txt",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let options = cli.parse_options()?;
    let map = StyleMap::from_path(&cli.map)
        .map_err(|e| format!("Cannot load style map {}: {}", cli.map.display(), e))?;

    let sources = open_sources(&collect_pdfs(&cli.input)?, &options);
    if sources.is_empty() {
        eprintln!("{}", "No PDF files to parse".yellow());
        return Ok(());
    }

    let mut batch = Batch::new(sources, options);
    let pb = progress_bar(batch.len() as u64, "Parsing")?;
    let results = batch.parse_with_progress(&map, |_| pb.inc(1));
    pb.finish_and_clear();

    let results = if cli.no_check {
        results
    } else {
        let outcome = check(cli, &batch, map.clone(), results)?;
        if outcome.map_changed(&map) {
            let path = extended_map_path(&cli.map);
            outcome.map.save(&path)?;
            eprintln!("{} {}", "Saved extended style map to".green(), path.display());
        }
        for name in &outcome.unresolved {
            eprintln!("{} {}", "Still without sections:".yellow(), name);
        }
        outcome.results
    };

    let mut docs = Vec::with_capacity(results.len());
    for (parser, result) in batch.parsers().iter().zip(results) {
        match result {
            Ok(doc) => docs.push(doc),
            Err(e) => eprintln!("{} {}: {}", "Failed to parse".red(), parser.name(), e),
        }
    }

    write_output(cli.output.as_deref(), &docs, cli.output_kind())?;
    if let Some(path) = &cli.output {
        eprintln!("{} {}", "Saved to".green(), path.display());
    }

    Ok(())
}

/// Open every input, reporting the ones that are not readable PDFs.
fn open_sources(paths: &[PathBuf], options: &ParseOptions) -> Vec<PdfSource> {
    paths
        .iter()
        .filter_map(|path| match PdfSource::open(path, options) {
            Ok(source) => Some(source),
            Err(e) => {
                eprintln!("{} {}: {}", "Skipping".red(), path.display(), e);
                None
            }
        })
        .collect()
}

fn progress_bar(len: u64, label: &'static str) -> CliResult<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );
    pb.set_message(label);
    Ok(pb)
}

/// Report documents without sections and run the correction loop on them.
fn check(
    cli: &Cli,
    batch: &Batch<PdfSource>,
    map: StyleMap,
    results: Vec<pdfsect::Result<Document>>,
) -> CliResult<CorrectionOutcome> {
    eprintln!("{}", "Checking for parsing issues...".cyan());
    let failed = failures(&results);
    eprintln!("Found {} issues in the current parsing batch", failed.len());
    for name in &failed {
        eprintln!("{} {}", "Detected parsing issue with file:".yellow(), name);
    }

    if cli.silent {
        correct(cli.unattended(), batch, map, results)
    } else {
        let prompt = TerminalPrompt::stdio().with_suggestion(cli.reference_word.as_str());
        correct(prompt, batch, map, results)
    }
}

fn correct<P: CorrectionPrompt>(
    prompt: P,
    batch: &Batch<PdfSource>,
    map: StyleMap,
    results: Vec<pdfsect::Result<Document>>,
) -> CliResult<CorrectionOutcome> {
    let pb = progress_bar(batch.len() as u64, "Reparsing")?;
    let outcome = CorrectionLoop::new(prompt).run_with_progress(batch, map, results, |_| {
        // One pass per round over the whole batch.
        if pb.length().is_some_and(|len| pb.position() >= len) {
            pb.reset();
        }
        pb.inc(1);
    });
    pb.finish_and_clear();
    Ok(outcome)
}

/// `styles.json` becomes `styles.json.extended`.
fn extended_map_path(map: &Path) -> PathBuf {
    let mut path = map.as_os_str().to_owned();
    path.push(".extended");
    PathBuf::from(path)
}

/// A path names a directory target if it exists as one or ends in a separator.
fn is_dir_target(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    path.is_dir() || raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

fn render_one(doc: &Document, kind: OutputKind) -> CliResult<String> {
    Ok(match kind {
        OutputKind::Json(format) => render::to_json(doc, format)?,
        OutputKind::Text => render::to_text(doc, &TextOptions::default()),
    })
}

/// Write all documents into one stream: JSON lines, or texts separated by
/// blank lines.
fn write_stream<W: Write>(writer: &mut W, docs: &[Document], kind: OutputKind) -> CliResult<()> {
    match kind {
        OutputKind::Json(_) => render::write_json_lines(writer, docs)?,
        OutputKind::Text => {
            for doc in docs {
                writeln!(writer, "{}\n", render::to_text(doc, &TextOptions::default()))?;
            }
        }
    }
    Ok(())
}

fn write_output(output: Option<&Path>, docs: &[Document], kind: OutputKind) -> CliResult<()> {
    let Some(path) = output else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        return write_stream(&mut lock, docs, kind);
    };

    if is_dir_target(path) {
        fs::create_dir_all(path)?;
        for doc in docs {
            let stem = Path::new(&doc.name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| doc.name.clone());
            let file = path.join(format!("{}.{}", stem, kind.extension()));
            fs::write(&file, render_one(doc, kind)?)?;
            log::debug!("wrote {}", file.display());
        }
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_stream(&mut writer, docs, kind)?;
    writer.flush()?;
    Ok(())
}
