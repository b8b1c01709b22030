//! CLI binary for edgequake-pdfconv.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionConfig` and a `TargetFormat`, then reports the artifact path.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_pdfconv::{
    convert_async, inspect, ConversionArtifact, ConversionConfig, ConvertError, ScanMode,
    TargetFormat,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One trimmed PNG per page in report_images/
  pdfconv report.pdf --to images

  # Editable Word document from a born-digital PDF
  pdfconv contract.pdf --to docx --native

  # OCR a scan into contract_scanned.docx (needs the `tesseract` feature)
  pdfconv contract.pdf --to docx --scanned --ocr-lang eng+deu

  # Every detected table as its own sheet
  pdfconv financials.pdf --to xlsx

  # One slide per page
  pdfconv handout.pdf --to pptx

  # Inspect PDF metadata only
  pdfconv --inspect-only report.pdf --json

OUTPUTS (written next to the input):
  images   <name>_images/page_<n>.png
  docx     <name>.docx, or <name>_scanned.docx with --scanned
  xlsx     <name>.xlsx with sheets Table_1 … Table_N
  pptx     <name>.pptx

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to a specific libpdfium
  RUST_LOG                Override the log filter (e.g. edgequake_pdfconv=debug)
"#;

/// Convert PDF files to images, DOCX, XLSX or PPTX.
#[derive(Parser, Debug)]
#[command(
    name = "pdfconv",
    version,
    about = "Convert PDF files to images, DOCX, XLSX or PPTX",
    long_about = "Convert a PDF into per-page PNG images, an editable Word document \
(OCR for scans, reflowed text otherwise), an Excel workbook with one sheet per detected \
table, or a PowerPoint deck with one slide per page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Target format.
    #[arg(short = 't', long = "to", env = "PDFCONV_TO", value_enum, default_value = "images")]
    to: TargetArg,

    /// The PDF is a scan: run OCR (docx only).
    #[arg(long, conflicts_with = "native")]
    scanned: bool,

    /// The PDF has embedded text: reflow it (docx only).
    #[arg(long)]
    native: bool,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDFCONV_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Maximum rendered edge in pixels.
    #[arg(long, env = "PDFCONV_MAX_PIXELS", default_value_t = 4000)]
    max_pixels: u32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFCONV_PASSWORD")]
    password: Option<String>,

    /// Tesseract language codes, e.g. eng or eng+fra.
    #[arg(long, env = "PDFCONV_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Per-channel tolerance when trimming white borders.
    #[arg(long, env = "PDFCONV_TRIM_TOLERANCE", default_value_t = 10)]
    trim_tolerance: u8,

    /// Print the result as JSON.
    #[arg(long, env = "PDFCONV_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFCONV_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TargetArg {
    Images,
    Docx,
    Xlsx,
    Pptx,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level progress; only errors are logged under it.
    let show_spinner = !cli.quiet && !cli.json && io::stderr().is_terminal();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_spinner).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let kind = e.downcast_ref::<ConvertError>().map(ConvertError::kind);
                let report = serde_json::json!({
                    "status": "error",
                    "kind": kind,
                    "message": format!("{e:#}"),
                });
                println!("{report}");
            } else {
                eprintln!("{} {e:#}", red("✘"));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_spinner: bool) -> Result<()> {
    let config = build_config(cli)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let input = cli.input.clone();
        let inspect_config = config.clone();
        let meta = tokio::task::spawn_blocking(move || inspect(&input, &inspect_config))
            .await
            .context("Inspect task panicked")??;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    let target = resolve_target(cli)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = show_spinner.then(|| start_spinner(&cli.input, target));
    let start = Instant::now();
    let result = convert_async(cli.input.clone(), target, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let artifact =
        result.with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    if cli.json {
        let report = serde_json::json!({
            "status": "ok",
            "target": target.to_string(),
            "artifact": artifact,
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            green("✔"),
            summary(&artifact),
            dim(&format!("{}ms", start.elapsed().as_millis())),
        );
        println!("{}", artifact.location().display());
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .max_rendered_pixels(cli.max_pixels)
        .ocr_language(cli.ocr_lang.clone())
        .trim_tolerance(cli.trim_tolerance);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }

    builder.build().context("Invalid configuration")
}

/// Pick the target, asking about scans when docx was chosen without a flag.
fn resolve_target(cli: &Cli) -> Result<TargetFormat> {
    if cli.to != TargetArg::Docx && (cli.scanned || cli.native) {
        bail!("--scanned/--native only apply to --to docx");
    }

    Ok(match cli.to {
        TargetArg::Images => TargetFormat::Images,
        TargetArg::Xlsx => TargetFormat::Spreadsheet,
        TargetArg::Pptx => TargetFormat::SlideDeck,
        TargetArg::Docx if cli.scanned => TargetFormat::FlowDocument(ScanMode::Scanned),
        TargetArg::Docx if cli.native => TargetFormat::FlowDocument(ScanMode::Native),
        TargetArg::Docx => TargetFormat::FlowDocument(ask_scan_mode()?),
    })
}

/// Ask once whether the PDF is a scan; re-prompts only on unrecognised input.
fn ask_scan_mode() -> Result<ScanMode> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!("cannot ask whether the PDF is scanned: pass --scanned or --native");
    }

    let mut stderr = io::stderr();
    let mut line = String::new();
    loop {
        write!(stderr, "{} ", bold("Is the PDF a scanned document? [y/n]"))
            .and_then(|_| stderr.flush())
            .context("Failed to write prompt")?;

        line.clear();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("no answer given: pass --scanned or --native");
        }
        if let Some(mode) = parse_answer(&line) {
            return Ok(mode);
        }
    }
}

fn parse_answer(answer: &str) -> Option<ScanMode> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(ScanMode::Scanned),
        "n" | "no" => Some(ScanMode::Native),
        _ => None,
    }
}

fn start_spinner(input: &std::path::Path, target: TargetFormat) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(format!("{} → {}", input.display(), target));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn summary(artifact: &ConversionArtifact) -> String {
    match artifact {
        ConversionArtifact::Images { pages, .. } => format!("{} page images", pages.len()),
        ConversionArtifact::FlowDocument {
            mode: ScanMode::Scanned,
            ..
        } => "OCR document written".to_string(),
        ConversionArtifact::FlowDocument { .. } => "document written".to_string(),
        ConversionArtifact::Spreadsheet { sheets, .. } => format!("{} tables", sheets.len()),
        ConversionArtifact::SlideDeck { slides, .. } => format!("{slides} slides"),
    }
}
