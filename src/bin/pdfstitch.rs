//! CLI binary for pdfstitch.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `StitchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfstitch::{
    list_documents, stitch, BatchProgressCallback, CancelFlag, OutputFormat, StitchConfig,
    SvgStyle,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-document
/// log lines using [indicatif]. Works correctly when documents complete
/// out-of-order (`--concurrency > 1`).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of documents that were skipped.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_batch_start` (called after the scan, before any processing).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Stitching");
        self.bar.reset_eta();
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Stitching {total_documents} PDF files…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(Self::file_name(path));
    }

    fn on_document_complete(&self, index: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&Self::file_name(path)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            Self::file_name(path),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, stitched: usize) {
        let failed = total_documents.saturating_sub(stitched);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents stitched",
                green("✔"),
                bold(&stitched.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents stitched  ({} skipped)",
                cyan("⚠"),
                bold(&stitched.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Stitch a folder of PDFs into a timestamped PNG in out/
  pdfstitch covers/ -o out/

  # Fixed output file, larger tiles, no spacing
  pdfstitch covers/ -o poster.png --box-size 400 --spacing 0

  # Pixel-mode SVG, full-resolution colour-grouped paths
  pdfstitch covers/ -o poster.svg -f svg --svg-style paths

  # Simplified Illustrator / PDF outputs
  pdfstitch covers/ -o out/ -f ai
  pdfstitch covers/ -o out/ -f pdf

  # Process four documents at a time (tile order is unaffected)
  pdfstitch covers/ -o out/ --concurrency 4

  # List what would be processed, without processing
  pdfstitch covers/ --list-only

OUTPUT FORMATS:
  png   Lossless raster (default).
  svg   One mark per non-white pixel: 2x2 rects at half resolution, or
        colour-grouped 1x1 paths at full resolution (--svg-style).
  ai    EPS wrapper with the raster inlined as hex RGB triples.
  pdf   Minimal single-page PDF with the canvas as an image XObject.

TILE GEOMETRY:
  Every document contributes one box-size x box-size tile; content is
  letterboxed, never stretched. The composite is one tile wide and
  n*(box+spacing)-spacing pixels tall.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library
  PDFSTITCH_*       Every flag below also reads its env var equivalent

A PDF whose first page carries no decodable embedded image contributes a
deterministic placeholder tile (white canvas, black circle) instead of
aborting the batch.
"#;

/// Stitch the embedded artwork of a folder of PDFs into one composite image.
#[derive(Parser, Debug)]
#[command(
    name = "pdfstitch",
    version,
    about = "Stitch the embedded artwork of a folder of PDFs into one composite image",
    long_about = "Scan a directory for PDF documents, extract each one's embedded artwork, \
crop it to content by edge analysis, and stack everything into a single composite image \
(PNG, pixel-SVG, AI, or minimal PDF).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDF files (not scanned recursively).
    input_dir: PathBuf,

    /// Output file, or directory for a timestamped filename.
    #[arg(short, long, env = "PDFSTITCH_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Tile edge length in pixels.
    #[arg(long, env = "PDFSTITCH_BOX_SIZE", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(1..))]
    box_size: u32,

    /// Vertical gap between tiles in pixels.
    #[arg(long, env = "PDFSTITCH_SPACING", default_value_t = 10)]
    spacing: u32,

    /// Output format.
    #[arg(short, long, env = "PDFSTITCH_FORMAT", value_enum, default_value = "png")]
    format: FormatArg,

    /// SVG pixel-emission style (ignored for other formats).
    #[arg(long, env = "PDFSTITCH_SVG_STYLE", value_enum, default_value = "rects")]
    svg_style: SvgStyleArg,

    /// Documents processed at once (1 = strictly sequential).
    #[arg(short, long, env = "PDFSTITCH_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// List matching PDF files and exit without processing.
    #[arg(long)]
    list_only: bool,

    /// Output a structured JSON run report instead of a summary line.
    #[arg(long, env = "PDFSTITCH_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFSTITCH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSTITCH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSTITCH_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Png,
    Svg,
    Ai,
    Pdf,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Svg => OutputFormat::Svg,
            FormatArg::Ai => OutputFormat::Ai,
            FormatArg::Pdf => OutputFormat::Pdf,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SvgStyleArg {
    Rects,
    Paths,
}

impl From<SvgStyleArg> for SvgStyle {
    fn from(v: SvgStyleArg) -> Self {
        match v {
            SvgStyleArg::Rects => SvgStyle::Rects,
            SvgStyleArg::Paths => SvgStyle::Paths,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let files = list_documents(&cli.input_dir)
            .await
            .context("Failed to scan input directory")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&files).context("Failed to serialize file list")?
            );
        } else {
            for file in &files {
                println!("{}", file.display());
            }
            eprintln!("{} {} PDF files", green("✔"), bold(&files.len().to_string()));
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let cancel = CancelFlag::new();
    let mut builder = StitchConfig::builder()
        .input_dir(&cli.input_dir)
        .output_path(&cli.output)
        .box_size(cli.box_size)
        .spacing(cli.spacing)
        .format(cli.format.into())
        .svg_style(cli.svg_style.into())
        .concurrency(cli.concurrency)
        .cancel(cancel.clone());

    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new_dynamic());
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Ctrl-C → cooperative cancellation between documents ──────────────
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} finishing current document, then stopping…", cyan("◆"));
            cancel.cancel();
        }
    });

    // ── Run ──────────────────────────────────────────────────────────────
    let output = stitch(&config).await.context("Stitch failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize run report")?
        );
    } else if !cli.quiet {
        println!("{}", output.output_path.display());
        eprintln!(
            "{} {}x{} composite from {}/{} documents",
            green("✔"),
            output.stats.canvas_width,
            output.stats.canvas_height,
            bold(&output.stats.stitched_documents.to_string()),
            output.stats.total_documents,
        );
    }

    Ok(())
}
