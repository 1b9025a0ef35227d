//! CLI binary for edgequake-pdf2txt.
//!
//! A thin shim over the library crate: `convert` maps flags to
//! `PipelineConfig`, `check` runs the tool health checks and `pdf` builds a
//! single validated pdftk invocation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_pdf2txt::{
    check_tools, convert, CommandSpec, OutputFormat, PdfArgs, PdfOperation, PdfTk,
    PipelineConfig, PipelineProgressCallback, PipelineStage, ProcessRunner, ProgressCallback,
    SystemRunner,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that names the running stage and logs a line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Resolving input…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

fn stage_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::Burst => "Splitting pages",
        PipelineStage::Rasterize => "Rasterising",
        PipelineStage::Recognize => "Recognising text",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_pipeline_start(&self, input: &str) {
        self.bar.set_message(input.to_string());
    }

    fn on_stage_start(&self, stage: PipelineStage, command: &[String]) {
        self.bar.set_prefix(stage_label(stage));
        self.bar.set_message(command.first().cloned().unwrap_or_default());
    }

    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<18} {}",
            green("✓"),
            stage_label(stage),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        let msg = match error.char_indices().nth(100) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };
        self.bar.println(format!("  {} {:<18} {}", red("✗"), stage_label(stage), red(&msg)));
        self.bar.finish_and_clear();
    }

    fn on_pipeline_complete(&self, _page_count: usize, _output: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scanned PDF into scan.txt
  pdf2txt convert scan.pdf scan

  # Searchable PDF, German and English
  pdf2txt convert --format pdf --language deu+eng scan.pdf searchable

  # From a URL, keeping intermediates for inspection
  pdf2txt convert --keep-intermediates https://example.com/scan.pdf out/scan

  # Are pdftk, magick and tesseract installed?
  pdf2txt check

  # Merge two files (validated before pdftk runs)
  pdf2txt pdf cat a.pdf b.pdf -o merged.pdf

  # Show the pdftk command without running it
  pdf2txt pdf burst big.pdf -o 'page_%04d.pdf' --print-command

REQUIRED TOOLS:
  pdftk       page splitting and all `pdf` operations
  magick      ImageMagick 7 (rasterisation)
  tesseract   OCR engine, with the language packs you request
"#;

/// OCR scanned PDFs to text with pdftk, ImageMagick and Tesseract.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "OCR scanned PDFs to text with pdftk, ImageMagick and Tesseract",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the burst → rasterise → OCR pipeline on a PDF file or URL.
    Convert(ConvertArgs),

    /// Run each tool's version check and report what is installed.
    Check {
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Build, validate and run one pdftk operation.
    Pdf(PdfCommandArgs),
}

#[derive(clap::Args, Debug)]
struct ConvertArgs {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Output path without extension; tesseract adds it.
    output_base: PathBuf,

    /// Output renderer.
    #[arg(long, env = "PDF2TXT_FORMAT", value_enum, default_value = "txt")]
    format: FormatArg,

    /// Tesseract language(s), joined with '+'.
    #[arg(short, long, env = "PDF2TXT_LANGUAGE", default_value = "eng")]
    language: String,

    /// Rasterisation density in DPI (72–1200).
    #[arg(long, env = "PDF2TXT_DENSITY", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=1200))]
    density: u32,

    /// Bits per channel of the page TIFFs (8 or 16).
    #[arg(long, env = "PDF2TXT_DEPTH", default_value_t = 8)]
    depth: u32,

    /// ImageMagick image type for the page TIFFs.
    #[arg(long, env = "PDF2TXT_IMAGE_TYPE", default_value = "Grayscale")]
    image_type: String,

    /// Keep the burst pages, TIFFs and list file after the run.
    #[arg(long, env = "PDF2TXT_KEEP_INTERMEDIATES")]
    keep_intermediates: bool,

    /// Parent directory for intermediates (default: system temp).
    #[arg(long, env = "PDF2TXT_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2TXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(clap::Args, Debug)]
struct PdfCommandArgs {
    /// Operation: cat, shuffle, burst, rotate, fill_form, stamp, dump_data, ...
    operation: String,

    /// Input PDFs; `A=file.pdf` assigns a handle.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (.pdf) or PROMPT.
    #[arg(short, long)]
    output: Option<String>,

    /// Argument placed after the operation (page ranges, form data, ...).
    #[arg(long = "arg", value_name = "ARG")]
    operation_args: Vec<String>,

    /// Password for an encrypted input; `A=secret` targets a handle.
    #[arg(long)]
    input_pw: Vec<String>,

    #[arg(long)]
    owner_pw: Option<String>,

    #[arg(long)]
    user_pw: Option<String>,

    /// Permission granted on the encrypted output (repeatable).
    #[arg(long)]
    allow: Vec<String>,

    /// Encryption strength: 40 or 128.
    #[arg(long)]
    encrypt: Option<i64>,

    #[arg(long)]
    flatten: bool,

    #[arg(long)]
    need_appearances: bool,

    #[arg(long)]
    compress: bool,

    #[arg(long)]
    uncompress: bool,

    #[arg(long)]
    keep_first_id: bool,

    #[arg(long)]
    keep_final_id: bool,

    #[arg(long)]
    drop_xfa: bool,

    /// Pass pdftk's own `verbose` option (`--verbose` controls logging).
    #[arg(long)]
    pdftk_verbose: bool,

    /// Let pdftk prompt for missing values instead of failing.
    #[arg(long)]
    ask: bool,

    /// Print the assembled command instead of running it.
    #[arg(long)]
    print_command: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Txt,
    Pdf,
    Hocr,
    Tsv,
    Alto,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Txt => OutputFormat::Txt,
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Hocr => OutputFormat::Hocr,
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Alto => OutputFormat::Alto,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner is the user's feedback while it runs; keep INFO logs out
    // of its way unless --verbose asks for everything.
    let show_progress = match &cli.command {
        Command::Convert(args) => !cli.quiet && !args.no_progress && !args.json,
        _ => false,
    };
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

    match cli.command {
        Command::Convert(args) => run_convert(args, show_progress, cli.quiet),
        Command::Check { json } => run_check(json),
        Command::Pdf(args) => run_pdf(args),
    }
}

fn run_convert(args: ConvertArgs, show_progress: bool, quiet: bool) -> Result<()> {
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&args, progress)?;

    let report = convert(&args.input, &args.output_base, &config).context("OCR pipeline failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            report.page_count,
            report.total_duration_ms,
            bold(&report.output.display().to_string()),
        );
        if let Some(dir) = &report.intermediates {
            eprintln!("   intermediates kept in {}", dim(&dir.display().to_string()));
        }
    }
    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(args: &ConvertArgs, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .density(args.density)
        .depth(args.depth)
        .image_type(args.image_type.clone())
        .language(args.language.clone())
        .format(args.format.into())
        .keep_intermediates(args.keep_intermediates)
        .download_timeout_secs(args.download_timeout);

    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn run_check(json: bool) -> Result<()> {
    let statuses = check_tools(&SystemRunner);

    if json {
        let out = serde_json::to_string_pretty(&statuses).context("Failed to serialise status")?;
        println!("{out}");
    } else {
        for s in &statuses {
            let (mark, detail) = if s.available {
                (green("✓"), s.version.clone().unwrap_or_default())
            } else {
                (red("✗"), s.error.clone().unwrap_or_default())
            };
            println!("{mark} {:<10} {}", bold(s.program), dim(&detail));
        }
    }

    if statuses.iter().all(|s| s.available) {
        Ok(())
    } else {
        anyhow::bail!("one or more required tools are unavailable")
    }
}

fn run_pdf(args: PdfCommandArgs) -> Result<()> {
    let pdftk = build_pdftk(&args)?;
    let tokens = pdftk.command_line().context("pdftk arguments failed validation")?;

    if args.print_command {
        println!("{}", tokens.join(" "));
        return Ok(());
    }

    let output = SystemRunner.execute(&tokens).context("Failed to run pdftk")?;
    io::stdout()
        .write_all(output.stdout.as_bytes())
        .context("Failed to write to stdout")?;
    io::stderr().write_all(output.stderr.as_bytes()).ok();

    match output.exit_code {
        Some(0) => Ok(()),
        Some(code) => std::process::exit(code),
        None => anyhow::bail!("pdftk was killed by a signal"),
    }
}

fn build_pdftk(args: &PdfCommandArgs) -> Result<PdfTk> {
    let operation: PdfOperation = args
        .operation
        .parse()
        .with_context(|| format!("Unknown pdftk operation '{}'", args.operation))?;

    let mut pdf_args = PdfArgs::new().input(args.inputs.clone());
    if let Some(out) = &args.output {
        pdf_args = pdf_args.output(out.clone());
    }
    if !args.input_pw.is_empty() {
        pdf_args = pdf_args.operator("input_pw", args.input_pw.clone());
    }
    if !args.allow.is_empty() {
        pdf_args = pdf_args.operator("allow", args.allow.clone());
    }
    pdf_args = pdf_args
        .operator("owner_pw", args.owner_pw.clone())
        .operator("user_pw", args.user_pw.clone());

    let flags = [
        ("flatten", args.flatten),
        ("need_appearances", args.need_appearances),
        ("compress", args.compress),
        ("uncompress", args.uncompress),
        ("keep_first_id", args.keep_first_id),
        ("keep_final_id", args.keep_final_id),
        ("drop_xfa", args.drop_xfa),
        ("verbose", args.pdftk_verbose),
        ("ask", args.ask),
    ];
    let any_option = args.encrypt.is_some() || flags.iter().any(|(_, on)| *on);
    if any_option {
        for (name, on) in flags {
            if on {
                pdf_args = pdf_args.option(name, true);
            }
        }
        if let Some(level) = args.encrypt {
            pdf_args = pdf_args.option("encrypt", level);
        }
    }

    PdfTk::for_operation(operation, pdf_args, args.operation_args.clone())
        .context("Invalid pdftk arguments")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_command(argv: &[&str]) -> PdfCommandArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Pdf(args) => args,
            other => panic!("expected pdf subcommand, got {other:?}"),
        }
    }

    #[test]
    fn pdftk_verbose_is_separate_from_log_verbosity() {
        let argv = ["pdf2txt", "-v", "pdf", "cat", "PROMPT", "-o", "out.pdf", "--pdftk-verbose"];
        let cli = Cli::try_parse_from(argv).unwrap();
        assert!(cli.verbose);

        let pdftk = build_pdftk(&pdf_command(&argv)).unwrap();
        assert_eq!(
            pdftk.command_line().unwrap(),
            ["pdftk", "PROMPT", "cat", "output", "out.pdf", "verbose", "dont_ask"]
        );
    }

    #[test]
    fn global_verbose_alone_adds_no_pdftk_option() {
        let args = pdf_command(&["pdf2txt", "pdf", "cat", "PROMPT", "-o", "out.pdf", "--verbose"]);
        let pdftk = build_pdftk(&args).unwrap();
        assert_eq!(
            pdftk.command_line().unwrap(),
            ["pdftk", "PROMPT", "cat", "output", "out.pdf"]
        );
    }
}
