//! mdviewer - A terminal markdown viewer and editor with a live HTML preview.
//!
//! # Usage
//!
//! ```bash
//! mdviewer README.md
//! mdviewer --mode rendered README.md
//! mdviewer --print README.md > README.html
//! ```

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use mdviewer::app::App;
use mdviewer::config::LaunchOptions;
use mdviewer::document::Document;
use mdviewer::render::Renderer;

/// A terminal markdown viewer and editor with a live HTML preview
#[derive(Parser, Debug)]
#[command(name = "mdviewer", version, about, long_about = None)]
struct Cli {
    /// Markdown file to open (path or file:// URL)
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Initial view mode: source, split or rendered
    #[arg(long, value_name = "MODE")]
    mode: Option<String>,

    /// Render the file to stdout as HTML and exit
    #[arg(long)]
    print: bool,

    /// Write diagnostics to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

/// Where diagnostics go. The interactive UI owns the terminal, so without
/// `--log-file` its diagnostics are discarded.
#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

const fn log_target(log_file: Option<&Path>, interactive: bool) -> LogTarget<'_> {
    match log_file {
        Some(path) => LogTarget::File(path),
        None if interactive => LogTarget::Discard,
        None => LogTarget::Stderr,
    }
}

fn init_logging(target: &LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::Discard => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn print_html(launch: &LaunchOptions) -> Result<()> {
    let path = launch
        .file
        .as_deref()
        .context("--print needs a readable markdown file")?;
    let markdown = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::new(path, markdown);

    let html = Renderer::new().render(document.content(), document.directory());
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(html.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let tokens = raw_args.get(1..).unwrap_or_default();

    let (cli, rejected) = match Cli::try_parse_from(&raw_args) {
        Ok(cli) => (Some(cli), None),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => (None, Some(err)),
    };

    let (launch, print) = match &cli {
        Some(cli) => (
            LaunchOptions::resolve(cli.mode.as_deref(), &cli.files),
            cli.print,
        ),
        None => (
            LaunchOptions::from_tokens(tokens),
            tokens.iter().any(|token| token == "--print"),
        ),
    };

    let log_file = cli.as_ref().and_then(|cli| cli.log_file.as_deref());
    init_logging(&log_target(log_file, !print))?;
    if let Some(err) = rejected {
        tracing::warn!(error = %err, "unrecognised command line, scanning arguments instead");
    }

    if print {
        return print_html(&launch);
    }

    App::new(launch).run().context("Application error")
}
