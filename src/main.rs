// Chunk: docs/chunks/headless_demo - Headless JSON highlighting demo
//!
//! neon-json: highlight a JSON file in the terminal, optionally after
//! replaying a sequence of edits through the incremental pipeline.
//!
//! ```text
//! neon-json data.json --edit '6:,"b":2' --edit 0..1 --lines 20
//! RUST_LOG=debug neon-json data.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{debug, error};
use neon_highlight::HighlightConfig;
use neon_json::{highlight_file, DemoError, DemoOptions, ScriptedEdit};

#[derive(Debug, Parser)]
#[command(name = "neon-json", version, about = "Incremental JSON syntax highlighting")]
struct Args {
    /// JSON file to highlight
    file: PathBuf,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Edit applied after loading: OFFSET:TEXT, START..END or START..END:TEXT.
    /// May be repeated.
    #[arg(short, long = "edit", value_name = "EDIT")]
    edits: Vec<ScriptedEdit>,

    /// Number of visible lines
    #[arg(short, long)]
    lines: Option<usize>,

    /// First visible line (0-based)
    #[arg(long, default_value_t = 0)]
    first_line: usize,

    /// Query worker threads
    #[arg(short, long)]
    threads: Option<usize>,

    /// Print plain text without escapes
    #[arg(long)]
    no_color: bool,

    /// Seconds to wait for highlighting to settle
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

fn load_config(args: &Args) -> Result<HighlightConfig, DemoError> {
    let mut config = match &args.config {
        Some(path) => HighlightConfig::load(path)?,
        None => match HighlightConfig::default_path() {
            Some(path) => HighlightConfig::load_or_default(&path)?,
            None => HighlightConfig::default(),
        },
    };
    if let Some(lines) = args.lines {
        config.visible_lines = lines;
    }
    if let Some(threads) = args.threads {
        config.worker_threads = threads;
    }
    Ok(config)
}

fn run(args: Args) -> Result<String, DemoError> {
    let config = load_config(&args)?;
    debug!("configuration: {:?}", config);
    let options = DemoOptions {
        config,
        edits: args.edits,
        first_line: args.first_line,
        color: !args.no_color,
        timeout: Duration::from_secs(args.timeout),
    };
    highlight_file(&args.file, &options)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            eprintln!("neon-json: {}", err);
            ExitCode::FAILURE
        }
    }
}
