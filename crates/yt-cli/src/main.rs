//! Command-line driver for Yarnturn: reads one JSON stanza from stdin, plays
//! one turn of the game, and writes one update document to stdout.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use yt_session::{SessionConfig, run_invocation};

#[derive(Parser)]
#[command(
    name = "yarnturn",
    about = "Play one turn of a compiled dialogue per invocation",
    version
)]
struct Cli {
    /// Compiled game file
    gamefile: PathBuf,

    /// Start a new session regardless of the input stanza
    #[arg(long)]
    start: bool,

    /// Directory holding autosave.json
    #[arg(long, default_value = ".")]
    autodir: PathBuf,

    /// Node a new session starts at
    #[arg(long, default_value = "Start")]
    start_node: String,

    /// Write the autosave on a single line
    #[arg(long)]
    compact_autosave: bool,
}

fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprint!("{e}");
                process::exit(1);
            }
        },
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = SessionConfig::default()
        .with_autosave_dir(&cli.autodir)
        .with_start_node(cli.start_node)
        .with_pretty_autosave(!cli.compact_autosave);
    log::debug!("autosave at {}", config.autosave_path().display());

    let result = run_invocation(
        &cli.gamefile,
        &config,
        cli.start,
        &mut io::stdin().lock(),
        &mut io::stdout().lock(),
    );

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
