//! sift: pick a file (or any line) from a rule-driven listing.
//!
//! The chosen rule's candidates are ranked as you type; the selection is
//! printed on stdout, so `vim "$(sift)"` works. Cancelling prints nothing
//! and still exits 0.

use clap::Parser;
use sift_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "sift", version, about = "Rule-driven fuzzy picker for files and lines")]
struct Cli {
    /// Use this rule instead of detecting one
    rule: Option<String>,

    /// Config file (default: $SIFT_CONFIG, then $SIFT_HOME/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore caches and re-run the listing command
    #[arg(long)]
    rescan: bool,

    /// Print the rules in evaluation order and exit
    #[arg(long, conflicts_with_all = ["rule", "filter", "print_config"])]
    list_rules: bool,

    /// Print the built-in config and exit
    #[arg(long, conflicts_with_all = ["rule", "filter"])]
    print_config: bool,

    /// Print candidates matching QUERY, best first, without the picker
    #[arg(short, long, value_name = "QUERY")]
    filter: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn is_interactive(&self) -> bool {
        !(self.list_rules || self.print_config || self.filter.is_some())
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.print_config {
        return cli::rules::print_config();
    }

    let source = cli::config::resolve(cli.config.as_deref())?;
    let config = cli::config::load(source)?;
    debug!(source = ?config.source, "using rules");

    if cli.list_rules {
        let cwd = cli::pick::current_dir()?;
        return cli::rules::list(&config, &cwd);
    }

    cli::pick::run(
        &config,
        cli::pick::PickArgs {
            rule: cli.rule,
            rescan: cli.rescan,
            filter: cli.filter,
        },
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The picker owns the terminal; keep stderr logs to errors unless asked.
    if let Err(err) = init_logging(LogConfig {
        app_name: "sift",
        verbose: cli.verbose,
        tui_mode: cli.is_interactive(),
    }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
