//! Command-line front end.
//!
//! Usage:
//!   omnidat <FILE> list   [KEY...] [KEY=VALUE | KEY^VALUE ...]
//!   omnidat <FILE> add    KEY=VALUE [KEY=VALUE ...]
//!   omnidat <FILE> trim   [KEY...] [KEY=VALUE | KEY^VALUE ...]
//!   omnidat <FILE> remove [KEY...] [KEY=VALUE | KEY^VALUE ...]
//!
//! Flags (`-v`, `--assign-id`) are recognised anywhere on the line. Put
//! `--` before arguments that start with `-`.

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use omnidat::{Action, Options, Store, execute};
use tracing_subscriber::EnvFilter;

/// Query and edit a line-per-record key=value file.
#[derive(Parser)]
#[command(name = "omnidat", version)]
struct Cli {
    /// Data file, one record per line
    file: PathBuf,

    /// list, add, trim or remove
    action: String,

    /// Projection keys, then predicates (key=value keeps, key^value drops).
    /// For add: the key=value fields of the new record.
    args: Vec<String>,

    /// Show debug logs and record counts on stderr
    #[arg(short, long)]
    verbose: bool,

    /// On add, set _id to the number of records already in the file
    #[arg(long)]
    assign_id: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let action: Action = match cli.action.parse() {
        Ok(action) => action,
        Err(e) => {
            eprintln!("omnidat: {e}");
            process::exit(2);
        }
    };

    let store = Store::new(cli.file.clone());
    let options = Options {
        assign_id: cli.assign_id,
    };

    if cli.verbose {
        eprintln!("File:     {}", cli.file.display());
        eprintln!("Action:   {}", action.name());
    }

    let mut out = BufWriter::new(io::stdout().lock());
    match execute(&store, action, cli.args.as_slice(), &options, &mut out) {
        Ok(summary) => {
            if cli.verbose {
                eprintln!("Records:  {summary}");
            }
        }
        Err(e) => {
            // Records streamed before the failure stay visible.
            drop(out);
            eprintln!("omnidat: {e}");
            process::exit(1);
        }
    }
}
