//! Patchbay - guitar wiring continuity tracer
//!
//! # Usage
//!
//! ```bash
//! patchbay trace bench.patch
//! RUST_LOG=debug patchbay trace bench.patch --json
//! patchbay count 14
//! patchbay enumerate 3 --limit 4
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use patchbay_core::{
    dsl,
    error::{PatchbayError, Result},
    report::{self, PatchReport},
    topology::{candidate_bits, candidate_count, MatrixCandidates},
    trace::DEFAULT_MAX_DEPTH,
    TraceConfig,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Guitar wiring patch-bay tracer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a patch, run its traces and print pin statuses
    Trace {
        /// Path to the patch description file
        #[arg(value_name = "PATCH_FILE")]
        patch_file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Recursion depth ceiling for traces
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Print how many candidate wirings exist for a pin count
    Count {
        #[arg(value_name = "PINS")]
        pins: usize,
    },

    /// Print candidate connection matrices for a pin count
    Enumerate {
        #[arg(value_name = "PINS")]
        pins: usize,

        /// Stop after this many matrices
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Trace {
            patch_file,
            json,
            max_depth,
        } => {
            let ast = dsl::parse_file(&patch_file)?;
            let config = TraceConfig::new().with_max_depth(max_depth);
            let patch = PatchReport::run(&ast, config)?;

            if !patch.is_clean() {
                warn!(path = %patch_file.display(), "patch has signal contention");
            }

            if json {
                report::write_json(&mut out, &patch)?;
            } else {
                report::write_text(&mut out, &patch)?;
            }
        }
        Command::Count { pins } => {
            let written = match candidate_count(pins) {
                Some(count) => writeln!(out, "{}", count),
                None => writeln!(out, "2^{}", candidate_bits(pins)),
            };
            written.map_err(|e| PatchbayError::output(e.to_string()))?;
        }
        Command::Enumerate { pins, limit } => {
            let candidates = MatrixCandidates::new(pins)?;
            report::write_matrices(&mut out, candidates.take(limit.unwrap_or(usize::MAX)))?;
        }
    }

    out.flush().map_err(|e| PatchbayError::output(e.to_string()))
}
