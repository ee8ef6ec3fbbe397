use clap::Parser;
use std::path::PathBuf;

/// Staged concurrent hashing pipeline.
#[derive(Clone, Parser)]
#[command(name = "sigflow")]
#[command(about = "Sign seeds through single hash -> multi hash -> combine and print the result.")]
pub struct Cli {
    /// Seeds to sign. Integers are signed as numbers, anything else as text. Default: 0 1 1 2 3 5.
    #[arg(value_name = "SEED")]
    pub seeds: Vec<String>,

    /// Config file. Default: `.sigflow.toml` in the current directory, if present.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Bound per-item concurrency to N workers per stage. Without N, uses the available threads.
    #[arg(long, short = 'w', num_args = 0..=1)]
    pub workers: Option<Option<usize>>,

    /// Delimiter between combined items.
    #[arg(long, short = 'd')]
    pub delimiter: Option<String>,

    /// Simulate the reference service latency (1 s per checksum, 10 ms per digest).
    #[arg(long, short = 'l', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub latency: Option<bool>,

    /// Print a JSON report (result, item count, elapsed ms) instead of the bare result.
    #[arg(long, short = 'j', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
