//! CLI command handler: merge config file and flags, run the pipeline, print the result.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

use crate::engine::arg_parser::Cli;
use crate::pipeline::Cancel;
use crate::utils::setup_logging;
use crate::utils::sigflow_toml::{apply_file_to_opts, load_sigflow_toml, read_sigflow_toml};
use crate::{Item, Opts, SignOpts, SignReport, sign_seeds_with_cancel};

/// Defaults, then the config file, then flags.
fn setup_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    let file = match cli.config.as_deref() {
        Some(path) => Some(read_sigflow_toml(path)?),
        None => load_sigflow_toml(Path::new(".")),
    };
    if let Some(ref file) = file {
        apply_file_to_opts(file, &mut opts);
    }

    if !cli.seeds.is_empty() {
        opts.seeds = cli.seeds.iter().map(|s| Item::parse_seed(s)).collect();
    }
    if let Some(workers) = cli.workers {
        opts.workers = Some(workers.unwrap_or_else(rayon::current_num_threads));
    }
    if let Some(ref d) = cli.delimiter {
        opts.delimiter = d.clone();
    }
    if let Some(v) = cli.latency {
        opts.latency = v;
    }
    if let Some(v) = cli.json {
        opts.json = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }

    setup_logging(opts.verbose);
    Ok(opts)
}

/// Run the signing pipeline once. Ctrl+C cancels the run; it then fails instead of printing.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli)?;
    debug!("Seeds: {:?}", opts.seeds);

    let cancel = Cancel::new();
    let cancel_handler = cancel.clone();
    ctrlc::set_handler(move || cancel_handler.cancel()).context("set Ctrl+C handler")?;

    let start = Instant::now();
    let result = sign_seeds_with_cancel(&opts.seeds, &SignOpts::from(&opts), cancel)?;
    let elapsed = start.elapsed();

    if opts.json {
        let report = SignReport {
            result,
            items: opts.seeds.len(),
            elapsed_ms: elapsed.as_millis(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        println!("{}", result);
    }
    info!("Signed {} seeds in {:?}", opts.seeds.len(), elapsed);
    Ok(())
}
