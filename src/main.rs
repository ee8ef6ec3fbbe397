//! Sigflow CLI: sign seeds through the staged hashing pipeline.

use anyhow::Result;
use clap::Parser;
use sigflow::engine::arg_parser::Cli;
use sigflow::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    // RUST_LOG and friends may come from a local .env.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
