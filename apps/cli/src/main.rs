//! dmfinder CLI: find decision makers for a list of companies.
//!
//! Reads companies from a CSV, Excel file or public Google Sheet, searches
//! the web for each, extracts contacts with a language model, and writes
//! them to CSV.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
