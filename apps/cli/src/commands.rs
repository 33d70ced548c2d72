//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use dmfinder_core::{BatchScheduler, RunProgress};
use dmfinder_shared::{
    AppConfig, Company, Credentials, init_config, load_config, load_dotenv,
};
use dmfinder_sheets::{
    InputSource, SheetsClient, default_output_path, read_companies, write_contacts,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// dmfinder: find decision makers and company emails for a list of domains.
#[derive(Parser)]
#[command(
    name = "dmfinder",
    version,
    about = "Find decision makers for a list of companies using web search and an LLM.",
    long_about = None,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Input file (.csv, .xlsx, .xls) or public Google Sheets URL with
    /// "Domain" and "Company Name" columns.
    #[arg(required = true)]
    pub input: Option<String>,

    /// Output CSV path (defaults to the sheet title, or output.csv).
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dmfinder=info",
        1 => "dmfinder=debug",
        _ => "dmfinder=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
        None => {
            let input = cli.input.ok_or_else(|| eyre!("missing <INPUT>"))?;
            cmd_find(&input, cli.output).await
        }
    }
}

async fn cmd_find(input: &str, output: Option<PathBuf>) -> Result<()> {
    // Credentials are checked before any input is read.
    load_dotenv();
    let config = load_config()?;
    let credentials = Credentials::from_env(&config)?;

    let source = InputSource::parse(input)?;
    let sheets = SheetsClient::new()?;

    info!(input, "reading companies");
    let companies = read_companies(&source, &sheets).await?;
    if companies.is_empty() {
        return Err(eyre!("no companies found in '{input}'"));
    }

    let output = match output {
        Some(path) => path,
        None => default_output_path(&source, &sheets).await,
    };
    info!(output = %output.display(), "output path resolved");

    let scheduler = BatchScheduler::from_config(&config, &credentials)?;
    let progress = CliProgress::new(companies.len());
    let (contacts, summary) = scheduler.run_with_summary(&companies, &progress).await;
    progress.finish();

    let written = write_contacts(&output, &contacts)?;

    println!();
    println!("  Companies: {}", summary.companies);
    println!("  Chunks:    {}", summary.chunks);
    println!("  Contacts:  {}", summary.contacts);
    if written {
        println!("  Output:    {}", output.display());
    } else {
        println!("  No contacts found; nothing written.");
    }
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar over companies, with chunk status in the message.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(companies: usize) -> Self {
        let bar = ProgressBar::new(companies as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("=> ")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl RunProgress for CliProgress {
    fn chunk_started(&self, index: usize, total_chunks: usize, size: usize) {
        self.bar.set_message(format!(
            "Chunk {}/{total_chunks} ({size} companies)",
            index + 1
        ));
    }

    fn company_done(&self, company: &Company, contacts: usize) {
        self.bar.inc(1);
        self.bar
            .println(format!("  {company}: {contacts} contact(s)"));
    }

    fn chunk_done(&self, index: usize, total_chunks: usize) {
        self.bar
            .println(format!("Chunk {}/{total_chunks} complete", index + 1));
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
