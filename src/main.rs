use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "paperlens")]
#[command(
    version,
    about = "Batch analyzer for academic paper metadata using LLM completions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every record in an input CSV and write results
    Run {
        #[arg(help = "Input CSV with paper_id, title, abstract, publication_year columns")]
        input: PathBuf,
        #[arg(long, short, help = "Output directory for result files")]
        output: Option<PathBuf>,
        #[arg(long, help = "LLM provider (openai)")]
        provider: Option<String>,
        #[arg(long, help = "Model or deployment name")]
        model: Option<String>,
        #[arg(long, help = "Concurrent in-flight requests")]
        concurrency: Option<usize>,
        #[arg(long, help = "Wall-clock budget for the whole batch, in seconds")]
        deadline_secs: Option<u64>,
    },

    /// Estimate cost for given token counts without calling the service
    Estimate {
        #[arg(long, help = "Prompt token count")]
        prompt_tokens: u64,
        #[arg(long, help = "Completion token count")]
        completion_tokens: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Print as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = match (verbose, quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    use paperlens::cli::commands;

    match cli.command {
        Commands::Run {
            input,
            output,
            provider,
            model,
            concurrency,
            deadline_secs,
        } => commands::run::run(commands::run::RunOptions {
            input,
            output,
            provider,
            model,
            concurrency,
            deadline_secs,
        })?,
        Commands::Estimate {
            prompt_tokens,
            completion_tokens,
        } => commands::estimate::run(prompt_tokens, completion_tokens)?,
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => commands::config::show(json)?,
            ConfigAction::Path => commands::config::path(),
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            paperlens::cli::Output::new().error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
