use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "brushbuddy", version, about = "Guided hair-brushing routine with a buddy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the brushing routine in this terminal
    Run(commands::run::RunArgs),
    /// List the routine steps
    Steps {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// List the built-in background tracks
    Tracks {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Logs go to stderr so they never interleave with the countdown line.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BRUSHBUDDY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Steps { json } => commands::steps::run(json),
        Commands::Tracks { json } => commands::tracks::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
