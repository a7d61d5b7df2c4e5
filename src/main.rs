use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use simplifiedaction::cli::favorites::FavoritesCommand;
use simplifiedaction::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Score one or more stocks by ticker or company name
    Search {
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Show the latest headlines for a ticker
    News { ticker: String },
    /// Manage favorite tickers
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites
    List,
    /// Add a ticker, or rename an existing favorite
    Add {
        ticker: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Remove a ticker
    Remove { ticker: String },
}

impl From<FavoritesAction> for FavoritesCommand {
    fn from(action: FavoritesAction) -> FavoritesCommand {
        match action {
            FavoritesAction::List => FavoritesCommand::List,
            FavoritesAction::Add { ticker, name } => FavoritesCommand::Add { ticker, name },
            FavoritesAction::Remove { ticker } => FavoritesCommand::Remove { ticker },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let serving = matches!(cli.command, Some(Commands::Serve { .. }));
    init_logging(cli.verbose, serving);

    let command = match cli.command {
        None => {
            Cli::command().print_help()?;
            return Ok(());
        }
        Some(Commands::Setup) => {
            return report(match cli.config_path.as_deref() {
                Some(path) => simplifiedaction::cli::setup::setup_at_path(path),
                None => simplifiedaction::cli::setup::setup(),
            });
        }
        Some(Commands::Search { queries }) => simplifiedaction::AppCommand::Search { queries },
        Some(Commands::News { ticker }) => simplifiedaction::AppCommand::News { ticker },
        Some(Commands::Favorites { action }) => {
            simplifiedaction::AppCommand::Favorites(action.into())
        }
        Some(Commands::Serve { bind }) => simplifiedaction::AppCommand::Serve { bind },
    };

    report(simplifiedaction::run_command(command, cli.config_path.as_deref()).await)
}

fn report(result: Result<()>) -> Result<()> {
    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
