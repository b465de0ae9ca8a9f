//! Shiftswap CLI - Shift scheduling and substitution service

use clap::Parser;
use shiftswap::cli::{commands, Cli, Commands, UserCommands};
use shiftswap::errors::to_exit_code;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(to_exit_code(&e));
        }
    }
}

async fn run(cli: Cli) -> shiftswap::Result<()> {
    let cwd = cli.cwd.as_deref();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Serve => commands::serve::run(cwd, config).await,
        Commands::User { command } => match command {
            UserCommands::Add { id, name, role } => {
                commands::user::add(cwd, config, &id, &name, role).await
            }
            UserCommands::List { json } => commands::user::list(cwd, config, json).await,
        },
    }
}
