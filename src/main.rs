//! cinedex - Browse The Movie Database from the command line
//!
//! # Usage
//!
//! ```bash
//! cinedex movies -C upcoming -s rating
//! cinedex detail 83533
//! cinedex watchlist add 83533 --json
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinedex::cli::{Cli, Command, ExitCode, Output};
use cinedex::commands;
use cinedex::config::Config;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run_cli(cli).await.into()
}

/// Log to stderr so stdout stays JSON-parseable; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "cinedex=debug" } else { "cinedex=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run CLI command and return exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config.with_env(),
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
    };

    match cli.command {
        Command::Movies(cmd) => {
            if cmd.page == 0 || cmd.pages == 0 {
                return output.error("--page and --pages start at 1", ExitCode::InvalidArgs);
            }
            commands::movies_cmd(cmd, &config, &output).await
        }

        Command::Detail(cmd) => commands::detail_cmd(cmd, &config, &output).await,

        Command::Credits(cmd) => commands::credits_cmd(cmd, &config, &output).await,

        Command::Recommend(cmd) => commands::recommend_cmd(cmd, &config, &output).await,

        Command::Watchlist(cmd) => commands::watchlist_cmd(cmd, &config, &output).await,

        Command::Filters(cmd) => commands::filters_cmd(cmd, &config, &output).await,

        Command::Account(cmd) => commands::account_cmd(cmd, &config, &output).await,
    }
}
