//! `safe-connect` command-line tool.
//!
//! ```sh
//! safe-connect init                       # Generate safe-connect.toml
//! safe-connect chains                     # List the chain registry
//! safe-connect connect --chain hetu       # Bootstrap a wallet session
//! safe-connect bind eth:0x…               # Resolve an account's contracts
//! ```

mod cli;
mod cmd;
mod signal;
mod telemetry;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), safe_connect::Error> {
    match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::Chains => cmd::chains::run(&cmd::Context::load(&cli.config)?).await,
        Commands::Connect { chain } => {
            let ctx = cmd::Context::load(&cli.config)?;
            cmd::connect::run(&ctx, chain.as_deref()).await
        }
        Commands::Bind(args) => {
            let ctx = cmd::Context::load(&cli.config)?;
            cmd::bind::run(&ctx, &args).await
        }
    }
}
