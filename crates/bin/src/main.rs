mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("driveacl=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    if let Err(e) = commands::run(cli).await {
        eprintln!("error: {e}");
        tracing::debug!(
            module = e.module(),
            recoverable = e.is_recoverable(),
            "command failed"
        );
        std::process::exit(1);
    }
}
