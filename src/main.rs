use clap::Parser;
use quicksuggest::cli::Cli;
use quicksuggest::tracing::{LogFormat, init_with};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_with(format, cli.verbose);

    cli.run().await.inspect_err(|e| {
        tracing::error!("Command failed: {:#}", e);
    })
}
