use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use youtube_transcript::{Cli, RunConfig, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "youtube_transcript=debug"
    } else {
        "youtube_transcript=warn"
    };

    // Logs go to stderr, stdout carries only the result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::load()?;
    let config = RunConfig::from_cli(&cli, &settings);

    let output = youtube_transcript::run(config, cli.quiet).await?;
    println!("{}", output);

    Ok(())
}
