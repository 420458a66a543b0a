//! pubmed-rag binary entry point

use color_eyre::Result;
use pubmed_rag::cli::{commands, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Pick up keys from a local .env before anything reads the environment
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("pubmed_rag=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    commands::execute(cli).await?;
    Ok(())
}
