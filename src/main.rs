use anyhow::Context;
use certwatch::{cli, config::Config, pipeline};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = cli::parse_cli();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("certwatch=info,sqlx=warn")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    pipeline::run(config).await
}
