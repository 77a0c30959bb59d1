use anyhow::Context;
use std::path::Path;
use talkd::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = if Path::new(&path).exists() {
        Config::load(&path).with_context(|| format!("loading {path}"))?
    } else {
        info!(%path, "no config file, using defaults");
        Config::default()
    };

    talkd::run(config).await
}
