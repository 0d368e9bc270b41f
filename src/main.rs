use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vassist::config::AssistConfig;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vassist=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting vassist");

    // An explicit path on the command line wins over the user config
    let config = match std::env::args_os().nth(1) {
        Some(path) => AssistConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => AssistConfig::load_or_default().context("Failed to load configuration")?,
    };

    vassist::ui::run(config).map_err(|e| anyhow::anyhow!("Window error: {}", e))?;

    info!("vassist exited");
    Ok(())
}
