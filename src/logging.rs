use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "simplechatbot=info";

/// Install the fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {}", err))
}
