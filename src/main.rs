use std::{sync::Arc, time::Duration};
use tracing::info;
use txcheck::{
    api::Server,
    config::Config,
    ledger::{LedgerClient, RpcClient},
    registry::Registry,
    state::AccountCache,
};

/// The main entry point for the validation service.
///
/// This function initializes logging, loads the configuration (path from the
/// first argument, `config/default.toml` otherwise), connects to the ledger
/// and the optional validation log, and starts the API server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&path)?;
    info!("Validation service starting with config: {:?}", config);

    // Account roots are cached briefly; everything else goes straight to the node
    let rpc: Arc<dyn LedgerClient> = Arc::new(RpcClient::new(config.ledger.rpc_url.clone()));
    let ledger: Arc<dyn LedgerClient> = Arc::new(AccountCache::new(
        rpc,
        Duration::from_secs(config.ledger.cache_ttl_secs),
    ));
    info!("Using XRPL node at {}", config.ledger.rpc_url);

    let registry = match &config.database {
        Some(database) => {
            let registry = Registry::connect(&database.url).await?;
            info!("Recording validations to {}", database.url);
            Some(registry)
        }
        None => None,
    };

    if let Some(faucet) = &config.faucet {
        info!("Faucet relay enabled for {}", faucet.url);
    }

    let server = Server::new(config, ledger, registry);
    server.start().await?;

    Ok(())
}
