mod config;
mod http;
mod job;
mod service;
mod store;

use std::sync::Arc;

use config::Config;
use env_logger::Env;
use http::start_http;
use log::{info, warn};
use service::JobService;
use store::{JobStore, MemoryJobStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine, the real environment still applies
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(Env::default().default_filter_or("compressd")).init();
    info!("starting compressd");

    let config = Config::from_env()?;

    let store: Arc<dyn JobStore> = match &config.data_file {
        Some(path) => Arc::new(MemoryJobStore::open(path).await?),
        None => {
            warn!("DATA_FILE not set -- jobs will be lost on restart");
            Arc::new(MemoryJobStore::new())
        }
    };

    if config.auth_tokens.is_empty() {
        warn!("AUTH_TOKENS is empty -- every request will be unauthorized");
    }
    info!(
        "{} session tokens, {:?} status transitions",
        config.auth_tokens.len(),
        config.transitions
    );

    let service = JobService::new(store, config.transitions);
    start_http(&config, service).await?;
    Ok(())
}
