//! txnsrv service entrypoint

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use redis::aio::ConnectionManager;
use tracing::info;

use common::logging::{init_logging, LoggingOptions};
use txnsrv::publish::{
    CommsWrapperPublisher, LegacyStorePublisher, ListenerPublisher, MicroservicesPublisher,
};
use txnsrv::storage::{RedisAssetDirectory, RedisCommsBridge, RedisTransactionStore};
use txnsrv::{
    Config, EventSubscriber, RetryPolicy, TransactionPublisher, UpdateEventDispatcher,
    SERVICE_NAME, SERVICE_VERSION,
};

#[derive(Debug, Parser)]
#[command(name = "txnsrv", about = "Well command-transaction service")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "config/txnsrv.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config).context("Failed to load configuration")?;

    init_logging(&LoggingOptions {
        default_filter: "info".to_string(),
        service_name: config.service.name.clone(),
        log_dir: config.service.log_dir.clone(),
    });

    info!("Starting {} v{}", SERVICE_NAME, SERVICE_VERSION);

    let client = redis::Client::open(config.redis.url.as_str())
        .context("Failed to create Redis client")?;
    let conn = ConnectionManager::new(client.clone())
        .await
        .context("Failed to connect to Redis")?;

    let assets = Arc::new(RedisAssetDirectory::new(
        conn.clone(),
        config.redis.key_prefix.clone(),
    ));
    let store = Arc::new(RedisTransactionStore::new(
        conn.clone(),
        config.redis.key_prefix.clone(),
    ));
    let policy = RetryPolicy::new(config.store.retry_count, config.store.retry_delay_ms);

    let publishers: Vec<Arc<dyn TransactionPublisher>> = vec![
        Arc::new(MicroservicesPublisher::new(
            conn.clone(),
            config.channels.microservices.clone(),
        )),
        Arc::new(ListenerPublisher::new(
            conn.clone(),
            config.channels.listener.clone(),
        )),
        Arc::new(LegacyStorePublisher::new(store, policy)),
        Arc::new(CommsWrapperPublisher::new(
            Arc::new(RedisCommsBridge::new(
                conn,
                config.channels.comms.clone(),
            )),
            policy,
        )),
    ];
    info!("Registered {} publishers", publishers.len());

    let dispatcher = Arc::new(UpdateEventDispatcher::new(assets, publishers));
    let subscriber = EventSubscriber::new(client, config.channels.events.clone(), dispatcher);

    subscriber.run().await?;

    info!("{} stopped", SERVICE_NAME);
    Ok(())
}
