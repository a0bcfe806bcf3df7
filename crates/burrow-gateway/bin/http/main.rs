use std::sync::Arc;

use anyhow::Context;
use burrow_cache::{CacheConfig, MokaResolutionCache, NullCache};
use burrow_core::{EngineConfig, MappingStore, Redirector, SequenceStore};
use burrow_gateway::cli::{GeneratorArg, StorageBackendArg, CLI};
use burrow_gateway::sweeper::spawn_expiry_sweeper;
use burrow_gateway::{App, AppState};
use burrow_generator::{
    Generator, LeasedCounter, Obfuscator, RandomGenerator, SequentialGenerator, DEFAULT_SEQUENCE,
};
use burrow_redirector::ResolutionService;
use burrow_shortener::AllocationService;
use burrow_storage::{InMemoryStore, MySqlStore};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is fine; flags and the real environment still apply
    let _ = dotenvy::dotenv();

    let cli = CLI::parse();
    burrow_telemetry::init(cli.log_format)?;

    let config = cli.engine_config();

    info!(
        listen_addr = %cli.listen_addr,
        base_url = %cli.base_url,
        storage_backend = %cli.storage,
        generator = %cli.generator,
        code_length = config.code_length,
        cache_max_entries = config.cache_max_entries,
        "starting gateway server"
    );

    match cli.storage {
        StorageBackendArg::InMemory => {
            run_server(&cli, InMemoryStore::new(), config).await
        }
        StorageBackendArg::Mysql => {
            let dsn = cli
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let store = MySqlStore::connect(dsn, config.store_timeout)
                .await
                .context("failed to connect to mysql")?;
            store
                .ensure_schema()
                .await
                .context("failed to create mysql schema")?;
            run_server(&cli, store, config).await
        }
    }
}

fn build_generator<S: SequenceStore>(
    cli: &CLI,
    config: &EngineConfig,
    store: Arc<S>,
) -> anyhow::Result<Box<dyn Generator>> {
    let generator: Box<dyn Generator> = match cli.generator {
        GeneratorArg::Sequential => Box::new(SequentialGenerator::with_counter(
            config.code_length,
            LeasedCounter::new(store, DEFAULT_SEQUENCE, cli.counter_block_size)
                .with_offset(cli.counter_offset),
            Obfuscator::default(),
        )?),
        GeneratorArg::Random => Box::new(RandomGenerator::new(config.code_length)?),
    };
    Ok(generator)
}

async fn run_server<S: MappingStore + SequenceStore>(
    cli: &CLI,
    store: S,
    config: EngineConfig,
) -> anyhow::Result<()> {
    let store = Arc::new(store);
    let generator = build_generator(cli, &config, Arc::clone(&store))?;
    let config = Arc::new(config);

    let shortener = AllocationService::from_shared(
        Arc::clone(&store),
        Arc::new(generator),
        Arc::clone(&config),
    );
    let redirector: Arc<dyn Redirector> = if config.cache_max_entries == 0 {
        Arc::new(ResolutionService::from_shared(
            Arc::clone(&store),
            Arc::new(NullCache),
            Arc::clone(&config),
        ))
    } else {
        let cache = MokaResolutionCache::from(CacheConfig::from(config.as_ref()));
        Arc::new(ResolutionService::from_shared(
            Arc::clone(&store),
            Arc::new(cache),
            Arc::clone(&config),
        ))
    };

    let sweeper = cli
        .sweep_interval()
        .map(|every| spawn_expiry_sweeper(Arc::clone(&store), every));

    let state = AppState::new(Arc::new(shortener), redirector, &cli.base_url);
    let listener = tokio::net::TcpListener::bind(cli.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
