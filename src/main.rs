use beaver_ttp::config::Config;
use beaver_ttp::{store, web};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install global collector configured based on RUST_LOG env var.
    let subscriber = tracing_subscriber::fmt()
        .with_thread_ids(true)
        .with_env_filter(EnvFilter::from_default_env());
    subscriber.init();
    let _span = tracing::trace_span!("cli").entered();

    let config = Config::parse();
    tracing::info!(
        store_host = %config.store_host,
        store_port = config.store_port,
        ttl_seconds = config.ttl_seconds,
        listen_port = config.listen_port,
        "starting beaver ttp"
    );

    let store = store::init(&config).await?;
    web::run(config, store).await
}
