//! hostreg — Host Registry and Placement Index
//!
//! Entry point: loads configuration, wires up the Runtime Driver and the
//! classified host index, builds the axum router, and serves it on the
//! configured bind address.

use std::sync::Arc;

use hostreg::api;
use hostreg::config::RegistryConfig;
use hostreg::registry::driver::ProcessRuntimeDriver;
use hostreg::registry::Core;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RegistryConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config.log_level.clone()))
        .json()
        .init();

    tracing::info!(
        version = hostreg::VERSION,
        bind_addr = %config.bind_addr,
        "starting hostreg"
    );

    let driver = Arc::new(ProcessRuntimeDriver::new(
        config.runtime_binary.clone(),
        config.runtime_host.clone(),
    ));
    let core = Arc::new(Core::new(driver));

    let router = api::routes::build_router(core);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!(bind_addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
