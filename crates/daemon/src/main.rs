//! The long-running gift purchasing daemon.
//!
//! Wires the postgres account store and the platform gateway into the
//! purchase cycle, then hands the cycle to the fixed-interval scheduler
//! until SIGINT.

mod config;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use giftflow_catalog::Discoverer;
use giftflow_engine::{
    AccountQueue, BalanceLedger, PurchaseCycle, Scheduler, SchedulerConfig, shutdown_channel,
};
use giftflow_infra::PostgresAccountStore;
use giftflow_purchasing::PurchaseExecutor;
use giftflow_platform::{GatewayClient, GatewayConfig};

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    giftflow_observability::init();

    let config = DaemonConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the account database")?;
    let store = Arc::new(PostgresAccountStore::new(pool));
    store.ensure_schema().await?;

    let gateway = Arc::new(GatewayClient::new(GatewayConfig::new(
        &config.gateway_url,
        &config.gateway_token,
    ))?);

    let cycle = PurchaseCycle::new(
        Discoverer::new(gateway.clone()),
        AccountQueue::new(store.clone()),
        PurchaseExecutor::new(gateway.clone()),
        BalanceLedger::new(store),
        gateway,
    );
    let scheduler = Scheduler::new(
        cycle,
        SchedulerConfig::default().with_interval(config.cycle_interval),
    );

    let (handle, signal) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; finishing in-flight work");
            handle.request();
        }
    });

    scheduler.run(signal).await?;
    Ok(())
}
