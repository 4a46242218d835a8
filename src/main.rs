use std::sync::Arc;

use anyhow::Result;
use subscription_tracker::{
    application::usecases::billing_cycle::BillingCycleUseCase,
    config,
    infrastructure::{
        axum_http,
        postgres::{
            postgres_connection,
            repositories::{
                billing_cycles::BillingCyclePostgres, payments::PaymentPostgres,
                subscriptions::SubscriptionPostgres,
            },
        },
    },
    observability, services,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Billing worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("billing-worker")?;

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let billing_cycle_usecase = Arc::new(BillingCycleUseCase::new(
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(BillingCyclePostgres::new(Arc::clone(&db_pool_arc))),
    ));

    let billing_loop = tokio::spawn(services::billing_worker::run_worker_loop(
        billing_cycle_usecase,
        dotenvy_env.billing.clone(),
    ));

    let worker_server = dotenvy_env.worker_server.clone();
    let http_server = tokio::spawn(async move { axum_http::http_serve::start(worker_server).await });

    tokio::select! {
        result = billing_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
