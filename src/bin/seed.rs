use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use subscription_tracker::{
    application::usecases::{billing_cycle::BillingCycleUseCase, seed::SeedUseCase},
    config,
    infrastructure::postgres::{
        postgres_connection,
        repositories::{
            app_users::AppUserPostgres, billing_cycles::BillingCyclePostgres,
            payments::PaymentPostgres, subscriptions::SubscriptionPostgres,
        },
    },
    observability,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Seed exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("seed")?;

    let database = config::config_loader::load_database()?;
    let postgres_pool =
        postgres_connection::establish_connection(&database.url, database.max_connections)?;
    let db_pool_arc = Arc::new(postgres_pool);

    let billing_cycle_usecase = Arc::new(BillingCycleUseCase::new(
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(BillingCyclePostgres::new(Arc::clone(&db_pool_arc))),
    ));
    let seed_usecase = SeedUseCase::new(
        Arc::new(AppUserPostgres::new(Arc::clone(&db_pool_arc))),
        billing_cycle_usecase,
    );

    let mut rng = StdRng::from_entropy();
    let evaluations = seed_usecase.run(Utc::now(), &mut rng).await?;
    info!(count = evaluations.len(), "seed: demo data created");

    println!("{}", serde_json::to_string_pretty(&evaluations)?);
    Ok(())
}
