use anyhow::{Context, Result, ensure};

use super::config_model::{BillingSchedule, Database, DotEnvyConfig, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .context("SERVER_PORT_WORKER is invalid")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .context("SERVER_TIMEOUT is invalid")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = load_database()?;
    let billing = load_billing_schedule()?;

    Ok(DotEnvyConfig {
        worker_server,
        database,
        billing,
    })
}

pub fn load_database() -> Result<Database> {
    dotenvy::dotenv().ok();

    Ok(Database {
        url: std::env::var("DATABASE_URL").context("DATABASE_URL is invalid")?,
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    })
}

pub fn load_billing_schedule() -> Result<BillingSchedule> {
    dotenvy::dotenv().ok();

    let poll_interval_secs: u64 = std::env::var("BILLING_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .context("BILLING_POLL_INTERVAL_SECS is invalid")?;
    ensure!(
        poll_interval_secs > 0,
        "BILLING_POLL_INTERVAL_SECS must be greater than zero"
    );

    let batch_size: i64 = std::env::var("BILLING_BATCH_SIZE")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .context("BILLING_BATCH_SIZE is invalid")?;
    ensure!(batch_size > 0, "BILLING_BATCH_SIZE must be greater than zero");

    Ok(BillingSchedule {
        poll_interval_secs,
        batch_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_section_loads_without_worker_server_settings() {
        unsafe {
            std::env::remove_var("SERVER_PORT_WORKER");
            std::env::remove_var("SERVER_TIMEOUT");
            std::env::remove_var("DATABASE_MAX_CONNECTIONS");
            std::env::set_var("DATABASE_URL", "postgres://localhost/subscriptions");
        }

        let database = load_database().unwrap();
        assert_eq!(database.url, "postgres://localhost/subscriptions");
        assert_eq!(database.max_connections, 10);
        assert!(load().is_err());
    }

    #[test]
    fn billing_schedule_defaults_and_validation() {
        unsafe {
            std::env::remove_var("BILLING_POLL_INTERVAL_SECS");
            std::env::remove_var("BILLING_BATCH_SIZE");
        }
        assert_eq!(
            load_billing_schedule().unwrap(),
            BillingSchedule {
                poll_interval_secs: 60,
                batch_size: 100,
            }
        );

        unsafe {
            std::env::set_var("BILLING_BATCH_SIZE", "0");
        }
        assert!(load_billing_schedule().is_err());

        unsafe {
            std::env::set_var("BILLING_BATCH_SIZE", "25");
            std::env::set_var("BILLING_POLL_INTERVAL_SECS", "abc");
        }
        let err = load_billing_schedule().unwrap_err();
        assert_eq!(err.to_string(), "BILLING_POLL_INTERVAL_SECS is invalid");

        unsafe {
            std::env::remove_var("BILLING_POLL_INTERVAL_SECS");
            std::env::remove_var("BILLING_BATCH_SIZE");
        }
    }
}
