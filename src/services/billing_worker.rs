use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::{
    application::usecases::billing_cycle::{BillingCycleUseCase, UseCaseResult},
    config::config_model::BillingSchedule,
    domain::{
        repositories::{
            billing_cycles::BillingCycleRepository, payments::PaymentRepository,
            subscriptions::SubscriptionRepository,
        },
        value_objects::billing_cycles::BillingRunSummary,
    },
};

pub async fn run_worker_loop<S, P, B>(
    usecase: Arc<BillingCycleUseCase<S, P, B>>,
    schedule: BillingSchedule,
) -> Result<()>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    info!(
        poll_interval_secs = schedule.poll_interval_secs,
        batch_size = schedule.batch_size,
        "billing_worker: starting worker loop"
    );

    loop {
        if let Err(e) = process_due_subscriptions(&usecase, Utc::now(), schedule.batch_size).await {
            error!(
                error = %e,
                "billing_worker: error while evaluating due subscriptions"
            );
        }

        tokio::time::sleep(schedule.poll_interval()).await;
    }
}

pub async fn process_due_subscriptions<S, P, B>(
    usecase: &BillingCycleUseCase<S, P, B>,
    now: DateTime<Utc>,
    batch_size: i64,
) -> UseCaseResult<BillingRunSummary>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    let summary = usecase.evaluate_due_subscriptions(now, batch_size).await?;

    if summary.evaluated == 0 {
        return Ok(summary);
    }

    info!(
        evaluated = summary.evaluated,
        paid = summary.paid,
        outstanding = summary.outstanding,
        skipped = summary.skipped,
        failed = summary.failed,
        "billing_worker: billing run finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        billing_cycles::MockBillingCycleRepository, payments::MockPaymentRepository,
        subscriptions::MockSubscriptionRepository,
    };
    use anyhow::anyhow;
    use chrono::TimeZone;

    #[tokio::test]
    async fn empty_batch_returns_empty_summary() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_due_subscriptions()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(Vec::new()) }));

        let usecase = BillingCycleUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockBillingCycleRepository::new()),
        );

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let summary = process_due_subscriptions(&usecase, now, 100).await.unwrap();

        assert_eq!(summary, BillingRunSummary::default());
    }

    #[tokio::test]
    async fn listing_failure_is_reported() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_list_due_subscriptions()
            .returning(|_, _| Box::pin(async { Err(anyhow!("connection refused")) }));

        let usecase = BillingCycleUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockPaymentRepository::new()),
            Arc::new(MockBillingCycleRepository::new()),
        );

        let result = process_due_subscriptions(&usecase, Utc::now(), 10).await;

        assert!(result.is_err());
    }
}
