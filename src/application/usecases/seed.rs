use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use rand::Rng;
use tracing::info;

use crate::{
    application::usecases::billing_cycle::{BillingCycleUseCase, UseCaseResult},
    domain::{
        billing::{dates::BILLING_DATE_FORMAT, errors::BillingError},
        entities::app_users::InsertAppUserEntity,
        repositories::{
            app_users::AppUserRepository, billing_cycles::BillingCycleRepository,
            payments::PaymentRepository, subscriptions::SubscriptionRepository,
        },
        value_objects::{
            billing_cycles::CycleEvaluation,
            enums::{billing_periods::BillingPeriod, currencies::SubscriptionCurrency},
            subscriptions::InsertSubscriptionModel,
        },
    },
};

pub const DEMO_USER_EMAIL: &str = "przemek.lewtak@gmai.com";
pub const DEMO_USER_NAME: &str = "Przemek Lewtak";

struct CatalogueItem {
    name: &'static str,
    category: &'static str,
    avatar_url: &'static str,
    price_minor: i64,
}

const DEMO_CATALOGUE: [CatalogueItem; 5] = [
    CatalogueItem {
        name: "Google Cloud",
        category: "Infrastructure tools",
        avatar_url: "https://dsc.cloud/88160a/Google-Avatar.png",
        price_minor: 520,
    },
    CatalogueItem {
        name: "Disney+",
        category: "Entertainment",
        avatar_url: "https://dsc.cloud/88160a/Disney-Avatar.png",
        price_minor: 899,
    },
    CatalogueItem {
        name: "Medium",
        category: "Entertainment",
        avatar_url: "https://dsc.cloud/88160a/Medium-Avatar.png",
        price_minor: 500,
    },
    CatalogueItem {
        name: "Netflix",
        category: "Entertainment",
        avatar_url: "https://dsc.cloud/88160a/Netflix-Avatar.png",
        price_minor: 1299,
    },
    CatalogueItem {
        name: "DigitalOcean",
        category: "Developer tools",
        avatar_url: "https://dsc.cloud/88160a/Zapier-Avatar.png",
        price_minor: 1599,
    },
];

/// Earliest start date handed to demo subscriptions.
fn catalogue_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2023, 2, 1)
}

/// Uniform date in `[start, end]`. Returns `start` when the range is empty.
pub fn random_date_between<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDate,
    end: NaiveDate,
) -> NaiveDate {
    if end <= start {
        return start;
    }
    let span = (end - start).num_days() as u64;
    start
        .checked_add_days(Days::new(rng.gen_range(0..=span)))
        .unwrap_or(end)
}

/// Uniform date within the calendar month containing `within`.
pub fn random_date_in_month<R: Rng + ?Sized>(
    rng: &mut R,
    within: NaiveDate,
) -> Result<NaiveDate, BillingError> {
    let first = within.with_day(1).ok_or_else(|| {
        BillingError::InvalidDate(format!("{within} has no first day of month"))
    })?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next_month| next_month.pred_opt())
        .ok_or_else(|| BillingError::InvalidDate(format!("{within} has no end of month")))?;

    Ok(random_date_between(rng, first, last))
}

pub struct SeedUseCase<U, S, P, B>
where
    U: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    app_user_repo: Arc<U>,
    billing_cycle_usecase: Arc<BillingCycleUseCase<S, P, B>>,
}

impl<U, S, P, B> SeedUseCase<U, S, P, B>
where
    U: AppUserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    pub fn new(app_user_repo: Arc<U>, billing_cycle_usecase: Arc<BillingCycleUseCase<S, P, B>>) -> Self {
        Self {
            app_user_repo,
            billing_cycle_usecase,
        }
    }

    /// Upserts the demo user, creates the demo catalogue for them and records
    /// one payment per subscription at a random date in `now`'s month.
    pub async fn run<R: Rng + Send + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> UseCaseResult<Vec<CycleEvaluation>> {
        let today = now.date_naive();
        let epoch = catalogue_epoch().context("catalogue epoch is not a valid date")?;

        let user_id = self
            .app_user_repo
            .upsert_by_email(InsertAppUserEntity {
                email: DEMO_USER_EMAIL.to_string(),
                name: Some(DEMO_USER_NAME.to_string()),
            })
            .await
            .context("failed to upsert demo user")?;
        info!(%user_id, "seed: demo user ready");

        let mut evaluations = Vec::with_capacity(DEMO_CATALOGUE.len());
        for item in &DEMO_CATALOGUE {
            let start_date = random_date_between(rng, epoch, today);
            let due_date = random_date_in_month(rng, today)?;

            let subscription_id = self
                .billing_cycle_usecase
                .create_subscription(
                    user_id,
                    InsertSubscriptionModel {
                        name: item.name.to_string(),
                        category: item.category.to_string(),
                        avatar_url: Some(item.avatar_url.to_string()),
                        price_minor: item.price_minor,
                        currency: SubscriptionCurrency::Gbp.to_string(),
                        billing_period: BillingPeriod::Monthly.to_string(),
                        start_date: Some(start_date.format(BILLING_DATE_FORMAT).to_string()),
                        next_payment_date: Some(today.format(BILLING_DATE_FORMAT).to_string()),
                    },
                )
                .await?;

            let evaluation = self
                .billing_cycle_usecase
                .evaluate_due_date(subscription_id, due_date, now)
                .await?;
            info!(
                %subscription_id,
                name = item.name,
                %due_date,
                status = %evaluation.status,
                next_payment_date = %evaluation.next_payment_date,
                "seed: demo subscription billed"
            );
            evaluations.push(evaluation);
        }

        Ok(evaluations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
        repositories::{
            app_users::MockAppUserRepository, billing_cycles::MockBillingCycleRepository,
            payments::MockPaymentRepository, subscriptions::MockSubscriptionRepository,
        },
        value_objects::{
            billing_cycles::{CycleAction, CycleWrite},
            enums::payment_statuses::PaymentStatus,
        },
    };
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};
    use std::{
        collections::HashMap,
        sync::Mutex,
    };
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn random_dates_stay_inside_the_month() {
        let mut rng = StdRng::seed_from_u64(7);
        for within in [date(2024, 2, 10), date(2023, 2, 28), date(2024, 12, 31)] {
            for _ in 0..500 {
                let picked = random_date_in_month(&mut rng, within).unwrap();
                assert_eq!((picked.year(), picked.month()), (within.year(), within.month()));
            }
        }
    }

    #[test]
    fn random_dates_reach_both_month_edges() {
        let mut rng = StdRng::seed_from_u64(11);
        let picked: Vec<_> = (0..2_000)
            .map(|_| random_date_in_month(&mut rng, date(2024, 2, 15)).unwrap())
            .collect();

        assert!(picked.contains(&date(2024, 2, 1)));
        assert!(picked.contains(&date(2024, 2, 29)));
    }

    #[test]
    fn random_date_between_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = date(2023, 2, 1);
        let end = date(2024, 6, 1);
        for _ in 0..500 {
            let picked = random_date_between(&mut rng, start, end);
            assert!(picked >= start && picked <= end);
        }
        assert_eq!(random_date_between(&mut rng, end, start), end);
    }

    #[tokio::test]
    async fn seeds_demo_catalogue_and_bills_each_subscription() {
        let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
        let today = now.date_naive();
        let user_id = Uuid::new_v4();
        let created: Arc<Mutex<HashMap<Uuid, InsertSubscriptionEntity>>> = Arc::default();

        let mut app_user_repo = MockAppUserRepository::new();
        app_user_repo
            .expect_upsert_by_email()
            .withf(|user: &InsertAppUserEntity| user.email == DEMO_USER_EMAIL)
            .times(1)
            .returning(move |_| Box::pin(async move { Ok(user_id) }));

        let mut subscription_repo = MockSubscriptionRepository::new();
        let store = Arc::clone(&created);
        subscription_repo
            .expect_create_subscription()
            .times(5)
            .returning(move |entity| {
                let id = Uuid::new_v4();
                store.lock().unwrap().insert(id, entity);
                Box::pin(async move { Ok(id) })
            });
        let store = Arc::clone(&created);
        subscription_repo.expect_find_by_id().returning(move |id| {
            let entity = store.lock().unwrap().get(&id).cloned().map(|insert| SubscriptionEntity {
                id,
                user_id: insert.user_id,
                name: insert.name,
                category: insert.category,
                avatar_url: insert.avatar_url,
                price_minor: insert.price_minor,
                currency: insert.currency,
                billing_period: insert.billing_period,
                start_date: insert.start_date,
                next_payment_date: insert.next_payment_date,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
            Box::pin(async move { Ok(entity) })
        });

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_by_due_date()
            .returning(|_, _| Box::pin(async { Ok(None) }));

        let mut billing_cycle_repo = MockBillingCycleRepository::new();
        billing_cycle_repo
            .expect_record_cycle()
            .withf(move |write: &CycleWrite| write.expected_next_payment_date == today)
            .times(5)
            .returning(|_| Box::pin(async { Ok(Some(Uuid::new_v4())) }));

        let billing_cycle_usecase = Arc::new(BillingCycleUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(payment_repo),
            Arc::new(billing_cycle_repo),
        ));
        let seed = SeedUseCase::new(Arc::new(app_user_repo), billing_cycle_usecase);

        let mut rng = StdRng::seed_from_u64(42);
        let evaluations = seed.run(now, &mut rng).await.unwrap();

        assert_eq!(evaluations.len(), 5);
        for evaluation in &evaluations {
            assert_eq!(evaluation.action, CycleAction::Created);
            assert_eq!(evaluation.due_date.month(), 5);
            match evaluation.status {
                PaymentStatus::Paid => assert_eq!(evaluation.next_payment_date.month(), 6),
                PaymentStatus::NotPaid => {
                    assert_eq!(evaluation.next_payment_date, evaluation.due_date)
                }
            }
        }

        let created = created.lock().unwrap();
        let mut prices: Vec<_> = created.values().map(|entity| entity.price_minor).collect();
        prices.sort_unstable();
        assert_eq!(prices, vec![500, 520, 899, 1299, 1599]);
        assert!(created.values().all(|entity| {
            entity.currency == "GBP"
                && entity.billing_period == "MONTHLY"
                && entity.start_date >= date(2023, 2, 1)
                && entity.start_date <= today
        }));
    }
}
