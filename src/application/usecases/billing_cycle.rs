use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    billing::{
        cycle_state::BillingCycleState,
        dates::{parse_billing_date, require_date},
        engine,
        errors::BillingError,
    },
    entities::subscriptions::InsertSubscriptionEntity,
    repositories::{
        billing_cycles::BillingCycleRepository, payments::PaymentRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        billing_cycles::{
            BillingRunSummary, CycleAction, CycleEvaluation, CycleWrite, ScheduleAdvance,
            SettlementWrite,
        },
        enums::{
            billing_periods::BillingPeriod, currencies::SubscriptionCurrency,
            payment_statuses::PaymentStatus,
        },
        payments::PaymentModel,
        subscriptions::{InsertSubscriptionModel, SubscriptionModel, positive_price},
    },
};

#[derive(Debug, Error)]
pub enum BillingCycleError {
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(Uuid),
    #[error("payment not found: {0}")]
    PaymentNotFound(Uuid),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type UseCaseResult<T> = std::result::Result<T, BillingCycleError>;

pub struct BillingCycleUseCase<S, P, B>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    payment_repo: Arc<P>,
    billing_cycle_repo: Arc<B>,
}

impl<S, P, B> BillingCycleUseCase<S, P, B>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    B: BillingCycleRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, payment_repo: Arc<P>, billing_cycle_repo: Arc<B>) -> Self {
        Self {
            subscription_repo,
            payment_repo,
            billing_cycle_repo,
        }
    }

    pub async fn create_subscription(
        &self,
        user_id: Uuid,
        insert_subscription_model: InsertSubscriptionModel,
    ) -> UseCaseResult<Uuid> {
        info!(%user_id, "billing_cycle: create subscription requested");

        let insert_subscription_entity =
            Self::validate_subscription(user_id, insert_subscription_model).map_err(|err| {
                warn!(%user_id, error = %err, "billing_cycle: invalid subscription input");
                err
            })?;

        let subscription_id = self
            .subscription_repo
            .create_subscription(insert_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "billing_cycle: failed to create subscription"
                );
                BillingCycleError::Internal(err)
            })?;

        info!(%user_id, %subscription_id, "billing_cycle: subscription created");
        Ok(subscription_id)
    }

    pub async fn list_subscriptions(&self, user_id: Uuid) -> UseCaseResult<Vec<SubscriptionModel>> {
        let subscriptions = self
            .subscription_repo
            .list_by_user(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "billing_cycle: failed to list subscriptions");
                BillingCycleError::Internal(err)
            })?;

        Ok(subscriptions
            .into_iter()
            .map(SubscriptionModel::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// Evaluates the subscription's current `next_payment_date`.
    pub async fn evaluate_subscription(
        &self,
        subscription_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription = self.load_subscription(subscription_id).await?;
        let due_date = subscription.next_payment_date;
        self.evaluate(&subscription, due_date, now).await
    }

    pub async fn evaluate_due_date(
        &self,
        subscription_id: Uuid,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription = self.load_subscription(subscription_id).await?;
        self.evaluate(&subscription, due_date, now).await
    }

    /// Evaluates every subscription due on or before `now`'s date. One failing
    /// subscription does not stop the batch.
    pub async fn evaluate_due_subscriptions(
        &self,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> UseCaseResult<BillingRunSummary> {
        let due_on = now.date_naive();
        let due_subscriptions = self
            .subscription_repo
            .list_due_subscriptions(due_on, batch_size)
            .await
            .map_err(|err| {
                error!(%due_on, db_error = ?err, "billing_cycle: failed to list due subscriptions");
                BillingCycleError::Internal(err)
            })?;

        debug!(
            %due_on,
            due_count = due_subscriptions.len(),
            "billing_cycle: due subscriptions loaded"
        );

        let mut summary = BillingRunSummary::default();
        for entity in due_subscriptions {
            let subscription_id = entity.id;
            let result = match SubscriptionModel::try_from(entity) {
                Ok(subscription) => {
                    let due_date = subscription.next_payment_date;
                    self.evaluate(&subscription, due_date, now).await
                }
                Err(err) => Err(err.into()),
            };

            match result {
                Ok(evaluation) => summary.record(&evaluation),
                Err(err) => {
                    error!(
                        %subscription_id,
                        error = %err,
                        "billing_cycle: failed to evaluate due subscription"
                    );
                    summary.record_failure();
                }
            }
        }

        Ok(summary)
    }

    /// Marks an outstanding payment as paid and advances the subscription when
    /// its schedule still points at that payment's due date.
    pub async fn settle_payment(&self, payment_id: Uuid) -> UseCaseResult<CycleEvaluation> {
        info!(%payment_id, "billing_cycle: settlement requested");

        let payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "billing_cycle: failed to load payment");
                BillingCycleError::Internal(err)
            })?
            .ok_or(BillingCycleError::PaymentNotFound(payment_id))?;
        let payment = PaymentModel::try_from(payment)?;

        let subscription = self.load_subscription(payment.subscription_id).await?;
        let decision = engine::settle(payment.due_date, subscription.billing_period, payment.status)
            .map_err(|err| {
                warn!(%payment_id, error = %err, "billing_cycle: payment cannot be settled");
                err
            })?;

        let settled = self
            .billing_cycle_repo
            .settle_cycle(SettlementWrite {
                payment_id,
                subscription_id: subscription.id,
                due_date: payment.due_date,
                next_payment_date: decision.next_payment_date,
            })
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "billing_cycle: failed to settle payment");
                BillingCycleError::Internal(err)
            })?;

        if !settled {
            warn!(%payment_id, "billing_cycle: payment was settled concurrently");
            return Err(BillingError::AlreadySettled.into());
        }

        let next_payment_date = if subscription.next_payment_date == payment.due_date {
            decision.next_payment_date
        } else {
            subscription.next_payment_date
        };

        info!(
            %payment_id,
            subscription_id = %subscription.id,
            %next_payment_date,
            "billing_cycle: payment settled"
        );

        Ok(CycleEvaluation {
            subscription_id: subscription.id,
            payment_id: Some(payment_id),
            due_date: payment.due_date,
            status: decision.status,
            next_payment_date,
            state: decision.state,
            action: CycleAction::Settled,
        })
    }

    pub async fn list_payments(&self, subscription_id: Uuid) -> UseCaseResult<Vec<PaymentModel>> {
        let payments = self
            .payment_repo
            .list_by_subscription(subscription_id)
            .await
            .map_err(|err| {
                error!(%subscription_id, db_error = ?err, "billing_cycle: failed to list payments");
                BillingCycleError::Internal(err)
            })?;

        Ok(payments
            .into_iter()
            .map(PaymentModel::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?)
    }

    async fn load_subscription(&self, subscription_id: Uuid) -> UseCaseResult<SubscriptionModel> {
        let entity = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    db_error = ?err,
                    "billing_cycle: failed to load subscription"
                );
                BillingCycleError::Internal(err)
            })?
            .ok_or(BillingCycleError::SubscriptionNotFound(subscription_id))?;

        SubscriptionModel::try_from(entity).map_err(|err| {
            error!(
                %subscription_id,
                error = %err,
                "billing_cycle: stored subscription is invalid"
            );
            err.into()
        })
    }

    async fn evaluate(
        &self,
        subscription: &SubscriptionModel,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription_id = subscription.id;
        let decision = engine::evaluate_cycle(due_date, subscription.billing_period, now.naive_utc())?;

        debug!(
            %subscription_id,
            %due_date,
            status = %decision.status,
            next_payment_date = %decision.next_payment_date,
            "billing_cycle: due date evaluated"
        );

        let existing = self
            .payment_repo
            .find_by_due_date(subscription_id, due_date)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    %due_date,
                    db_error = ?err,
                    "billing_cycle: failed to look up payment for due date"
                );
                BillingCycleError::Internal(err)
            })?;

        let Some(existing) = existing else {
            return self.record(subscription, due_date, decision).await;
        };
        let existing = PaymentModel::try_from(existing)?;

        if existing.status == PaymentStatus::NotPaid && decision.status == PaymentStatus::Paid {
            return self.settle_existing(subscription, existing).await;
        }

        if existing.status == PaymentStatus::Paid && due_date == subscription.next_payment_date {
            return self.advance_paid(subscription, existing).await;
        }

        debug!(
            %subscription_id,
            %due_date,
            payment_id = %existing.id,
            status = %existing.status,
            "billing_cycle: due date already recorded"
        );

        Ok(CycleEvaluation {
            subscription_id,
            payment_id: Some(existing.id),
            due_date,
            status: existing.status,
            next_payment_date: subscription.next_payment_date,
            state: BillingCycleState::for_status(existing.status),
            action: CycleAction::Unchanged,
        })
    }

    async fn record(
        &self,
        subscription: &SubscriptionModel,
        due_date: NaiveDate,
        decision: engine::CycleDecision,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription_id = subscription.id;
        // An old due date must not pull the schedule back.
        let next_payment_date = decision.next_payment_date.max(subscription.next_payment_date);
        let payment_id = self
            .billing_cycle_repo
            .record_cycle(CycleWrite {
                subscription_id,
                expected_next_payment_date: subscription.next_payment_date,
                due_date,
                amount_minor: subscription.price_minor,
                status: decision.status,
                next_payment_date,
            })
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    %due_date,
                    db_error = ?err,
                    "billing_cycle: failed to record billing cycle"
                );
                BillingCycleError::Internal(err)
            })?;

        let action = match payment_id {
            Some(payment_id) => {
                info!(
                    %subscription_id,
                    %payment_id,
                    %due_date,
                    status = %decision.status,
                    %next_payment_date,
                    "billing_cycle: payment recorded"
                );
                CycleAction::Created
            }
            None => {
                warn!(
                    %subscription_id,
                    %due_date,
                    "billing_cycle: schedule or payment changed during evaluation, skipping"
                );
                CycleAction::Stale
            }
        };

        Ok(CycleEvaluation {
            subscription_id,
            payment_id,
            due_date,
            status: decision.status,
            next_payment_date,
            state: decision.state,
            action,
        })
    }

    async fn settle_existing(
        &self,
        subscription: &SubscriptionModel,
        payment: PaymentModel,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription_id = subscription.id;
        let decision = engine::settle(payment.due_date, subscription.billing_period, payment.status)?;

        let settled = self
            .billing_cycle_repo
            .settle_cycle(SettlementWrite {
                payment_id: payment.id,
                subscription_id,
                due_date: payment.due_date,
                next_payment_date: decision.next_payment_date,
            })
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    payment_id = %payment.id,
                    db_error = ?err,
                    "billing_cycle: failed to settle outstanding payment"
                );
                BillingCycleError::Internal(err)
            })?;

        if !settled {
            warn!(
                %subscription_id,
                payment_id = %payment.id,
                "billing_cycle: outstanding payment changed during evaluation, skipping"
            );
            return Ok(CycleEvaluation {
                subscription_id,
                payment_id: Some(payment.id),
                due_date: payment.due_date,
                status: payment.status,
                next_payment_date: subscription.next_payment_date,
                state: BillingCycleState::for_status(payment.status),
                action: CycleAction::Stale,
            });
        }

        info!(
            %subscription_id,
            payment_id = %payment.id,
            next_payment_date = %decision.next_payment_date,
            "billing_cycle: outstanding payment settled"
        );

        let next_payment_date = if subscription.next_payment_date == payment.due_date {
            decision.next_payment_date
        } else {
            subscription.next_payment_date
        };

        Ok(CycleEvaluation {
            subscription_id,
            payment_id: Some(payment.id),
            due_date: payment.due_date,
            status: decision.status,
            next_payment_date,
            state: decision.state,
            action: CycleAction::Settled,
        })
    }

    /// The current due date is already paid but the schedule still points at
    /// it; move the schedule on without touching the payment.
    async fn advance_paid(
        &self,
        subscription: &SubscriptionModel,
        payment: PaymentModel,
    ) -> UseCaseResult<CycleEvaluation> {
        let subscription_id = subscription.id;
        let next_payment_date = engine::advance_next_payment_date(
            payment.due_date,
            subscription.billing_period,
            PaymentStatus::Paid,
        )?;

        let advanced = self
            .billing_cycle_repo
            .advance_schedule(ScheduleAdvance {
                subscription_id,
                expected_next_payment_date: subscription.next_payment_date,
                next_payment_date,
            })
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    payment_id = %payment.id,
                    db_error = ?err,
                    "billing_cycle: failed to advance schedule past paid payment"
                );
                BillingCycleError::Internal(err)
            })?;

        let (action, next_payment_date) = if advanced {
            info!(
                %subscription_id,
                payment_id = %payment.id,
                %next_payment_date,
                "billing_cycle: schedule advanced past paid payment"
            );
            (CycleAction::Advanced, next_payment_date)
        } else {
            warn!(
                %subscription_id,
                payment_id = %payment.id,
                "billing_cycle: schedule changed during evaluation, skipping"
            );
            (CycleAction::Stale, subscription.next_payment_date)
        };

        Ok(CycleEvaluation {
            subscription_id,
            payment_id: Some(payment.id),
            due_date: payment.due_date,
            status: PaymentStatus::Paid,
            next_payment_date,
            state: BillingCycleState::Settled,
            action,
        })
    }

    fn validate_subscription(
        user_id: Uuid,
        model: InsertSubscriptionModel,
    ) -> UseCaseResult<InsertSubscriptionEntity> {
        let name = model.name.trim().to_string();
        if name.is_empty() {
            return Err(BillingCycleError::InvalidInput("name is required".to_string()));
        }
        let category = model.category.trim().to_string();
        if category.is_empty() {
            return Err(BillingCycleError::InvalidInput("category is required".to_string()));
        }

        let price_minor = positive_price(model.price_minor)?;
        let currency = SubscriptionCurrency::try_from(model.currency.as_str())?;
        let billing_period = BillingPeriod::try_from(model.billing_period.as_str())?;

        let start_date = require_date(
            model.start_date.as_deref().map(parse_billing_date).transpose()?,
            "start_date",
        )?;
        let next_payment_date = require_date(
            model
                .next_payment_date
                .as_deref()
                .map(parse_billing_date)
                .transpose()?,
            "next_payment_date",
        )?;
        if next_payment_date < start_date {
            return Err(BillingError::InvalidDate(format!(
                "next_payment_date {next_payment_date} is before start_date {start_date}"
            ))
            .into());
        }

        Ok(InsertSubscriptionEntity {
            user_id,
            name,
            category,
            avatar_url: model.avatar_url.filter(|url| !url.trim().is_empty()),
            price_minor,
            currency: currency.to_string(),
            billing_period: billing_period.to_string(),
            start_date,
            next_payment_date,
        })
    }
}
