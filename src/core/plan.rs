//! Financial plan business logic.
//!
//! Handles plan creation and update for a mentor, including the material
//! change detection that decides whether the reminder schedule must be
//! rebuilt. Creating a plan immediately populates its initial reminder batch;
//! a failure in that batch is logged and does not fail the creation, since the
//! plan itself is the primary record.

use crate::{
    clock::Clock,
    core::{reminder, schedule},
    entities::{
        BillingFrequency, FinancialPlan, PaymentModality, PaymentType, PlanStatus, financial_plan,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::warn;

/// Payload for [`create_plan`].
#[derive(Debug, Clone)]
pub struct CreatePlanPayload {
    /// Mentorship the plan bills for
    pub mentorship_id: i64,
    /// Mentee user ID
    pub mentee_id: String,
    /// Payment instrument
    pub payment_type: PaymentType,
    /// Lump sum or installments
    pub payment_modality: PaymentModality,
    /// Total value of the plan
    pub total_amount: Decimal,
    /// Number of installments, at least 1
    pub installments: i32,
    /// Step between billing dates
    pub billing_frequency: BillingFrequency,
    /// Step in days, required when the frequency is CUSTOM
    pub custom_frequency_days: Option<i32>,
    /// First billing day
    pub start_date: NaiveDate,
    /// Day the plan stops billing
    pub expiration_date: NaiveDate,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Payload for [`update_plan`]. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlanPayload {
    /// New payment instrument
    pub payment_type: Option<PaymentType>,
    /// New modality
    pub payment_modality: Option<PaymentModality>,
    /// New total value
    pub total_amount: Option<Decimal>,
    /// New installment count
    pub installments: Option<i32>,
    /// New billing frequency
    pub billing_frequency: Option<BillingFrequency>,
    /// New custom step in days
    pub custom_frequency_days: Option<i32>,
    /// New expiration day
    pub expiration_date: Option<NaiveDate>,
    /// New status
    pub status: Option<PlanStatus>,
    /// New notes
    pub notes: Option<String>,
}

/// Filters accepted by [`list_plans`].
#[derive(Debug, Clone, Default)]
pub struct PlanFilters {
    /// Restrict to these statuses
    pub status: Option<Vec<PlanStatus>>,
    /// Expiration on or before this day
    pub expiring_before: Option<NaiveDate>,
    /// Expiration on or after this day
    pub expiring_after: Option<NaiveDate>,
    /// Next billing on or before this day
    pub billing_due_before: Option<NaiveDate>,
}

fn validate_create(payload: &CreatePlanPayload) -> Result<()> {
    if payload.installments < 1 {
        return Err(Error::Validation {
            message: format!("installments must be at least 1, got {}", payload.installments),
        });
    }
    if payload.total_amount <= Decimal::ZERO {
        return Err(Error::Validation {
            message: format!("total amount must be positive, got {}", payload.total_amount),
        });
    }
    if payload.expiration_date <= payload.start_date {
        return Err(Error::Validation {
            message: "expiration date must be after the start date".to_string(),
        });
    }
    if payload.billing_frequency == BillingFrequency::Custom
        && !payload.custom_frequency_days.is_some_and(|days| days > 0)
    {
        return Err(Error::Validation {
            message: "custom billing frequency requires a positive day count".to_string(),
        });
    }
    Ok(())
}

/// Creates a financial plan and populates its initial reminder batch.
///
/// The installment amount is `total / installments` rounded to two decimal
/// places, and the first `next_billing_date` is one billing period after the
/// start date. The reminder batch runs from the start date through the
/// expiration date inside the same transaction; if it fails it is logged and
/// the plan is still created.
pub async fn create_plan(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
    payload: CreatePlanPayload,
) -> Result<financial_plan::Model> {
    validate_create(&payload)?;

    let installment_amount =
        (payload.total_amount / Decimal::from(payload.installments)).round_dp(2);
    let next_billing_date = schedule::next_due_date(
        payload.start_date,
        payload.billing_frequency,
        payload.custom_frequency_days,
    );
    let now = clock.now();

    let txn = db.begin().await?;

    let plan = financial_plan::ActiveModel {
        mentorship_id: Set(payload.mentorship_id),
        mentee_id: Set(payload.mentee_id),
        mentor_id: Set(mentor_id.to_string()),
        payment_type: Set(payload.payment_type),
        payment_modality: Set(payload.payment_modality),
        total_amount: Set(payload.total_amount),
        installments: Set(payload.installments),
        installment_amount: Set(installment_amount),
        billing_frequency: Set(payload.billing_frequency),
        custom_frequency_days: Set(payload.custom_frequency_days),
        start_date: Set(payload.start_date),
        expiration_date: Set(payload.expiration_date),
        next_billing_date: Set(Some(next_billing_date)),
        last_payment_date: Set(None),
        status: Set(PlanStatus::Active),
        notes: Set(payload.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Err(error) =
        reminder::generate_reminders(&txn, clock, &plan, plan.start_date, 1).await
    {
        warn!(plan_id = plan.id, %error, "initial reminder batch failed; plan created without reminders");
    }

    txn.commit().await?;
    Ok(plan)
}

/// Updates a plan owned by the mentor.
///
/// A material change to any of the billing terms (total amount, installment
/// count, frequency, custom step) triggers regeneration of the unsettled
/// reminder schedule. The installment amount is recomputed whenever the total
/// or the installment count changes. A regeneration failure is logged without
/// failing the update.
pub async fn update_plan(
    db: &DatabaseConnection,
    clock: &Clock,
    plan_id: i64,
    mentor_id: &str,
    payload: UpdatePlanPayload,
) -> Result<financial_plan::Model> {
    if payload.installments.is_some_and(|n| n < 1) {
        return Err(Error::Validation {
            message: "installments must be at least 1".to_string(),
        });
    }
    if payload.total_amount.is_some_and(|t| t <= Decimal::ZERO) {
        return Err(Error::Validation {
            message: "total amount must be positive".to_string(),
        });
    }

    let txn = db.begin().await?;

    let current = FinancialPlan::find_by_id(plan_id)
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "financial plan",
        })?;

    let frequency = payload.billing_frequency.unwrap_or(current.billing_frequency);
    let custom_days = payload.custom_frequency_days.or(current.custom_frequency_days);
    if frequency == BillingFrequency::Custom && !custom_days.is_some_and(|days| days > 0) {
        return Err(Error::Validation {
            message: "custom billing frequency requires a positive day count".to_string(),
        });
    }

    let material = payload
        .total_amount
        .is_some_and(|total| total != current.total_amount)
        || payload
            .installments
            .is_some_and(|count| count != current.installments)
        || payload
            .billing_frequency
            .is_some_and(|frequency| frequency != current.billing_frequency)
        || payload
            .custom_frequency_days
            .is_some_and(|days| Some(days) != current.custom_frequency_days);

    let mut active: financial_plan::ActiveModel = current.clone().into();
    if let Some(payment_type) = payload.payment_type {
        active.payment_type = Set(payment_type);
    }
    if let Some(payment_modality) = payload.payment_modality {
        active.payment_modality = Set(payment_modality);
    }
    if let Some(total_amount) = payload.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(installments) = payload.installments {
        active.installments = Set(installments);
    }
    if let Some(billing_frequency) = payload.billing_frequency {
        active.billing_frequency = Set(billing_frequency);
    }
    if let Some(custom_frequency_days) = payload.custom_frequency_days {
        active.custom_frequency_days = Set(Some(custom_frequency_days));
    }
    if let Some(expiration_date) = payload.expiration_date {
        active.expiration_date = Set(expiration_date);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }

    if payload.total_amount.is_some() || payload.installments.is_some() {
        let total = payload.total_amount.unwrap_or(current.total_amount);
        let installments = payload.installments.unwrap_or(current.installments);
        active.installment_amount = Set((total / Decimal::from(installments)).round_dp(2));
    }

    active.updated_at = Set(clock.now());
    let updated = active.update(&txn).await?;

    if material {
        if let Err(error) = reminder::regenerate_pending(&txn, clock, &updated).await {
            warn!(plan_id = updated.id, %error, "reminder regeneration failed after plan update");
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Finds the plan billing a mentorship, if any.
pub async fn plan_by_mentorship(
    db: &DatabaseConnection,
    mentorship_id: i64,
) -> Result<Option<financial_plan::Model>> {
    FinancialPlan::find()
        .filter(financial_plan::Column::MentorshipId.eq(mentorship_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists a mentor's plans with optional filters, ordered by expiration date
/// ascending. Returns the matching rows and their count.
pub async fn list_plans(
    db: &DatabaseConnection,
    mentor_id: &str,
    filters: &PlanFilters,
) -> Result<(Vec<financial_plan::Model>, u64)> {
    let mut query = FinancialPlan::find()
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .order_by_asc(financial_plan::Column::ExpirationDate);

    if let Some(ref statuses) = filters.status {
        query = query.filter(financial_plan::Column::Status.is_in(statuses.iter().copied()));
    }
    if let Some(before) = filters.expiring_before {
        query = query.filter(financial_plan::Column::ExpirationDate.lte(before));
    }
    if let Some(after) = filters.expiring_after {
        query = query.filter(financial_plan::Column::ExpirationDate.gte(after));
    }
    if let Some(before) = filters.billing_due_before {
        query = query.filter(financial_plan::Column::NextBillingDate.lte(before));
    }

    let plans = query.all(db).await?;
    let total = plans.len() as u64;
    Ok((plans, total))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::reminder::reminders_by_mentorship;
    use crate::entities::{BillingReminder, ReminderStatus, billing_reminder};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_plan_computes_derived_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let mentorship = create_test_mentorship(&db).await?;

        let plan =
            create_plan(&db, &test_clock(), MENTOR, plan_payload(mentorship.id)).await?;

        assert_eq!(plan.installment_amount, Decimal::from(100));
        assert_eq!(plan.next_billing_date, Some(date(2024, 2, 1)));
        assert_eq!(plan.last_payment_date, None);
        assert_eq!(plan.status, PlanStatus::Active);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_plan_generates_initial_reminders() -> Result<()> {
        let db = setup_test_db().await?;
        let mentorship = create_test_mentorship(&db).await?;

        let plan =
            create_plan(&db, &test_clock(), MENTOR, plan_payload(mentorship.id)).await?;

        // 1200 over 12 monthly installments across 2024: one per month, on the 1st
        let reminders = reminders_by_mentorship(&db, mentorship.id, MENTOR).await?;
        assert_eq!(reminders.len(), 12);
        for (index, reminder) in reminders.iter().enumerate() {
            let month = u32::try_from(index).unwrap() + 1;
            assert_eq!(reminder.due_date, date(2024, month, 1));
            assert_eq!(reminder.amount, Decimal::from(100));
            assert_eq!(reminder.installment_number, Some(i32::try_from(index).unwrap() + 1));
            assert_eq!(reminder.total_installments, Some(12));
            assert_eq!(reminder.status, ReminderStatus::Pending);
            assert_eq!(reminder.plan_id, plan.id);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_create_single_installment_plan() -> Result<()> {
        let db = setup_test_db().await?;
        let mentorship = create_test_mentorship(&db).await?;

        let mut payload = plan_payload(mentorship.id);
        payload.installments = 1;
        payload.payment_modality = PaymentModality::Cash;
        let plan = create_plan(&db, &test_clock(), MENTOR, payload).await?;

        assert_eq!(plan.installment_amount, plan.total_amount);

        let reminders = reminders_by_mentorship(&db, mentorship.id, MENTOR).await?;
        assert_eq!(reminders.len(), 12);
        for reminder in &reminders {
            assert_eq!(reminder.installment_number, None);
            assert_eq!(reminder.total_installments, None);
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_create_plan_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let mentorship = create_test_mentorship(&db).await?;
        let clock = test_clock();

        let mut payload = plan_payload(mentorship.id);
        payload.installments = 0;
        assert!(matches!(
            create_plan(&db, &clock, MENTOR, payload).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let mut payload = plan_payload(mentorship.id);
        payload.total_amount = Decimal::ZERO;
        assert!(matches!(
            create_plan(&db, &clock, MENTOR, payload).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let mut payload = plan_payload(mentorship.id);
        payload.expiration_date = payload.start_date;
        assert!(matches!(
            create_plan(&db, &clock, MENTOR, payload).await.unwrap_err(),
            Error::Validation { .. }
        ));

        let mut payload = plan_payload(mentorship.id);
        payload.billing_frequency = BillingFrequency::Custom;
        payload.custom_frequency_days = None;
        assert!(matches!(
            create_plan(&db, &clock, MENTOR, payload).await.unwrap_err(),
            Error::Validation { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_plan_not_found_for_other_mentor() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;

        let result = update_plan(
            &db,
            &test_clock(),
            plan.id,
            "other_mentor",
            UpdatePlanPayload::default(),
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                entity: "financial plan"
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_material_change_keeps_reminders() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;

        let updated = update_plan(
            &db,
            &test_clock(),
            plan.id,
            MENTOR,
            UpdatePlanPayload {
                notes: Some("renegotiated contact date".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.notes.as_deref(), Some("renegotiated contact date"));

        let reminders = reminders_by_mentorship(&db, plan.mentorship_id, MENTOR).await?;
        assert_eq!(reminders.len(), 12);
        assert_eq!(reminders[0].due_date, date(2024, 1, 1));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_material_change_regenerates_and_preserves_paid() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        let clock = test_clock(); // 2024-06-15

        let reminders = reminders_by_mentorship(&db, plan.mentorship_id, MENTOR).await?;
        set_reminder_status(&db, reminders[0].id, ReminderStatus::Paid).await?;

        let updated = update_plan(
            &db,
            &clock,
            plan.id,
            MENTOR,
            UpdatePlanPayload {
                total_amount: Some(Decimal::from(2400)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.installment_amount, Decimal::from(200));

        let paid = BillingReminder::find()
            .filter(billing_reminder::Column::PlanId.eq(plan.id))
            .filter(billing_reminder::Column::Status.eq(ReminderStatus::Paid))
            .count(&db)
            .await?;
        assert_eq!(paid, 1);

        let pending = reminders_by_mentorship(&db, plan.mentorship_id, MENTOR)
            .await?
            .into_iter()
            .filter(|r| r.status == ReminderStatus::Pending)
            .collect::<Vec<_>>();
        // Monthly from Jun 15 through Dec 31, numbering resumed after the paid one
        assert_eq!(pending.len(), 7);
        assert_eq!(pending[0].due_date, date(2024, 6, 15));
        assert_eq!(pending[0].installment_number, Some(2));
        assert_eq!(pending[0].amount, Decimal::from(200));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_installment_amount_recomputed_on_count_change() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;

        let updated = update_plan(
            &db,
            &test_clock(),
            plan.id,
            MENTOR,
            UpdatePlanPayload {
                installments: Some(6),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.installments, 6);
        assert_eq!(updated.installment_amount, Decimal::from(200));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_to_custom_frequency_requires_days() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;

        let result = update_plan(
            &db,
            &test_clock(),
            plan.id,
            MENTOR,
            UpdatePlanPayload {
                billing_frequency: Some(BillingFrequency::Custom),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let updated = update_plan(
            &db,
            &test_clock(),
            plan.id,
            MENTOR,
            UpdatePlanPayload {
                billing_frequency: Some(BillingFrequency::Custom),
                custom_frequency_days: Some(15),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.custom_frequency_days, Some(15));

        Ok(())
    }

    #[tokio::test]
    async fn test_plan_by_mentorship() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;

        let found = plan_by_mentorship(&db, plan.mentorship_id).await?;
        assert_eq!(found.map(|p| p.id), Some(plan.id));

        let missing = plan_by_mentorship(&db, 9999).await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_plans_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();

        let mentorship_a = create_test_mentorship(&db).await?;
        let mut payload = plan_payload(mentorship_a.id);
        payload.expiration_date = date(2024, 7, 1);
        let plan_a = create_plan(&db, &clock, MENTOR, payload).await?;

        let mentorship_b = create_test_mentorship(&db).await?;
        let plan_b = create_plan(&db, &clock, MENTOR, plan_payload(mentorship_b.id)).await?;

        update_plan(
            &db,
            &clock,
            plan_b.id,
            MENTOR,
            UpdatePlanPayload {
                status: Some(PlanStatus::Suspended),
                ..Default::default()
            },
        )
        .await?;

        let (all, total) = list_plans(&db, MENTOR, &PlanFilters::default()).await?;
        assert_eq!(total, 2);
        // Ordered by expiration ascending
        assert_eq!(all[0].id, plan_a.id);

        let (active, _) = list_plans(
            &db,
            MENTOR,
            &PlanFilters {
                status: Some(vec![PlanStatus::Active]),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, plan_a.id);

        let (expiring_soon, _) = list_plans(
            &db,
            MENTOR,
            &PlanFilters {
                expiring_before: Some(date(2024, 8, 1)),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(expiring_soon.len(), 1);

        let (none, _) = list_plans(&db, "other_mentor", &PlanFilters::default()).await?;
        assert!(none.is_empty());

        Ok(())
    }
}
