//! Shared test utilities for `MentorBilling`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults. Time-sensitive tests
//! pin the clock to 2024-06-15 via [`test_clock`] so day-boundary assertions
//! are deterministic.

#![allow(clippy::unwrap_used)]

use crate::{
    clock::Clock,
    config,
    core::plan::{self, CreatePlanPayload},
    entities::{
        BillingFrequency, BillingReminder, MentorshipStatus, PaymentModality, PaymentType,
        ReminderStatus, billing_reminder, financial_plan, mentorship, payment_history,
    },
    errors::Result,
};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Mentor used by all default test fixtures.
pub const MENTOR: &str = "mentor_1";
/// Mentee used by all default test fixtures.
pub const MENTEE: &str = "mentee_1";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a `NaiveDate`, panicking on invalid input (tests only).
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// The standard fixed test clock: 2024-06-15, midway through the default
/// plan's billing year.
pub fn test_clock() -> Clock {
    Clock::fixed_date(date(2024, 6, 15))
}

/// Creates a test mentorship between [`MENTOR`] and [`MENTEE`], active since
/// the start of 2024.
pub async fn create_test_mentorship(db: &DatabaseConnection) -> Result<mentorship::Model> {
    let now = test_clock().now();
    mentorship::ActiveModel {
        mentor_id: Set(MENTOR.to_string()),
        mentee_id: Set(MENTEE.to_string()),
        status: Set(MentorshipStatus::Active),
        start_date: Set(date(2024, 1, 1)),
        end_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// The default plan payload: 1200 over 12 monthly installments of 100,
/// running from 2024-01-01 through 2024-12-31, paid by PIX.
pub fn plan_payload(mentorship_id: i64) -> CreatePlanPayload {
    CreatePlanPayload {
        mentorship_id,
        mentee_id: MENTEE.to_string(),
        payment_type: PaymentType::Pix,
        payment_modality: PaymentModality::Installment,
        total_amount: Decimal::from(1200),
        installments: 12,
        billing_frequency: BillingFrequency::Monthly,
        custom_frequency_days: None,
        start_date: date(2024, 1, 1),
        expiration_date: date(2024, 12, 31),
        notes: None,
    }
}

/// Sets up a database with one mentorship and its default plan (including the
/// plan's initial twelve reminders). Returns (db, plan).
pub async fn setup_with_plan() -> Result<(DatabaseConnection, financial_plan::Model)> {
    let db = setup_test_db().await?;
    let mentorship = create_test_mentorship(&db).await?;
    let plan = plan::create_plan(&db, &test_clock(), MENTOR, plan_payload(mentorship.id)).await?;
    Ok((db, plan))
}

/// Inserts a reminder for the plan with the plan's installment amount and no
/// installment numbering.
pub async fn create_test_reminder(
    db: &DatabaseConnection,
    plan: &financial_plan::Model,
    due_date: NaiveDate,
    status: ReminderStatus,
) -> Result<billing_reminder::Model> {
    create_custom_reminder(db, plan, due_date, plan.installment_amount, status).await
}

/// Inserts a reminder with a custom amount.
pub async fn create_custom_reminder(
    db: &DatabaseConnection,
    plan: &financial_plan::Model,
    due_date: NaiveDate,
    amount: Decimal,
    status: ReminderStatus,
) -> Result<billing_reminder::Model> {
    let now = test_clock().now();
    billing_reminder::ActiveModel {
        plan_id: Set(plan.id),
        mentorship_id: Set(plan.mentorship_id),
        mentee_id: Set(plan.mentee_id.clone()),
        mentor_id: Set(plan.mentor_id.clone()),
        due_date: Set(due_date),
        amount: Set(amount),
        installment_number: Set(None),
        total_installments: Set(None),
        status: Set(status),
        sent_at: Set(None),
        paid_at: Set(None),
        confirmed_by: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overwrites a reminder's status directly, bypassing the payment processor.
pub async fn set_reminder_status(
    db: &DatabaseConnection,
    reminder_id: i64,
    status: ReminderStatus,
) -> Result<()> {
    let reminder = BillingReminder::find_by_id(reminder_id)
        .one(db)
        .await?
        .unwrap();
    let mut active: billing_reminder::ActiveModel = reminder.into();
    active.status = Set(status);
    active.update(db).await?;
    Ok(())
}

/// Deletes every reminder of a plan, for tests that seed their own schedule.
pub async fn clear_reminders(db: &DatabaseConnection, plan_id: i64) -> Result<()> {
    BillingReminder::delete_many()
        .filter(billing_reminder::Column::PlanId.eq(plan_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Inserts a payment history row directly, bypassing the payment processor,
/// for report and statistics tests that need payments on specific days.
pub async fn insert_payment_row(
    db: &DatabaseConnection,
    plan: &financial_plan::Model,
    day: NaiveDate,
    amount: Decimal,
    mentee_id: &str,
    payment_type: PaymentType,
) -> Result<()> {
    let instant = day.and_time(NaiveTime::from_hms_opt(10, 0, 0).unwrap()).and_utc();
    payment_history::ActiveModel {
        plan_id: Set(plan.id),
        mentorship_id: Set(plan.mentorship_id),
        mentee_id: Set(mentee_id.to_string()),
        mentor_id: Set(plan.mentor_id.clone()),
        amount: Set(amount),
        payment_type: Set(payment_type),
        installment_number: Set(None),
        payment_date: Set(instant),
        confirmed_at: Set(instant),
        confirmed_by: Set(plan.mentor_id.clone()),
        reminder_id: Set(None),
        notes: Set(None),
        created_at: Set(instant),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
