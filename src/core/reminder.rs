//! Reminder generation, regeneration and queries.
//!
//! Reminders are created in batches from the schedule generator and rebuilt
//! when a plan's billing terms change. Regeneration only ever touches
//! unsettled reminders: PAID and CANCELLED rows are collected-money history
//! and survive every rebuild. Numbering resumes after the settled history so
//! a mentee who paid three installments sees the rebuilt schedule continue at
//! four.

use crate::{
    clock::Clock,
    core::schedule,
    entities::{BillingReminder, ReminderStatus, billing_reminder, financial_plan},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate};
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryOrder, Set, prelude::*, sea_query::Expr};

/// Filters accepted by [`list_reminders`].
#[derive(Debug, Clone, Default)]
pub struct ReminderFilters {
    /// Restrict to these statuses
    pub status: Option<Vec<ReminderStatus>>,
    /// Due on or after this day
    pub due_date_start: Option<NaiveDate>,
    /// Due on or before this day
    pub due_date_end: Option<NaiveDate>,
    /// Restrict to one mentee
    pub mentee_id: Option<String>,
}

/// Outcome of one regeneration pass over a plan's reminders.
#[derive(Debug, Clone, Copy)]
pub struct RegenerationSummary {
    /// Unsettled reminders deleted
    pub removed: u64,
    /// Reminders created from the fresh schedule
    pub created: usize,
    /// Installment number assigned to the first new reminder
    pub first_installment: i32,
}

/// Creates the reminder batch for a plan from `from` through the plan's
/// expiration date.
///
/// Generic over the connection so plan creation and lifecycle extension can
/// run it inside their transactions. An empty schedule inserts nothing.
pub async fn generate_reminders<C: ConnectionTrait>(
    conn: &C,
    clock: &Clock,
    plan: &financial_plan::Model,
    from: NaiveDate,
    first_installment: i32,
) -> Result<usize> {
    let entries = schedule::generate_schedule(
        from,
        plan.expiration_date,
        plan.billing_frequency,
        plan.custom_frequency_days,
        plan.installment_amount,
        plan.installments,
        first_installment,
    );

    if entries.is_empty() {
        return Ok(0);
    }

    let now = clock.now();
    let models: Vec<billing_reminder::ActiveModel> = entries
        .into_iter()
        .map(|entry| billing_reminder::ActiveModel {
            plan_id: Set(plan.id),
            mentorship_id: Set(plan.mentorship_id),
            mentee_id: Set(plan.mentee_id.clone()),
            mentor_id: Set(plan.mentor_id.clone()),
            due_date: Set(entry.due_date),
            amount: Set(entry.amount),
            installment_number: Set(entry.installment_number),
            total_installments: Set(entry.total_installments),
            status: Set(ReminderStatus::Pending),
            sent_at: Set(None),
            paid_at: Set(None),
            confirmed_by: Set(None),
            notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    let created = models.len();
    BillingReminder::insert_many(models).exec(conn).await?;
    Ok(created)
}

/// Rebuilds the unsettled portion of a plan's schedule.
///
/// Deletes every PENDING and OVERDUE reminder of the plan, counts the PAID
/// ones to find where installment numbering resumes, and regenerates from
/// today through the plan's expiration date. PAID and CANCELLED reminders are
/// never touched.
pub async fn regenerate_pending<C: ConnectionTrait>(
    conn: &C,
    clock: &Clock,
    plan: &financial_plan::Model,
) -> Result<RegenerationSummary> {
    let removed = BillingReminder::delete_many()
        .filter(billing_reminder::Column::PlanId.eq(plan.id))
        .filter(
            billing_reminder::Column::Status
                .is_in([ReminderStatus::Pending, ReminderStatus::Overdue]),
        )
        .exec(conn)
        .await?
        .rows_affected;

    let paid = BillingReminder::find()
        .filter(billing_reminder::Column::PlanId.eq(plan.id))
        .filter(billing_reminder::Column::Status.eq(ReminderStatus::Paid))
        .count(conn)
        .await?;

    // paid counts are bounded by the schedule cap, far below i32 limits
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let first_installment = paid as i32 + 1;

    let created = generate_reminders(conn, clock, plan, clock.today(), first_installment).await?;

    Ok(RegenerationSummary {
        removed,
        created,
        first_installment,
    })
}

/// Lists a mentor's reminders with optional filters, ordered by due date
/// ascending. Returns the matching rows and their count.
pub async fn list_reminders(
    db: &DatabaseConnection,
    mentor_id: &str,
    filters: &ReminderFilters,
) -> Result<(Vec<billing_reminder::Model>, u64)> {
    let mut query = BillingReminder::find()
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .order_by_asc(billing_reminder::Column::DueDate);

    if let Some(ref statuses) = filters.status {
        query = query.filter(billing_reminder::Column::Status.is_in(statuses.iter().copied()));
    }
    if let Some(start) = filters.due_date_start {
        query = query.filter(billing_reminder::Column::DueDate.gte(start));
    }
    if let Some(end) = filters.due_date_end {
        query = query.filter(billing_reminder::Column::DueDate.lte(end));
    }
    if let Some(ref mentee_id) = filters.mentee_id {
        query = query.filter(billing_reminder::Column::MenteeId.eq(mentee_id));
    }

    let reminders = query.all(db).await?;
    let total = reminders.len() as u64;
    Ok((reminders, total))
}

/// Retrieves all reminders of one mentorship, ordered by due date ascending.
pub async fn reminders_by_mentorship(
    db: &DatabaseConnection,
    mentorship_id: i64,
    mentor_id: &str,
) -> Result<Vec<billing_reminder::Model>> {
    BillingReminder::find()
        .filter(billing_reminder::Column::MentorshipId.eq(mentorship_id))
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .order_by_asc(billing_reminder::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// PENDING reminders due today.
pub async fn today_reminders(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
) -> Result<Vec<billing_reminder::Model>> {
    BillingReminder::find()
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .filter(billing_reminder::Column::Status.eq(ReminderStatus::Pending))
        .filter(billing_reminder::Column::DueDate.eq(clock.today()))
        .order_by_asc(billing_reminder::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// PENDING and OVERDUE reminders due within the next seven days.
pub async fn week_reminders(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
) -> Result<Vec<billing_reminder::Model>> {
    let today = clock.today();
    let week_end = today.checked_add_days(Days::new(7)).unwrap_or(today);

    BillingReminder::find()
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .filter(
            billing_reminder::Column::Status
                .is_in([ReminderStatus::Pending, ReminderStatus::Overdue]),
        )
        .filter(billing_reminder::Column::DueDate.gte(today))
        .filter(billing_reminder::Column::DueDate.lte(week_end))
        .order_by_asc(billing_reminder::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Cancels a reminder unconditionally. Idempotent: cancelling an already
/// cancelled reminder is a no-op, and no precondition is checked because
/// CANCELLED is reachable from every non-terminal state.
pub async fn cancel_reminder(
    db: &DatabaseConnection,
    clock: &Clock,
    reminder_id: i64,
    mentor_id: &str,
) -> Result<()> {
    BillingReminder::update_many()
        .col_expr(
            billing_reminder::Column::Status,
            Expr::value(ReminderStatus::Cancelled),
        )
        .col_expr(billing_reminder::Column::UpdatedAt, Expr::value(clock.now()))
        .filter(billing_reminder::Column::Id.eq(reminder_id))
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Moves a reminder's due date.
pub async fn reschedule_reminder(
    db: &DatabaseConnection,
    clock: &Clock,
    reminder_id: i64,
    mentor_id: &str,
    new_due_date: NaiveDate,
) -> Result<billing_reminder::Model> {
    let reminder = BillingReminder::find_by_id(reminder_id)
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "billing reminder",
        })?;

    let mut active: billing_reminder::ActiveModel = reminder.into();
    active.due_date = Set(new_due_date);
    active.updated_at = Set(clock.now());
    active.update(db).await.map_err(Into::into)
}
