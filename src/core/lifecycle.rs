//! Plan lifecycle transitions with mentorship cascade.
//!
//! Suspending, reactivating or expiring a plan mirrors the status onto the
//! linked mentorship row, and extending a plan moves both the plan's
//! expiration date and the mentorship's end date. Each operation runs its
//! writes in one transaction.
//!
//! Extension regenerates only *future* PENDING reminders and restarts
//! installment numbering at one; full regeneration after a plan update
//! (see `core::reminder`) removes all PENDING and OVERDUE reminders and
//! resumes numbering after the paid history. The asymmetry is intentional:
//! extending a plan must not disturb obligations that are already due.

use crate::{
    clock::Clock,
    core::reminder,
    entities::{
        BillingReminder, FinancialPlan, Mentorship, MentorshipStatus, PlanStatus, ReminderStatus,
        billing_reminder, financial_plan, mentorship,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::warn;

async fn plan_for_mentorship<C: ConnectionTrait>(
    conn: &C,
    mentorship_id: i64,
    mentor_id: &str,
) -> Result<financial_plan::Model> {
    FinancialPlan::find()
        .filter(financial_plan::Column::MentorshipId.eq(mentorship_id))
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "financial plan",
        })
}

async fn cascade_mentorship_status<C: ConnectionTrait>(
    conn: &C,
    mentorship_id: i64,
    mentor_id: &str,
    status: MentorshipStatus,
    end_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut update = Mentorship::update_many()
        .col_expr(mentorship::Column::Status, Expr::value(status))
        .col_expr(mentorship::Column::UpdatedAt, Expr::value(now))
        .filter(mentorship::Column::Id.eq(mentorship_id))
        .filter(mentorship::Column::MentorId.eq(mentor_id));
    if let Some(end) = end_date {
        update = update.col_expr(mentorship::Column::EndDate, Expr::value(end));
    }
    update.exec(conn).await?;
    Ok(())
}

/// Suspends billing for a mentorship. The optional reason is stored in the
/// plan's notes, and the mentorship status mirrors the suspension.
pub async fn suspend(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
    reason: Option<String>,
) -> Result<()> {
    let txn = db.begin().await?;
    let plan = plan_for_mentorship(&txn, mentorship_id, mentor_id).await?;
    let now = clock.now();

    let mut active: financial_plan::ActiveModel = plan.into();
    active.status = Set(PlanStatus::Suspended);
    if reason.is_some() {
        active.notes = Set(reason);
    }
    active.updated_at = Set(now);
    active.update(&txn).await?;

    cascade_mentorship_status(
        &txn,
        mentorship_id,
        mentor_id,
        MentorshipStatus::Suspended,
        None,
        now,
    )
    .await?;

    txn.commit().await?;
    Ok(())
}

/// Reactivates a suspended or expired mentorship, optionally with a new
/// expiration date (mirrored onto the mentorship's end date).
pub async fn reactivate(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
    new_expiration_date: Option<NaiveDate>,
) -> Result<()> {
    let txn = db.begin().await?;
    let plan = plan_for_mentorship(&txn, mentorship_id, mentor_id).await?;
    let now = clock.now();

    let mut active: financial_plan::ActiveModel = plan.into();
    active.status = Set(PlanStatus::Active);
    if let Some(expiration) = new_expiration_date {
        active.expiration_date = Set(expiration);
    }
    active.updated_at = Set(now);
    active.update(&txn).await?;

    cascade_mentorship_status(
        &txn,
        mentorship_id,
        mentor_id,
        MentorshipStatus::Active,
        new_expiration_date,
        now,
    )
    .await?;

    txn.commit().await?;
    Ok(())
}

/// Expires a mentorship manually, ahead of the sweeper.
pub async fn expire(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
) -> Result<()> {
    let txn = db.begin().await?;
    let plan = plan_for_mentorship(&txn, mentorship_id, mentor_id).await?;
    let now = clock.now();

    let mut active: financial_plan::ActiveModel = plan.into();
    active.status = Set(PlanStatus::Expired);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    cascade_mentorship_status(
        &txn,
        mentorship_id,
        mentor_id,
        MentorshipStatus::Expired,
        None,
        now,
    )
    .await?;

    txn.commit().await?;
    Ok(())
}

/// Extends a mentorship to a new expiration date.
///
/// Moves `plan.expiration_date` and `mentorship.end_date`. When
/// `regenerate_reminders` is set, PENDING reminders due strictly after today
/// are deleted and the schedule is rebuilt from today through the new
/// expiration; reminders that are already due, overdue or settled stay as
/// they are. A regeneration failure is logged without failing the extension.
pub async fn extend(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
    new_expiration_date: NaiveDate,
    regenerate_reminders: bool,
) -> Result<()> {
    let txn = db.begin().await?;
    let plan = plan_for_mentorship(&txn, mentorship_id, mentor_id).await?;
    let now = clock.now();
    let today = clock.today();

    let mut active: financial_plan::ActiveModel = plan.into();
    active.expiration_date = Set(new_expiration_date);
    active.updated_at = Set(now);
    let plan = active.update(&txn).await?;

    Mentorship::update_many()
        .col_expr(mentorship::Column::EndDate, Expr::value(new_expiration_date))
        .col_expr(mentorship::Column::UpdatedAt, Expr::value(now))
        .filter(mentorship::Column::Id.eq(mentorship_id))
        .filter(mentorship::Column::MentorId.eq(mentor_id))
        .exec(&txn)
        .await?;

    if regenerate_reminders {
        BillingReminder::delete_many()
            .filter(billing_reminder::Column::PlanId.eq(plan.id))
            .filter(billing_reminder::Column::Status.eq(ReminderStatus::Pending))
            .filter(billing_reminder::Column::DueDate.gt(today))
            .exec(&txn)
            .await?;

        if let Err(error) = reminder::generate_reminders(&txn, clock, &plan, today, 1).await {
            warn!(plan_id = plan.id, %error, "reminder regeneration failed after extension");
        }
    }

    txn.commit().await?;
    Ok(())
}
