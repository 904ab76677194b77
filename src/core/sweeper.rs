//! Periodic expiration and overdue sweep.
//!
//! Intended to be run once a day by an external scheduler. The sweep expires
//! every ACTIVE plan whose expiration date has passed, cascading the status
//! to the linked mentorship, then bulk-marks past-due PENDING reminders as
//! OVERDUE. All comparisons are calendar-day based: a plan expiring today is
//! not expired yet, and a reminder due today is not overdue yet.
//!
//! Each candidate plan is processed in its own transaction; a failure on one
//! is logged and the sweep continues, so the returned counter only reflects
//! successes. Rerunning the sweep on the same day finds nothing left to
//! expire.

use crate::{
    clock::Clock,
    entities::{
        BillingReminder, FinancialPlan, Mentorship, MentorshipStatus, PlanStatus, ReminderStatus,
        billing_reminder, financial_plan, mentorship,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{error, info};

/// Result of one sweep run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOutcome {
    /// Plans successfully transitioned to EXPIRED
    pub expired: usize,
    /// Reminder notifications dispatched. Always zero here: dispatch belongs
    /// to an external messaging collaborator, not this core.
    pub notified: usize,
}

/// Runs one expiration sweep.
pub async fn process_expirations(db: &DatabaseConnection, clock: &Clock) -> Result<SweepOutcome> {
    let today = clock.today();
    let now = clock.now();

    let candidates = FinancialPlan::find()
        .filter(financial_plan::Column::Status.eq(PlanStatus::Active))
        .filter(financial_plan::Column::ExpirationDate.lt(today))
        .all(db)
        .await?;

    let mut expired = 0;
    for plan in candidates {
        match expire_plan(db, &plan, now).await {
            Ok(()) => expired += 1,
            Err(sweep_error) => {
                error!(
                    plan_id = plan.id,
                    mentorship_id = plan.mentorship_id,
                    error = %sweep_error,
                    "failed to expire plan; continuing sweep"
                );
            }
        }
    }

    let overdue = BillingReminder::update_many()
        .col_expr(
            billing_reminder::Column::Status,
            Expr::value(ReminderStatus::Overdue),
        )
        .col_expr(billing_reminder::Column::UpdatedAt, Expr::value(now))
        .filter(billing_reminder::Column::Status.eq(ReminderStatus::Pending))
        .filter(billing_reminder::Column::DueDate.lt(today))
        .exec(db)
        .await?
        .rows_affected;

    if expired > 0 || overdue > 0 {
        info!(expired, overdue, "expiration sweep applied changes");
    }

    Ok(SweepOutcome {
        expired,
        notified: 0,
    })
}

async fn expire_plan(
    db: &DatabaseConnection,
    plan: &financial_plan::Model,
    now: DateTime<Utc>,
) -> Result<()> {
    let txn = db.begin().await?;

    let mut active: financial_plan::ActiveModel = plan.clone().into();
    active.status = Set(PlanStatus::Expired);
    active.updated_at = Set(now);
    active.update(&txn).await?;

    Mentorship::update_many()
        .col_expr(
            mentorship::Column::Status,
            Expr::value(MentorshipStatus::Expired),
        )
        .col_expr(mentorship::Column::UpdatedAt, Expr::value(now))
        .filter(mentorship::Column::Id.eq(plan.mentorship_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}
