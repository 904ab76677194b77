//! Payment confirmation and reversal.
//!
//! A reminder moves to PAID when the mentor confirms collection, producing
//! exactly one payment history row; reverting the confirmation deletes that
//! row and restores the reminder to PENDING or OVERDUE depending on whether
//! its due date has passed. The invariant "one history row iff the reminder
//! is PAID" is maintained here, not by a store constraint, which is why
//! confirm refuses reminders that are already PAID or CANCELLED.
//!
//! The plan's rolling billing state advances on confirmation: the next
//! billing date is one period after the day of confirmation, not after the
//! reminder's due date.

use crate::{
    clock::Clock,
    core::schedule,
    entities::{
        BillingReminder, FinancialPlan, PaymentHistory, ReminderStatus, billing_reminder,
        financial_plan, payment_history,
    },
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Marks a reminder as paid and records the payment.
///
/// Fails with `NotFound` when the reminder does not exist, is not owned by
/// the mentor, or its plan row is gone; fails with `Validation` when the
/// reminder is already PAID or CANCELLED. On success the reminder, the new
/// payment history row, and the plan's `last_payment_date`/`next_billing_date`
/// are all written in one transaction.
pub async fn confirm_payment(
    db: &DatabaseConnection,
    clock: &Clock,
    reminder_id: i64,
    mentor_id: &str,
    notes: Option<String>,
) -> Result<(billing_reminder::Model, payment_history::Model)> {
    let txn = db.begin().await?;

    let reminder = BillingReminder::find_by_id(reminder_id)
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "billing reminder",
        })?;

    if matches!(
        reminder.status,
        ReminderStatus::Paid | ReminderStatus::Cancelled
    ) {
        return Err(Error::Validation {
            message: format!(
                "reminder {reminder_id} cannot be confirmed from status {:?}",
                reminder.status
            ),
        });
    }

    let plan = FinancialPlan::find_by_id(reminder.plan_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "financial plan",
        })?;

    let now = clock.now();
    let today = clock.today();

    let mut active: billing_reminder::ActiveModel = reminder.clone().into();
    active.status = Set(ReminderStatus::Paid);
    active.paid_at = Set(Some(now));
    active.confirmed_by = Set(Some(mentor_id.to_string()));
    if notes.is_some() {
        active.notes = Set(notes.clone());
    }
    active.updated_at = Set(now);
    let confirmed = active.update(&txn).await?;

    let payment = payment_history::ActiveModel {
        plan_id: Set(plan.id),
        mentorship_id: Set(reminder.mentorship_id),
        mentee_id: Set(reminder.mentee_id.clone()),
        mentor_id: Set(mentor_id.to_string()),
        amount: Set(reminder.amount),
        payment_type: Set(plan.payment_type),
        installment_number: Set(reminder.installment_number),
        payment_date: Set(now),
        confirmed_at: Set(now),
        confirmed_by: Set(mentor_id.to_string()),
        reminder_id: Set(Some(reminder.id)),
        notes: Set(notes),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // The next expected charge steps from the confirmation day, not the due date
    let mut plan_active: financial_plan::ActiveModel = plan.clone().into();
    plan_active.last_payment_date = Set(Some(today));
    plan_active.next_billing_date = Set(Some(schedule::next_due_date(
        today,
        plan.billing_frequency,
        plan.custom_frequency_days,
    )));
    plan_active.updated_at = Set(now);
    plan_active.update(&txn).await?;

    txn.commit().await?;
    Ok((confirmed, payment))
}

/// Undoes a payment confirmation.
///
/// Only a PAID reminder can be reverted. The reminder returns to OVERDUE when
/// its due date is before today, otherwise PENDING, and the payment history
/// row created by the confirmation is deleted.
pub async fn revert_payment(
    db: &DatabaseConnection,
    clock: &Clock,
    reminder_id: i64,
    mentor_id: &str,
) -> Result<billing_reminder::Model> {
    let txn = db.begin().await?;

    let reminder = BillingReminder::find_by_id(reminder_id)
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "billing reminder",
        })?;

    if reminder.status != ReminderStatus::Paid {
        return Err(Error::Validation {
            message: format!("reminder {reminder_id} is not marked as paid"),
        });
    }

    let restored_status = if reminder.due_date < clock.today() {
        ReminderStatus::Overdue
    } else {
        ReminderStatus::Pending
    };

    let mut active: billing_reminder::ActiveModel = reminder.into();
    active.status = Set(restored_status);
    active.paid_at = Set(None);
    active.confirmed_by = Set(None);
    active.updated_at = Set(clock.now());
    let reverted = active.update(&txn).await?;

    PaymentHistory::delete_many()
        .filter(payment_history::Column::ReminderId.eq(reminder_id))
        .filter(payment_history::Column::MentorId.eq(mentor_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(reverted)
}

/// A mentor's payment history, newest first, optionally restricted to one
/// mentee. `limit` defaults to 50.
pub async fn payment_history(
    db: &DatabaseConnection,
    mentor_id: &str,
    mentee_id: Option<&str>,
    limit: Option<u64>,
) -> Result<Vec<payment_history::Model>> {
    let mut query = PaymentHistory::find()
        .filter(payment_history::Column::MentorId.eq(mentor_id))
        .order_by_desc(payment_history::Column::PaymentDate)
        .limit(limit.unwrap_or(50));

    if let Some(mentee_id) = mentee_id {
        query = query.filter(payment_history::Column::MenteeId.eq(mentee_id));
    }

    query.all(db).await.map_err(Into::into)
}
