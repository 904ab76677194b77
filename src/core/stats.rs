//! Financial statistics for a mentor's dashboard.
//!
//! One pass over the mentor's plans bucketed by status, one pass over the
//! reminders, and a sum over the payment history. Overdue is calendar-day
//! based: a PENDING reminder counts as overdue only once its due date is
//! strictly before today. Every PENDING reminder feeds the pending bucket,
//! and a past-due PENDING one additionally feeds the overdue bucket, so the
//! two buckets overlap by design.

use crate::{
    clock::Clock,
    entities::{
        BillingReminder, FinancialPlan, PaymentHistory, PlanStatus, ReminderStatus,
        billing_reminder, financial_plan, payment_history,
    },
    errors::Result,
};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, prelude::*};

/// Aggregated financial view of one mentor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialStats {
    /// Mentees with any plan
    pub total_mentees: usize,
    /// Plans currently ACTIVE
    pub active_mentees: usize,
    /// Plans EXPIRED
    pub expired_mentees: usize,
    /// Plans SUSPENDED
    pub suspended_mentees: usize,
    /// Sum of every confirmed payment
    pub total_revenue: Decimal,
    /// Sum of all PENDING reminder amounts
    pub pending_payments: Decimal,
    /// Sum of overdue reminder amounts (past-due PENDING plus OVERDUE)
    pub overdue_payments: Decimal,
    /// Count of PENDING reminders
    pub pending_reminders: usize,
    /// Count of overdue reminders (past-due PENDING plus OVERDUE)
    pub overdue_reminders: usize,
    /// PENDING reminders due today
    pub today_reminders: usize,
    /// PENDING reminders due on or before today plus seven days
    pub week_reminders: usize,
    /// ACTIVE plans expiring within seven days
    pub expiring_this_week: u64,
    /// ACTIVE plans expiring within thirty days
    pub expiring_this_month: u64,
}

fn days_ahead(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

/// Computes the financial statistics for a mentor.
#[allow(clippy::too_many_lines)]
pub async fn financial_stats(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
) -> Result<FinancialStats> {
    let today = clock.today();
    let week_ahead = days_ahead(today, 7);
    let month_ahead = days_ahead(today, 30);

    let plans = FinancialPlan::find()
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .all(db)
        .await?;

    let mut active_mentees = 0;
    let mut expired_mentees = 0;
    let mut suspended_mentees = 0;
    for plan in &plans {
        match plan.status {
            PlanStatus::Active => active_mentees += 1,
            PlanStatus::Expired => expired_mentees += 1,
            PlanStatus::Suspended => suspended_mentees += 1,
            PlanStatus::Cancelled | PlanStatus::Pending => {}
        }
    }

    let reminders = BillingReminder::find()
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .all(db)
        .await?;

    let mut pending_reminders = 0;
    let mut overdue_reminders = 0;
    let mut today_reminders = 0;
    let mut week_reminders = 0;
    let mut pending_payments = Decimal::ZERO;
    let mut overdue_payments = Decimal::ZERO;

    for reminder in &reminders {
        match reminder.status {
            ReminderStatus::Pending => {
                pending_reminders += 1;
                pending_payments += reminder.amount;
                if reminder.due_date < today {
                    overdue_reminders += 1;
                    overdue_payments += reminder.amount;
                }
                if reminder.due_date == today {
                    today_reminders += 1;
                }
                if reminder.due_date <= week_ahead {
                    week_reminders += 1;
                }
            }
            ReminderStatus::Overdue => {
                overdue_reminders += 1;
                overdue_payments += reminder.amount;
            }
            ReminderStatus::Sent | ReminderStatus::Paid | ReminderStatus::Cancelled => {}
        }
    }

    let total_revenue = PaymentHistory::find()
        .filter(payment_history::Column::MentorId.eq(mentor_id))
        .all(db)
        .await?
        .iter()
        .map(|payment| payment.amount)
        .sum();

    let expiring_this_week = FinancialPlan::find()
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .filter(financial_plan::Column::Status.eq(PlanStatus::Active))
        .filter(financial_plan::Column::ExpirationDate.lte(week_ahead))
        .count(db)
        .await?;

    let expiring_this_month = FinancialPlan::find()
        .filter(financial_plan::Column::MentorId.eq(mentor_id))
        .filter(financial_plan::Column::Status.eq(PlanStatus::Active))
        .filter(financial_plan::Column::ExpirationDate.lte(month_ahead))
        .count(db)
        .await?;

    Ok(FinancialStats {
        total_mentees: plans.len(),
        active_mentees,
        expired_mentees,
        suspended_mentees,
        total_revenue,
        pending_payments,
        overdue_payments,
        pending_reminders,
        overdue_reminders,
        today_reminders,
        week_reminders,
        expiring_this_week,
        expiring_this_month,
    })
}
