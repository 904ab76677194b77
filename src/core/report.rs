//! Financial reporting over a mentor's payment history.
//!
//! All reports work from a single fetch of the mentor's confirmed payments.
//! Month boundaries are calendar months; the month-over-month comparison in
//! the summary ignores the caller's range filter, matching the dashboard
//! semantics where "paid this month" is absolute.

use crate::{
    clock::Clock,
    entities::{
        BillingReminder, PaymentHistory, PaymentType, ReminderStatus, billing_reminder,
        payment_history,
    },
    errors::Result,
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sea_orm::{DatabaseConnection, QueryOrder, prelude::*};
use std::collections::HashMap;

/// How many recent payments a report carries.
const RECENT_PAYMENTS_LIMIT: usize = 20;

/// Aggregated totals of a financial report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// Sum of confirmed payments in the requested range
    pub total_revenue: Decimal,
    /// Sum of PENDING reminder amounts not yet overdue
    pub pending_amount: Decimal,
    /// Sum of overdue reminder amounts (OVERDUE status or past due date)
    pub overdue_amount: Decimal,
    /// Confirmed payments since the first of the current month
    pub paid_this_month: Decimal,
    /// Confirmed payments within the previous calendar month
    pub paid_last_month: Decimal,
    /// Month-over-month growth in percent; zero when last month was empty
    pub growth_percentage: f64,
    /// Mean payment in the requested range; zero when there are none
    pub average_ticket: Decimal,
    /// Number of payments in the requested range
    pub total_payments: usize,
}

/// A financial report: summary totals plus the most recent payments.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialReport {
    /// Aggregated totals
    pub summary: ReportSummary,
    /// Most recent payments in range, newest first, at most twenty
    pub recent_payments: Vec<payment_history::Model>,
}

/// Revenue collected in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRevenue {
    /// Month label, e.g. `"Mar 24"`
    pub month: String,
    /// Sum of payments confirmed in the month
    pub revenue: Decimal,
    /// Number of payments confirmed in the month
    pub payments: usize,
}

/// Revenue share of one payment type.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentTypeRevenue {
    /// The payment instrument
    pub payment_type: PaymentType,
    /// Total collected through it
    pub revenue: Decimal,
    /// Number of payments
    pub count: usize,
    /// Share of total revenue in percent
    pub percentage: f64,
}

/// Revenue contributed by one mentee.
#[derive(Debug, Clone, PartialEq)]
pub struct MenteeRevenue {
    /// Mentee user ID
    pub mentee_id: String,
    /// Total collected from the mentee
    pub total_paid: Decimal,
    /// Number of payments
    pub payments_count: usize,
}

fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

fn month_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1)).unwrap_or(date)
}

async fn all_payments(
    db: &DatabaseConnection,
    mentor_id: &str,
) -> Result<Vec<payment_history::Model>> {
    PaymentHistory::find()
        .filter(payment_history::Column::MentorId.eq(mentor_id))
        .order_by_desc(payment_history::Column::PaymentDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Builds the full financial report for a mentor, optionally restricted to a
/// payment-date range (dates inclusive on both ends).
pub async fn financial_report(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<FinancialReport> {
    let today = clock.today();
    let this_month_start = month_start(today);
    let last_month_start = months_back(this_month_start, 1);

    let payments = all_payments(db, mentor_id).await?;

    let in_range: Vec<&payment_history::Model> = payments
        .iter()
        .filter(|payment| {
            let day = payment.payment_date.date_naive();
            start_date.is_none_or(|start| day >= start) && end_date.is_none_or(|end| day <= end)
        })
        .collect();

    let total_revenue: Decimal = in_range.iter().map(|payment| payment.amount).sum();
    let total_payments = in_range.len();

    let paid_this_month: Decimal = payments
        .iter()
        .filter(|payment| payment.payment_date.date_naive() >= this_month_start)
        .map(|payment| payment.amount)
        .sum();
    let paid_last_month: Decimal = payments
        .iter()
        .filter(|payment| {
            let day = payment.payment_date.date_naive();
            day >= last_month_start && day < this_month_start
        })
        .map(|payment| payment.amount)
        .sum();

    let growth_percentage = if paid_last_month > Decimal::ZERO {
        ((paid_this_month - paid_last_month) / paid_last_month * Decimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let average_ticket = if total_payments > 0 {
        (total_revenue / Decimal::from(total_payments)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    // Open obligations, split exclusively: anything past due or already
    // marked OVERDUE counts as overdue, the rest as pending
    let reminders = BillingReminder::find()
        .filter(billing_reminder::Column::MentorId.eq(mentor_id))
        .filter(
            billing_reminder::Column::Status
                .is_in([ReminderStatus::Pending, ReminderStatus::Overdue]),
        )
        .all(db)
        .await?;

    let mut pending_amount = Decimal::ZERO;
    let mut overdue_amount = Decimal::ZERO;
    for reminder in &reminders {
        if reminder.status == ReminderStatus::Overdue || reminder.due_date < today {
            overdue_amount += reminder.amount;
        } else {
            pending_amount += reminder.amount;
        }
    }

    let recent_payments = in_range
        .into_iter()
        .take(RECENT_PAYMENTS_LIMIT)
        .cloned()
        .collect();

    Ok(FinancialReport {
        summary: ReportSummary {
            total_revenue,
            pending_amount,
            overdue_amount,
            paid_this_month,
            paid_last_month,
            growth_percentage,
            average_ticket,
            total_payments,
        },
        recent_payments,
    })
}

/// Revenue per calendar month over the trailing twelve months, oldest first.
pub async fn monthly_revenue(
    db: &DatabaseConnection,
    clock: &Clock,
    mentor_id: &str,
) -> Result<Vec<MonthlyRevenue>> {
    let payments = all_payments(db, mentor_id).await?;
    let current_month = month_start(clock.today());

    let mut months = Vec::with_capacity(12);
    for back in (0..12).rev() {
        let bucket_start = months_back(current_month, back);
        let bucket_end = month_after(bucket_start);

        let mut revenue = Decimal::ZERO;
        let mut count = 0;
        for payment in &payments {
            let day = payment.payment_date.date_naive();
            if day >= bucket_start && day < bucket_end {
                revenue += payment.amount;
                count += 1;
            }
        }

        months.push(MonthlyRevenue {
            month: bucket_start.format("%b %y").to_string(),
            revenue,
            payments: count,
        });
    }

    Ok(months)
}

/// Revenue grouped by payment type, sorted by revenue descending, with each
/// type's share of the total.
pub async fn revenue_by_payment_type(
    db: &DatabaseConnection,
    mentor_id: &str,
) -> Result<Vec<PaymentTypeRevenue>> {
    let payments = all_payments(db, mentor_id).await?;

    let mut grouped: HashMap<PaymentType, (Decimal, usize)> = HashMap::new();
    let mut total = Decimal::ZERO;
    for payment in &payments {
        let entry = grouped
            .entry(payment.payment_type)
            .or_insert((Decimal::ZERO, 0));
        entry.0 += payment.amount;
        entry.1 += 1;
        total += payment.amount;
    }

    let mut rows: Vec<PaymentTypeRevenue> = grouped
        .into_iter()
        .map(|(payment_type, (revenue, count))| PaymentTypeRevenue {
            payment_type,
            revenue,
            count,
            percentage: if total > Decimal::ZERO {
                (revenue / total * Decimal::from(100)).to_f64().unwrap_or(0.0)
            } else {
                0.0
            },
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    Ok(rows)
}

/// The mentees who paid the most, descending, truncated to `limit`
/// (default 10).
pub async fn top_mentees_by_revenue(
    db: &DatabaseConnection,
    mentor_id: &str,
    limit: Option<usize>,
) -> Result<Vec<MenteeRevenue>> {
    let payments = all_payments(db, mentor_id).await?;

    let mut grouped: HashMap<String, (Decimal, usize)> = HashMap::new();
    for payment in &payments {
        let entry = grouped
            .entry(payment.mentee_id.clone())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += payment.amount;
        entry.1 += 1;
    }

    let mut rows: Vec<MenteeRevenue> = grouped
        .into_iter()
        .map(|(mentee_id, (total_paid, payments_count))| MenteeRevenue {
            mentee_id,
            total_paid,
            payments_count,
        })
        .collect();

    rows.sort_by(|a, b| b.total_paid.cmp(&a.total_paid));
    rows.truncate(limit.unwrap_or(10));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    async fn record_payment(
        db: &DatabaseConnection,
        plan: &crate::entities::financial_plan::Model,
        day: NaiveDate,
        amount: Decimal,
        mentee_id: &str,
        payment_type: PaymentType,
    ) -> Result<()> {
        insert_payment_row(db, plan, day, amount, mentee_id, payment_type).await
    }

    #[tokio::test]
    async fn test_report_month_over_month_growth() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;
        let clock = test_clock(); // 2024-06-15

        record_payment(&db, &plan, date(2024, 5, 10), Decimal::from(100), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 5), Decimal::from(150), MENTEE, PaymentType::Pix).await?;

        let report = financial_report(&db, &clock, MENTOR, None, None).await?;
        assert_eq!(report.summary.paid_this_month, Decimal::from(150));
        assert_eq!(report.summary.paid_last_month, Decimal::from(100));
        assert!((report.summary.growth_percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.summary.total_revenue, Decimal::from(250));
        assert_eq!(report.summary.total_payments, 2);
        assert_eq!(report.summary.average_ticket, Decimal::from(125));

        Ok(())
    }

    #[tokio::test]
    async fn test_report_growth_is_zero_without_last_month() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;
        let clock = test_clock();

        record_payment(&db, &plan, date(2024, 6, 5), Decimal::from(150), MENTEE, PaymentType::Pix).await?;

        let report = financial_report(&db, &clock, MENTOR, None, None).await?;
        assert!((report.summary.growth_percentage - 0.0).abs() < f64::EPSILON);

        Ok(())
    }

    #[tokio::test]
    async fn test_report_range_filter_and_recent_payments() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;
        let clock = test_clock();

        record_payment(&db, &plan, date(2024, 1, 10), Decimal::from(100), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 3, 10), Decimal::from(200), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 10), Decimal::from(300), MENTEE, PaymentType::Pix).await?;

        let report = financial_report(
            &db,
            &clock,
            MENTOR,
            Some(date(2024, 2, 1)),
            Some(date(2024, 5, 31)),
        )
        .await?;

        assert_eq!(report.summary.total_revenue, Decimal::from(200));
        assert_eq!(report.summary.total_payments, 1);
        assert_eq!(report.recent_payments.len(), 1);
        assert_eq!(report.recent_payments[0].amount, Decimal::from(200));
        // Month-over-month totals ignore the range filter
        assert_eq!(report.summary.paid_this_month, Decimal::from(300));

        Ok(())
    }

    #[tokio::test]
    async fn test_report_pending_and_overdue_are_exclusive() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;
        let clock = test_clock(); // 2024-06-15

        // Past due but still PENDING: overdue bucket
        create_custom_reminder(&db, &plan, date(2024, 6, 1), Decimal::from(80), ReminderStatus::Pending).await?;
        // Marked OVERDUE: overdue bucket
        create_custom_reminder(&db, &plan, date(2024, 5, 1), Decimal::from(20), ReminderStatus::Overdue).await?;
        // Due today: pending bucket
        create_custom_reminder(&db, &plan, date(2024, 6, 15), Decimal::from(50), ReminderStatus::Pending).await?;

        let report = financial_report(&db, &clock, MENTOR, None, None).await?;
        assert_eq!(report.summary.overdue_amount, Decimal::from(100));
        assert_eq!(report.summary.pending_amount, Decimal::from(50));

        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_revenue_buckets() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;
        let clock = test_clock(); // 2024-06-15

        record_payment(&db, &plan, date(2024, 6, 1), Decimal::from(100), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 20), Decimal::from(50), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 4, 2), Decimal::from(75), MENTEE, PaymentType::Pix).await?;
        // Older than the trailing window
        record_payment(&db, &plan, date(2023, 1, 2), Decimal::from(999), MENTEE, PaymentType::Pix).await?;

        let months = monthly_revenue(&db, &clock, MENTOR).await?;
        assert_eq!(months.len(), 12);

        // Oldest bucket first: Jul 23 through Jun 24
        assert_eq!(months[0].month, "Jul 23");
        assert_eq!(months[11].month, "Jun 24");
        assert_eq!(months[11].revenue, Decimal::from(150));
        assert_eq!(months[11].payments, 2);
        assert_eq!(months[9].month, "Apr 24");
        assert_eq!(months[9].revenue, Decimal::from(75));

        let empty_months = months.iter().filter(|m| m.revenue == Decimal::ZERO).count();
        assert_eq!(empty_months, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_revenue_by_payment_type_shares() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;

        record_payment(&db, &plan, date(2024, 6, 1), Decimal::from(300), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 2), Decimal::from(100), MENTEE, PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 3), Decimal::from(100), MENTEE, PaymentType::Cash).await?;

        let rows = revenue_by_payment_type(&db, MENTOR).await?;
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].payment_type, PaymentType::Pix);
        assert_eq!(rows[0].revenue, Decimal::from(400));
        assert_eq!(rows[0].count, 2);
        assert!((rows[0].percentage - 80.0).abs() < 1e-9);

        assert_eq!(rows[1].payment_type, PaymentType::Cash);
        assert!((rows[1].percentage - 20.0).abs() < 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn test_top_mentees_order_and_truncation() -> Result<()> {
        let (db, plan) = setup_with_plan().await?;
        clear_reminders(&db, plan.id).await?;

        record_payment(&db, &plan, date(2024, 6, 1), Decimal::from(100), "mentee_a", PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 2), Decimal::from(100), "mentee_a", PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 3), Decimal::from(500), "mentee_b", PaymentType::Pix).await?;
        record_payment(&db, &plan, date(2024, 6, 4), Decimal::from(50), "mentee_c", PaymentType::Pix).await?;

        let top = top_mentees_by_revenue(&db, MENTOR, None).await?;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].mentee_id, "mentee_b");
        assert_eq!(top[0].total_paid, Decimal::from(500));
        assert_eq!(top[1].mentee_id, "mentee_a");
        assert_eq!(top[1].payments_count, 2);

        let top_two = top_mentees_by_revenue(&db, MENTOR, Some(2)).await?;
        assert_eq!(top_two.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_reports_for_empty_mentor() -> Result<()> {
        let db = setup_test_db().await?;
        let clock = test_clock();

        let report = financial_report(&db, &clock, "nobody", None, None).await?;
        assert_eq!(report.summary.total_revenue, Decimal::ZERO);
        assert_eq!(report.summary.average_ticket, Decimal::ZERO);
        assert!(report.recent_payments.is_empty());

        let months = monthly_revenue(&db, &clock, "nobody").await?;
        assert_eq!(months.len(), 12);
        assert!(months.iter().all(|m| m.revenue == Decimal::ZERO));

        assert!(revenue_by_payment_type(&db, "nobody").await?.is_empty());
        assert!(top_mentees_by_revenue(&db, "nobody", None).await?.is_empty());

        Ok(())
    }
}
