//! Due-date schedule generation.
//!
//! Pure calendar arithmetic with no store access: a step function that advances
//! a date by one billing period, and a generator that unrolls the step from a
//! start date to an end date. The generator is hard-capped so a small custom
//! step over a multi-year window cannot produce a pathological batch.

use crate::entities::BillingFrequency;
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;

/// Hard cap on the number of entries a single generation can produce.
pub const MAX_SCHEDULE_ENTRIES: usize = 24;

/// Step applied for CUSTOM frequency when no day count is configured.
const DEFAULT_CUSTOM_STEP_DAYS: i32 = 30;

/// One scheduled billing obligation produced by [`generate_schedule`].
///
/// `installment_number` and `total_installments` are present iff the plan has
/// more than one installment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Calendar day the payment is due
    pub due_date: NaiveDate,
    /// Amount due
    pub amount: Decimal,
    /// 1-based installment label
    pub installment_number: Option<i32>,
    /// Total installments of the plan
    pub total_installments: Option<i32>,
}

/// Advances a date by one billing period.
///
/// MONTHLY adds one month, QUARTERLY three, SEMIANNUAL six, ANNUAL twelve;
/// CUSTOM adds `custom_days` days, defaulting to 30 when absent. Month
/// arithmetic clamps to the last day of shorter months (Jan 31 + 1 month is
/// Feb 29 in a leap year).
#[must_use]
pub fn next_due_date(
    from: NaiveDate,
    frequency: BillingFrequency,
    custom_days: Option<i32>,
) -> NaiveDate {
    match frequency {
        BillingFrequency::Monthly => add_months(from, 1),
        BillingFrequency::Quarterly => add_months(from, 3),
        BillingFrequency::Semiannual => add_months(from, 6),
        BillingFrequency::Annual => add_months(from, 12),
        BillingFrequency::Custom => {
            // a non-positive step would stall the generation loop
            let days = custom_days.unwrap_or(DEFAULT_CUSTOM_STEP_DAYS).max(1);
            from.checked_add_days(Days::new(u64::from(days.unsigned_abs())))
                .unwrap_or(NaiveDate::MAX)
        }
    }
}

fn add_months(from: NaiveDate, months: u32) -> NaiveDate {
    from.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Produces the ordered due-date sequence from `start` through `end` inclusive.
///
/// Emits one entry per billing period while `current <= end`, stopping
/// unconditionally after [`MAX_SCHEDULE_ENTRIES`]. `first_installment` is the
/// number assigned to the first emitted entry; regeneration after settled
/// history passes the count of paid installments plus one so numbering resumes
/// where collection stopped. Never fails: the result may be empty (start past
/// end) or capped.
#[must_use]
pub fn generate_schedule(
    start: NaiveDate,
    end: NaiveDate,
    frequency: BillingFrequency,
    custom_days: Option<i32>,
    installment_amount: Decimal,
    total_installments: i32,
    first_installment: i32,
) -> Vec<ScheduleEntry> {
    let numbered = total_installments > 1;
    let mut entries = Vec::new();
    let mut current = start;
    let mut installment = first_installment;

    while current <= end && entries.len() < MAX_SCHEDULE_ENTRIES {
        entries.push(ScheduleEntry {
            due_date: current,
            amount: installment_amount,
            installment_number: numbered.then_some(installment),
            total_installments: numbered.then_some(total_installments),
        });
        current = next_due_date(current, frequency, custom_days);
        installment += 1;
    }

    entries
}
