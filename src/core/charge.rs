//! Ad-hoc mentorship charges.
//!
//! Lightweight one-off billing items outside the recurring plan schedule.
//! Listing presents a past-due pending charge as overdue without persisting
//! the change; the stored status only moves through explicit operations.

use crate::{
    clock::Clock,
    entities::{ChargeStatus, MentorshipCharge, mentorship_charge},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*};
use tracing::info;

/// Payload for [`create_charge`].
#[derive(Debug, Clone)]
pub struct CreateChargePayload {
    /// What the charge is for
    pub description: String,
    /// Amount due
    pub amount: Decimal,
    /// Calendar day the charge is due
    pub due_date: NaiveDate,
}

/// Payload for [`update_charge`]. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateChargePayload {
    /// New description
    pub description: Option<String>,
    /// New amount
    pub amount: Option<Decimal>,
    /// New due day
    pub due_date: Option<NaiveDate>,
}

/// Creates a pending charge against a mentorship.
pub async fn create_charge(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
    payload: CreateChargePayload,
) -> Result<mentorship_charge::Model> {
    if payload.description.trim().is_empty() {
        return Err(Error::Validation {
            message: "charge description cannot be empty".to_string(),
        });
    }
    if payload.amount <= Decimal::ZERO {
        return Err(Error::Validation {
            message: format!("charge amount must be positive, got {}", payload.amount),
        });
    }

    let now = clock.now();
    mentorship_charge::ActiveModel {
        mentorship_id: Set(mentorship_id),
        mentor_id: Set(mentor_id.to_string()),
        description: Set(payload.description.trim().to_string()),
        amount: Set(payload.amount),
        due_date: Set(payload.due_date),
        status: Set(ChargeStatus::Pending),
        paid_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Lists a mentorship's charges, newest due date first.
///
/// Pending charges whose due date has passed are returned with OVERDUE status
/// without writing the change back; the stored row stays pending until an
/// explicit operation moves it.
pub async fn charges_by_mentorship(
    db: &DatabaseConnection,
    clock: &Clock,
    mentorship_id: i64,
    mentor_id: &str,
) -> Result<Vec<mentorship_charge::Model>> {
    let today = clock.today();
    let charges = MentorshipCharge::find()
        .filter(mentorship_charge::Column::MentorshipId.eq(mentorship_id))
        .filter(mentorship_charge::Column::MentorId.eq(mentor_id))
        .order_by_desc(mentorship_charge::Column::DueDate)
        .all(db)
        .await?;

    Ok(charges
        .into_iter()
        .map(|charge| {
            if charge.status == ChargeStatus::Pending && charge.due_date < today {
                mentorship_charge::Model {
                    status: ChargeStatus::Overdue,
                    ..charge
                }
            } else {
                charge
            }
        })
        .collect())
}

async fn charge_for_mentor(
    db: &DatabaseConnection,
    charge_id: i64,
    mentor_id: &str,
) -> Result<mentorship_charge::Model> {
    MentorshipCharge::find_by_id(charge_id)
        .filter(mentorship_charge::Column::MentorId.eq(mentor_id))
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "mentorship charge",
        })
}

/// Updates a charge's description, amount or due date.
pub async fn update_charge(
    db: &DatabaseConnection,
    clock: &Clock,
    charge_id: i64,
    mentor_id: &str,
    payload: UpdateChargePayload,
) -> Result<mentorship_charge::Model> {
    let charge = charge_for_mentor(db, charge_id, mentor_id).await?;

    let mut active: mentorship_charge::ActiveModel = charge.into();
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(amount);
    }
    if let Some(due_date) = payload.due_date {
        active.due_date = Set(due_date);
    }
    active.updated_at = Set(clock.now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a charge.
pub async fn delete_charge(
    db: &DatabaseConnection,
    charge_id: i64,
    mentor_id: &str,
) -> Result<()> {
    let deleted = MentorshipCharge::delete_many()
        .filter(mentorship_charge::Column::Id.eq(charge_id))
        .filter(mentorship_charge::Column::MentorId.eq(mentor_id))
        .exec(db)
        .await?
        .rows_affected;

    if deleted == 0 {
        return Err(Error::NotFound {
            entity: "mentorship charge",
        });
    }
    Ok(())
}

/// Marks a charge as paid.
pub async fn mark_charge_paid(
    db: &DatabaseConnection,
    clock: &Clock,
    charge_id: i64,
    mentor_id: &str,
) -> Result<mentorship_charge::Model> {
    let charge = charge_for_mentor(db, charge_id, mentor_id).await?;
    let now = clock.now();

    let mut active: mentorship_charge::ActiveModel = charge.into();
    active.status = Set(ChargeStatus::Paid);
    active.paid_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(db).await.map_err(Into::into)
}

/// Requests a reminder for a charge.
///
/// Verifies the charge exists and belongs to the mentor, then records the
/// request. Delivery itself belongs to the external notification service.
// TODO: hand the request off to the notification collaborator once one exists
pub async fn send_charge_reminder(
    db: &DatabaseConnection,
    charge_id: i64,
    mentor_id: &str,
) -> Result<()> {
    let charge = charge_for_mentor(db, charge_id, mentor_id).await?;
    info!(
        charge_id = charge.id,
        mentorship_id = charge.mentorship_id,
        "charge reminder queued for dispatch"
    );
    Ok(())
}
