//! Payment history entity - One confirmed payment.
//!
//! Exactly one row exists for a reminder iff that reminder is PAID; the
//! invariant is maintained by confirm/revert, not by a store constraint.
//! `reminder_id` is nullable to leave room for ad-hoc payments recorded
//! outside the reminder schedule.

use super::enums::PaymentType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment history database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_history")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Plan the payment settles against
    pub plan_id: i64,
    /// Mentorship of the plan, denormalized for queries
    pub mentorship_id: i64,
    /// Mentee user ID, denormalized for queries
    pub mentee_id: String,
    /// Mentor user ID; the owner of the record
    pub mentor_id: String,
    /// Amount collected
    pub amount: Decimal,
    /// Payment instrument, copied from the plan at confirmation time
    pub payment_type: PaymentType,
    /// Installment label copied from the reminder, when numbered
    pub installment_number: Option<i32>,
    /// Instant the payment was made
    pub payment_date: DateTimeUtc,
    /// Instant the mentor confirmed it
    pub confirmed_at: DateTimeUtc,
    /// Mentor who confirmed it
    pub confirmed_by: String,
    /// Reminder this payment settles, when it came from the schedule
    pub reminder_id: Option<i64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `PaymentHistory` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one financial plan
    #[sea_orm(
        belongs_to = "super::financial_plan::Entity",
        from = "Column::PlanId",
        to = "super::financial_plan::Column::Id"
    )]
    FinancialPlan,
}

impl Related<super::financial_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialPlan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
