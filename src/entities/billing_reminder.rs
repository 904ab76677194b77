//! Billing reminder entity - One scheduled billing obligation with a due date.
//!
//! Reminders are created in batches by the schedule generator and mutated one
//! at a time by the payment processor and the expiration sweeper.
//! `installment_number`/`total_installments` are set only when the plan has
//! more than one installment.

use super::enums::ReminderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Billing reminder database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_reminders")]
pub struct Model {
    /// Unique identifier for the reminder
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Plan this reminder bills for
    pub plan_id: i64,
    /// Mentorship of the plan, denormalized for queries
    pub mentorship_id: i64,
    /// Mentee user ID, denormalized for queries
    pub mentee_id: String,
    /// Mentor user ID; the owner of the reminder
    pub mentor_id: String,
    /// Calendar day the payment is due
    pub due_date: Date,
    /// Amount due
    pub amount: Decimal,
    /// 1-based installment label; set only when the plan has more than one
    pub installment_number: Option<i32>,
    /// Total installments of the plan; set only when more than one
    pub total_installments: Option<i32>,
    /// Lifecycle status
    pub status: ReminderStatus,
    /// When the reminder was dispatched to the mentee, if ever
    pub sent_at: Option<DateTimeUtc>,
    /// When payment was confirmed
    pub paid_at: Option<DateTimeUtc>,
    /// Mentor who confirmed the payment
    pub confirmed_by: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the reminder was created
    pub created_at: DateTimeUtc,
    /// When the reminder was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `BillingReminder` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reminder belongs to one financial plan
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
