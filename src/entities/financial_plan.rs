//! Financial plan entity - Represents a mentee's recurring billing arrangement.
//!
//! One plan per mentorship in normal use, owned by the mentor. The plan carries
//! the billing terms (total, installments, frequency) and the rolling billing
//! state (`next_billing_date`, `last_payment_date`). Plans are never hard
//! deleted; the lifecycle manager only moves them through statuses.

use super::enums::{BillingFrequency, PaymentModality, PaymentType, PlanStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Financial plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_plans")]
pub struct Model {
    /// Unique identifier for the plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mentorship this plan bills for
    pub mentorship_id: i64,
    /// Mentee user ID
    pub mentee_id: String,
    /// Mentor user ID; the owner of the plan
    pub mentor_id: String,
    /// Payment instrument agreed with the mentee
    pub payment_type: PaymentType,
    /// Lump sum or installments
    pub payment_modality: PaymentModality,
    /// Total value of the plan
    pub total_amount: Decimal,
    /// Number of installments, at least 1
    pub installments: i32,
    /// `total_amount / installments`, recomputed whenever either changes
    pub installment_amount: Decimal,
    /// Step between billing dates
    pub billing_frequency: BillingFrequency,
    /// Step in days when `billing_frequency` is CUSTOM
    pub custom_frequency_days: Option<i32>,
    /// First billing day
    pub start_date: Date,
    /// Day the plan stops billing; strictly after `start_date`
    pub expiration_date: Date,
    /// Next day a charge is expected
    pub next_billing_date: Option<Date>,
    /// Day of the most recent confirmed payment
    pub last_payment_date: Option<Date>,
    /// Lifecycle status
    pub status: PlanStatus,
    /// Free-form notes from the mentor
    pub notes: Option<String>,
    /// When the plan was created
    pub created_at: DateTimeUtc,
    /// When the plan was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `FinancialPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each plan belongs to one mentorship
    #[sea_orm(
        belongs_to = "super::mentorship::Entity",
        from = "Column::MentorshipId",
        to = "super::mentorship::Column::Id"
    )]
    Mentorship,
    /// One plan has many billing reminders
    #[sea_orm(has_many = "super::billing_reminder::Entity")]
    BillingReminders,
    /// One plan has many payment history rows
    #[sea_orm(has_many = "super::payment_history::Entity")]
    PaymentHistory,
}

impl Related<super::mentorship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mentorship.def()
    }
}

impl Related<super::billing_reminder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingReminders.def()
    }
}

impl Related<super::payment_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
