//! Mentorship entity - The relationship a financial plan bills for.
//!
//! Lifecycle operations on a plan mirror their status change onto this row
//! (suspend, reactivate, expire), and extension moves `end_date` in lockstep
//! with the plan's expiration date.

use super::enums::MentorshipStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mentorship database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mentorships")]
pub struct Model {
    /// Unique identifier for the mentorship
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mentor user ID
    pub mentor_id: String,
    /// Mentee user ID
    pub mentee_id: String,
    /// Lifecycle status, kept in lockstep with the plan
    pub status: MentorshipStatus,
    /// Day the mentorship started
    pub start_date: Date,
    /// Day the mentorship ends, when known
    pub end_date: Option<Date>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Mentorship and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One mentorship has (in normal use, exactly one) financial plan
    #[sea_orm(has_many = "super::financial_plan::Entity")]
    FinancialPlans,
    /// One mentorship has many ad-hoc charges
    #[sea_orm(has_many = "super::mentorship_charge::Entity")]
    Charges,
}

impl Related<super::financial_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialPlans.def()
    }
}

impl Related<super::mentorship_charge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Charges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
