//! Mentorship charge entity - A one-off billing item outside the plan schedule.

use super::enums::ChargeStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ad-hoc charge database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mentorship_charges")]
pub struct Model {
    /// Unique identifier for the charge
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mentorship the charge belongs to
    pub mentorship_id: i64,
    /// Mentor user ID; the owner of the charge
    pub mentor_id: String,
    /// What the charge is for
    pub description: String,
    /// Amount due
    pub amount: Decimal,
    /// Calendar day the charge is due
    pub due_date: Date,
    /// Lifecycle status
    pub status: ChargeStatus,
    /// Instant the charge was marked paid
    pub paid_at: Option<DateTimeUtc>,
    /// When the charge was created
    pub created_at: DateTimeUtc,
    /// When the charge was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MentorshipCharge` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each charge belongs to one mentorship
    #[sea_orm(
        belongs_to = "super::mentorship::Entity",
        from = "Column::MentorshipId",
        to = "super::mentorship::Column::Id"
    )]
    Mentorship,
}

impl Related<super::mentorship::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mentorship.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
