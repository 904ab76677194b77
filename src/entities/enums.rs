//! Closed-variant status, frequency and type enums shared across entities.
//!
//! Every status-like field in the schema is a tagged enum stored as a string
//! column, never an open string. The stored values match the wire values the
//! rest of the platform uses (uppercase for plan/reminder statuses and
//! frequencies, lowercase for payment types, modalities and charge statuses).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a financial plan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PlanStatus {
    /// Billing is running normally
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Billing paused by the mentor; reactivation possible
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
    /// Past its expiration date, or expired manually
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
    /// Terminated; never billed again
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
    /// Created but not yet activated
    #[sea_orm(string_value = "PENDING")]
    Pending,
}

/// Lifecycle status of a single billing reminder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ReminderStatus {
    /// Awaiting payment, not yet due
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Dispatched to the mentee by an external notifier
    #[sea_orm(string_value = "SENT")]
    Sent,
    /// Payment confirmed by the mentor
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Due date passed without payment
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    /// Cancelled by the mentor; terminal
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// How often a plan bills.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum BillingFrequency {
    /// Every month
    #[sea_orm(string_value = "MONTHLY")]
    Monthly,
    /// Every three months
    #[sea_orm(string_value = "QUARTERLY")]
    Quarterly,
    /// Every six months
    #[sea_orm(string_value = "SEMIANNUAL")]
    Semiannual,
    /// Every year
    #[sea_orm(string_value = "ANNUAL")]
    Annual,
    /// Every `custom_frequency_days` days
    #[sea_orm(string_value = "CUSTOM")]
    Custom,
}

/// Payment instrument used by the mentee.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentType {
    /// Instant bank transfer (PIX)
    #[sea_orm(string_value = "pix")]
    Pix,
    /// Credit card
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Debit card
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
    /// Conventional bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cash in hand
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Whether the plan is settled up front or in installments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum PaymentModality {
    /// Single lump-sum payment
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Split into installments
    #[sea_orm(string_value = "installment")]
    Installment,
}

/// Status of the mentorship linked to a plan, mirrored by lifecycle operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MentorshipStatus {
    /// Mentorship in progress
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Paused alongside the plan
    #[sea_orm(string_value = "SUSPENDED")]
    Suspended,
    /// Ended by elapsed time
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
    /// Terminated
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Status of an ad-hoc mentorship charge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ChargeStatus {
    /// Awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past due
    #[sea_orm(string_value = "overdue")]
    Overdue,
}
