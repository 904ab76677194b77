//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod billing_reminder;
pub mod enums;
pub mod financial_plan;
pub mod mentorship;
pub mod mentorship_charge;
pub mod payment_history;

// Re-export specific types to avoid conflicts
pub use billing_reminder::{
    Column as BillingReminderColumn, Entity as BillingReminder, Model as BillingReminderModel,
};
pub use enums::{
    BillingFrequency, ChargeStatus, MentorshipStatus, PaymentModality, PaymentType, PlanStatus,
    ReminderStatus,
};
pub use financial_plan::{
    Column as FinancialPlanColumn, Entity as FinancialPlan, Model as FinancialPlanModel,
};
pub use mentorship::{Column as MentorshipColumn, Entity as Mentorship, Model as MentorshipModel};
pub use mentorship_charge::{
    Column as MentorshipChargeColumn, Entity as MentorshipCharge, Model as MentorshipChargeModel,
};
pub use payment_history::{
    Column as PaymentHistoryColumn, Entity as PaymentHistory, Model as PaymentHistoryModel,
};
