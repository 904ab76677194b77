//! Core business logic - framework-agnostic billing operations.
//!
//! One module per component: schedule generation, plan management, reminder
//! regeneration and queries, payment processing, lifecycle transitions, the
//! periodic expiration sweep, and the read-side aggregations.

/// Ad-hoc mentorship charges outside the plan schedule
pub mod charge;
/// Suspend, reactivate, expire and extend plans with mentorship cascade
pub mod lifecycle;
/// Payment confirmation and reversal state machine
pub mod payment;
/// Financial plan creation, update and listing
pub mod plan;
/// Reminder generation, regeneration and queries
pub mod reminder;
/// Financial reporting over payment history
pub mod report;
/// Pure due-date schedule generation
pub mod schedule;
/// One-pass financial statistics for a mentor
pub mod stats;
/// Periodic expiration and overdue sweep
pub mod sweeper;
