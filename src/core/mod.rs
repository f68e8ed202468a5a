//! Core business logic module
//!
//! This module contains the procurement engine and its operations:
//! - `engine` - Orchestrator struct and lifecycle policy
//! - `lifecycle` - Submission, confirmation, exception, termination
//! - `inbound` - Partial and full goods receipts
//! - `allocation` - Batch allocation of one PO across several lines
//! - `ledger` - Manual ledger entries and fund projections
//! - `dedup` - Deduction idempotency guard and memo rendering

pub mod allocation;
pub mod dedup;
pub mod engine;
pub mod inbound;
pub mod ledger;
pub mod lifecycle;

pub use allocation::BatchOutcome;
pub use dedup::{deduction_memo, reversal_memo};
pub use engine::{LifecyclePolicy, ProcurementEngine};
