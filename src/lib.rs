//! Procurement Engine Library
//! # Overview
//!
//! This library drives a purchase lifecycle and reconciles it against
//! per-site fund ledgers and inventory, across three independent backing
//! stores with no cross-store transactions.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (PurchaseLine, FundTransaction, etc.)
//! - [`store`] - Store seams and in-memory bindings:
//!   - [`store::traits`] - `PurchaseStore`, `LedgerStore`, `StockSync`
//!   - [`store::memory`] - DashMap-backed implementations
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Orchestration and lifecycle policy
//!   - [`core::lifecycle`] - The purchase state machine
//!   - [`core::inbound`] - Goods receipt accumulation
//!   - [`core::allocation`] - Batch allocation across lines
//!   - [`core::ledger`] - Manual ledger entries and projections
//!
//! # Purchase Lifecycle
//!
//! A line moves through five persisted states:
//!
//! - **Submitted**: Requested by an operator, awaiting confirmation
//! - **Purchased**: Confirmed against a PO; a deduction posted to the site fund
//! - **Received**: Cumulative receipts equal the ordered quantity
//! - **Exception**: Flagged for investigation; the ledger is never touched
//! - **Terminated**: Closed; optionally reverses the deduction per policy
//!
//! # Write Ordering
//!
//! Every operation re-fetches its record, validates, then awaits store
//! writes in a strict sequence (line before ledger row before balance
//! before stock). A failure mid-sequence surfaces as-is; committed writes
//! stay observable and the deduction dedup guard makes re-driving a
//! confirmation safe.

// Module declarations
pub mod core;
pub mod store;
pub mod types;

pub use crate::core::{
    deduction_memo, reversal_memo, BatchOutcome, LifecyclePolicy, ProcurementEngine,
};
pub use store::{
    InMemoryLedgerStore, InMemoryPurchaseStore, InMemoryStockSync, LedgerStore, PurchaseStore,
    StockSync,
};
pub use types::{
    FundTransaction, LineId, NewPurchaseLine, Operator, ProcurementError, PurchaseFilter,
    PurchaseLine, PurchaseStatus, Site, SiteFund, SiteSummary, StockItem, TransactionId,
    TransactionKind,
};
