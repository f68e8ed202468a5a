//! Store module
//!
//! Contains the seams to the three remote stores the engine writes to, and
//! the in-memory reference bindings used by tests:
//! - `traits`: `PurchaseStore`, `LedgerStore`, `StockSync`
//! - `memory`: DashMap-backed implementations

pub mod memory;
pub mod traits;

pub use memory::{InMemoryLedgerStore, InMemoryPurchaseStore, InMemoryStockSync};
pub use traits::{LedgerStore, PurchaseStore, StockSync};
