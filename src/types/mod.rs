//! Types module
//!
//! Contains core data structures used throughout the engine.
//! This module organizes types into logical submodules:
//! - `purchase`: Purchase-line aggregate, lifecycle status, sites, operators
//! - `fund`: Site funds and signed ledger transactions
//! - `stock`: Inventory rows
//! - `error`: Error types for the procurement engine

pub mod error;
pub mod fund;
pub mod purchase;
pub mod stock;

pub use error::ProcurementError;
pub use fund::{FundTransaction, SiteFund, SiteSummary, TransactionId, TransactionKind};
pub use purchase::{
    LineId, NewPurchaseLine, Operator, PurchaseFilter, PurchaseLine, PurchaseStatus, Site,
};
pub use stock::StockItem;
