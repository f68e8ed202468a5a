//! Store trait seams for the procurement engine
//!
//! Each trait models a remote backing store. Every call is a round-trip
//! that can fail independently, and the engine awaits them in a strict
//! sequence; there are no cross-store transactions. A failure mid-sequence
//! leaves every earlier write committed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{
    FundTransaction, LineId, ProcurementError, PurchaseFilter, PurchaseLine, Site, SiteFund,
    StockItem, TransactionId, TransactionKind,
};

/// Backing store for purchase lines
#[allow(async_fn_in_trait)]
pub trait PurchaseStore: Send + Sync {
    /// Fetch a line by id
    ///
    /// Returns `Ok(None)` when the id is unknown; `Err` only for transport
    /// failures.
    async fn get(&self, id: LineId) -> Result<Option<PurchaseLine>, ProcurementError>;

    /// Persist a line, inserting or replacing by id
    async fn save(&self, line: &PurchaseLine) -> Result<(), ProcurementError>;

    /// Fetch the lines matching a filter
    ///
    /// The default filter matches everything, so this doubles as a full
    /// listing. Result ordering is unspecified.
    async fn query(&self, filter: &PurchaseFilter) -> Result<Vec<PurchaseLine>, ProcurementError>;
}

/// Backing store for the fund ledger
///
/// Balance mutation goes through the delta primitives only. The engine
/// never reads a balance, adds to it, and writes it back; the store applies
/// the increment as one operation.
#[allow(async_fn_in_trait)]
pub trait LedgerStore: Send + Sync {
    /// Fetch a transaction by id
    async fn get(&self, id: TransactionId) -> Result<Option<FundTransaction>, ProcurementError>;

    /// Persist a new transaction row
    async fn create(&self, tx: &FundTransaction) -> Result<(), ProcurementError>;

    /// Replace an existing transaction row
    async fn update(&self, tx: &FundTransaction) -> Result<(), ProcurementError>;

    /// Delete a transaction row
    async fn delete(&self, id: TransactionId) -> Result<(), ProcurementError>;

    /// List every transaction row
    async fn list(&self) -> Result<Vec<FundTransaction>, ProcurementError>;

    /// Look up a transaction by its structured dedup key
    ///
    /// Matches on (`po_number`, `sku`, `kind`). This is the idempotency
    /// lookup for purchase deductions and their reversals.
    async fn find_matching(
        &self,
        po_number: &str,
        sku: &str,
        kind: TransactionKind,
    ) -> Result<Option<FundTransaction>, ProcurementError>;

    /// Fetch a site's fund state, zeroed if the site has no rows yet
    async fn fund(&self, site: Site) -> Result<SiteFund, ProcurementError>;

    /// Atomically add `delta` to a site's balance
    ///
    /// Creates the fund row if absent. Returns the state after the delta.
    async fn apply_balance_delta(
        &self,
        site: Site,
        delta: Decimal,
    ) -> Result<SiteFund, ProcurementError>;

    /// Atomically add `delta` to a site's confirmed-payment total
    ///
    /// Creates the fund row if absent. Returns the state after the delta.
    async fn apply_actual_paid_delta(
        &self,
        site: Site,
        delta: Decimal,
    ) -> Result<SiteFund, ProcurementError>;
}

/// Backing store for inventory
#[allow(async_fn_in_trait)]
pub trait StockSync: Send + Sync {
    /// Fetch a stock row by SKU
    async fn get(&self, sku: &str) -> Result<Option<StockItem>, ProcurementError>;

    /// Add an inbound quantity to a SKU, creating the row if absent
    ///
    /// `quantity` is the delta of this receipt, not a cumulative total.
    /// Stamps `last_inbound_at` and returns the row after the increment.
    async fn add_inbound(
        &self,
        sku: &str,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<StockItem, ProcurementError>;
}
