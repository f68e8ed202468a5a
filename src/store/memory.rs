//! In-memory store bindings
//!
//! DashMap-backed implementations of the store traits. These are the
//! bindings the test suites run against; they are also usable directly by
//! callers that do not need a remote backend.
//!
//! # Thread Safety
//!
//! All three stores use DashMap for fine-grained per-key locking and can be
//! shared across tasks behind an `Arc`. The balance and actual-paid deltas
//! mutate the fund row under its shard lock, so concurrent deltas to the
//! same site never lose updates.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::store::traits::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{
    FundTransaction, LineId, ProcurementError, PurchaseFilter, PurchaseLine, Site, SiteFund,
    StockItem, TransactionId, TransactionKind,
};

/// In-memory purchase-line store
#[derive(Debug, Default)]
pub struct InMemoryPurchaseStore {
    lines: DashMap<LineId, PurchaseLine>,
}

impl InMemoryPurchaseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PurchaseStore for InMemoryPurchaseStore {
    async fn get(&self, id: LineId) -> Result<Option<PurchaseLine>, ProcurementError> {
        Ok(self.lines.get(&id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, line: &PurchaseLine) -> Result<(), ProcurementError> {
        self.lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn query(
        &self,
        filter: &PurchaseFilter,
    ) -> Result<Vec<PurchaseLine>, ProcurementError> {
        Ok(self
            .lines
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }
}

/// In-memory fund-ledger store
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    transactions: DashMap<TransactionId, FundTransaction>,
    funds: DashMap<Site, SiteFund>,
}

impl InMemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn get(&self, id: TransactionId) -> Result<Option<FundTransaction>, ProcurementError> {
        Ok(self.transactions.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, tx: &FundTransaction) -> Result<(), ProcurementError> {
        self.transactions.insert(tx.id, tx.clone());
        Ok(())
    }

    async fn update(&self, tx: &FundTransaction) -> Result<(), ProcurementError> {
        self.transactions.insert(tx.id, tx.clone());
        Ok(())
    }

    async fn delete(&self, id: TransactionId) -> Result<(), ProcurementError> {
        self.transactions.remove(&id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<FundTransaction>, ProcurementError> {
        Ok(self.transactions.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn find_matching(
        &self,
        po_number: &str,
        sku: &str,
        kind: TransactionKind,
    ) -> Result<Option<FundTransaction>, ProcurementError> {
        Ok(self
            .transactions
            .iter()
            .find(|entry| {
                entry.kind == kind
                    && entry.po_number.as_deref() == Some(po_number)
                    && entry.sku.as_deref() == Some(sku)
            })
            .map(|entry| entry.value().clone()))
    }

    async fn fund(&self, site: Site) -> Result<SiteFund, ProcurementError> {
        Ok(self
            .funds
            .get(&site)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| SiteFund::new(site)))
    }

    async fn apply_balance_delta(
        &self,
        site: Site,
        delta: Decimal,
    ) -> Result<SiteFund, ProcurementError> {
        let mut entry = self.funds.entry(site).or_insert_with(|| SiteFund::new(site));
        entry.balance += delta;
        Ok(entry.clone())
    }

    async fn apply_actual_paid_delta(
        &self,
        site: Site,
        delta: Decimal,
    ) -> Result<SiteFund, ProcurementError> {
        let mut entry = self.funds.entry(site).or_insert_with(|| SiteFund::new(site));
        entry.actual_paid += delta;
        Ok(entry.clone())
    }
}

/// In-memory inventory store
#[derive(Debug, Default)]
pub struct InMemoryStockSync {
    items: DashMap<String, StockItem>,
}

impl InMemoryStockSync {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockSync for InMemoryStockSync {
    async fn get(&self, sku: &str) -> Result<Option<StockItem>, ProcurementError> {
        Ok(self.items.get(sku).map(|entry| entry.value().clone()))
    }

    async fn add_inbound(
        &self,
        sku: &str,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<StockItem, ProcurementError> {
        let mut entry = self
            .items
            .entry(sku.to_string())
            .or_insert_with(|| StockItem::new(sku));
        entry.quantity += quantity;
        entry.last_inbound_at = Some(at);
        Ok(entry.clone())
    }
}
