//! Procurement engine orchestration
//!
//! This module provides the `ProcurementEngine` struct, which coordinates
//! the purchase store, fund ledger, and stock sync behind one set of
//! lifecycle operations.
//!
//! # Design
//!
//! The engine holds no domain state of its own. Every operation re-fetches
//! the record it is about to mutate, validates against the fetched state,
//! and then awaits the store writes in a strict sequence. The stores are
//! independent remote systems; there is no cross-store transaction, and a
//! failure mid-sequence leaves the earlier writes committed and observable.
//!
//! # Architecture
//!
//! ```text
//! ProcurementEngine
//!     ├── Arc<P: PurchaseStore>  (purchase lines)
//!     ├── Arc<L: LedgerStore>    (fund transactions and site balances)
//!     └── Arc<S: StockSync>      (inventory)
//! ```
//!
//! # Thread Safety
//!
//! The engine is cloneable and can be shared across async tasks. All
//! internal references are Arc-wrapped, and the store implementations are
//! responsible for their own synchronization.

use std::sync::Arc;

use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{LineId, ProcurementError, PurchaseFilter, PurchaseLine};

/// Behavior switches for the purchase lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecyclePolicy {
    /// Post a compensating ledger credit when terminating a confirmed line
    ///
    /// Off by default: termination closes the line and leaves the ledger
    /// untouched. When enabled, terminating a line that carries a PO number
    /// and order amount posts a `DeductionReversal` for the deducted amount,
    /// at most once per (PO number, SKU) pair.
    pub reverse_on_terminate: bool,
}

/// Orchestrator for the purchase lifecycle and fund ledger
///
/// `ProcurementEngine` coordinates lifecycle transitions, goods receipts,
/// batch allocations, and ledger entries across the three backing stores.
/// It can be cloned and shared across tasks; clones operate on the same
/// underlying stores.
#[derive(Debug)]
pub struct ProcurementEngine<P, L, S> {
    /// Purchase-line store
    pub(crate) purchases: Arc<P>,

    /// Fund-ledger store
    pub(crate) ledger: Arc<L>,

    /// Inventory store
    pub(crate) stock: Arc<S>,

    /// Lifecycle behavior switches
    pub(crate) policy: LifecyclePolicy,
}

impl<P, L, S> Clone for ProcurementEngine<P, L, S> {
    fn clone(&self) -> Self {
        Self {
            purchases: Arc::clone(&self.purchases),
            ledger: Arc::clone(&self.ledger),
            stock: Arc::clone(&self.stock),
            policy: self.policy,
        }
    }
}

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Create an engine with the default policy
    ///
    /// # Arguments
    ///
    /// * `purchases` - Arc-wrapped purchase-line store
    /// * `ledger` - Arc-wrapped fund-ledger store
    /// * `stock` - Arc-wrapped inventory store
    pub fn new(purchases: Arc<P>, ledger: Arc<L>, stock: Arc<S>) -> Self {
        Self::with_policy(purchases, ledger, stock, LifecyclePolicy::default())
    }

    /// Create an engine with an explicit policy
    pub fn with_policy(
        purchases: Arc<P>,
        ledger: Arc<L>,
        stock: Arc<S>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            purchases,
            ledger,
            stock,
            policy,
        }
    }

    /// The policy this engine was built with
    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// Fetch the purchase lines matching a filter
    ///
    /// Unset filter fields match everything; set fields combine with AND.
    /// This is the read surface for status, SKU, and site views over the
    /// purchase record store.
    pub async fn query_purchases(
        &self,
        filter: &PurchaseFilter,
    ) -> Result<Vec<PurchaseLine>, ProcurementError> {
        self.purchases.query(filter).await
    }

    /// Fetch a purchase line, failing if the id is unknown
    ///
    /// Every mutating operation starts here so that validation always runs
    /// against the persisted state, not a caller-supplied snapshot.
    pub(crate) async fn fetch_line(&self, id: LineId) -> Result<PurchaseLine, ProcurementError> {
        self.purchases
            .get(id)
            .await?
            .ok_or_else(|| ProcurementError::line_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryLedgerStore, InMemoryPurchaseStore, InMemoryStockSync};

    fn engine() -> ProcurementEngine<InMemoryPurchaseStore, InMemoryLedgerStore, InMemoryStockSync>
    {
        ProcurementEngine::new(
            Arc::new(InMemoryPurchaseStore::new()),
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(InMemoryStockSync::new()),
        )
    }

    #[test]
    fn test_default_policy_does_not_reverse() {
        assert!(!engine().policy().reverse_on_terminate);
    }

    #[test]
    fn test_engine_is_cloneable_and_shares_stores() {
        let purchases = Arc::new(InMemoryPurchaseStore::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let stock = Arc::new(InMemoryStockSync::new());

        let engine = ProcurementEngine::new(
            Arc::clone(&purchases),
            Arc::clone(&ledger),
            Arc::clone(&stock),
        );
        let _clone = engine.clone();

        assert!(Arc::strong_count(&purchases) >= 3); // original + engine + clone
        assert!(Arc::strong_count(&ledger) >= 3);
        assert!(Arc::strong_count(&stock) >= 3);
    }

    #[tokio::test]
    async fn test_fetch_line_unknown_id() {
        let engine = engine();
        let result = engine.fetch_line(LineId::new()).await;
        assert!(matches!(result, Err(ProcurementError::LineNotFound { .. })));
    }

    #[tokio::test]
    async fn test_query_purchases_filters_by_status_and_site() {
        use crate::types::{NewPurchaseLine, Operator, PurchaseStatus, Site};
        use rust_decimal::Decimal;

        let engine = engine();
        let operator = Operator::new("alice").unwrap();
        let us = engine
            .submit(
                NewPurchaseLine {
                    sku: "SKU-A".to_string(),
                    product_name: None,
                    quantity: 5,
                    site: Site::UnitedStates,
                },
                &operator,
            )
            .await
            .unwrap();
        let de = engine
            .submit(
                NewPurchaseLine {
                    sku: "SKU-B".to_string(),
                    product_name: None,
                    quantity: 3,
                    site: Site::Germany,
                },
                &operator,
            )
            .await
            .unwrap();
        engine
            .confirm_purchase(us.id, "PO-1", Decimal::new(10000, 2), &operator)
            .await
            .unwrap();

        let all = engine
            .query_purchases(&PurchaseFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let submitted = engine
            .query_purchases(&PurchaseFilter {
                status: Some(PurchaseStatus::Submitted),
                ..PurchaseFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].id, de.id);

        let german = engine
            .query_purchases(&PurchaseFilter {
                site: Some(Site::Germany),
                sku: Some("SKU-B".to_string()),
                ..PurchaseFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(german.len(), 1);
        assert_eq!(german[0].id, de.id);
    }
}
