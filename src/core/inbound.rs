//! Goods receipt accumulation
//!
//! Partial and full receipts against a purchased line share one application
//! path: validate the delta, bump the cumulative received quantity, flip the
//! status to `Received` when the order is complete, then increment stock by
//! the delta of this receipt. The line persists before the stock write, so
//! a stock failure leaves an accurate line with stale inventory rather than
//! the other way around.

use chrono::Utc;
use tracing::info;

use crate::core::engine::ProcurementEngine;
use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{LineId, Operator, ProcurementError, PurchaseLine, PurchaseStatus};

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Receive part of a purchased line
    ///
    /// # Arguments
    ///
    /// * `id` - The line receiving goods
    /// * `quantity` - Units received in this delivery (must be > 0)
    /// * `operator` - Operator recording the receipt
    ///
    /// # Returns
    ///
    /// * `Ok(PurchaseLine)` - The line after the receipt; `Received` when
    ///   the cumulative quantity now equals the ordered quantity
    /// * `Err(ProcurementError::InvalidQuantity)` - If `quantity` is zero
    /// * `Err(ProcurementError::InvalidTransition)` - If the line is not `Purchased`
    /// * `Err(ProcurementError::OverReceipt)` - If the receipt would exceed
    ///   the ordered quantity; nothing is written
    pub async fn receive_partial(
        &self,
        id: LineId,
        quantity: u32,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let line = self.fetch_line(id).await?;

        if quantity == 0 {
            return Err(ProcurementError::invalid_quantity(id, 0));
        }
        if !line.status.can_receive() {
            return Err(ProcurementError::invalid_transition(
                id,
                line.status,
                "received against",
            ));
        }
        if quantity > line.remaining() {
            return Err(ProcurementError::over_receipt(
                id,
                line.quantity,
                line.received_quantity,
                quantity,
            ));
        }

        self.apply_receipt(line, quantity, operator).await
    }

    /// Receive everything still outstanding on a purchased line
    ///
    /// Clamps the cumulative quantity to the ordered quantity and flips the
    /// line to `Received` in one step.
    ///
    /// # Arguments
    ///
    /// * `id` - The line receiving goods
    /// * `operator` - Operator recording the receipt
    ///
    /// # Returns
    ///
    /// * `Ok(PurchaseLine)` - The fully received line
    /// * `Err(ProcurementError::InvalidTransition)` - If the line is not `Purchased`
    /// * `Err(ProcurementError::NothingToReceive)` - If no quantity remains
    pub async fn receive_remaining(
        &self,
        id: LineId,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let line = self.fetch_line(id).await?;

        if !line.status.can_receive() {
            return Err(ProcurementError::invalid_transition(
                id,
                line.status,
                "received against",
            ));
        }
        let remaining = line.remaining();
        if remaining == 0 {
            return Err(ProcurementError::nothing_to_receive(id));
        }

        self.apply_receipt(line, remaining, operator).await
    }

    /// Apply a validated receipt delta to a line
    ///
    /// Persists the bumped line, then increments stock by the delta. Stock
    /// is incremented by this receipt's quantity only, never the cumulative
    /// total, so repeated partial receipts do not double-count.
    async fn apply_receipt(
        &self,
        mut line: PurchaseLine,
        delta: u32,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let now = Utc::now();

        line.received_quantity = (line.received_quantity + delta).min(line.quantity);
        if line.received_quantity == line.quantity {
            line.status = PurchaseStatus::Received;
        }
        self.purchases.save(&line).await?;

        let stock = self.stock.add_inbound(&line.sku, delta, now).await?;

        info!(
            line = %line.id,
            sku = %line.sku,
            delta,
            received = line.received_quantity,
            ordered = line.quantity,
            on_hand = stock.quantity,
            operator = %operator,
            "goods receipt applied"
        );
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryLedgerStore, InMemoryPurchaseStore, InMemoryStockSync};
    use crate::types::{NewPurchaseLine, Site};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    type TestEngine =
        ProcurementEngine<InMemoryPurchaseStore, InMemoryLedgerStore, InMemoryStockSync>;

    fn engine() -> TestEngine {
        ProcurementEngine::new(
            Arc::new(InMemoryPurchaseStore::new()),
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(InMemoryStockSync::new()),
        )
    }

    fn operator() -> Operator {
        Operator::new("bob").unwrap()
    }

    /// Submit and confirm a line so receipts are allowed
    async fn purchased(engine: &TestEngine, sku: &str, quantity: u32) -> PurchaseLine {
        let line = engine
            .submit(
                NewPurchaseLine {
                    sku: sku.to_string(),
                    product_name: None,
                    quantity,
                    site: Site::Germany,
                },
                &operator(),
            )
            .await
            .unwrap();
        engine
            .confirm_purchase(line.id, "PO-1", Decimal::new(10000, 2), &operator())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_partial_receipts_accumulate() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;

        let after = engine.receive_partial(line.id, 3, &operator()).await.unwrap();
        assert_eq!(after.received_quantity, 3);
        assert_eq!(after.status, PurchaseStatus::Purchased);
        assert_eq!(after.status_label(), "purchased (remaining 7)");

        let after = engine.receive_partial(line.id, 4, &operator()).await.unwrap();
        assert_eq!(after.received_quantity, 7);
        assert_eq!(after.status, PurchaseStatus::Purchased);
    }

    #[tokio::test]
    async fn test_exact_final_receipt_flips_to_received() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;

        engine.receive_partial(line.id, 6, &operator()).await.unwrap();
        let after = engine.receive_partial(line.id, 4, &operator()).await.unwrap();

        assert_eq!(after.received_quantity, 10);
        assert_eq!(after.status, PurchaseStatus::Received);
    }

    #[tokio::test]
    async fn test_over_receipt_rejected_and_nothing_written() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;
        engine.receive_partial(line.id, 7, &operator()).await.unwrap();

        let result = engine.receive_partial(line.id, 5, &operator()).await;
        assert_eq!(
            result,
            Err(ProcurementError::over_receipt(line.id, 10, 7, 5))
        );

        // Line and stock unchanged by the rejected receipt
        let stored = engine.purchases.get(line.id).await.unwrap().unwrap();
        assert_eq!(stored.received_quantity, 7);
        let stock = engine.stock.get("SKU-A").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 7);
    }

    #[tokio::test]
    async fn test_huge_receipt_rejected_without_wrapping() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;
        engine.receive_partial(line.id, 7, &operator()).await.unwrap();

        // A delta near u32::MAX must fail the same way any over-receipt
        // does, not wrap the cumulative sum past the guard
        let result = engine.receive_partial(line.id, u32::MAX, &operator()).await;
        assert_eq!(
            result,
            Err(ProcurementError::over_receipt(line.id, 10, 7, u32::MAX))
        );

        let stored = engine.purchases.get(line.id).await.unwrap().unwrap();
        assert_eq!(stored.received_quantity, 7);
        let stock = engine.stock.get("SKU-A").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 7);
    }

    #[tokio::test]
    async fn test_zero_quantity_receipt_rejected() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;

        let result = engine.receive_partial(line.id, 0, &operator()).await;
        assert!(matches!(
            result,
            Err(ProcurementError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_receipt_rejected_before_purchase() {
        let engine = engine();
        let line = engine
            .submit(
                NewPurchaseLine {
                    sku: "SKU-A".to_string(),
                    product_name: None,
                    quantity: 10,
                    site: Site::Germany,
                },
                &operator(),
            )
            .await
            .unwrap();

        let result = engine.receive_partial(line.id, 3, &operator()).await;
        assert!(matches!(
            result,
            Err(ProcurementError::InvalidTransition {
                from: PurchaseStatus::Submitted,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_receipt_rejected_after_fully_received() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 5).await;
        engine.receive_remaining(line.id, &operator()).await.unwrap();

        let result = engine.receive_partial(line.id, 1, &operator()).await;
        assert!(matches!(
            result,
            Err(ProcurementError::InvalidTransition {
                from: PurchaseStatus::Received,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_receive_remaining_clamps_and_completes() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;
        engine.receive_partial(line.id, 4, &operator()).await.unwrap();

        let after = engine.receive_remaining(line.id, &operator()).await.unwrap();
        assert_eq!(after.received_quantity, 10);
        assert_eq!(after.status, PurchaseStatus::Received);

        // Stock saw 4 then 6, totaling the ordered quantity exactly
        let stock = engine.stock.get("SKU-A").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);
    }

    #[tokio::test]
    async fn test_receive_remaining_with_no_prior_receipts() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 8).await;

        let after = engine.receive_remaining(line.id, &operator()).await.unwrap();
        assert_eq!(after.received_quantity, 8);
        assert_eq!(after.status, PurchaseStatus::Received);
    }

    #[tokio::test]
    async fn test_stock_incremented_by_delta_not_cumulative() {
        let engine = engine();
        let line = purchased(&engine, "SKU-A", 10).await;

        engine.receive_partial(line.id, 3, &operator()).await.unwrap();
        engine.receive_partial(line.id, 3, &operator()).await.unwrap();
        engine.receive_partial(line.id, 4, &operator()).await.unwrap();

        // 3 + 3 + 4, not 3 + 6 + 10
        let stock = engine.stock.get("SKU-A").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 10);
        assert!(stock.last_inbound_at.is_some());
    }

    #[tokio::test]
    async fn test_receipts_on_shared_sku_accumulate_in_stock() {
        let engine = engine();
        let first = purchased(&engine, "SKU-A", 5).await;

        // Second line for the same SKU under a different PO
        let line = engine
            .submit(
                NewPurchaseLine {
                    sku: "SKU-A".to_string(),
                    product_name: None,
                    quantity: 3,
                    site: Site::Germany,
                },
                &operator(),
            )
            .await
            .unwrap();
        let second = engine
            .confirm_purchase(line.id, "PO-2", Decimal::new(5000, 2), &operator())
            .await
            .unwrap();

        engine.receive_remaining(first.id, &operator()).await.unwrap();
        engine.receive_remaining(second.id, &operator()).await.unwrap();

        let stock = engine.stock.get("SKU-A").await.unwrap().unwrap();
        assert_eq!(stock.quantity, 8);
    }

    #[test]
    fn test_random_receipt_sequences_conserve_quantity() {
        use proptest::prelude::*;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();

        proptest!(|(ordered in 1u32..50, deltas in proptest::collection::vec(1u32..20, 1..10))| {
            runtime.block_on(async {
                let engine = engine();
                let line = purchased(&engine, "SKU-P", ordered).await;

                for delta in deltas {
                    // Rejected receipts must not move any state
                    let _ = engine.receive_partial(line.id, delta, &operator()).await;
                }

                let stored = engine.purchases.get(line.id).await.unwrap().unwrap();
                prop_assert!(stored.received_quantity <= stored.quantity);

                let stock_quantity = engine
                    .stock
                    .get("SKU-P")
                    .await
                    .unwrap()
                    .map(|item| item.quantity)
                    .unwrap_or(0);
                prop_assert_eq!(stock_quantity, stored.received_quantity);

                if stored.received_quantity == stored.quantity {
                    prop_assert_eq!(stored.status, PurchaseStatus::Received);
                } else {
                    prop_assert_eq!(stored.status, PurchaseStatus::Purchased);
                }
                Ok(())
            })?;
        });
    }
}
