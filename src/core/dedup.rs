//! Deduction dedup guard
//!
//! A purchase deduction is keyed by (PO number, SKU). The structured key
//! lives on the transaction row itself and is what the guard queries; the
//! memo rendered into the description is display text only and is never
//! parsed back.

use crate::core::engine::ProcurementEngine;
use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{ProcurementError, TransactionKind};

/// Render the human-readable memo for a purchase deduction
pub fn deduction_memo(po_number: &str, sku: &str) -> String {
    format!("PO {po_number} ({sku})")
}

/// Render the memo for a termination reversal
pub fn reversal_memo(po_number: &str, sku: &str) -> String {
    format!("Reversal of PO {po_number} ({sku})")
}

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Fail if a deduction for this (PO number, SKU) pair already exists
    ///
    /// Runs before any write in a purchase confirmation, so re-driving a
    /// confirmation whose deduction already posted is rejected instead of
    /// double-charging the site.
    pub(crate) async fn ensure_deduction_absent(
        &self,
        po_number: &str,
        sku: &str,
    ) -> Result<(), ProcurementError> {
        if self
            .ledger
            .find_matching(po_number, sku, TransactionKind::PurchaseDeduction)
            .await?
            .is_some()
        {
            return Err(ProcurementError::duplicate_deduction(po_number, sku));
        }
        Ok(())
    }
}
