//! Batch allocation over selected purchase lines
//!
//! A batch shares one PO number and one total amount across several
//! submitted lines. The selection is validated in full before any write;
//! after that each line is confirmed independently, so one failing line
//! does not roll back the lines confirmed before it. The outcome reports
//! both sets and the caller re-attempts exactly the failed remainder.
//!
//! # Split rule
//!
//! `row_amount = quantity / total_quantity * total_amount`, computed in
//! `Decimal` arithmetic. No remainder redistribution happens: the posted
//! row amounts may not sum to exactly `total_amount` when the division is
//! inexact, and that is the recorded truth.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::engine::ProcurementEngine;
use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{LineId, Operator, ProcurementError, PurchaseLine};

/// Result of a batch allocation
///
/// `confirmed` holds the lines whose confirmation fully committed;
/// `failed` pairs each remaining line with the error that stopped it.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Lines confirmed during this batch, in selection order
    pub confirmed: Vec<PurchaseLine>,

    /// Lines that failed, with the error each one hit
    pub failed: Vec<(LineId, ProcurementError)>,
}

impl BatchOutcome {
    /// Whether every selected line was confirmed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compute one line's share of the batch amount
///
/// Proportional by quantity, with no rounding adjustment.
pub(crate) fn proportional_amount(
    quantity: u32,
    total_quantity: u64,
    total_amount: Decimal,
) -> Decimal {
    Decimal::from(quantity) / Decimal::from(total_quantity) * total_amount
}

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Allocate one PO across several submitted lines
    ///
    /// This method processes a batch by:
    /// 1. Validating the selection, PO number, and total amount with no writes
    /// 2. Computing each line's proportional share of the total amount
    /// 3. Running a purchase confirmation per line, independently
    ///
    /// Each confirmation posts to the ledger of that line's own site. A
    /// line that fails mid-batch is recorded in the outcome and processing
    /// continues with the next line.
    ///
    /// # Arguments
    ///
    /// * `ids` - The selected lines
    /// * `po_number` - Shared purchase order number
    /// * `total_amount` - Total amount to split (non-negative)
    /// * `operator` - Operator driving the allocation
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOutcome)` - Confirmed and failed lines
    /// * `Err(ProcurementError::EmptySelection)` - If `ids` is empty
    /// * `Err(ProcurementError::MissingPoNumber)` - If the PO number is blank
    /// * `Err(ProcurementError::InvalidAmount)` - If `total_amount` is negative
    /// * `Err(ProcurementError::LineNotFound)` - If a selected id is unknown
    /// * `Err(ProcurementError::InvalidSelectionState)` - If a selected line
    ///   is not `Submitted`; nothing has been written
    /// * `Err(ProcurementError::ZeroQuantityAllocation)` - If the selection's
    ///   quantities sum to zero
    pub async fn allocate_batch(
        &self,
        ids: &[LineId],
        po_number: &str,
        total_amount: Decimal,
        operator: &Operator,
    ) -> Result<BatchOutcome, ProcurementError> {
        if ids.is_empty() {
            return Err(ProcurementError::EmptySelection);
        }
        let po_number = po_number.trim();
        if po_number.is_empty() {
            return Err(ProcurementError::MissingPoNumber);
        }
        if total_amount < Decimal::ZERO {
            return Err(ProcurementError::invalid_amount(
                total_amount,
                "batch allocation",
            ));
        }

        // Pre-validate the whole selection before the first write
        let mut lines = Vec::with_capacity(ids.len());
        for &id in ids {
            let line = self.fetch_line(id).await?;
            if !line.status.can_confirm() {
                return Err(ProcurementError::invalid_selection_state(id, line.status));
            }
            lines.push(line);
        }

        // Summed in u64 so a selection of large lines cannot wrap
        let total_quantity: u64 = lines.iter().map(|line| u64::from(line.quantity)).sum();
        if total_quantity == 0 {
            return Err(ProcurementError::zero_quantity_allocation(po_number));
        }

        let mut outcome = BatchOutcome {
            confirmed: Vec::with_capacity(lines.len()),
            failed: Vec::new(),
        };
        for line in lines {
            let row_amount = proportional_amount(line.quantity, total_quantity, total_amount);
            match self
                .confirm_purchase(line.id, po_number, row_amount, operator)
                .await
            {
                Ok(confirmed) => outcome.confirmed.push(confirmed),
                Err(err) => {
                    warn!(line = %line.id, po = po_number, error = %err, "batch line failed");
                    outcome.failed.push((line.id, err));
                }
            }
        }

        info!(
            po = po_number,
            total = %total_amount,
            confirmed = outcome.confirmed.len(),
            failed = outcome.failed.len(),
            operator = %operator,
            "batch allocation finished"
        );
        Ok(outcome)
    }
}
