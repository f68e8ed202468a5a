//! Purchase lifecycle state machine
//!
//! Submission, purchase confirmation, exception flagging, and termination.
//! This is the only transition implementation; the batch allocation path in
//! [`crate::core::allocation`] drives the same `confirm_purchase` per line.
//!
//! # Write ordering
//!
//! `confirm_purchase` validates everything against fetched state before the
//! first write, then sequences: purchase line → ledger transaction → balance
//! delta. A failure between those writes is surfaced as-is; the committed
//! prefix stays. The dedup guard makes re-driving a confirmation safe once
//! its deduction row exists.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::dedup::{deduction_memo, reversal_memo};
use crate::core::engine::ProcurementEngine;
use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{
    FundTransaction, LineId, NewPurchaseLine, Operator, ProcurementError, PurchaseLine,
    PurchaseStatus, TransactionId, TransactionKind,
};

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Submit a new purchase line
    ///
    /// Creates the line in `Submitted` status with the submitting operator
    /// and timestamp stamped on.
    ///
    /// # Arguments
    ///
    /// * `input` - SKU, optional product name, quantity, and site
    /// * `operator` - Operator submitting the request
    ///
    /// # Returns
    ///
    /// * `Ok(PurchaseLine)` - The persisted line
    /// * `Err(ProcurementError::EmptySku)` - If the SKU is blank
    /// * `Err(ProcurementError::InvalidQuantity)` - If the quantity is zero
    pub async fn submit(
        &self,
        input: NewPurchaseLine,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        if input.sku.trim().is_empty() {
            return Err(ProcurementError::EmptySku);
        }

        let id = LineId::new();
        if input.quantity == 0 {
            return Err(ProcurementError::invalid_quantity(id, 0));
        }

        let line = PurchaseLine::submitted(id, input, operator, Utc::now());
        self.purchases.save(&line).await?;

        info!(
            line = %line.id,
            sku = %line.sku,
            quantity = line.quantity,
            site = %line.site,
            operator = %operator,
            "purchase line submitted"
        );
        Ok(line)
    }

    /// Confirm a submitted line against a purchase order
    ///
    /// This method confirms a purchase by:
    /// 1. Re-fetching the line and validating the PO number, amount, and status
    /// 2. Checking the ledger for an existing deduction on (PO number, SKU)
    /// 3. Saving the line as `Purchased` with the PO linkage and audit stamps
    /// 4. Creating the negative deduction transaction
    /// 5. Applying the balance delta to the line's site fund
    ///
    /// # Arguments
    ///
    /// * `id` - The line to confirm
    /// * `po_number` - Purchase order number (required, dedup key)
    /// * `amount` - Order amount for this line (non-negative)
    /// * `operator` - Operator confirming the purchase
    ///
    /// # Returns
    ///
    /// * `Ok(PurchaseLine)` - The confirmed line
    /// * `Err(ProcurementError::LineNotFound)` - If the id is unknown
    /// * `Err(ProcurementError::MissingPoNumber)` - If the PO number is blank
    /// * `Err(ProcurementError::InvalidAmount)` - If the amount is negative
    /// * `Err(ProcurementError::InvalidTransition)` - If the line is not `Submitted`
    /// * `Err(ProcurementError::DuplicateDeduction)` - If a deduction for this
    ///   (PO number, SKU) pair was already posted
    pub async fn confirm_purchase(
        &self,
        id: LineId,
        po_number: &str,
        amount: Decimal,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let mut line = self.fetch_line(id).await?;

        let po_number = po_number.trim();
        if po_number.is_empty() {
            return Err(ProcurementError::MissingPoNumber);
        }
        if amount < Decimal::ZERO {
            return Err(ProcurementError::invalid_amount(
                amount,
                "purchase confirmation",
            ));
        }
        if !line.status.can_confirm() {
            return Err(ProcurementError::invalid_transition(
                id,
                line.status,
                "purchased",
            ));
        }

        // Idempotency guard, before any write
        if let Err(err) = self.ensure_deduction_absent(po_number, &line.sku).await {
            warn!(line = %id, po = po_number, sku = %line.sku, "duplicate deduction rejected");
            return Err(err);
        }

        let now = Utc::now();
        line.status = PurchaseStatus::Purchased;
        line.po_number = Some(po_number.to_string());
        line.order_amount = Some(amount);
        line.purchased_by = Some(operator.as_str().to_string());
        line.purchased_at = Some(now);
        self.purchases.save(&line).await?;

        let tx = FundTransaction {
            id: TransactionId::new(),
            site: line.site,
            kind: TransactionKind::PurchaseDeduction,
            amount: -amount,
            description: deduction_memo(po_number, &line.sku),
            po_number: Some(po_number.to_string()),
            sku: Some(line.sku.clone()),
            created_by: operator.as_str().to_string(),
            created_at: now,
            actual_paid: None,
            payment_date: None,
        };
        self.ledger.create(&tx).await?;
        self.ledger.apply_balance_delta(line.site, -amount).await?;

        info!(
            line = %id,
            po = po_number,
            amount = %amount,
            site = %line.site,
            operator = %operator,
            "purchase confirmed and deduction posted"
        );
        Ok(line)
    }

    /// Flag a line for manual investigation
    ///
    /// Allowed from `Submitted` and `Purchased`. Never touches the ledger;
    /// a deduction posted before the flag stays posted.
    ///
    /// # Arguments
    ///
    /// * `id` - The line to flag
    /// * `operator` - Operator flagging the line
    pub async fn mark_exception(
        &self,
        id: LineId,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let mut line = self.fetch_line(id).await?;

        if !line.status.can_mark_exception() {
            return Err(ProcurementError::invalid_transition(
                id,
                line.status,
                "flagged as exception",
            ));
        }

        line.status = PurchaseStatus::Exception;
        line.exception_at = Some(Utc::now());
        self.purchases.save(&line).await?;

        warn!(line = %id, sku = %line.sku, operator = %operator, "purchase line flagged as exception");
        Ok(line)
    }

    /// Terminate a line
    ///
    /// Allowed from `Submitted`, `Purchased`, and `Exception`. The line is
    /// saved as `Terminated` first; when the policy enables reversal and the
    /// line carries a posted deduction, a compensating `DeductionReversal`
    /// is then created and the site balance credited. The reversal is keyed
    /// on (PO number, SKU) and is never posted twice.
    ///
    /// # Arguments
    ///
    /// * `id` - The line to terminate
    /// * `operator` - Operator terminating the line
    pub async fn terminate(
        &self,
        id: LineId,
        operator: &Operator,
    ) -> Result<PurchaseLine, ProcurementError> {
        let mut line = self.fetch_line(id).await?;

        if !line.status.can_terminate() {
            return Err(ProcurementError::invalid_transition(
                id,
                line.status,
                "terminated",
            ));
        }

        line.status = PurchaseStatus::Terminated;
        line.terminated_at = Some(Utc::now());
        self.purchases.save(&line).await?;

        if self.policy.reverse_on_terminate {
            if let (Some(po_number), Some(amount)) = (line.po_number.clone(), line.order_amount) {
                self.reverse_deduction(&line, &po_number, amount, operator)
                    .await?;
            }
        }

        info!(line = %id, sku = %line.sku, operator = %operator, "purchase line terminated");
        Ok(line)
    }

    /// Post the compensating credit for a terminated line's deduction
    async fn reverse_deduction(
        &self,
        line: &PurchaseLine,
        po_number: &str,
        amount: Decimal,
        operator: &Operator,
    ) -> Result<(), ProcurementError> {
        let existing = self
            .ledger
            .find_matching(po_number, &line.sku, TransactionKind::DeductionReversal)
            .await?;
        if existing.is_some() {
            warn!(line = %line.id, po = po_number, "reversal already posted, skipping");
            return Ok(());
        }

        let tx = FundTransaction {
            id: TransactionId::new(),
            site: line.site,
            kind: TransactionKind::DeductionReversal,
            amount,
            description: reversal_memo(po_number, &line.sku),
            po_number: Some(po_number.to_string()),
            sku: Some(line.sku.clone()),
            created_by: operator.as_str().to_string(),
            created_at: Utc::now(),
            actual_paid: None,
            payment_date: None,
        };
        self.ledger.create(&tx).await?;
        self.ledger.apply_balance_delta(line.site, amount).await?;

        info!(
            line = %line.id,
            po = po_number,
            amount = %amount,
            site = %line.site,
            "deduction reversed on termination"
        );
        Ok(())
    }
}
