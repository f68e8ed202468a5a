//! Manual ledger operations and fund projections
//!
//! Everything that touches the fund ledger outside a purchase confirmation:
//! recording repayments and expenses, deleting a transaction (with the
//! balance reversed), confirming payments, and the per-site summary
//! projections.
//!
//! # Sign convention
//!
//! Recorded amounts are normalized by kind, whatever sign the caller
//! passed: repayments and reversals are stored positive, everything else
//! negative. The balance delta applied alongside each row equals the
//! stored amount, so a site balance is always the sum of its rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::engine::ProcurementEngine;
use crate::store::{LedgerStore, PurchaseStore, StockSync};
use crate::types::{
    FundTransaction, Operator, ProcurementError, Site, SiteSummary, TransactionId, TransactionKind,
};

/// Compute the summary projection for one site from its transaction rows
///
/// `contract_amount` counts the magnitude of debit rows and subtracts any
/// reversal credits, so a reversed deduction drops back out of committed
/// spend. Repayments count toward the fund pool only.
pub(crate) fn summarize(site: Site, transactions: &[FundTransaction]) -> SiteSummary {
    let mut contract_amount = Decimal::ZERO;
    let mut repayment_total = Decimal::ZERO;
    let mut actual_paid_total = Decimal::ZERO;

    for tx in transactions.iter().filter(|tx| tx.site == site) {
        match tx.kind {
            TransactionKind::Repayment => repayment_total += tx.amount,
            TransactionKind::DeductionReversal => contract_amount -= tx.amount,
            TransactionKind::PurchaseDeduction | TransactionKind::OperatingExpense => {
                contract_amount += tx.amount.abs()
            }
        }
        if let Some(paid) = tx.actual_paid {
            actual_paid_total += paid;
        }
    }

    SiteSummary {
        site,
        contract_amount,
        repayment_total,
        actual_paid_total,
        fund_pool: repayment_total - actual_paid_total,
    }
}

impl<P, L, S> ProcurementEngine<P, L, S>
where
    P: PurchaseStore,
    L: LedgerStore,
    S: StockSync,
{
    /// Record a repayment into a site's fund
    ///
    /// The amount is normalized positive and credited to the balance.
    ///
    /// # Arguments
    ///
    /// * `site` - Site receiving the funds
    /// * `amount` - Repayment amount (any sign, must be non-zero)
    /// * `description` - Free-form memo
    /// * `operator` - Operator recording the entry
    pub async fn record_repayment(
        &self,
        site: Site,
        amount: Decimal,
        description: &str,
        operator: &Operator,
    ) -> Result<FundTransaction, ProcurementError> {
        self.record_manual(site, TransactionKind::Repayment, amount, description, operator)
            .await
    }

    /// Record a manual expense against a site's fund
    ///
    /// The amount is normalized by kind and the balance moved accordingly.
    ///
    /// # Arguments
    ///
    /// * `site` - Site carrying the cost
    /// * `kind` - Transaction kind (normally `OperatingExpense`)
    /// * `amount` - Expense amount (any sign, must be non-zero)
    /// * `description` - Free-form memo
    /// * `operator` - Operator recording the entry
    pub async fn record_expense(
        &self,
        site: Site,
        kind: TransactionKind,
        amount: Decimal,
        description: &str,
        operator: &Operator,
    ) -> Result<FundTransaction, ProcurementError> {
        self.record_manual(site, kind, amount, description, operator)
            .await
    }

    /// Create a manual ledger row and apply its balance delta
    async fn record_manual(
        &self,
        site: Site,
        kind: TransactionKind,
        amount: Decimal,
        description: &str,
        operator: &Operator,
    ) -> Result<FundTransaction, ProcurementError> {
        if amount == Decimal::ZERO {
            return Err(ProcurementError::invalid_amount(amount, "ledger entry"));
        }
        let signed = if kind.is_credit() {
            amount.abs()
        } else {
            -amount.abs()
        };

        let tx = FundTransaction {
            id: TransactionId::new(),
            site,
            kind,
            amount: signed,
            description: description.to_string(),
            po_number: None,
            sku: None,
            created_by: operator.as_str().to_string(),
            created_at: Utc::now(),
            actual_paid: None,
            payment_date: None,
        };
        self.ledger.create(&tx).await?;
        self.ledger.apply_balance_delta(site, signed).await?;

        info!(tx = %tx.id, site = %site, kind = %kind, amount = %signed, operator = %operator, "ledger entry recorded");
        Ok(tx)
    }

    /// Delete a ledger transaction and reverse its balance effect
    ///
    /// The row is removed first, then the site balance moves by the
    /// negated amount, restoring it to its pre-posting value.
    ///
    /// # Arguments
    ///
    /// * `id` - The transaction to delete
    /// * `operator` - Operator deleting the entry
    ///
    /// # Returns
    ///
    /// * `Ok(FundTransaction)` - The deleted row
    /// * `Err(ProcurementError::TransactionNotFound)` - If the id is unknown
    pub async fn delete_transaction(
        &self,
        id: TransactionId,
        operator: &Operator,
    ) -> Result<FundTransaction, ProcurementError> {
        let tx = self
            .ledger
            .get(id)
            .await?
            .ok_or_else(|| ProcurementError::transaction_not_found(id))?;

        self.ledger.delete(id).await?;
        self.ledger.apply_balance_delta(tx.site, -tx.amount).await?;

        info!(tx = %id, site = %tx.site, amount = %tx.amount, operator = %operator, "ledger entry deleted, balance reversed");
        Ok(tx)
    }

    /// Confirm the payment made against a ledger transaction
    ///
    /// Sets `actual_paid` and `payment_date` on the row and moves the
    /// site's confirmed-payment total by the difference from any earlier
    /// confirmation, so editing a confirmation never double-counts.
    ///
    /// # Arguments
    ///
    /// * `id` - The transaction being paid
    /// * `actual_amount` - Amount actually paid (non-negative)
    /// * `payment_date` - When the payment was made
    /// * `operator` - Operator confirming the payment
    pub async fn confirm_payment(
        &self,
        id: TransactionId,
        actual_amount: Decimal,
        payment_date: DateTime<Utc>,
        operator: &Operator,
    ) -> Result<FundTransaction, ProcurementError> {
        if actual_amount < Decimal::ZERO {
            return Err(ProcurementError::invalid_amount(
                actual_amount,
                "payment confirmation",
            ));
        }

        let mut tx = self
            .ledger
            .get(id)
            .await?
            .ok_or_else(|| ProcurementError::transaction_not_found(id))?;

        let previous = tx.actual_paid.unwrap_or(Decimal::ZERO);
        let delta = actual_amount - previous;

        tx.actual_paid = Some(actual_amount);
        tx.payment_date = Some(payment_date);
        self.ledger.update(&tx).await?;
        self.ledger.apply_actual_paid_delta(tx.site, delta).await?;

        info!(tx = %id, site = %tx.site, paid = %actual_amount, delta = %delta, operator = %operator, "payment confirmed");
        Ok(tx)
    }

    /// Summary projection for one site
    pub async fn site_summary(&self, site: Site) -> Result<SiteSummary, ProcurementError> {
        let transactions = self.ledger.list().await?;
        Ok(summarize(site, &transactions))
    }

    /// Summary projections for every known site
    pub async fn overview(&self) -> Result<Vec<SiteSummary>, ProcurementError> {
        let transactions = self.ledger.list().await?;
        Ok(Site::ALL
            .iter()
            .map(|&site| summarize(site, &transactions))
            .collect())
    }
}
