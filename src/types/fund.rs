//! Fund-ledger types for the procurement engine
//!
//! This module defines the per-site fund aggregate and the signed ledger
//! transactions posted against it. Amounts follow one sign convention
//! everywhere: repayments are positive, every other kind is negative, and
//! a site balance is exactly the sum of its transaction amounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::purchase::Site;

/// Ledger transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        TransactionId(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TransactionId {
    fn from(id: Uuid) -> Self {
        TransactionId(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kinds of ledger transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds returned to the site; always recorded positive
    Repayment,

    /// Deduction posted when a purchase is confirmed; always negative
    PurchaseDeduction,

    /// Manually recorded operating cost; always negative
    OperatingExpense,

    /// Compensating credit for a terminated purchase; always positive
    ///
    /// Only posted when the termination policy enables reversal, and at
    /// most once per (PO number, SKU) pair.
    DeductionReversal,
}

impl TransactionKind {
    /// Whether amounts of this kind are recorded positive
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            TransactionKind::Repayment | TransactionKind::DeductionReversal
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Repayment => "repayment",
            TransactionKind::PurchaseDeduction => "purchase deduction",
            TransactionKind::OperatingExpense => "operating expense",
            TransactionKind::DeductionReversal => "deduction reversal",
        };
        write!(f, "{label}")
    }
}

/// A signed ledger transaction
///
/// Purchase deductions and their reversals carry the structured
/// (`po_number`, `sku`) key used for idempotency lookups; the description
/// is display text only and is never parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundTransaction {
    /// Unique transaction id
    pub id: TransactionId,

    /// Site whose ledger this transaction belongs to
    pub site: Site,

    /// Transaction kind
    pub kind: TransactionKind,

    /// Signed amount (positive credit, negative debit)
    pub amount: Decimal,

    /// Human-readable description
    pub description: String,

    /// PO number for purchase deductions and reversals
    pub po_number: Option<String>,

    /// SKU for purchase deductions and reversals
    pub sku: Option<String>,

    /// Operator who recorded the transaction
    pub created_by: String,

    /// When the transaction was recorded
    pub created_at: DateTime<Utc>,

    /// Amount actually paid out, set by payment confirmation
    pub actual_paid: Option<Decimal>,

    /// Date the payment was made, set by payment confirmation
    pub payment_date: Option<DateTime<Utc>>,
}

/// A site's fund state
///
/// `balance` is maintained by atomic deltas applied in the same call
/// sequence that posts the corresponding transaction; `actual_paid`
/// accumulates confirmed payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteFund {
    /// The site this fund belongs to
    pub site: Site,

    /// Running balance (sum of all transaction amounts)
    pub balance: Decimal,

    /// Total confirmed payments
    pub actual_paid: Decimal,
}

impl SiteFund {
    /// Create an empty fund for a site
    pub fn new(site: Site) -> Self {
        SiteFund {
            site,
            balance: Decimal::ZERO,
            actual_paid: Decimal::ZERO,
        }
    }
}

/// Per-site projection over the ledger
///
/// Computed from the transaction rows, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSummary {
    /// The site summarized
    pub site: Site,

    /// Sum of absolute non-repayment amounts (committed spend)
    pub contract_amount: Decimal,

    /// Sum of repayment amounts
    pub repayment_total: Decimal,

    /// Total confirmed payments across the site's transactions
    pub actual_paid_total: Decimal,

    /// Funds still available: `repayment_total - actual_paid_total`
    pub fund_pool: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_fund_is_zeroed() {
        let fund = SiteFund::new(Site::Germany);
        assert_eq!(fund.site, Site::Germany);
        assert_eq!(fund.balance, Decimal::ZERO);
        assert_eq!(fund.actual_paid, Decimal::ZERO);
    }

    #[rstest]
    #[case::repayment(TransactionKind::Repayment, true)]
    #[case::deduction(TransactionKind::PurchaseDeduction, false)]
    #[case::expense(TransactionKind::OperatingExpense, false)]
    #[case::reversal(TransactionKind::DeductionReversal, true)]
    fn test_kind_sign_convention(#[case] kind: TransactionKind, #[case] credit: bool) {
        assert_eq!(kind.is_credit(), credit);
    }

    #[rstest]
    #[case::repayment(TransactionKind::Repayment, "repayment")]
    #[case::deduction(TransactionKind::PurchaseDeduction, "purchase deduction")]
    #[case::expense(TransactionKind::OperatingExpense, "operating expense")]
    #[case::reversal(TransactionKind::DeductionReversal, "deduction reversal")]
    fn test_kind_display(#[case] kind: TransactionKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }
}
