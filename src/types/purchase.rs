//! Purchase-line types for the procurement engine
//!
//! This module defines the purchase-line aggregate, its lifecycle status,
//! the sales sites purchases are attributed to, and the validated operator
//! identity stamped onto every mutation.

use crate::types::error::ProcurementError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Purchase line identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        LineId(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for LineId {
    fn from(id: Uuid) -> Self {
        LineId(id)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sales sites a purchase line can be attributed to
///
/// Each site carries its own fund ledger; a purchase deduction always lands
/// on the ledger of the line's own site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    UnitedStates,
    Germany,
    Canada,
    UnitedKingdom,
    Australia,
    HongKong,
    QyUnitedStates,
}

impl Site {
    /// Every known site, in display order
    pub const ALL: [Site; 7] = [
        Site::UnitedStates,
        Site::Germany,
        Site::Canada,
        Site::UnitedKingdom,
        Site::Australia,
        Site::HongKong,
        Site::QyUnitedStates,
    ];
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Site::UnitedStates => "United States",
            Site::Germany => "Germany",
            Site::Canada => "Canada",
            Site::UnitedKingdom => "United Kingdom",
            Site::Australia => "Australia",
            Site::HongKong => "Hong Kong",
            Site::QyUnitedStates => "QY United States",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle status of a purchase line
///
/// Only these five states are ever persisted. The "purchased, N remaining"
/// presentation of a partially received line is derived from the quantities
/// at display time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Requested by an operator, awaiting purchase confirmation
    Submitted,

    /// Confirmed against a PO; goods not yet fully received
    Purchased,

    /// Fully received; cumulative receipts equal the ordered quantity
    Received,

    /// Flagged for manual investigation
    ///
    /// Flagging never touches the fund ledger. A deduction posted before
    /// the flag stays posted.
    Exception,

    /// Closed without (further) fulfilment
    Terminated,
}

impl PurchaseStatus {
    /// Whether a purchase confirmation may be applied in this status
    pub fn can_confirm(&self) -> bool {
        matches!(self, PurchaseStatus::Submitted)
    }

    /// Whether goods receipts may be applied in this status
    pub fn can_receive(&self) -> bool {
        matches!(self, PurchaseStatus::Purchased)
    }

    /// Whether the line may be flagged as an exception in this status
    pub fn can_mark_exception(&self) -> bool {
        matches!(self, PurchaseStatus::Submitted | PurchaseStatus::Purchased)
    }

    /// Whether the line may be terminated in this status
    pub fn can_terminate(&self) -> bool {
        matches!(
            self,
            PurchaseStatus::Submitted | PurchaseStatus::Purchased | PurchaseStatus::Exception
        )
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PurchaseStatus::Submitted => "submitted",
            PurchaseStatus::Purchased => "purchased",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Exception => "exception",
            PurchaseStatus::Terminated => "terminated",
        };
        write!(f, "{label}")
    }
}

/// Operator identity stamped onto mutations
///
/// Every lifecycle call takes the acting operator explicitly; there is no
/// ambient current-user state. The name must be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator(String);

impl Operator {
    /// Validate and construct an operator identity
    ///
    /// # Errors
    ///
    /// Returns `ProcurementError::InvalidOperator` if `name` is empty or
    /// whitespace-only.
    pub fn new(name: &str) -> Result<Self, ProcurementError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProcurementError::invalid_operator(name));
        }
        Ok(Operator(trimmed.to_string()))
    }

    /// The validated operator name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input for submitting a new purchase line
#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    /// Stock keeping unit the purchase is for
    pub sku: String,

    /// Human-readable product name, if known at submission time
    pub product_name: Option<String>,

    /// Ordered quantity in integral units (must be > 0)
    pub quantity: u32,

    /// Site whose ledger will carry the eventual deduction
    pub site: Site,
}

/// Criteria for querying purchase lines
///
/// Every field is optional and unset fields match everything, so the
/// default filter selects every stored line. Set fields combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseFilter {
    /// Match lines in this lifecycle status
    pub status: Option<PurchaseStatus>,

    /// Match lines for this SKU exactly
    pub sku: Option<String>,

    /// Match lines attributed to this site
    pub site: Option<Site>,
}

impl PurchaseFilter {
    /// Whether a line satisfies every set criterion
    pub fn matches(&self, line: &PurchaseLine) -> bool {
        self.status.map_or(true, |status| line.status == status)
            && self.sku.as_deref().map_or(true, |sku| line.sku == sku)
            && self.site.map_or(true, |site| line.site == site)
    }
}

/// A purchase line
///
/// The aggregate driven through the lifecycle: ordered and received
/// quantities, the PO linkage written at confirmation time, and the audit
/// stamps for each transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    /// Unique line id
    pub id: LineId,

    /// Stock keeping unit
    pub sku: String,

    /// Human-readable product name
    pub product_name: Option<String>,

    /// Ordered quantity in integral units
    pub quantity: u32,

    /// Cumulative quantity received so far
    ///
    /// Monotonically increasing, never exceeds `quantity`. When it reaches
    /// `quantity` the status flips to `Received`.
    pub received_quantity: u32,

    /// Site the purchase is attributed to
    pub site: Site,

    /// Current lifecycle status
    pub status: PurchaseStatus,

    /// PO number, set at confirmation
    pub po_number: Option<String>,

    /// Confirmed order amount, set at confirmation
    pub order_amount: Option<Decimal>,

    /// Operator who submitted the line
    pub submitted_by: String,

    /// When the line was submitted
    pub submitted_at: DateTime<Utc>,

    /// Operator who confirmed the purchase
    pub purchased_by: Option<String>,

    /// When the purchase was confirmed
    pub purchased_at: Option<DateTime<Utc>>,

    /// When the line was flagged as an exception
    pub exception_at: Option<DateTime<Utc>>,

    /// When the line was terminated
    pub terminated_at: Option<DateTime<Utc>>,
}

impl PurchaseLine {
    /// Create a freshly submitted line
    ///
    /// # Arguments
    ///
    /// * `id` - Pre-assigned line id
    /// * `input` - Validated submission input
    /// * `operator` - Operator submitting the line
    /// * `now` - Submission timestamp
    pub fn submitted(id: LineId, input: NewPurchaseLine, operator: &Operator, now: DateTime<Utc>) -> Self {
        PurchaseLine {
            id,
            sku: input.sku,
            product_name: input.product_name,
            quantity: input.quantity,
            received_quantity: 0,
            site: input.site,
            status: PurchaseStatus::Submitted,
            po_number: None,
            order_amount: None,
            submitted_by: operator.as_str().to_string(),
            submitted_at: now,
            purchased_by: None,
            purchased_at: None,
            exception_at: None,
            terminated_at: None,
        }
    }

    /// Quantity still outstanding against the order
    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.received_quantity)
    }

    /// Display label for the current state
    ///
    /// A purchased line with receipts outstanding renders the remaining
    /// quantity; everything else renders the bare status.
    pub fn status_label(&self) -> String {
        match self.status {
            PurchaseStatus::Purchased if self.received_quantity > 0 => {
                format!("purchased (remaining {})", self.remaining())
            }
            status => status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_input() -> NewPurchaseLine {
        NewPurchaseLine {
            sku: "SKU-A".to_string(),
            product_name: Some("Widget".to_string()),
            quantity: 10,
            site: Site::UnitedStates,
        }
    }

    #[test]
    fn test_submitted_line_has_expected_defaults() {
        let operator = Operator::new("alice").unwrap();
        let now = Utc::now();
        let line = PurchaseLine::submitted(LineId::new(), sample_input(), &operator, now);

        assert_eq!(line.status, PurchaseStatus::Submitted);
        assert_eq!(line.received_quantity, 0);
        assert_eq!(line.remaining(), 10);
        assert_eq!(line.submitted_by, "alice");
        assert_eq!(line.submitted_at, now);
        assert!(line.po_number.is_none());
        assert!(line.order_amount.is_none());
        assert!(line.purchased_by.is_none());
        assert!(line.exception_at.is_none());
        assert!(line.terminated_at.is_none());
    }

    #[rstest]
    #[case::submitted(PurchaseStatus::Submitted, true, false, true, true)]
    #[case::purchased(PurchaseStatus::Purchased, false, true, true, true)]
    #[case::received(PurchaseStatus::Received, false, false, false, false)]
    #[case::exception(PurchaseStatus::Exception, false, false, false, true)]
    #[case::terminated(PurchaseStatus::Terminated, false, false, false, false)]
    fn test_status_transition_table(
        #[case] status: PurchaseStatus,
        #[case] confirm: bool,
        #[case] receive: bool,
        #[case] exception: bool,
        #[case] terminate: bool,
    ) {
        assert_eq!(status.can_confirm(), confirm);
        assert_eq!(status.can_receive(), receive);
        assert_eq!(status.can_mark_exception(), exception);
        assert_eq!(status.can_terminate(), terminate);
    }

    #[test]
    fn test_status_label_shows_remaining_for_partial_receipts() {
        let operator = Operator::new("alice").unwrap();
        let mut line = PurchaseLine::submitted(LineId::new(), sample_input(), &operator, Utc::now());
        line.status = PurchaseStatus::Purchased;

        assert_eq!(line.status_label(), "purchased");

        line.received_quantity = 3;
        assert_eq!(line.status_label(), "purchased (remaining 7)");
    }

    #[test]
    fn test_status_label_for_terminal_states() {
        let operator = Operator::new("alice").unwrap();
        let mut line = PurchaseLine::submitted(LineId::new(), sample_input(), &operator, Utc::now());

        line.status = PurchaseStatus::Received;
        line.received_quantity = 10;
        assert_eq!(line.status_label(), "received");

        line.status = PurchaseStatus::Terminated;
        assert_eq!(line.status_label(), "terminated");
    }

    #[rstest]
    #[case::plain("alice", "alice")]
    #[case::trimmed("  bob  ", "bob")]
    fn test_operator_accepts_nonempty_names(#[case] input: &str, #[case] expected: &str) {
        let operator = Operator::new(input).unwrap();
        assert_eq!(operator.as_str(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn test_operator_rejects_blank_names(#[case] input: &str) {
        let result = Operator::new(input);
        assert!(matches!(
            result,
            Err(ProcurementError::InvalidOperator { .. })
        ));
    }

    #[rstest]
    #[case::unfiltered(None, None, None, true)]
    #[case::status_hit(Some(PurchaseStatus::Submitted), None, None, true)]
    #[case::status_miss(Some(PurchaseStatus::Purchased), None, None, false)]
    #[case::sku_hit(None, Some("SKU-A"), None, true)]
    #[case::sku_miss(None, Some("SKU-B"), None, false)]
    #[case::site_hit(None, None, Some(Site::UnitedStates), true)]
    #[case::site_miss(None, None, Some(Site::Germany), false)]
    #[case::all_set_hit(Some(PurchaseStatus::Submitted), Some("SKU-A"), Some(Site::UnitedStates), true)]
    #[case::one_criterion_misses(Some(PurchaseStatus::Submitted), Some("SKU-A"), Some(Site::Germany), false)]
    fn test_filter_criteria_combine_with_and(
        #[case] status: Option<PurchaseStatus>,
        #[case] sku: Option<&str>,
        #[case] site: Option<Site>,
        #[case] expected: bool,
    ) {
        let operator = Operator::new("alice").unwrap();
        let line = PurchaseLine::submitted(LineId::new(), sample_input(), &operator, Utc::now());
        let filter = PurchaseFilter {
            status,
            sku: sku.map(str::to_string),
            site,
        };
        assert_eq!(filter.matches(&line), expected);
    }

    #[test]
    fn test_remaining_saturates() {
        let operator = Operator::new("alice").unwrap();
        let mut line = PurchaseLine::submitted(LineId::new(), sample_input(), &operator, Utc::now());
        line.received_quantity = 10;
        assert_eq!(line.remaining(), 0);
    }
}
