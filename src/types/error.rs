//! Error types for the procurement engine
//!
//! This module defines all error types that can occur while driving the
//! purchase lifecycle and the fund ledger. Errors are designed to be
//! descriptive enough to act on without re-reading store state.
//!
//! # Error Categories
//!
//! - **Validation Errors**: Missing PO number, bad amounts, bad quantities, etc.
//! - **State Errors**: Illegal lifecycle transitions, over-receipt, duplicates
//! - **Lookup Errors**: Purchase line or ledger transaction not found
//! - **Remote Errors**: A store write failed mid-sequence

use crate::types::purchase::{LineId, PurchaseStatus};
use crate::types::TransactionId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the procurement engine
///
/// This enum represents all possible errors that can occur while processing
/// lifecycle operations, receipts, allocations, and ledger entries. Each
/// variant includes relevant context to help diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcurementError {
    /// Purchase line not found in the purchase store
    ///
    /// Every operation re-fetches the line before mutating it, so a stale
    /// or deleted id surfaces here before anything is written.
    #[error("Purchase line {id} not found")]
    LineNotFound {
        /// The line id that was not found
        id: LineId,
    },

    /// Ledger transaction not found in the ledger store
    #[error("Fund transaction {id} not found")]
    TransactionNotFound {
        /// The transaction id that was not found
        id: TransactionId,
    },

    /// A purchase confirmation or allocation was attempted without a PO number
    ///
    /// The PO number is half of the ledger dedup key, so it is required
    /// before any write happens.
    #[error("Purchase confirmation requires a PO number")]
    MissingPoNumber,

    /// A monetary amount failed validation (negative where it must not be)
    #[error("Invalid amount {amount} for {operation}")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
        /// Operation that rejected it
        operation: String,
    },

    /// A receipt quantity failed validation (zero)
    #[error("Invalid receipt quantity {quantity} for purchase line {id}")]
    InvalidQuantity {
        /// The line being received against
        id: LineId,
        /// The rejected quantity
        quantity: u32,
    },

    /// A partial receipt would exceed the ordered quantity
    ///
    /// The receipt is rejected and nothing is written. The cumulative
    /// received quantity never exceeds the ordered quantity.
    #[error("Receipt of {requested} on purchase line {id} exceeds ordered quantity: ordered {ordered}, already received {received}")]
    OverReceipt {
        /// The line being received against
        id: LineId,
        /// Ordered quantity
        ordered: u32,
        /// Cumulative quantity received so far
        received: u32,
        /// Quantity requested in this receipt
        requested: u32,
    },

    /// A full receipt was requested but nothing remains outstanding
    #[error("Purchase line {id} has no remaining quantity to receive")]
    NothingToReceive {
        /// The fully received line
        id: LineId,
    },

    /// The line's current status does not permit the requested operation
    #[error("Purchase line {id} cannot be {operation} from status {from}")]
    InvalidTransition {
        /// The line being transitioned
        id: LineId,
        /// Status the line currently holds
        from: PurchaseStatus,
        /// Operation that was rejected
        operation: String,
    },

    /// A batch selection contains a line that is not awaiting purchase
    ///
    /// Raised during pre-validation, before any line in the batch is
    /// written, so a bad selection leaves every line untouched.
    #[error("Purchase line {id} in selection has status {status}, expected submitted")]
    InvalidSelectionState {
        /// The offending line
        id: LineId,
        /// Its actual status
        status: PurchaseStatus,
    },

    /// A batch allocation was requested over lines totaling zero quantity
    #[error("Cannot allocate PO {po_number} across zero total quantity")]
    ZeroQuantityAllocation {
        /// The PO whose allocation was rejected
        po_number: String,
    },

    /// A batch allocation was requested with no lines selected
    #[error("Cannot allocate over an empty selection")]
    EmptySelection,

    /// A purchase deduction already exists for this PO number and SKU
    ///
    /// This is the idempotency guard: re-driving a confirmation after a
    /// partial failure will not post the deduction twice.
    #[error("A deduction for PO {po_number} ({sku}) has already been posted")]
    DuplicateDeduction {
        /// PO number of the existing deduction
        po_number: String,
        /// SKU of the existing deduction
        sku: String,
    },

    /// A submission carried an empty SKU
    #[error("Purchase line cannot be submitted without a SKU")]
    EmptySku,

    /// An operator name failed validation (empty or whitespace)
    #[error("Invalid operator name '{name}'")]
    InvalidOperator {
        /// The rejected name
        name: String,
    },

    /// A remote store call failed
    ///
    /// When this surfaces mid-sequence, every write that completed before it
    /// stays committed. Callers observe the partial state directly.
    #[error("Remote write failed during {operation}: {message}")]
    RemoteWrite {
        /// The store call that failed
        operation: String,
        /// Description of the failure
        message: String,
    },
}

// Helper functions for creating common errors

impl ProcurementError {
    /// Create a LineNotFound error
    pub fn line_not_found(id: LineId) -> Self {
        ProcurementError::LineNotFound { id }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(id: TransactionId) -> Self {
        ProcurementError::TransactionNotFound { id }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, operation: &str) -> Self {
        ProcurementError::InvalidAmount {
            amount,
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(id: LineId, quantity: u32) -> Self {
        ProcurementError::InvalidQuantity { id, quantity }
    }

    /// Create an OverReceipt error
    pub fn over_receipt(id: LineId, ordered: u32, received: u32, requested: u32) -> Self {
        ProcurementError::OverReceipt {
            id,
            ordered,
            received,
            requested,
        }
    }

    /// Create a NothingToReceive error
    pub fn nothing_to_receive(id: LineId) -> Self {
        ProcurementError::NothingToReceive { id }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(id: LineId, from: PurchaseStatus, operation: &str) -> Self {
        ProcurementError::InvalidTransition {
            id,
            from,
            operation: operation.to_string(),
        }
    }

    /// Create an InvalidSelectionState error
    pub fn invalid_selection_state(id: LineId, status: PurchaseStatus) -> Self {
        ProcurementError::InvalidSelectionState { id, status }
    }

    /// Create a ZeroQuantityAllocation error
    pub fn zero_quantity_allocation(po_number: &str) -> Self {
        ProcurementError::ZeroQuantityAllocation {
            po_number: po_number.to_string(),
        }
    }

    /// Create a DuplicateDeduction error
    pub fn duplicate_deduction(po_number: &str, sku: &str) -> Self {
        ProcurementError::DuplicateDeduction {
            po_number: po_number.to_string(),
            sku: sku.to_string(),
        }
    }

    /// Create an InvalidOperator error
    pub fn invalid_operator(name: &str) -> Self {
        ProcurementError::InvalidOperator {
            name: name.to_string(),
        }
    }

    /// Create a RemoteWrite error
    pub fn remote_write(operation: &str, message: &str) -> Self {
        ProcurementError::RemoteWrite {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}
