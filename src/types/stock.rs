//! Inventory types for the procurement engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inventory row keyed by SKU
///
/// Stock is incremented by the delta of each receipt, not by the cumulative
/// received quantity, so repeated partial receipts never double-count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Stock keeping unit
    pub sku: String,

    /// On-hand quantity in integral units
    pub quantity: u32,

    /// When stock last increased through an inbound receipt
    pub last_inbound_at: Option<DateTime<Utc>>,
}

impl StockItem {
    /// Create an empty stock row for a SKU
    pub fn new(sku: &str) -> Self {
        StockItem {
            sku: sku.to_string(),
            quantity: 0,
            last_inbound_at: None,
        }
    }
}
