//! Consumption ledger: one entry per balance deduction

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Lot;
use crate::types::Cell;

/// Audit row for a single FIFO step that drew from a lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionEntry {
    pub lot_row: usize,
    pub lot_id: Cell,
    pub product_key: String,
    pub lot_reference: Cell,
    pub lot_reference_description: Cell,
    pub unit_price: Cell,
    pub quantity_taken: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
}

impl ConsumptionEntry {
    pub fn record(lot: &Lot, quantity_taken: Decimal, before: Decimal, after: Decimal) -> Self {
        Self {
            lot_row: lot.row,
            lot_id: lot.lot_id.clone().unwrap_or_default(),
            product_key: lot.product_key.clone(),
            lot_reference: lot.lot_reference.clone(),
            lot_reference_description: lot.lot_reference_description.clone(),
            unit_price: lot.unit_price.clone(),
            quantity_taken,
            balance_before: before,
            balance_after: after,
        }
    }
}
