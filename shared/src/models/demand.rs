//! Demand lines: requested shipments to be covered from lots

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fields::DemandFieldMap;
use crate::normalize::{normalize_product_key, quantity_or_zero};
use crate::types::{Cell, Table};

/// One requested shipment quantity for a product. Read-only during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandLine {
    /// Row index in the Demand Lines table
    pub row: usize,
    pub product_key: String,
    pub requested_quantity: Decimal,
    /// Every cell of the source row, carried onto each record derived from it
    pub passthrough: Vec<Cell>,
}

impl DemandLine {
    pub fn from_row(table: &Table, row: usize, fields: &DemandFieldMap) -> Self {
        let mut passthrough = table.rows.get(row).cloned().unwrap_or_default();
        passthrough.resize(passthrough.len().max(table.headers.len()), Cell::Empty);

        Self {
            row,
            product_key: normalize_product_key(table.cell(row, fields.product_key)),
            requested_quantity: quantity_or_zero(
                table.cell(row, fields.requested_quantity),
                "requested quantity",
                row,
            ),
            passthrough,
        }
    }

    pub fn from_table(table: &Table, fields: &DemandFieldMap) -> Vec<Self> {
        (0..table.len())
            .map(|row| Self::from_row(table, row, fields))
            .collect()
    }
}
