//! Inventory lots and the balance book the engine draws from

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fields::LotFieldMap;
use crate::normalize::{normalize_product_key, quantity_or_zero};
use crate::types::{Cell, Table};

/// One available inventory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lot {
    /// Row index in the Lots table
    pub row: usize,
    pub product_key: String,
    /// Remaining quantity; never increases and never goes below zero
    pub balance: Decimal,
    pub lot_reference: Cell,
    pub lot_reference_description: Cell,
    pub unit_price: Cell,
    /// Provenance (delivery) id, copied into ledger entries only
    pub lot_id: Option<Cell>,
}

impl Lot {
    pub fn from_row(table: &Table, row: usize, fields: &LotFieldMap) -> Self {
        Self {
            row,
            product_key: normalize_product_key(table.cell(row, fields.product_key)),
            balance: quantity_or_zero(table.cell(row, fields.balance), "lot balance", row),
            lot_reference: table.cell(row, fields.lot_reference).clone(),
            lot_reference_description: table
                .cell(row, fields.lot_reference_description)
                .clone(),
            unit_price: table.cell(row, fields.unit_price).clone(),
            lot_id: fields.lot_id.map(|col| table.cell(row, col).clone()),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.balance <= Decimal::ZERO
    }

    /// Deduct up to `quantity`, returning `(balance_before, balance_after)`.
    pub fn draw(&mut self, quantity: Decimal) -> (Decimal, Decimal) {
        let before = self.balance;
        self.balance = (before - quantity).max(Decimal::ZERO);
        (before, self.balance)
    }
}

/// Lots in table order, indexed by product key.
///
/// The book is owned by a single allocation pass; every balance change is visible to the
/// demand lines processed after it.
#[derive(Debug, Clone, Default)]
pub struct LotBook {
    lots: Vec<Lot>,
    by_product: HashMap<String, Vec<usize>>,
}

impl LotBook {
    pub fn new(lots: Vec<Lot>) -> Self {
        let mut by_product: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, lot) in lots.iter().enumerate() {
            by_product
                .entry(lot.product_key.clone())
                .or_default()
                .push(idx);
        }
        Self { lots, by_product }
    }

    pub fn from_table(table: &Table, fields: &LotFieldMap) -> Self {
        Self::new(
            (0..table.len())
                .map(|row| Lot::from_row(table, row, fields))
                .collect(),
        )
    }

    /// Positions of the lots for a product, in FIFO (table) order
    pub fn candidates(&self, product_key: &str) -> &[usize] {
        self.by_product
            .get(product_key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The `nth` lot for a product, in FIFO order
    pub fn candidate_mut(&mut self, product_key: &str, nth: usize) -> Option<&mut Lot> {
        let idx = *self.by_product.get(product_key)?.get(nth)?;
        self.lots.get_mut(idx)
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }
}
