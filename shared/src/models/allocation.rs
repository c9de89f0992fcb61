//! Allocation records: the fragments a demand line is split into

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DemandLine, Lot};
use crate::types::Cell;

/// Whether a fragment was drawn from a lot or left uncovered
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Inventoried,
    NonInventoried,
}

impl LineKind {
    /// Label written to the output table
    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Inventoried => "línea de sse",
            LineKind::NonInventoried => "línea de maquila",
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pricing and reference fields copied from the consumed lot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotPricing {
    pub lot_reference: Cell,
    pub lot_reference_description: Cell,
    pub unit_price: Cell,
}

impl From<&Lot> for LotPricing {
    fn from(lot: &Lot) -> Self {
        Self {
            lot_reference: lot.lot_reference.clone(),
            lot_reference_description: lot.lot_reference_description.clone(),
            unit_price: lot.unit_price.clone(),
        }
    }
}

/// One row of the Allocated Demand Lines output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRecord {
    /// Row index of the originating demand line
    pub demand_row: usize,
    pub passthrough: Vec<Cell>,
    pub allocated_quantity: Decimal,
    pub line_kind: LineKind,
    /// Set only on inventoried fragments
    pub pricing: Option<LotPricing>,
    pub is_fragmented: bool,
}

impl AllocationRecord {
    pub fn inventoried(line: &DemandLine, lot: &Lot, quantity: Decimal) -> Self {
        Self {
            demand_row: line.row,
            passthrough: line.passthrough.clone(),
            allocated_quantity: quantity,
            line_kind: LineKind::Inventoried,
            pricing: Some(LotPricing::from(lot)),
            is_fragmented: false,
        }
    }

    pub fn non_inventoried(line: &DemandLine, quantity: Decimal) -> Self {
        Self {
            demand_row: line.row,
            passthrough: line.passthrough.clone(),
            allocated_quantity: quantity,
            line_kind: LineKind::NonInventoried,
            pricing: None,
            is_fragmented: false,
        }
    }

    /// "Sí" / "No" as written to the output table
    pub fn fragmented_label(&self) -> &'static str {
        if self.is_fragmented {
            "Sí"
        } else {
            "No"
        }
    }
}
