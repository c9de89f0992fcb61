//! Rendering allocation results back into tables

use std::collections::HashSet;

use crate::fields::{DemandFieldMap, LotFieldMap};
use crate::models::{AllocationRecord, ConsumptionEntry, Lot};
use crate::types::{Cell, Table};

/// Columns appended to the demand table
pub const ALLOCATION_COLUMNS: [&str; 5] = [
    "commodity_code",
    "commodity_code_description",
    "net_price",
    "line_kind",
    "is_fragmented",
];

/// Consumption ledger columns
pub const LEDGER_COLUMNS: [&str; 8] = [
    "delivery",
    "product_key",
    "lot_reference",
    "lot_reference_description",
    "unit_price",
    "quantity_taken",
    "balance_before",
    "balance_after",
];

/// Allocated Demand Lines: the demand columns plus the allocation columns.
///
/// The quantity column of each row holds that fragment's allocated quantity.
pub fn allocated_lines(
    demand: &Table,
    fields: &DemandFieldMap,
    records: &[AllocationRecord],
) -> Table {
    let mut headers = demand.headers.clone();
    headers.extend(ALLOCATION_COLUMNS.iter().map(|c| c.to_string()));

    let rows = records
        .iter()
        .map(|record| {
            let mut row = record.passthrough.clone();
            row.resize(demand.headers.len(), Cell::Empty);
            if let Some(quantity) = row.get_mut(fields.requested_quantity) {
                *quantity = Cell::Number(record.allocated_quantity);
            }

            match &record.pricing {
                Some(pricing) => row.extend([
                    pricing.lot_reference.clone(),
                    pricing.lot_reference_description.clone(),
                    pricing.unit_price.clone(),
                ]),
                None => row.extend([Cell::Empty, Cell::Empty, Cell::Empty]),
            }
            row.push(Cell::text(record.line_kind.label()));
            row.push(Cell::text(record.fragmented_label()));
            row
        })
        .collect();

    Table::new(headers, rows)
}

/// Updated Lots: the input table with the balance rewritten for every lot drawn from
pub fn updated_lots(
    mut lots_table: Table,
    fields: &LotFieldMap,
    lots: &[Lot],
    ledger: &[ConsumptionEntry],
) -> Table {
    let drawn: HashSet<usize> = ledger.iter().map(|e| e.lot_row).collect();
    for lot in lots.iter().filter(|lot| drawn.contains(&lot.row)) {
        lots_table.set_cell(lot.row, fields.balance, Cell::Number(lot.balance));
    }
    lots_table
}

/// Consumption Ledger table, one row per deduction
pub fn ledger(entries: &[ConsumptionEntry]) -> Table {
    let headers = LEDGER_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows = entries
        .iter()
        .map(|entry| {
            vec![
                entry.lot_id.clone(),
                Cell::text(entry.product_key.clone()),
                entry.lot_reference.clone(),
                entry.lot_reference_description.clone(),
                entry.unit_price.clone(),
                Cell::Number(entry.quantity_taken),
                Cell::Number(entry.balance_before),
                Cell::Number(entry.balance_after),
            ]
        })
        .collect();

    Table::new(headers, rows)
}
