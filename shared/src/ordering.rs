//! Output ordering for allocation records

use crate::models::AllocationRecord;
use crate::types::Cell;

/// Stable sort by `(document, item)` passthrough columns.
///
/// Fragments of one demand line share both keys, so they stay adjacent and keep the order
/// they were produced in.
pub fn sort_by_document_item(records: &mut [AllocationRecord], document: usize, item: usize) {
    records.sort_by(|a, b| {
        key(a, document)
            .sort_cmp(key(b, document))
            .then_with(|| key(a, item).sort_cmp(key(b, item)))
    });
}

fn key(record: &AllocationRecord, col: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    record.passthrough.get(col).unwrap_or(&EMPTY)
}
