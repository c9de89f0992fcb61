//! FIFO allocation engine
//!
//! Demand lines are processed one at a time, in table order. Each one scans the lots for
//! its product in table order, drawing balance until it is covered or the lots run out.
//! Whatever is left becomes a single non-inventoried fragment.
//!
//! Lot balances are shared across the whole pass, so the outcome depends on demand order.
//! Lines must never be reordered or processed in parallel.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AllocationResult;
use crate::fields::{DemandFieldMap, LotFieldMap};
use crate::models::{AllocationRecord, ConsumptionEntry, DemandLine, LineKind, LotBook};
use crate::ordering::sort_by_document_item;
use crate::render;
use crate::types::Table;

/// Terminal state of one demand line's scan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Scanning,
    Satisfied,
    ExhaustedWithShortfall,
}

/// Fragments produced for one demand line
#[derive(Debug, Clone, PartialEq)]
pub struct LineAllocation {
    pub records: Vec<AllocationRecord>,
    pub state: ScanState,
}

/// Allocate a single demand line against the book.
///
/// Consumed balance is deducted in place and every deduction is appended to `ledger`.
pub fn allocate_line(
    book: &mut LotBook,
    line: &DemandLine,
    ledger: &mut Vec<ConsumptionEntry>,
) -> LineAllocation {
    let mut remaining = line.requested_quantity;
    let mut records = Vec::new();
    let mut state = ScanState::Scanning;

    for nth in 0..book.candidates(&line.product_key).len() {
        if remaining <= Decimal::ZERO {
            state = ScanState::Satisfied;
            break;
        }

        let Some(lot) = book.candidate_mut(&line.product_key, nth) else {
            continue;
        };
        if lot.is_exhausted() {
            continue;
        }

        let take = remaining.min(lot.balance);
        let (before, after) = lot.draw(take);

        tracing::trace!(
            demand_row = line.row,
            lot_row = lot.row,
            %take,
            %before,
            %after,
            "Drew from lot"
        );

        records.push(AllocationRecord::inventoried(line, lot, take));
        ledger.push(ConsumptionEntry::record(lot, take, before, after));
        remaining -= take;
    }

    if remaining > Decimal::ZERO {
        records.push(AllocationRecord::non_inventoried(line, remaining));
        state = ScanState::ExhaustedWithShortfall;
    } else {
        state = match state {
            ScanState::Scanning => ScanState::Satisfied,
            other => other,
        };
    }

    let fragmented = records.len() > 1;
    for record in &mut records {
        record.is_fragmented = fragmented;
    }

    LineAllocation { records, state }
}

/// Records, balances and ledger produced by one pass over all demand lines
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub records: Vec<AllocationRecord>,
    pub book: LotBook,
    pub ledger: Vec<ConsumptionEntry>,
}

/// Allocate every demand line in order, taking ownership of the book for the pass.
pub fn allocate(mut book: LotBook, lines: &[DemandLine]) -> AllocationOutcome {
    let mut records = Vec::new();
    let mut ledger = Vec::new();

    for line in lines {
        let allocation = allocate_line(&mut book, line, &mut ledger);
        records.extend(allocation.records);
    }

    AllocationOutcome {
        records,
        book,
        ledger,
    }
}

/// Totals reported with every run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AllocationSummary {
    pub demand_lines: usize,
    pub records: usize,
    pub inventoried_records: usize,
    pub non_inventoried_records: usize,
    pub fragmented_lines: usize,
    pub lots_touched: usize,
    pub total_requested: Decimal,
    pub total_from_lots: Decimal,
    pub total_shortfall: Decimal,
}

impl AllocationSummary {
    /// Totals saturate at the `Decimal` bounds instead of overflowing.
    pub fn from_outcome(lines: &[DemandLine], outcome: &AllocationOutcome) -> Self {
        let mut summary = Self {
            demand_lines: lines.len(),
            records: outcome.records.len(),
            total_requested: lines
                .iter()
                .fold(Decimal::ZERO, |total, l| total.saturating_add(l.requested_quantity)),
            ..Default::default()
        };

        let mut fragmented_rows = HashSet::new();
        for record in &outcome.records {
            match record.line_kind {
                LineKind::Inventoried => {
                    summary.inventoried_records += 1;
                    summary.total_from_lots =
                        summary.total_from_lots.saturating_add(record.allocated_quantity);
                }
                LineKind::NonInventoried => {
                    summary.non_inventoried_records += 1;
                    summary.total_shortfall =
                        summary.total_shortfall.saturating_add(record.allocated_quantity);
                }
            }
            if record.is_fragmented {
                fragmented_rows.insert(record.demand_row);
            }
        }
        summary.fragmented_lines = fragmented_rows.len();
        summary.lots_touched = outcome
            .ledger
            .iter()
            .map(|e| e.lot_row)
            .collect::<HashSet<_>>()
            .len();

        summary
    }
}

/// The three output tables of a run plus its summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationRun {
    pub summary: AllocationSummary,
    pub allocated_lines: Table,
    pub updated_lots: Table,
    pub ledger: Table,
}

/// Table-in, table-out entry point
pub struct FifoAllocator;

impl FifoAllocator {
    /// Run a full allocation pass.
    ///
    /// Field resolution happens before any state is built; a missing field aborts the run
    /// with no output.
    pub fn run(lots: Table, demand: Table) -> AllocationResult<AllocationRun> {
        let lot_fields = LotFieldMap::resolve(&lots)?;
        let demand_fields = DemandFieldMap::resolve(&demand)?;

        tracing::debug!(
            lots = lots.len(),
            demand_lines = demand.len(),
            ?lot_fields,
            ?demand_fields,
            "Starting FIFO allocation"
        );

        let book = LotBook::from_table(&lots, &lot_fields);
        let lines = DemandLine::from_table(&demand, &demand_fields);

        let mut outcome = allocate(book, &lines);
        if let Some((document, item)) = demand_fields.ordering_columns() {
            sort_by_document_item(&mut outcome.records, document, item);
        }

        let summary = AllocationSummary::from_outcome(&lines, &outcome);

        tracing::debug!(
            records = summary.records,
            fragmented_lines = summary.fragmented_lines,
            shortfall = %summary.total_shortfall,
            "FIFO allocation complete"
        );

        Ok(AllocationRun {
            summary,
            allocated_lines: render::allocated_lines(&demand, &demand_fields, &outcome.records),
            updated_lots: render::updated_lots(
                lots,
                &lot_fields,
                outcome.book.lots(),
                &outcome.ledger,
            ),
            ledger: render::ledger(&outcome.ledger),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lot;
    use crate::types::Cell;

    fn lot(row: usize, product: &str, balance: i64, reference: &str) -> Lot {
        Lot {
            row,
            product_key: product.to_string(),
            balance: Decimal::from(balance),
            lot_reference: Cell::text(reference),
            lot_reference_description: Cell::text(format!("{} desc", reference)),
            unit_price: Cell::Number(Decimal::from(row as i64 + 1)),
            lot_id: Some(Cell::text(format!("D{}", row))),
        }
    }

    fn line(row: usize, product: &str, quantity: i64) -> DemandLine {
        DemandLine {
            row,
            product_key: product.to_string(),
            requested_quantity: Decimal::from(quantity),
            passthrough: vec![Cell::text(product), Cell::Number(Decimal::from(quantity))],
        }
    }

    fn quantities(records: &[AllocationRecord]) -> Vec<Decimal> {
        records.iter().map(|r| r.allocated_quantity).collect()
    }

    #[test]
    fn test_fifo_split_across_two_lots() {
        let mut book = LotBook::new(vec![lot(0, "widget", 5, "L1"), lot(1, "widget", 10, "L2")]);
        let mut ledger = Vec::new();

        let result = allocate_line(&mut book, &line(0, "widget", 8), &mut ledger);

        assert_eq!(result.state, ScanState::Satisfied);
        assert_eq!(quantities(&result.records), vec![Decimal::from(5), Decimal::from(3)]);
        assert!(result.records.iter().all(|r| r.line_kind == LineKind::Inventoried));
        assert!(result.records.iter().all(|r| r.is_fragmented));
        assert_eq!(
            result.records[0].pricing.as_ref().map(|p| &p.lot_reference),
            Some(&Cell::text("L1"))
        );
        assert_eq!(
            result.records[1].pricing.as_ref().map(|p| &p.lot_reference),
            Some(&Cell::text("L2"))
        );
        assert_eq!(book.lots()[0].balance, Decimal::ZERO);
        assert_eq!(book.lots()[1].balance, Decimal::from(7));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].balance_before, Decimal::from(10));
        assert_eq!(ledger[1].balance_after, Decimal::from(7));
    }

    #[test]
    fn test_shortfall_becomes_non_inventoried() {
        let mut book = LotBook::new(vec![lot(0, "widget", 5, "L1")]);
        let mut ledger = Vec::new();

        let result = allocate_line(&mut book, &line(0, "widget", 12), &mut ledger);

        assert_eq!(result.state, ScanState::ExhaustedWithShortfall);
        assert_eq!(quantities(&result.records), vec![Decimal::from(5), Decimal::from(7)]);
        assert_eq!(result.records[1].line_kind, LineKind::NonInventoried);
        assert_eq!(result.records[1].pricing, None);
        assert!(result.records.iter().all(|r| r.fragmented_label() == "Sí"));
    }

    #[test]
    fn test_no_candidate_lots() {
        let mut book = LotBook::new(vec![lot(0, "gadget", 5, "L1")]);
        let mut ledger = Vec::new();

        let result = allocate_line(&mut book, &line(0, "widget", 4), &mut ledger);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].line_kind, LineKind::NonInventoried);
        assert_eq!(result.records[0].allocated_quantity, Decimal::from(4));
        assert_eq!(result.records[0].fragmented_label(), "No");
        assert!(ledger.is_empty());
        assert_eq!(book.lots()[0].balance, Decimal::from(5));
    }

    #[test]
    fn test_exact_satisfaction_no_split() {
        let mut book = LotBook::new(vec![lot(0, "widget", 5, "L1"), lot(1, "widget", 5, "L2")]);
        let mut ledger = Vec::new();

        let result = allocate_line(&mut book, &line(0, "widget", 5), &mut ledger);

        assert_eq!(result.records.len(), 1);
        assert!(!result.records[0].is_fragmented);
        assert_eq!(book.lots()[0].balance, Decimal::ZERO);
        assert_eq!(book.lots()[1].balance, Decimal::from(5));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_non_positive_request_vanishes() {
        let mut book = LotBook::new(vec![lot(0, "widget", 5, "L1")]);
        let mut ledger = Vec::new();

        let zero = allocate_line(&mut book, &line(0, "widget", 0), &mut ledger);
        let negative = allocate_line(&mut book, &line(1, "widget", -3), &mut ledger);
        let unmatched = allocate_line(&mut book, &line(2, "gadget", 0), &mut ledger);

        assert!(zero.records.is_empty());
        assert!(negative.records.is_empty());
        assert!(unmatched.records.is_empty());
        assert!(ledger.is_empty());
        assert_eq!(book.lots()[0].balance, Decimal::from(5));
    }

    #[test]
    fn test_exhausted_lot_skipped_by_later_lines() {
        let book = LotBook::new(vec![lot(0, "widget", 5, "L1"), lot(1, "widget", 10, "L2")]);
        let lines = vec![line(0, "widget", 5), line(1, "widget", 4)];

        let outcome = allocate(book, &lines);

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(
            outcome.records[1].pricing.as_ref().map(|p| &p.lot_reference),
            Some(&Cell::text("L2"))
        );
        assert!(outcome.records.iter().all(|r| !r.is_fragmented));
        assert_eq!(outcome.book.lots()[1].balance, Decimal::from(6));
    }

    #[test]
    fn test_demand_order_changes_split() {
        let lots = || LotBook::new(vec![lot(0, "widget", 5, "L1"), lot(1, "widget", 10, "L2")]);

        let forward = allocate(lots(), &[line(0, "widget", 8), line(1, "widget", 5)]);
        let reversed = allocate(lots(), &[line(1, "widget", 5), line(0, "widget", 8)]);

        assert_eq!(forward.records.len(), 3);
        assert_eq!(reversed.records.len(), 2);
    }

    #[test]
    fn test_summary_totals() {
        let book = LotBook::new(vec![lot(0, "widget", 5, "L1"), lot(1, "widget", 10, "L2")]);
        let lines = vec![line(0, "widget", 8), line(1, "widget", 9), line(2, "gadget", 2)];

        let outcome = allocate(book, &lines);
        let summary = AllocationSummary::from_outcome(&lines, &outcome);

        assert_eq!(summary.demand_lines, 3);
        assert_eq!(summary.records, 5);
        assert_eq!(summary.inventoried_records, 3);
        assert_eq!(summary.non_inventoried_records, 2);
        assert_eq!(summary.fragmented_lines, 2);
        assert_eq!(summary.lots_touched, 2);
        assert_eq!(summary.total_requested, Decimal::from(19));
        assert_eq!(summary.total_from_lots, Decimal::from(15));
        assert_eq!(summary.total_shortfall, Decimal::from(4));
    }

    #[test]
    fn test_summary_totals_saturate() {
        let huge = Decimal::MAX - Decimal::ONE;
        let mut lines = vec![line(0, "widget", 0), line(1, "widget", 0)];
        for l in &mut lines {
            l.requested_quantity = huge;
        }

        let outcome = allocate(LotBook::new(vec![lot(0, "widget", 5, "L1")]), &lines);
        let summary = AllocationSummary::from_outcome(&lines, &outcome);

        assert_eq!(summary.records, 3);
        assert_eq!(summary.total_requested, Decimal::MAX);
        assert_eq!(summary.total_from_lots, Decimal::from(5));
        assert_eq!(summary.total_shortfall, Decimal::MAX);
    }
}
