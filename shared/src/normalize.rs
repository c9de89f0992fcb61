//! Normalization helpers for headers, join keys and quantities

use rust_decimal::Decimal;

use crate::types::Cell;

/// Trim and case-fold a column header
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Trim and case-fold a product description into a join key
pub fn normalize_product_key(cell: &Cell) -> String {
    cell.to_string().trim().to_lowercase()
}

/// Read a quantity, treating anything non-numeric as zero.
///
/// The engine does not validate upstream quantities; a value that cannot be read is
/// reported and contributes nothing.
pub fn quantity_or_zero(cell: &Cell, context: &str, row: usize) -> Decimal {
    match cell.as_decimal() {
        Some(value) => value,
        None => {
            if !cell.is_empty() {
                tracing::warn!(row, value = %cell, "Non-numeric {} treated as zero", context);
            } else {
                tracing::warn!(row, "Missing {} treated as zero", context);
            }
            Decimal::ZERO
        }
    }
}
