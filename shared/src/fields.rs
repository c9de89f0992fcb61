//! Field resolution: mapping loosely named spreadsheet headers to logical fields
//!
//! Headers are trimmed and case-folded, then searched for a fixed keyword per field.
//! When several headers contain the keyword, the first one in table order wins.

use serde::Serialize;

use crate::error::{TableKind, UnresolvedFieldError};
use crate::normalize::normalize_header;
use crate::types::Table;

// ============================================================================
// Keywords
// ============================================================================

/// Lots: product description, the join key
pub const LOT_PRODUCT_KEYWORD: &str = "descripcion";
/// Lots: remaining balance
pub const LOT_BALANCE_KEYWORD: &str = "saldo";
/// Lots: lot reference (tariff fraction)
pub const LOT_REFERENCE_KEYWORD: &str = "fraccion";
/// Lots: lot reference description
pub const LOT_REFERENCE_DESCRIPTION_KEYWORD: &str = "desc fraccion";
/// Lots: unit price
pub const LOT_UNIT_PRICE_KEYWORD: &str = "precio";

/// Whole header names accepted as the lot provenance (delivery) field.
///
/// Matched exactly, so `delivery quantity` can never be taken for it.
pub const LOT_PROVENANCE_HEADERS: &[&str] = &[
    "delivery",
    "delivery id",
    "delivery number",
    "delivery no",
    "delivery no.",
    "entrega",
];

/// Demand: product description, the join key
pub const DEMAND_PRODUCT_KEYWORD: &str = "des no custom";
/// Demand: requested quantity
pub const DEMAND_QUANTITY_KEYWORD: &str = "delivery quantity";
/// Demand: document id (optional, ordering)
pub const DEMAND_DOCUMENT_KEYWORD: &str = "document";
/// Demand: item id (optional, ordering)
pub const DEMAND_ITEM_KEYWORD: &str = "item";

// ============================================================================
// Resolution
// ============================================================================

/// Index of the first header containing `keyword`
pub fn resolve(
    headers: &[String],
    table: TableKind,
    keyword: &str,
) -> Result<usize, UnresolvedFieldError> {
    resolve_optional(headers, keyword).ok_or_else(|| UnresolvedFieldError {
        table,
        keyword: keyword.to_string(),
        headers: headers.iter().map(|h| normalize_header(h)).collect(),
    })
}

/// Index of the first header containing `keyword`, if any
pub fn resolve_optional(headers: &[String], keyword: &str) -> Option<usize> {
    let keyword = normalize_header(keyword);
    headers
        .iter()
        .position(|h| normalize_header(h).contains(&keyword))
}

/// Index of the first header equal to one of `allowed`
pub fn resolve_exact(headers: &[String], allowed: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let normalized = normalize_header(h);
        allowed.iter().any(|a| normalized == *a)
    })
}

/// Column indexes of the Lots fields the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LotFieldMap {
    pub product_key: usize,
    pub balance: usize,
    pub lot_reference: usize,
    pub lot_reference_description: usize,
    pub unit_price: usize,
    pub lot_id: Option<usize>,
}

impl LotFieldMap {
    pub fn resolve(table: &Table) -> Result<Self, UnresolvedFieldError> {
        let headers = &table.headers;
        let kind = TableKind::Lots;

        Ok(Self {
            product_key: resolve(headers, kind, LOT_PRODUCT_KEYWORD)?,
            balance: resolve(headers, kind, LOT_BALANCE_KEYWORD)?,
            lot_reference: resolve(headers, kind, LOT_REFERENCE_KEYWORD)?,
            lot_reference_description: resolve(headers, kind, LOT_REFERENCE_DESCRIPTION_KEYWORD)?,
            unit_price: resolve(headers, kind, LOT_UNIT_PRICE_KEYWORD)?,
            lot_id: resolve_exact(headers, LOT_PROVENANCE_HEADERS),
        })
    }
}

/// Column indexes of the Demand Lines fields the engine reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DemandFieldMap {
    pub product_key: usize,
    pub requested_quantity: usize,
    pub document_id: Option<usize>,
    pub item_id: Option<usize>,
}

impl DemandFieldMap {
    pub fn resolve(table: &Table) -> Result<Self, UnresolvedFieldError> {
        let headers = &table.headers;
        let kind = TableKind::DemandLines;

        Ok(Self {
            product_key: resolve(headers, kind, DEMAND_PRODUCT_KEYWORD)?,
            requested_quantity: resolve(headers, kind, DEMAND_QUANTITY_KEYWORD)?,
            document_id: resolve_optional(headers, DEMAND_DOCUMENT_KEYWORD),
            item_id: resolve_optional(headers, DEMAND_ITEM_KEYWORD),
        })
    }

    /// Sort key columns, present only when both document and item were found
    pub fn ordering_columns(&self) -> Option<(usize, usize)> {
        self.document_id.zip(self.item_id)
    }
}
