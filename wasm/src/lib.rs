//! WebAssembly module for FIFO allocation
//!
//! Provides client-side computation for:
//! - Full allocation runs over tables already parsed in the browser
//! - Column resolution checks before upload
//! - Product key normalization

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;

use shared::error::TableKind;
use shared::{fields, normalize, FifoAllocator};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("fifo-allocation wasm loaded"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

/// Run a FIFO allocation over two JSON tables (`{ headers, rows }`).
///
/// Returns the allocation run as JSON: summary plus the three output tables.
#[wasm_bindgen]
pub fn run_fifo(lots_json: &str, demand_json: &str) -> Result<String, JsValue> {
    let lots: Table = serde_json::from_str(lots_json)
        .map_err(|e| js_error(format!("Invalid lots table JSON: {}", e)))?;
    let demand: Table = serde_json::from_str(demand_json)
        .map_err(|e| js_error(format!("Invalid demand table JSON: {}", e)))?;

    let run = FifoAllocator::run(lots, demand).map_err(|e| js_error(e.to_string()))?;
    serde_json::to_string(&run).map_err(|e| js_error(format!("Serialization failed: {}", e)))
}

/// Position of the first header containing `keyword`
#[wasm_bindgen]
pub fn resolve_column(headers_json: &str, keyword: &str) -> Result<usize, JsValue> {
    let headers: Vec<String> = serde_json::from_str(headers_json)
        .map_err(|e| js_error(format!("Invalid headers JSON: {}", e)))?;

    // The table kind only labels the error message here
    fields::resolve(&headers, TableKind::Lots, keyword).map_err(|e| js_error(e.to_string()))
}

/// Normalize a product description the way the engine joins on it
#[wasm_bindgen]
pub fn normalize_product_key(description: &str) -> String {
    normalize::normalize_product_key(&Cell::text(description))
}
