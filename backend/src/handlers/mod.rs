//! HTTP handlers for the FIFO allocation server

pub mod allocation;
pub mod health;

pub use allocation::{export_allocation, preview_allocation, run_allocation};
pub use health::health_check;
