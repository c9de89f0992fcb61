//! Domain models for FIFO allocation

mod allocation;
mod demand;
mod ledger;
mod lot;

pub use allocation::*;
pub use demand::*;
pub use ledger::*;
pub use lot::*;
