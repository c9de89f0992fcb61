//! Business logic services for the FIFO allocation server

pub mod allocation;
pub mod tabular;

pub use allocation::AllocationService;
