//! FIFO allocation core
//!
//! Allocates demand lines against inventory lots oldest-first, splitting lines a single lot
//! cannot cover and flagging any uncovered remainder. Shared between the backend server
//! and the WASM bindings.

pub mod engine;
pub mod error;
pub mod fields;
pub mod models;
pub mod normalize;
pub mod ordering;
pub mod render;
pub mod types;

pub use engine::*;
pub use error::*;
pub use models::*;
pub use types::*;
