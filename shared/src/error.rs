//! Error types for the allocation core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which input table a field was looked up in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Lots,
    DemandLines,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Lots => write!(f, "Lots"),
            TableKind::DemandLines => write!(f, "Demand Lines"),
        }
    }
}

/// A required logical field matched no header of its table
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("no column in the {table} table contains \"{keyword}\"")]
pub struct UnresolvedFieldError {
    pub table: TableKind,
    pub keyword: String,
    /// Normalized headers that were searched
    pub headers: Vec<String>,
}

/// Errors that abort an allocation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error(transparent)]
    UnresolvedField(#[from] UnresolvedFieldError),
}

pub type AllocationResult<T> = Result<T, AllocationError>;
