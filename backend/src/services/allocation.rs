//! Allocation service: turns uploaded CSV tables into a FIFO allocation report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AllocationRun, AllocationSummary, FifoAllocator, Table};
use uuid::Uuid;

use super::tabular::{read_table, write_table};
use crate::config::AllocationConfig;
use crate::error::{AppError, AppResult};

/// Allocation service for running FIFO passes over uploaded tables
#[derive(Clone)]
pub struct AllocationService {
    config: AllocationConfig,
}

/// Raw uploaded files for one run
#[derive(Debug, Clone)]
pub struct AllocationUpload {
    pub lots: Vec<u8>,
    pub demand: Vec<u8>,
}

/// Result of one allocation run as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub summary: AllocationSummary,
    pub allocated_lines: Table,
    pub updated_lots: Table,
    pub ledger: Table,
}

impl AllocationReport {
    fn from_run(run: AllocationRun) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            summary: run.summary,
            allocated_lines: run.allocated_lines,
            updated_lots: run.updated_lots,
            ledger: run.ledger,
        }
    }

    /// Same report with every table cut to its first `rows` rows
    pub fn preview(mut self, rows: usize) -> Self {
        self.allocated_lines = self.allocated_lines.head(rows);
        self.updated_lots = self.updated_lots.head(rows);
        self.ledger = self.ledger.head(rows);
        self
    }
}

/// Downloadable output tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputTable {
    AllocatedLines,
    UpdatedLots,
    Ledger,
}

impl OutputTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputTable::AllocatedLines => "allocated-lines",
            OutputTable::UpdatedLots => "updated-lots",
            OutputTable::Ledger => "ledger",
        }
    }

    /// Download file name
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputTable::AllocatedLines => "CI_modificado.csv",
            OutputTable::UpdatedLots => "Minuta_actualizada.csv",
            OutputTable::Ledger => "Consumo_por_lote.csv",
        }
    }

    fn select(self, report: &AllocationReport) -> &Table {
        match self {
            OutputTable::AllocatedLines => &report.allocated_lines,
            OutputTable::UpdatedLots => &report.updated_lots,
            OutputTable::Ledger => &report.ledger,
        }
    }
}

impl std::str::FromStr for OutputTable {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allocated-lines" => Ok(OutputTable::AllocatedLines),
            "updated-lots" => Ok(OutputTable::UpdatedLots),
            "ledger" => Ok(OutputTable::Ledger),
            other => Err(AppError::NotFound(format!("Output table '{}'", other))),
        }
    }
}

impl AllocationService {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Parse both uploads and run one allocation pass
    pub fn run(&self, upload: &AllocationUpload) -> AppResult<AllocationReport> {
        let delimiter = self.config.delimiter_byte();
        let lots = read_table(&upload.lots, delimiter, "lots")?;
        let demand = read_table(&upload.demand, delimiter, "demand")?;

        let run = FifoAllocator::run(lots, demand)?;
        let report = AllocationReport::from_run(run);

        tracing::info!(
            run_id = %report.run_id,
            demand_lines = report.summary.demand_lines,
            records = report.summary.records,
            non_inventoried = report.summary.non_inventoried_records,
            lots_touched = report.summary.lots_touched,
            "Allocation run completed"
        );

        Ok(report)
    }

    /// Run and cut every table to the configured preview size
    pub fn preview(&self, upload: &AllocationUpload) -> AppResult<AllocationReport> {
        Ok(self.run(upload)?.preview(self.config.preview_rows))
    }

    /// Run and serialize one output table as CSV
    pub fn export(&self, upload: &AllocationUpload, output: OutputTable) -> AppResult<String> {
        let report = self.run(upload)?;
        write_table(output.select(&report), self.config.delimiter_byte())
    }
}
