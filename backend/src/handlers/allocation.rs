//! HTTP handlers for allocation runs
//!
//! Every endpoint takes the same multipart upload: a `lots` part and a `demand` part,
//! each a CSV file. Nothing is kept between requests.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::services::allocation::{AllocationReport, AllocationUpload, OutputTable};
use crate::services::AllocationService;
use crate::AppState;

/// Collect the `lots` and `demand` parts of a multipart upload
async fn read_upload(mut multipart: Multipart) -> AppResult<AllocationUpload> {
    let mut lots = None;
    let mut demand = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_lowercase).unwrap_or_default();
        match name.as_str() {
            "lots" | "minuta" => lots = Some(field.bytes().await?.to_vec()),
            "demand" | "ci" => demand = Some(field.bytes().await?.to_vec()),
            other => tracing::debug!("Ignoring upload part '{}'", other),
        }
    }

    Ok(AllocationUpload {
        lots: lots.ok_or_else(|| AppError::MissingUpload("lots".to_string()))?,
        demand: demand.ok_or_else(|| AppError::MissingUpload("demand".to_string()))?,
    })
}

/// Run the pass off the async runtime; it is one synchronous loop over the tables.
async fn run_blocking<T, F>(state: &AppState, job: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(AllocationService) -> AppResult<T> + Send + 'static,
{
    let service = AllocationService::new(state.config.allocation.clone());
    tokio::task::spawn_blocking(move || job(service))
        .await
        .map_err(|e| AppError::Internal(format!("Allocation task failed: {}", e)))?
}

/// Run an allocation and return all three tables
pub async fn run_allocation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<AllocationReport>> {
    let upload = read_upload(multipart).await?;
    let report = run_blocking(&state, move |service| service.run(&upload)).await?;
    Ok(Json(report))
}

/// Run an allocation and return the first rows of each table
pub async fn preview_allocation(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<AllocationReport>> {
    let upload = read_upload(multipart).await?;
    let report = run_blocking(&state, move |service| service.preview(&upload)).await?;
    Ok(Json(report))
}

/// Run an allocation and download one output table as CSV
pub async fn export_allocation(
    State(state): State<AppState>,
    Path(output): Path<String>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let output: OutputTable = output.parse()?;
    let upload = read_upload(multipart).await?;
    tracing::info!(output = output.as_str(), "Exporting allocation table");
    let csv = run_blocking(&state, move |service| service.export(&upload, output)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.file_name()),
            ),
        ],
        csv,
    ))
}
