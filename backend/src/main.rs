//! FIFO Allocation Server
//!
//! Allocates demand lines against inventory lots first-in-first-out. Clients upload the
//! Lots and Demand Lines tables as CSV and get back the allocated lines, the updated lot
//! balances and a consumption ledger.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod routes;
mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing
    let json_logs = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fifo_server=debug,shared=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting FIFO Allocation Server");
    tracing::info!("Environment: {}", config.environment);

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.allocation.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "FIFO Allocation API v1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "fifo-test-boundary";

    const LOTS_CSV: &str = "\
Descripcion,Fraccion,Desc Fraccion,Precio,Saldo
widget,L1,First lot,1.50,5
widget,L2,Second lot,1.75,10
";

    const DEMAND_CSV: &str = "\
DES NO CUSTOM,Delivery Quantity
Widget,8
";

    fn test_app() -> Router {
        let config = Config {
            environment: "test".to_string(),
            server: config::ServerConfig::default(),
            allocation: config::AllocationConfig::default(),
            logging: config::LoggingConfig { json: false },
        };
        create_app(AppState {
            config: Arc::new(config),
        })
    }

    fn multipart_body(parts: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, content) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.csv\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn upload_request(uri: &str, parts: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_run_allocation() {
        let request = upload_request(
            "/api/v1/allocations",
            &[("lots", LOTS_CSV), ("demand", DEMAND_CSV)],
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["summary"]["records"], 2);
        assert_eq!(json["summary"]["fragmented_lines"], 1);
        assert_eq!(json["allocated_lines"]["rows"][0][5], "línea de sse");
        assert_eq!(json["updated_lots"]["rows"][1][4], 7.0);
        assert_eq!(json["ledger"]["rows"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_missing_part_is_rejected() {
        let request = upload_request("/api/v1/allocations", &[("lots", LOTS_CSV)]);
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MISSING_UPLOAD");
        assert_eq!(json["error"]["field"], "demand");
    }

    #[tokio::test]
    async fn test_unresolved_field_is_unprocessable() {
        let request = upload_request(
            "/api/v1/allocations",
            &[("minuta", "Descripcion,Saldo\nwidget,5\n"), ("ci", DEMAND_CSV)],
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"]["field"], "fraccion");
    }

    #[tokio::test]
    async fn test_export_csv_download() {
        let request = upload_request(
            "/api/v1/allocations/export/updated-lots",
            &[("lots", LOTS_CSV), ("demand", DEMAND_CSV)],
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Minuta_actualizada.csv\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            csv,
            "Descripcion,Fraccion,Desc Fraccion,Precio,Saldo\nwidget,L1,First lot,1.50,0\nwidget,L2,Second lot,1.75,7\n"
        );
    }

    #[tokio::test]
    async fn test_unknown_export_is_not_found() {
        let request = upload_request(
            "/api/v1/allocations/export/minuta",
            &[("lots", LOTS_CSV), ("demand", DEMAND_CSV)],
        );
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
