use std::sync::Arc;

use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::{PrometheusMetrics, PrometheusMetricsBuilder};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

pub mod config;
pub mod ledger;
pub mod receipt;

pub use crate::config::AppConfig;

use crate::ledger::{FileAppendLog, LedgerWriter};
use crate::receipt::ReceiptService;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(crate::receipt::handlers::generate_receipt),
    components(schemas(receipt::ReceiptForm, ErrorResponse)),
    tags(
        (name = "Receipts", description = "Payment receipt generation and sales ledger.")
    )
)]
pub struct ApiDoc;

/// OpenAPI document - GET /api-doc/openapi.json
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Build the receipt service backed by the configured ledger file.
pub fn build_service(config: &AppConfig) -> ReceiptService {
    let ledger = LedgerWriter::new(Arc::new(FileAppendLog::new(&config.ledger_path)));
    ReceiptService::new(ledger, config.signatory.clone(), config.page_size)
}

/// Request metrics middleware, also serving GET /metrics.
pub fn build_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("receipt_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// Receipt routes plus the OpenAPI document.
pub fn configure(cfg: &mut web::ServiceConfig) {
    receipt::handlers::config(cfg);
    cfg.service(web::resource("/api-doc/openapi.json").route(web::get().to(openapi_json)));
}

pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let service = web::Data::new(build_service(&config));
    let prometheus = build_metrics()?;

    log::info!(
        "Starting server at http://{}:{} (ledger: {})",
        config.host,
        config.port,
        config.ledger_path.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
