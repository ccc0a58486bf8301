//! OpenAPI document and metrics endpoints, wired the same way `run` wires them.

use actix_web::{http::StatusCode, test, web, App};
use receipt_server::ledger::{InMemoryLog, LedgerWriter};
use receipt_server::receipt::{PageSize, ReceiptService};
use std::sync::Arc;

fn app_state() -> web::Data<ReceiptService> {
    web::Data::new(ReceiptService::new(
        LedgerWriter::new(Arc::new(InMemoryLog::new())),
        "Store Manager",
        PageSize::Letter,
    ))
}

#[actix_web::test]
async fn test_openapi_document_lists_generate() {
    let app = test::init_service(
        App::new()
            .app_data(app_state())
            .configure(receipt_server::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api-doc/openapi.json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let doc: serde_json::Value = test::read_body_json(resp).await;
    assert!(doc["paths"]["/generate"]["post"].is_object());
    assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
}

#[actix_web::test]
async fn test_metrics_endpoint_reports_requests() {
    let app = test::init_service(
        App::new()
            .wrap(receipt_server::build_metrics().unwrap())
            .app_data(app_state())
            .configure(receipt_server::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body(resp).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("receipt_server_http_requests_total"));
}
