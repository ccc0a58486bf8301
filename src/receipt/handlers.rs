use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};

use crate::ErrorResponse;

use super::service::ReceiptService;
use super::validation::ReceiptForm;
use super::ReceiptError;

const FORM_HTML: &str = include_str!("../../static/index.html");

/// Submission form - GET /
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(FORM_HTML)
}

#[utoipa::path(
    post,
    path = "/generate",
    tag = "Receipts",
    request_body(content = ReceiptForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "PDF receipt as an attachment", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 500, description = "Ledger or rendering failure", body = ErrorResponse)
    )
)]
pub async fn generate_receipt(
    service: web::Data<ReceiptService>,
    body: web::Bytes,
) -> impl Responder {
    let form = match ReceiptForm::from_urlencoded(&body) {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Malformed receipt form: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&e.to_string()));
        }
    };

    match web::block(move || service.issue(&form)).await {
        Ok(Ok(receipt)) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(receipt.filename)],
            })
            .body(receipt.pdf),
        Ok(Err(ReceiptError::Validation(errors))) => {
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(&errors.to_string()))
        }
        Ok(Err(e)) => {
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
        Err(e) => {
            log::error!("Receipt worker failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("Receipt generation was interrupted"))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(index))
            .route(web::post().to(generate_receipt)),
    )
    .service(web::resource("/generate").route(web::post().to(generate_receipt)));
}
