use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{HttpResponse, Result};
use tracing::error;

use crate::presentation::dto::ErrorPage;

/// Replaces every 404 and 500 body with the site's error pages, including
/// the default 404 for URLs no route matches.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, not_found_page)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, server_error_page)
}

fn not_found_page<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let path = res.request().path().to_owned();
    let page = HttpResponse::NotFound().json(ErrorPage {
        status: 404,
        error: "not found",
        path: Some(path),
    });
    let (req, _) = res.into_parts();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, page).map_into_right_body(),
    ))
}

fn server_error_page<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    error!(path = %res.request().path(), "internal server error");
    let page = HttpResponse::InternalServerError().json(ErrorPage {
        status: 500,
        error: "internal server error",
        path: None,
    });
    let (req, _) = res.into_parts();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, page).map_into_right_body(),
    ))
}
