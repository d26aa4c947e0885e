pub mod auth;
pub mod errors;
pub mod feed;
pub mod follow;
pub mod post;

use actix_web::{HttpResponse, Responder};
use chrono::Utc;

use crate::presentation::dto::HealthResponse;

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
