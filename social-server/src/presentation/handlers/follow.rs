use actix_web::{HttpRequest, HttpResponse, web};
use tracing::info;

use crate::application::follow_service::FollowService;
use crate::domain::error::DomainError;
use crate::presentation::utils::{AuthenticatedUser, profile_url, redirect, request_id};

pub async fn profile_follow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let outcome = follows.follow(user.id, &path).await?;
    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %path,
        outcome = ?outcome,
        "follow requested"
    );

    Ok(redirect(&profile_url(&path)))
}

pub async fn profile_unfollow(
    req: HttpRequest,
    user: AuthenticatedUser,
    follows: web::Data<FollowService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let removed = follows.unfollow(user.id, &path).await?;
    info!(
        request_id = %request_id(&req),
        username = %user.username,
        author = %path,
        removed,
        "unfollow requested"
    );

    Ok(redirect(&profile_url(&path)))
}
