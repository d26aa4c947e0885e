use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::feed_service::FeedService;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    GroupResponse, IndexResponse, PageQuery, PostDetailResponse, PostItem, ProfileResponse,
};
use crate::presentation::utils::{AuthenticatedUser, CurrentUser, request_id};

pub async fn index(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = feed.index(query.page.as_deref()).await?;
    debug!(
        request_id = %request_id(&req),
        page = page.number,
        count = page.count,
        "index rendered"
    );

    Ok(HttpResponse::Ok().json(IndexResponse {
        page: page.map(PostItem::from),
    }))
}

pub async fn group_posts(
    feed: web::Data<FeedService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let (group, page) = feed.group(&path, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(GroupResponse {
        group,
        page: page.map(PostItem::from),
    }))
}

pub async fn profile(
    feed: web::Data<FeedService>,
    viewer: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let profile = feed
        .profile(&path, viewer.id(), query.page.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse::new(profile, viewer.id())))
}

pub async fn post_view(
    feed: web::Data<FeedService>,
    viewer: CurrentUser,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (username, post_id) = path.into_inner();
    let detail = feed.post_detail(&username, post_id, viewer.id()).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse::new(detail, viewer.id())))
}

/// Posts by the authors the current user follows.
pub async fn follow_index(
    req: HttpRequest,
    user: AuthenticatedUser,
    feed: web::Data<FeedService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let page = feed.follow_feed(user.id, query.page.as_deref()).await?;
    info!(
        request_id = %request_id(&req),
        username = %user.username,
        count = page.count,
        "follow feed rendered"
    );

    Ok(HttpResponse::Ok().json(IndexResponse {
        page: page.map(PostItem::from),
    }))
}
