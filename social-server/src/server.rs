use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger, NormalizePath};
use actix_web::{App, HttpServer};
use sqlx::PgPool;
use tracing::info;

use crate::data::comment_repository::PostgresCommentRepository;
use crate::data::follow_repository::PostgresFollowRepository;
use crate::data::group_repository::PostgresGroupRepository;
use crate::data::post_repository::PostgresPostRepository;
use crate::data::user_repository::PostgresUserRepository;
use crate::infrastructure::cache::PageCache;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::handlers::errors::error_handlers;
use crate::presentation::middleware::{IdentityMiddleware, RequestIdMiddleware, TimingMiddleware};
use crate::presentation::routes::{AppState, Repositories, configure};

pub fn postgres_repositories(pool: &PgPool) -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        posts: Arc::new(PostgresPostRepository::new(pool.clone())),
        groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
        comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
        follows: Arc::new(PostgresFollowRepository::new(pool.clone())),
    }
}

pub async fn start_http_server(config: AppConfig, pool: PgPool) -> anyhow::Result<()> {
    let page_cache = Arc::new(PageCache::new(
        config.page_cache_ttl,
        config.page_cache_capacity,
    ));
    let state = AppState::new(
        postgres_repositories(&pool),
        JwtKeys::new(config.jwt_secret.clone()),
        MediaStorage::new(config.media_root.clone()),
        page_cache,
    );

    let bind_address = (config.host.clone(), config.port);
    info!(
        host = %bind_address.0,
        port = bind_address.1,
        media_root = %config.media_root.display(),
        page_cache_ttl_secs = config.page_cache_ttl.as_secs(),
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(error_handlers())
            .wrap(IdentityMiddleware)
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .configure(configure(state.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
