//! Fixtures shared by handler tests: an in-memory store wired into the real
//! route table, plus request builders.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header;
use actix_web::test::TestRequest;
use tempfile::TempDir;

use crate::data::group_repository::GroupRepository;
use crate::data::memory::MemoryStore;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::group::Group;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::infrastructure::cache::PageCache;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::routes::{AppState, Repositories};

pub const BOUNDARY: &str = "social-test-boundary";

/// Builds the application around a [`TestContext`] the same way `main` does.
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap($crate::presentation::handlers::errors::error_handlers())
                .wrap($crate::presentation::middleware::IdentityMiddleware)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure($crate::presentation::routes::configure($ctx.state.clone())),
        )
        .await
    };
}
pub(crate) use test_app;

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub cache: Arc<PageCache>,
    pub media: TempDir,
}

impl TestContext {
    /// Page cache disabled, so every listing reflects the store.
    pub fn new() -> Self {
        Self::with_cache_ttl(Duration::ZERO)
    }

    pub fn with_cache_ttl(ttl: Duration) -> Self {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories {
            users: store.clone(),
            posts: store.clone(),
            groups: store.clone(),
            comments: store.clone(),
            follows: store.clone(),
        };
        let media = tempfile::tempdir().unwrap();
        let cache = Arc::new(PageCache::new(ttl, 16));
        let state = AppState::new(
            repos,
            JwtKeys::new("test-secret".into()),
            MediaStorage::new(media.path()),
            Arc::clone(&cache),
        );

        Self {
            store,
            state,
            cache,
            media,
        }
    }

    /// Creates a user and returns them with a valid bearer token.
    pub async fn user(&self, username: &str) -> (User, String) {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unused-hash".to_string(),
        );
        let user = UserRepository::create(self.store.as_ref(), user)
            .await
            .unwrap();
        let token = self.state.auth.keys().generate_token(user.id).unwrap();
        (user, token)
    }

    pub async fn group(&self, slug: &str) -> Group {
        let group = Group::new(format!("Group {slug}"), slug.to_string(), String::new());
        GroupRepository::create(self.store.as_ref(), group)
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let post = Post::new(author.id, text.to_string(), group.map(|g| g.id), None);
        PostRepository::create(self.store.as_ref(), post)
            .await
            .unwrap()
    }

    pub fn post_by_text(&self, text: &str) -> Post {
        let mut posts = self.store.posts_with_text(text);
        assert_eq!(posts.len(), 1, "expected exactly one post with text {text:?}");
        posts.remove(0)
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub fn get(uri: &str, token: Option<&str>) -> TestRequest {
    let req = TestRequest::get().uri(uri);
    match token {
        Some(token) => req.insert_header(bearer(token)),
        None => req,
    }
}

/// One part of a multipart body.
pub struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            data,
        }
    }
}

pub fn multipart(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> TestRequest {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                part.name
            ),
            None => format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                part.name
            ),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let req = TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body);
    match token {
        Some(token) => req.insert_header(bearer(token)),
        None => req,
    }
}

pub fn form(uri: &str, token: Option<&str>, fields: &[(&str, &str)]) -> TestRequest {
    let req = TestRequest::post().uri(uri).set_form(fields);
    match token {
        Some(token) => req.insert_header(bearer(token)),
        None => req,
    }
}

pub fn location(res: &actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
