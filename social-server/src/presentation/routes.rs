use std::sync::Arc;

use actix_web::web;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::feed_service::FeedService;
use crate::application::follow_service::FollowService;
use crate::application::post_service::PostService;
use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::cache::PageCache;
use crate::infrastructure::media::MediaStorage;
use crate::infrastructure::security::JwtKeys;
use crate::presentation::forms::multipart_config;
use crate::presentation::handlers::{self, auth, feed, follow, post};
use crate::presentation::middleware::{LoginRequired, PageCacheMiddleware};

/// Repositories behind the web application.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub feed: FeedService,
    pub posts: PostService,
    pub comments: CommentService,
    pub follows: FollowService,
    pub page_cache: Arc<PageCache>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        keys: JwtKeys,
        media: MediaStorage,
        page_cache: Arc<PageCache>,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&repos.users), keys),
            feed: FeedService::new(
                Arc::clone(&repos.posts),
                Arc::clone(&repos.users),
                Arc::clone(&repos.groups),
                Arc::clone(&repos.follows),
                Arc::clone(&repos.comments),
            ),
            posts: PostService::new(Arc::clone(&repos.posts), Arc::clone(&repos.groups), media),
            comments: CommentService::new(Arc::clone(&repos.posts), Arc::clone(&repos.comments)),
            follows: FollowService::new(Arc::clone(&repos.users), Arc::clone(&repos.follows)),
            page_cache,
        }
    }
}

/// Registers services and the route table. Fixed paths come before the
/// `/{username}` patterns that would otherwise shadow them.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state.auth))
            .app_data(web::Data::new(state.feed))
            .app_data(web::Data::new(state.posts))
            .app_data(web::Data::new(state.comments))
            .app_data(web::Data::new(state.follows))
            .app_data(multipart_config())
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .service(
                        web::resource("/login")
                            .name("login")
                            .route(web::get().to(auth::login_form))
                            .route(web::post().to(auth::login)),
                    ),
            )
            .service(
                web::resource("/")
                    .name("index")
                    .wrap(PageCacheMiddleware::new(state.page_cache))
                    .route(web::get().to(feed::index)),
            )
            .service(
                web::resource("/group/{slug}")
                    .name("group")
                    .route(web::get().to(feed::group_posts)),
            )
            .service(
                web::resource("/new")
                    .name("new_post")
                    .wrap(LoginRequired)
                    .route(web::get().to(post::new_post_form))
                    .route(web::post().to(post::create_post)),
            )
            .service(
                web::resource("/follow")
                    .name("follow_index")
                    .wrap(LoginRequired)
                    .route(web::get().to(feed::follow_index)),
            )
            .service(
                web::resource("/{username}")
                    .name("profile")
                    .route(web::get().to(feed::profile)),
            )
            .service(
                web::resource("/{username}/follow")
                    .name("profile_follow")
                    .wrap(LoginRequired)
                    .route(web::post().to(follow::profile_follow)),
            )
            .service(
                web::resource("/{username}/unfollow")
                    .name("profile_unfollow")
                    .wrap(LoginRequired)
                    .route(web::post().to(follow::profile_unfollow)),
            )
            .service(
                web::resource("/{username}/{post_id}")
                    .name("post")
                    .route(web::get().to(feed::post_view)),
            )
            .service(
                web::resource("/{username}/{post_id}/edit")
                    .name("post_edit")
                    .wrap(LoginRequired)
                    .route(web::get().to(post::edit_form))
                    .route(web::post().to(post::post_edit)),
            )
            .service(
                web::resource("/{username}/{post_id}/comment")
                    .name("add_comment")
                    .wrap(LoginRequired)
                    .route(web::post().to(post::add_comment)),
            );
    }
}
