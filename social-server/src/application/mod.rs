pub mod auth_service;
pub mod comment_service;
pub mod feed_service;
pub mod follow_service;
pub mod group_service;
pub mod post_service;

use uuid::Uuid;

use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::post::PostView;

/// Looks a post up by its author's username and its id. A post that exists
/// under another author is reported as missing.
pub(crate) async fn find_post_of(
    posts: &dyn PostRepository,
    username: &str,
    post_id: Uuid,
) -> Result<PostView, DomainError> {
    posts
        .find_view(post_id)
        .await?
        .filter(|post| post.author.username == username)
        .ok_or(DomainError::PostNotFound(post_id))
}
