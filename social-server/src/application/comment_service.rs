use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::find_post_of;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::post::PostView;
use crate::domain::validation::{FormErrors, required_text};

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// The post a comment form targets, together with its current comments.
    pub async fn thread(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<(PostView, Vec<CommentView>), DomainError> {
        let post = find_post_of(self.posts.as_ref(), username, post_id).await?;
        let comments = self.comments.list_for_post(post.id).await?;
        Ok((post, comments))
    }

    #[instrument(skip(self, text))]
    pub async fn add_comment(
        &self,
        username: &str,
        post_id: Uuid,
        author_id: Uuid,
        text: Option<&str>,
    ) -> Result<Comment, DomainError> {
        let post = find_post_of(self.posts.as_ref(), username, post_id).await?;

        let mut errors = FormErrors::new();
        let text = required_text(&mut errors, "text", text);
        errors.finish(())?;

        self.comments
            .create(Comment::new(post.id, author_id, text))
            .await
    }
}
