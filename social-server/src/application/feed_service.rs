use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::find_post_of;
use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::CommentView;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::pagination::{
    FOLLOW_PAGE_SIZE, GROUP_PAGE_SIZE, INDEX_PAGE_SIZE, PROFILE_PAGE_SIZE, Page, Paginator,
};
use crate::domain::post::{PostFilter, PostView};
use crate::domain::user::{AuthorStats, User};

pub struct Profile {
    pub author: User,
    pub stats: AuthorStats,
    pub following: bool,
    pub page: Page<PostView>,
}

pub struct PostDetail {
    pub post: PostView,
    pub stats: AuthorStats,
    pub following: bool,
    pub comments: Vec<CommentView>,
}

/// Read side of the application: every paginated listing and the post page.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    follows: Arc<dyn FollowRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        follows: Arc<dyn FollowRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            groups,
            follows,
            comments,
        }
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        per_page: u32,
        page: Option<&str>,
    ) -> Result<Page<PostView>, DomainError> {
        let count = self.posts.count(filter).await?;
        let window = Paginator::new(per_page, count).resolve(page);
        let items = self
            .posts
            .list(filter, window.limit, window.offset)
            .await?;
        Ok(window.into_page(items))
    }

    async fn author_stats(&self, author_id: Uuid) -> Result<AuthorStats, DomainError> {
        Ok(AuthorStats {
            posts_count: self.posts.count(PostFilter::Author(author_id)).await?,
            followers_count: self.follows.count_followers(author_id).await?,
            following_count: self.follows.count_following(author_id).await?,
        })
    }

    async fn is_following(&self, viewer: Option<Uuid>, author_id: Uuid) -> Result<bool, DomainError> {
        match viewer {
            Some(viewer) if viewer != author_id => self.follows.exists(viewer, author_id).await,
            _ => Ok(false),
        }
    }

    #[instrument(skip(self))]
    pub async fn index(&self, page: Option<&str>) -> Result<Page<PostView>, DomainError> {
        self.paginate(PostFilter::All, INDEX_PAGE_SIZE, page).await
    }

    #[instrument(skip(self))]
    pub async fn group(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Group, Page<PostView>), DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))?;
        let page = self
            .paginate(PostFilter::Group(group.id), GROUP_PAGE_SIZE, page)
            .await?;
        Ok((group, page))
    }

    #[instrument(skip(self))]
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: Option<&str>,
    ) -> Result<Profile, DomainError> {
        let author = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))?;
        let stats = self.author_stats(author.id).await?;
        let following = self.is_following(viewer, author.id).await?;
        let page = self
            .paginate(PostFilter::Author(author.id), PROFILE_PAGE_SIZE, page)
            .await?;

        Ok(Profile {
            author,
            stats,
            following,
            page,
        })
    }

    #[instrument(skip(self))]
    pub async fn post_detail(
        &self,
        username: &str,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostDetail, DomainError> {
        let post = find_post_of(self.posts.as_ref(), username, post_id).await?;
        let stats = self.author_stats(post.author.id).await?;
        let following = self.is_following(viewer, post.author.id).await?;
        let comments = self.comments.list_for_post(post.id).await?;

        Ok(PostDetail {
            post,
            stats,
            following,
            comments,
        })
    }

    #[instrument(skip(self))]
    pub async fn follow_feed(
        &self,
        user_id: Uuid,
        page: Option<&str>,
    ) -> Result<Page<PostView>, DomainError> {
        self.paginate(PostFilter::FollowedBy(user_id), FOLLOW_PAGE_SIZE, page)
            .await
    }
}
