use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::feed_service::{PostDetail, Profile};
use crate::domain::comment::CommentView;
use crate::domain::group::{Group, GroupRef};
use crate::domain::pagination::Page;
use crate::domain::post::{AuthorRef, PostView};
use crate::domain::user::AuthorStats;
use crate::domain::validation::FormErrors;
use crate::infrastructure::media::MediaStorage;
use crate::presentation::utils::{post_url, profile_url};

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `login` is a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
    pub user: UserResponse,
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct LoginFormResponse {
    pub next: String,
    pub fields: [&'static str; 2],
}

// ======================= LISTINGS =======================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostItem {
    pub id: Uuid,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorRef,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
    pub url: String,
}

impl From<PostView> for PostItem {
    fn from(post: PostView) -> Self {
        Self {
            url: post_url(&post.author.username, post.id),
            image: post.image.as_deref().map(MediaStorage::url),
            id: post.id,
            text: post.text,
            pub_date: post.pub_date,
            author: post.author,
            group: post.group,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub page: Page<PostItem>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub group: Group,
    pub page: Page<PostItem>,
}

/// Which follow button the viewer is offered on an author's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    /// Anonymous visitors and the author themselves get no button.
    pub fn offered(viewer: Option<Uuid>, author_id: Uuid, following: bool) -> Option<Self> {
        match viewer {
            Some(viewer) if viewer != author_id && following => Some(Self::Unfollow),
            Some(viewer) if viewer != author_id => Some(Self::Follow),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorCard {
    pub id: Uuid,
    pub username: String,
    pub url: String,
    #[serde(flatten)]
    pub stats: AuthorStats,
    pub following: bool,
    pub follow_action: Option<FollowAction>,
}

impl AuthorCard {
    fn new(author: &AuthorRef, stats: AuthorStats, following: bool, viewer: Option<Uuid>) -> Self {
        Self {
            id: author.id,
            username: author.username.clone(),
            url: profile_url(&author.username),
            stats,
            following,
            follow_action: FollowAction::offered(viewer, author.id, following),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub author: AuthorCard,
    pub page: Page<PostItem>,
}

impl ProfileResponse {
    pub fn new(profile: Profile, viewer: Option<Uuid>) -> Self {
        let author = AuthorRef {
            id: profile.author.id,
            username: profile.author.username,
        };
        Self {
            author: AuthorCard::new(&author, profile.stats, profile.following, viewer),
            page: profile.page.map(PostItem::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub author: AuthorCard,
    pub post: PostItem,
    pub comments: Vec<CommentView>,
    /// Present only for signed-in viewers.
    pub comment_form: Option<CommentFormView>,
    pub can_edit: bool,
}

impl PostDetailResponse {
    pub fn new(detail: PostDetail, viewer: Option<Uuid>) -> Self {
        Self {
            author: AuthorCard::new(&detail.post.author, detail.stats, detail.following, viewer),
            can_edit: viewer == Some(detail.post.author.id),
            comment_form: viewer.map(|_| CommentFormView::default()),
            comments: detail.comments,
            post: PostItem::from(detail.post),
        }
    }
}

// ======================= FORMS =======================

#[derive(Debug, Serialize)]
pub struct GroupChoice {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

impl From<Group> for GroupChoice {
    fn from(group: Group) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct PostFormView {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
    pub errors: FormErrors,
}

/// The new-post and edit-post page. `post_edit` tells the two apart.
#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub form: PostFormView,
    pub groups: Vec<GroupChoice>,
    pub post_edit: bool,
    pub post: Option<PostItem>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct CommentFormView {
    pub text: String,
    pub errors: FormErrors,
}

#[derive(Debug, Serialize)]
pub struct CommentPageResponse {
    pub post: PostItem,
    pub comments: Vec<CommentView>,
    pub comment_form: CommentFormView,
}

// ======================= Utils =======================

#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub status: u16,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_action_depends_on_viewer() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();

        assert_eq!(FollowAction::offered(None, author, false), None);
        assert_eq!(FollowAction::offered(Some(author), author, false), None);
        assert_eq!(
            FollowAction::offered(Some(viewer), author, false),
            Some(FollowAction::Follow)
        );
        assert_eq!(
            FollowAction::offered(Some(viewer), author, true),
            Some(FollowAction::Unfollow)
        );
    }

    #[test]
    fn post_item_links_image_under_media() {
        let view = PostView {
            id: Uuid::nil(),
            text: "hi".into(),
            pub_date: Utc::now(),
            author: AuthorRef {
                id: Uuid::new_v4(),
                username: "leela".into(),
            },
            group: None,
            image: Some("posts/a.gif".into()),
        };

        let item = PostItem::from(view);
        assert_eq!(item.image.as_deref(), Some("/media/posts/a.gif"));
        assert_eq!(item.url, format!("/leela/{}", Uuid::nil()));
    }
}
