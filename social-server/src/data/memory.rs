//! In-memory store implementing every repository trait, for handler and
//! service tests. Mirrors the foreign-key rules of the SQL schema: deleting a
//! user cascades to their posts, comments and follow edges, deleting a post
//! cascades to its comments and deleting a group detaches its posts.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::follow_repository::FollowRepository;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::{Comment, CommentView};
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::group::Group;
use crate::domain::post::{AuthorRef, Post, PostFilter, PostView};
use crate::domain::user::User;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
}

impl Tables {
    fn matches(&self, post: &Post, filter: PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(id) => post.group_id == Some(id),
            PostFilter::Author(id) => post.author_id == id,
            PostFilter::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn view(&self, post: &Post) -> Option<PostView> {
        let author = self.users.iter().find(|u| u.id == post.author_id)?;
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id))
            .map(Group::to_ref);
        Some(PostView {
            id: post.id,
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: AuthorRef {
                id: author.id,
                username: author.username.clone(),
            },
            group,
            image: post.image.clone(),
        })
    }

    fn delete_post(&mut self, id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
        self.posts.len() != before
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn post_count(&self) -> usize {
        self.tables().posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.tables().comments.len()
    }

    pub fn follow_count(&self) -> usize {
        self.tables().follows.len()
    }

    pub fn posts_with_text(&self, text: &str) -> Vec<Post> {
        self.tables()
            .posts
            .iter()
            .filter(|p| p.text == text)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(
                "email already registered".to_string(),
            ));
        }
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(
                "username already taken".to_string(),
            ));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<Uuid> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.delete_post(post_id);
        }
        tables.comments.retain(|c| c.author_id != id);
        tables
            .follows
            .retain(|f| f.user_id != id && f.author_id != id);
        Ok(true)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        let mut tables = self.tables();
        if tables.groups.iter().any(|g| g.slug == group.slug) {
            return Err(DomainError::GroupAlreadyExists(group.slug));
        }
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self.tables().groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, DomainError> {
        Ok(self.tables().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.tables().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(tables.groups.len() != before)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut tables = self.tables();
        if !tables.users.iter().any(|u| u.id == post.author_id) {
            return Err(DomainError::Internal("unknown author".to_string()));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.tables().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, DomainError> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| tables.view(p)))
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables();
        Ok(tables.posts.iter_mut().find(|p| p.id == post.id).map(|p| {
            p.text = post.text.clone();
            p.group_id = post.group_id;
            p.image = post.image.clone();
            p.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tables().delete_post(id))
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .filter(|p| tables.matches(p, filter))
            .count() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError> {
        let tables = self.tables();
        let mut posts: Vec<&Post> = tables
            .posts
            .iter()
            .filter(|p| tables.matches(p, filter))
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(posts
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .filter_map(|p| tables.view(p))
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut tables = self.tables();
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, DomainError> {
        let tables = self.tables();
        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created.cmp(&b.created).then(a.id.cmp(&b.id)));
        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let author = tables.users.iter().find(|u| u.id == c.author_id)?;
                Some(CommentView {
                    id: c.id,
                    author: author.username.clone(),
                    text: c.text.clone(),
                    created: c.created,
                })
            })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn follow(&self, edge: Follow) -> Result<bool, DomainError> {
        if edge.user_id == edge.author_id {
            return Err(DomainError::Internal("self follow".to_string()));
        }
        let mut tables = self.tables();
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == edge.user_id && f.author_id == edge.author_id)
        {
            return Ok(false);
        }
        tables.follows.push(edge);
        Ok(true)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        Ok(self
            .tables()
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn count_followers(&self, author_id: Uuid) -> Result<u64, DomainError> {
        Ok(self
            .tables()
            .follows
            .iter()
            .filter(|f| f.author_id == author_id)
            .count() as u64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64, DomainError> {
        Ok(self
            .tables()
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .count() as u64)
    }
}
