use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::data::follow_repository::FollowRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use crate::domain::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowing,
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl FollowService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    async fn author(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn follow(&self, user_id: Uuid, username: &str) -> Result<FollowOutcome, DomainError> {
        let author = self.author(username).await?;
        if author.id == user_id {
            debug!("self follow ignored");
            return Ok(FollowOutcome::SelfFollow);
        }

        if self.follows.follow(Follow::new(user_id, author.id)).await? {
            Ok(FollowOutcome::Followed)
        } else {
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Returns whether an edge existed.
    #[instrument(skip(self))]
    pub async fn unfollow(&self, user_id: Uuid, username: &str) -> Result<bool, DomainError> {
        let author = self.author(username).await?;
        self.follows.unfollow(user_id, author.id).await
    }
}
