use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::validation::{FormErrors, validate_email, validate_password, validate_username};
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(id.to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let username = username.trim().to_string();
        let email = email.trim().to_lowercase();

        let mut errors = FormErrors::new();
        validate_username(&mut errors, &username);
        validate_email(&mut errors, &email);
        validate_password(&mut errors, &password);
        errors.finish(())?;

        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        let user = User::new(username, email, hash);
        self.repo.create(user).await
    }

    /// Authenticates by username or email and issues a bearer token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, String), DomainError> {
        let login = login.trim();
        let user = match self.repo.find_by_username(login).await? {
            Some(user) => Some(user),
            None => self.repo.find_by_email(&login.to_lowercase()).await?,
        }
        .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))?;
        Ok((user, token))
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> Result<(), DomainError> {
        let user = self.find_by_username(username).await?;
        if !self.repo.delete(user.id).await? {
            return Err(DomainError::UserNotFound(username.to_string()));
        }
        info!(user_id = %user.id, "user and owned content deleted");
        Ok(())
    }
}
