use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Inserts the edge unless it already exists. Returns whether a row was added.
    async fn follow(&self, edge: Follow) -> Result<bool, DomainError>;
    /// Returns whether an edge was removed.
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn count_followers(&self, author_id: Uuid) -> Result<u64, DomainError>;
    async fn count_following(&self, user_id: Uuid) -> Result<u64, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_where(&self, column: &'static str, id: Uuid) -> Result<u64, DomainError> {
        let sql = format!("SELECT COUNT(*) FROM follows WHERE {column} = $1");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to count follows by {} {}: {}", column, id, e);
                DomainError::from(e)
            })?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, edge: Follow) -> Result<bool, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (id, user_id, author_id)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT follows_user_author_key DO NOTHING
            "#,
        )
        .bind(edge.id)
        .bind(edge.user_id)
        .bind(edge.author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to follow {} -> {}: {}", edge.user_id, edge.author_id, e);
            DomainError::from(e)
        })?;

        let inserted = inserted.rows_affected() > 0;
        if inserted {
            info!(user_id = %edge.user_id, author_id = %edge.author_id, "follow created");
        }
        Ok(inserted)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to unfollow {} -> {}: {}", user_id, author_id, e);
                DomainError::from(e)
            })?;

        let deleted = deleted.rows_affected() > 0;
        if deleted {
            info!(user_id = %user_id, author_id = %author_id, "follow removed");
        }
        Ok(deleted)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to check follow {} -> {}: {}", user_id, author_id, e);
            DomainError::from(e)
        })
    }

    async fn count_followers(&self, author_id: Uuid) -> Result<u64, DomainError> {
        self.count_where("author_id", author_id).await
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64, DomainError> {
        self.count_where("user_id", user_id).await
    }
}
