use crate::data::has_constraint;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: Group) -> Result<Group, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, DomainError>;
    async fn list_all(&self) -> Result<Vec<Group>, DomainError>;
    /// Deletes the group. Its posts stay, detached from any group.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO groups (id, title, slug, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(group.id)
        .bind(&group.title)
        .bind(&group.slug)
        .bind(&group.description)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if has_constraint(&e, "groups_slug") {
                DomainError::GroupAlreadyExists(group.slug.clone())
            } else {
                error!("failed to create group: {}", e);
                DomainError::from(e)
            }
        })?;

        info!(group_id = %group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find group by slug {}: {}", slug, e);
            DomainError::from(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, DomainError> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to find group by id {}: {}", id, e);
                DomainError::from(e)
            })
    }

    async fn list_all(&self) -> Result<Vec<Group>, DomainError> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM groups ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to list groups: {}", e);
                DomainError::from(e)
            })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete group {}: {}", id, e);
                DomainError::from(e)
            })?;

        let deleted = deleted.rows_affected() > 0;
        if deleted {
            info!(group_id = %id, "group deleted");
        }
        Ok(deleted)
    }
}
