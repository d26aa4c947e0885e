use crate::domain::error::DomainError;
use crate::domain::group::GroupRef;
use crate::domain::post::{AuthorRef, Post, PostFilter, PostView};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, DomainError>;
    /// Persists text, group and image. The author and `pub_date` never change.
    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError>;
    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.image,
           u.id AS author_id, u.username AS author_username,
           g.id AS group_id, g.title AS group_title, g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

/// `$1` is always bound, to NULL for `PostFilter::All`.
fn filter_clause(filter: PostFilter) -> (&'static str, Option<Uuid>) {
    match filter {
        PostFilter::All => ("$1::uuid IS NULL", None),
        PostFilter::Group(id) => ("p.group_id = $1", Some(id)),
        PostFilter::Author(id) => ("p.author_id = $1", Some(id)),
        PostFilter::FollowedBy(id) => (
            "p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)",
            Some(id),
        ),
    }
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: Uuid,
    text: String,
    pub_date: DateTime<Utc>,
    image: Option<String>,
    author_id: Uuid,
    author_username: String,
    group_id: Option<Uuid>,
    group_title: Option<String>,
    group_slug: Option<String>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        let group = match (row.group_id, row.group_title, row.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
            _ => None,
        };
        PostView {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            group,
            image: row.image,
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, text, pub_date, author_id, group_id, image)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.pub_date)
        .bind(post.author_id)
        .bind(post.group_id)
        .bind(&post.image)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, text, pub_date, author_id, group_id, image
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, DomainError> {
        let sql = format!("{VIEW_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_view {}: {}", id, e);
                DomainError::from(e)
            })?;
        Ok(row.map(PostView::from))
    }

    async fn update(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let updated = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET text = $1, group_id = $2, image = $3
            WHERE id = $4
            RETURNING id, text, pub_date, author_id, group_id, image
            "#,
        )
        .bind(&post.text)
        .bind(post.group_id)
        .bind(&post.image)
        .bind(post.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", post.id, e);
            DomainError::from(e)
        })?;

        if updated.is_some() {
            info!(post_id = %post.id, "post updated");
        }

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete post {}: {}", id, e);
                DomainError::from(e)
            })?;

        let deleted = deleted.rows_affected() > 0;
        if deleted {
            info!(post_id = %id, "post deleted");
        }
        Ok(deleted)
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, DomainError> {
        let (clause, param) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM posts p WHERE {clause}");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(param)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!(?filter, "db error while counting posts: {}", e);
                DomainError::from(e)
            })?;
        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, DomainError> {
        let (clause, param) = filter_clause(filter);
        let sql = format!(
            "{VIEW_SELECT} WHERE {clause} ORDER BY p.pub_date DESC, p.id DESC LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(param)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(?filter, "db error while fetching posts: {}", e);
                DomainError::from(e)
            })?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }
}
