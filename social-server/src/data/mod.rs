pub mod comment_repository;
pub mod follow_repository;
pub mod group_repository;
#[cfg(test)]
pub mod memory;
pub mod post_repository;
pub mod user_repository;

/// True when `err` is a database error raised by a constraint whose name
/// contains `name`.
pub(crate) fn has_constraint(err: &sqlx::Error, name: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|c| c.contains(name))
}
