use std::sync::Arc;

use tracing::{info, instrument};

use crate::data::group_repository::GroupRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::validation::{FormErrors, GROUP_TITLE_MAX_LEN, REQUIRED};

pub const SLUG_MAX_LEN: usize = 50;
const INVALID_SLUG: &str =
    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.";

#[derive(Clone)]
pub struct GroupService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    /// Creates a group. Without an explicit slug one is derived from the title.
    #[instrument(skip(self, description))]
    pub async fn create_group(
        &self,
        title: &str,
        slug: Option<&str>,
        description: &str,
    ) -> Result<Group, DomainError> {
        let title = title.trim();
        let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => slug.to_string(),
            None => slug::slugify(title),
        };

        let mut errors = FormErrors::new();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > GROUP_TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {GROUP_TITLE_MAX_LEN} characters."),
            );
        }
        let valid_slug = slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if slug.is_empty() || slug.len() > SLUG_MAX_LEN || !valid_slug {
            errors.add("slug", INVALID_SLUG);
        }
        errors.finish(())?;

        self.groups
            .create(Group::new(
                title.to_string(),
                slug,
                description.trim().to_string(),
            ))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_group(&self, slug: &str) -> Result<(), DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::GroupNotFound(slug.to_string()))?;
        self.groups.delete(group.id).await?;
        info!(group_id = %group.id, "group deleted, its posts detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::MemoryStore;

    #[actix_web::test]
    async fn slug_is_derived_from_title() {
        let service = GroupService::new(Arc::new(MemoryStore::new()));
        let group = service
            .create_group("Planet Express", None, "Our crew")
            .await
            .unwrap();
        assert_eq!(group.slug, "planet-express");
    }

    #[actix_web::test]
    async fn duplicate_and_invalid_slugs_are_rejected() {
        let service = GroupService::new(Arc::new(MemoryStore::new()));
        service
            .create_group("Robots", Some("robots"), "")
            .await
            .unwrap();

        let duplicate = service.create_group("Robots 2", Some("robots"), "").await;
        assert!(matches!(duplicate, Err(DomainError::GroupAlreadyExists(_))));

        let invalid = service.create_group("", Some("no spaces"), "").await;
        let Err(DomainError::Validation(errors)) = invalid else {
            panic!("expected validation error");
        };
        assert_eq!(errors.field("title"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("slug"), [INVALID_SLUG.to_string()]);
    }

    #[actix_web::test]
    async fn deleting_unknown_group_is_not_found() {
        let service = GroupService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            service.delete_group("nope").await,
            Err(DomainError::GroupNotFound(_))
        ));
    }
}
