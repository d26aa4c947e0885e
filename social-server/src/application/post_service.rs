use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::application::find_post_of;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::post::{ImageChange, Post, PostDraft, PostView};
use crate::domain::validation::{FormErrors, INVALID_CHOICE, INVALID_IMAGE, required_text};
use crate::infrastructure::media::{MediaError, MediaStorage, inspect_image};

/// Raw post form fields as submitted.
#[derive(Debug, Default, Clone)]
pub struct PostInput {
    pub text: Option<String>,
    pub group: Option<String>,
    pub image: Option<Upload>,
    pub clear_image: bool,
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Whether the current user may edit a post.
pub enum EditAccess {
    Author(PostView),
    NotAuthor,
}

pub enum EditOutcome {
    Updated(Post),
    NotAuthor,
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    media: MediaStorage,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        groups: Arc<dyn GroupRepository>,
        media: MediaStorage,
    ) -> Self {
        Self {
            posts,
            groups,
            media,
        }
    }

    /// Groups a post can be filed under.
    pub async fn group_choices(&self) -> Result<Vec<Group>, DomainError> {
        self.groups.list_all().await
    }

    /// Validates every field first and only then stores the image, so a
    /// rejected form never leaves a file behind.
    async fn validate(&self, input: PostInput) -> Result<PostDraft, DomainError> {
        let mut errors = FormErrors::new();
        let text = required_text(&mut errors, "text", input.text.as_deref());

        let group_id = match input.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let found = match Uuid::parse_str(raw) {
                    Ok(id) => self.groups.find_by_id(id).await?.map(|group| group.id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.add("group", INVALID_CHOICE);
                }
                found
            }
        };

        let upload = input.image.filter(|upload| !upload.bytes.is_empty());
        let image = match upload {
            Some(upload) => {
                let (upload, checked) = tokio::task::spawn_blocking(move || {
                    let checked = inspect_image(&upload.bytes);
                    (upload, checked)
                })
                .await
                .map_err(|e| DomainError::Internal(format!("image check failed: {e}")))?;
                match checked {
                    Ok(info) => Some((upload, info)),
                    Err(MediaError::NotAnImage) => {
                        debug!(file_name = ?upload.file_name, "rejected non-image upload");
                        errors.add("image", INVALID_IMAGE);
                        None
                    }
                    Err(MediaError::Io(err)) => {
                        return Err(DomainError::Internal(err.to_string()));
                    }
                }
            }
            None => None,
        };

        errors.finish(())?;

        let image = match image {
            Some((upload, info)) => ImageChange::Replace(
                self.media
                    .save_post_image(&upload.bytes, info)
                    .await
                    .map_err(|e| DomainError::Internal(e.to_string()))?,
            ),
            None if input.clear_image => ImageChange::Clear,
            None => ImageChange::Keep,
        };

        Ok(PostDraft {
            text,
            group_id,
            image,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create_post(&self, author_id: Uuid, input: PostInput) -> Result<Post, DomainError> {
        let draft = self.validate(input).await?;
        let image = match draft.image {
            ImageChange::Replace(path) => Some(path),
            ImageChange::Keep | ImageChange::Clear => None,
        };
        let post = Post::new(author_id, draft.text, draft.group_id, image);
        let saved_image = post.image.clone();

        match self.posts.create(post).await {
            Ok(post) => Ok(post),
            Err(err) => {
                if let Some(path) = saved_image {
                    self.media.remove(&path).await;
                }
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn edit_access(
        &self,
        username: &str,
        post_id: Uuid,
        editor_id: Uuid,
    ) -> Result<EditAccess, DomainError> {
        let post = find_post_of(self.posts.as_ref(), username, post_id).await?;
        if post.author.id != editor_id {
            info!(post_id = %post_id, editor_id = %editor_id, "edit attempt by non-author");
            return Ok(EditAccess::NotAuthor);
        }
        Ok(EditAccess::Author(post))
    }

    /// Applies an edit. The previous image file is removed once the post no
    /// longer points at it.
    #[instrument(skip(self, input))]
    pub async fn edit_post(
        &self,
        username: &str,
        post_id: Uuid,
        editor_id: Uuid,
        input: PostInput,
    ) -> Result<EditOutcome, DomainError> {
        if let EditAccess::NotAuthor = self.edit_access(username, post_id, editor_id).await? {
            return Ok(EditOutcome::NotAuthor);
        }

        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        let draft = self.validate(input).await?;
        let previous_image = post.image.clone();

        post.text = draft.text;
        post.group_id = draft.group_id;
        let new_image = match draft.image {
            ImageChange::Keep => None,
            ImageChange::Clear => {
                post.image = None;
                None
            }
            ImageChange::Replace(path) => {
                post.image = Some(path.clone());
                Some(path)
            }
        };

        let updated = self
            .posts
            .update(&post)
            .await
            .and_then(|updated| updated.ok_or(DomainError::PostNotFound(post_id)));
        let updated = match updated {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(path) = &new_image {
                    self.media.remove(path).await;
                }
                return Err(err);
            }
        };

        if let Some(previous) = previous_image {
            if updated.image.as_deref() != Some(previous.as_str()) {
                self.media.remove(&previous).await;
            }
        }

        Ok(EditOutcome::Updated(updated))
    }

    /// Deletes a post with its comments and its image file.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        if !self.posts.delete(post_id).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        if let Some(image) = post.image {
            self.media.remove(&image).await;
        }
        Ok(())
    }
}
