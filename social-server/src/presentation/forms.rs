//! Multipart post form, the only form that carries a file.

use actix_multipart::form::{MultipartForm, MultipartFormConfig, bytes::Bytes, text::Text};

use crate::application::post_service::{PostInput, Upload};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(MultipartForm)]
pub struct PostForm {
    pub text: Option<Text<String>>,
    pub group: Option<Text<String>>,
    #[multipart(limit = "5MiB")]
    pub image: Option<Bytes>,
    #[multipart(rename = "image-clear")]
    pub image_clear: Option<Text<String>>,
}

impl PostForm {
    /// Text and group as submitted, for re-rendering a rejected form.
    pub fn echo(&self) -> (String, Option<String>) {
        (
            self.text.as_ref().map(|t| t.0.clone()).unwrap_or_default(),
            self.group
                .as_ref()
                .map(|g| g.0.clone())
                .filter(|g| !g.is_empty()),
        )
    }

    pub fn into_input(self) -> PostInput {
        PostInput {
            text: self.text.map(Text::into_inner),
            group: self.group.map(Text::into_inner),
            image: self.image.map(|file| Upload {
                file_name: file.file_name,
                bytes: file.data.to_vec(),
            }),
            clear_image: self
                .image_clear
                .is_some_and(|flag| !matches!(flag.as_str(), "" | "false" | "off" | "0")),
        }
    }
}

/// Body limits for the post form; the image may use the whole in-memory budget.
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .memory_limit(MAX_IMAGE_BYTES + 64 * 1024)
        .total_limit(MAX_IMAGE_BYTES + 128 * 1024)
}
