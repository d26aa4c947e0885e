use std::path::{Path, PathBuf};

use image::{GenericImageView, ImageFormat};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

pub const POST_IMAGE_DIR: &str = "posts";
pub const MEDIA_URL: &str = "/media/";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("not an image or a corrupted image")]
    NotAnImage,
    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
}

/// What an uploaded blob turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub extension: &'static str,
}

/// Fully decodes `bytes`, so a valid header over a damaged body is rejected.
/// CPU bound; call it off the async executor.
pub fn inspect_image(bytes: &[u8]) -> Result<ImageInfo, MediaError> {
    let format = image::guess_format(bytes).map_err(|_| MediaError::NotAnImage)?;
    let decoded =
        image::load_from_memory_with_format(bytes, format).map_err(|_| MediaError::NotAnImage)?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(MediaError::NotAnImage);
    }

    let extension = match format {
        ImageFormat::Gif => "gif",
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Bmp => "bmp",
        other => other.extensions_str().first().copied().unwrap_or("img"),
    };

    Ok(ImageInfo {
        width,
        height,
        extension,
    })
}

/// Uploaded files on local disk, addressed by paths relative to `root`.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a validated post image and returns its relative path.
    pub async fn save_post_image(
        &self,
        bytes: &[u8],
        info: ImageInfo,
    ) -> Result<String, MediaError> {
        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}.{}", Uuid::new_v4().simple(), info.extension);
        tokio::fs::write(dir.join(&name), bytes).await?;

        let relative = format!("{POST_IMAGE_DIR}/{name}");
        info!(path = %relative, width = info.width, height = info.height, "image stored");
        Ok(relative)
    }

    /// Deletes a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) {
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => info!(path = %relative, "image removed"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %relative, error = %err, "failed to remove image"),
        }
    }

    pub fn url(relative: &str) -> String {
        format!("{MEDIA_URL}{relative}")
    }
}
