//! # Media Infrastructure
//!
//! Manages the media and static roots of the application: uploaded files live
//! under the media root, pre-built assets under the static root. Both
//! directories are created on init and served by the HTTP layer.
//!
//! Uploaded images are validated by decoding before anything touches disk;
//! filenames are random, so a stored path never reveals the original name.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ladle_media::MediaStore;
//!
//! # async fn example() -> Result<(), ladle_media::MediaError> {
//! let media = MediaStore::builder()
//!     .media_dir("media")
//!     .static_dir("static")
//!     .init()
//!     .await?;
//!
//! let stored = media.store_image("recipes", include_bytes!("../tests/fixtures/pixel.png")).await?;
//! media.remove(&stored.path).await?;
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::{MediaError, MediaErrorExt};

use image::ImageFormat;
use nanoid::nanoid;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Image formats accepted for upload.
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// A stored media file, addressed relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Media-relative path, e.g. `recipes/h2K9mQ4X7pLw.jpg`.
    pub path: String,
}

#[derive(Debug)]
struct MediaStoreInner {
    media_root: PathBuf,
    static_root: PathBuf,
}

/// Handle to the media/static directory layout.
#[derive(Debug, Clone)]
pub struct MediaStore {
    inner: Arc<MediaStoreInner>,
}

/// A fluent builder for configuring and initializing the [`MediaStore`].
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct MediaStoreBuilder {
    media_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
}

impl MediaStoreBuilder {
    /// Sets the directory uploaded files are written to.
    pub fn media_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.media_dir = Some(path.into());
        self
    }

    /// Sets the directory static assets are served from.
    pub fn static_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(path.into());
        self
    }

    /// Consumes the builder, creates both roots if missing, and returns the handle.
    ///
    /// # Errors
    /// * [`MediaError::Validation`] if a directory was not configured.
    /// * [`MediaError::Io`] if a root cannot be created.
    pub async fn init(self) -> Result<MediaStore, MediaError> {
        let media_root = self.media_dir.ok_or(MediaError::Validation {
            message: "media_dir is required".into(),
            context: None,
        })?;
        let static_root = self.static_dir.ok_or(MediaError::Validation {
            message: "static_dir is required".into(),
            context: None,
        })?;

        fs::create_dir_all(&media_root)
            .await
            .context(format!("Creating media root {}", media_root.display()))?;
        fs::create_dir_all(&static_root)
            .await
            .context(format!("Creating static root {}", static_root.display()))?;

        info!(media = %media_root.display(), r#static = %static_root.display(), "Media roots ready");

        Ok(MediaStore { inner: Arc::new(MediaStoreInner { media_root, static_root }) })
    }
}

impl MediaStore {
    /// Returns a new [`MediaStoreBuilder`].
    pub fn builder() -> MediaStoreBuilder {
        MediaStoreBuilder::default()
    }

    /// Root directory for uploaded files.
    #[must_use]
    pub fn media_root(&self) -> &Path {
        &self.inner.media_root
    }

    /// Root directory for static assets.
    #[must_use]
    pub fn static_root(&self) -> &Path {
        &self.inner.static_root
    }

    /// Validates and persists an uploaded image under `<media root>/<namespace>/`.
    ///
    /// The payload must decode as one of the accepted formats (JPEG, PNG, WebP).
    /// The stored filename is a random id with the format's canonical extension;
    /// the returned [`StoredImage::path`] is relative to the media root.
    ///
    /// # Errors
    /// * [`MediaError::Validation`] if the namespace is invalid or the payload is
    ///   not a decodable image in an accepted format.
    /// * [`MediaError::Io`] if the file cannot be written.
    #[instrument(skip(self, data), fields(len = data.len()))]
    pub async fn store_image(
        &self,
        namespace: &str,
        data: &[u8],
    ) -> Result<StoredImage, MediaError> {
        validate_namespace(namespace)?;

        let format = image::guess_format(data).map_err(|e| MediaError::Validation {
            message: e.to_string().into(),
            context: Some("Unrecognized image payload".into()),
        })?;

        if !ALLOWED_FORMATS.contains(&format) {
            return Err(MediaError::Validation {
                message: format!("Unsupported image format {format:?}").into(),
                context: None,
            });
        }

        // Decode fully: a valid magic number is not a valid image.
        image::load_from_memory(data).map_err(|e| MediaError::Validation {
            message: e.to_string().into(),
            context: Some("Image payload failed to decode".into()),
        })?;

        let extension = format.extensions_str().first().copied().unwrap_or("bin");
        let filename = format!("{}.{extension}", nanoid!());
        let relative = format!("{namespace}/{filename}");

        let dir = self.inner.media_root.join(namespace);
        fs::create_dir_all(&dir).await.context("Creating media namespace")?;
        fs::write(dir.join(&filename), data).await.context("Writing media file")?;

        debug!(path = %relative, "Stored media file");
        Ok(StoredImage { path: relative })
    }

    /// Removes a previously stored file by its media-relative path.
    ///
    /// Unknown paths are ignored so callers can treat removal as idempotent.
    ///
    /// # Errors
    /// * [`MediaError::Validation`] if the path escapes the media root.
    /// * [`MediaError::Io`] on filesystem failures other than absence.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let safe = sanitize_relative(relative)?;
        let target = self.inner.media_root.join(safe);

        match fs::remove_file(&target).await {
            Ok(()) => {
                debug!(path = %relative, "Removed media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context(format!("Removing {relative}")),
        }
    }
}

fn validate_namespace(namespace: &str) -> Result<(), MediaError> {
    let valid = !namespace.is_empty()
        && namespace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(MediaError::Validation {
            message: format!("Invalid media namespace '{namespace}'").into(),
            context: None,
        })
    }
}

/// Rejects absolute paths and any traversal components.
fn sanitize_relative(relative: &str) -> Result<&Path, MediaError> {
    let path = Path::new(relative);
    let traversal_free =
        path.components().all(|component| matches!(component, Component::Normal(_)));
    if traversal_free && !relative.is_empty() {
        Ok(path)
    } else {
        Err(MediaError::Validation {
            message: format!("Path '{relative}' escapes the media root").into(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_rules() {
        validate_namespace("recipes").expect("plain namespace");
        validate_namespace("recipe-images_2").expect("dashes and underscores");
        assert!(validate_namespace("").is_err());
        assert!(validate_namespace("a/b").is_err());
        assert!(validate_namespace("..").is_err());
    }

    #[test]
    fn relative_path_rules() {
        sanitize_relative("recipes/a.jpg").expect("normal path");
        assert!(sanitize_relative("/etc/passwd").is_err());
        assert!(sanitize_relative("../outside").is_err());
        assert!(sanitize_relative("recipes/../../outside").is_err());
        assert!(sanitize_relative("").is_err());
    }
}
