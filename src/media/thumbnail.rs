use ::image::{imageops::FilterType, DynamicImage, ImageFormat};
use iced::widget::image::Handle;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::data::DisplayMode;

#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Task join error: {0}")]
    Task(String),
}

/// A decoded thumbnail ready for display
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub color: Handle,
    /// Grayscale variant, only produced for monochrome items
    pub monochrome: Option<Handle>,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    /// Handle to draw, given whether the cell is hovered
    pub fn handle(&self, hovered: bool) -> &Handle {
        match &self.monochrome {
            Some(gray) if !hovered => gray,
            _ => &self.color,
        }
    }
}

/// Make sure the thumbnail cache directory exists.
/// Returns `None` (caching disabled) if it cannot be created.
pub fn ensure_cache_dir(dir: Option<PathBuf>) -> Option<PathBuf> {
    let dir = dir?;
    match fs::create_dir_all(&dir) {
        Ok(()) => Some(dir),
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "thumbnail cache disabled");
            None
        }
    }
}

/// Stable file name for a source URL
pub fn cache_key(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// Get the thumbnail path for a URL (doesn't generate, just returns the expected path)
pub fn thumbnail_path(cache_dir: &Path, url: &str) -> PathBuf {
    cache_dir.join(format!("{}.jpg", cache_key(url)))
}

/// Load a thumbnail for `url`, from the disk cache when possible.
///
/// Decoding and resizing run on a blocking task.
pub async fn load_thumbnail(
    http: Client,
    url: String,
    cache_dir: Option<PathBuf>,
    size: u32,
    mode: DisplayMode,
) -> Result<Thumbnail, MediaError> {
    let cache_path = cache_dir.map(|dir| thumbnail_path(&dir, &url));

    if let Some(path) = cache_path.clone().filter(|p| p.exists()) {
        let cached = tokio::task::spawn_blocking(move || load_cached(&path, mode))
            .await
            .map_err(|e| MediaError::Task(e.to_string()))?;
        match cached {
            Ok(thumbnail) => return Ok(thumbnail),
            Err(err) => debug!(%url, error = %err, "cached thumbnail unreadable, downloading again"),
        }
    }

    let bytes = download(&http, &url).await?;
    let thumbnail = tokio::task::spawn_blocking(move || make_thumbnail(&bytes, size, mode, cache_path.as_deref()))
        .await
        .map_err(|e| MediaError::Task(e.to_string()))??;
    debug!(%url, width = thumbnail.width, height = thumbnail.height, "thumbnail ready");
    Ok(thumbnail)
}

/// Load the original image for the lightbox, undecoded
pub async fn load_full_image(http: Client, url: String) -> Result<Handle, MediaError> {
    let bytes = download(&http, &url).await?;
    Ok(Handle::from_bytes(bytes))
}

async fn download(http: &Client, url: &str) -> Result<Vec<u8>, MediaError> {
    let failed = |err: reqwest::Error| MediaError::Download {
        url: url.to_string(),
        message: err.to_string(),
    };

    let response = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(failed)?;
    let bytes = response.bytes().await.map_err(failed)?;
    Ok(bytes.to_vec())
}

fn load_cached(path: &Path, mode: DisplayMode) -> Result<Thumbnail, MediaError> {
    let img = ::image::open(path).map_err(|e| MediaError::Decode(e.to_string()))?;
    Ok(build_thumbnail(&img, mode))
}

/// Decode, shrink to fit `size` and optionally write the result to `save_to`
pub fn make_thumbnail(
    bytes: &[u8],
    size: u32,
    mode: DisplayMode,
    save_to: Option<&Path>,
) -> Result<Thumbnail, MediaError> {
    let img = ::image::load_from_memory(bytes).map_err(|e| MediaError::Decode(e.to_string()))?;

    // Resize to thumbnail size, never upscale
    let thumbnail = if img.width() > size || img.height() > size {
        img.resize(size, size, FilterType::Lanczos3)
    } else {
        img
    };

    if let Some(path) = save_to {
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(thumbnail.to_rgb8());
        match rgb.save_with_format(path, ImageFormat::Jpeg) {
            Ok(()) => debug!(path = %path.display(), "cached thumbnail"),
            Err(err) => warn!(path = %path.display(), error = %err, "failed to cache thumbnail"),
        }
    }

    Ok(build_thumbnail(&thumbnail, mode))
}

fn build_thumbnail(img: &DynamicImage, mode: DisplayMode) -> Thumbnail {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let color = Handle::from_rgba(width, height, rgba.into_raw());

    let monochrome = match mode {
        DisplayMode::Monochrome => {
            let gray = img.grayscale().to_rgba8();
            Some(Handle::from_rgba(width, height, gray.into_raw()))
        }
        DisplayMode::Color => None,
    };

    Thumbnail {
        color,
        monochrome,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgb, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_cache_key_is_stable_hex() {
        let key = cache_key("https://cms.test/uploads/a.jpg");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, cache_key("https://cms.test/uploads/a.jpg"));
        assert_ne!(key, cache_key("https://cms.test/uploads/b.jpg"));
    }

    #[test]
    fn test_thumbnail_keeps_aspect_and_caches() {
        let dir = std::env::temp_dir().join(format!("pistar-folio-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = thumbnail_path(&dir, "https://cms.test/wide.png");

        let thumbnail = make_thumbnail(&png(1200, 800), 600, DisplayMode::Monochrome, Some(&path)).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (600, 400));
        assert!(thumbnail.monochrome.is_some());
        assert!(path.exists());

        let cached = load_cached(&path, DisplayMode::Color).unwrap();
        assert_eq!((cached.width, cached.height), (600, 400));
        assert!(cached.monochrome.is_none());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_small_images_are_not_upscaled() {
        let thumbnail = make_thumbnail(&png(100, 50), 600, DisplayMode::Color, None).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (100, 50));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let result = make_thumbnail(b"not an image", 600, DisplayMode::Color, None);
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }
}
