/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the content backend layer and the UI layer.
use std::fmt;

/// Nominal grid image size, used for the aspect ratio when the backend
/// did not report intrinsic dimensions.
pub const FALLBACK_WIDTH: f32 = 600.0;
pub const FALLBACK_HEIGHT: f32 = 400.0;

/// Alt text used when a record carries neither alt text nor a title
pub const PLACEHOLDER_ALT: &str = "Gallery Image";

/// Opaque identity of a gallery item, stable for the lifetime of a session.
///
/// The backend hands out numeric ids, newer versions also a string
/// `documentId`; both collapse into this one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a grid cell presents its image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Grayscale at rest, full color while hovered
    Monochrome,
    /// Always full color
    #[default]
    Color,
}

/// Which slice of the image collection a filter session shows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GalleryFilter {
    /// Images flagged for the landing page
    Home,
    /// Images tagged with the category of this title
    Category(String),
}

impl GalleryFilter {
    pub fn label(&self) -> &str {
        match self {
            GalleryFilter::Home => "Home",
            GalleryFilter::Category(title) => title,
        }
    }
}

impl fmt::Display for GalleryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single image in the gallery, normalized from a backend record.
///
/// Immutable once mapped. `image_ref` is `None` when the record had no usable
/// image; the grid shows a placeholder for it.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub id: ItemId,
    pub title: String,
    pub alt_text: String,
    /// Absolute URL of the original image
    pub image_ref: Option<String>,
    pub intrinsic_width: Option<u32>,
    pub intrinsic_height: Option<u32>,
    /// Position reported by the backend, 0 when absent
    pub sort_key: f64,
    pub display_mode: DisplayMode,
}

impl GalleryItem {
    /// Item standing in for a record that could not be displayed
    pub fn placeholder(id: ItemId) -> Self {
        Self {
            id,
            title: String::new(),
            alt_text: PLACEHOLDER_ALT.to_string(),
            image_ref: None,
            intrinsic_width: None,
            intrinsic_height: None,
            sort_key: 0.0,
            display_mode: DisplayMode::Color,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_ref.is_some()
    }

    /// Height of the cell when rendered `width` units wide.
    ///
    /// Follows the intrinsic aspect ratio, or the 600x400 fallback ratio when
    /// either dimension is missing.
    pub fn display_height(&self, width: f32) -> f32 {
        match (self.intrinsic_width, self.intrinsic_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => width * h as f32 / w as f32,
            _ => width * FALLBACK_HEIGHT / FALLBACK_WIDTH,
        }
    }
}

/// A navigation category as configured in the CMS
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub title: String,
    pub position: f64,
}

/// A client reference shown on the references page
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub id: ItemId,
    pub title: String,
    pub description: Option<String>,
    pub logo_light: Option<String>,
    pub logo_dark: Option<String>,
    /// `documentId`s of the images linked to this reference
    pub image_documents: Vec<String>,
}

impl Reference {
    /// Logo matching the active theme, falling back to the other variant
    pub fn logo(&self, dark_mode: bool) -> Option<&str> {
        let (preferred, other) = if dark_mode {
            (&self.logo_dark, &self.logo_light)
        } else {
            (&self.logo_light, &self.logo_dark)
        };
        preferred.as_deref().or(other.as_deref())
    }
}

/// An image attached to a reference, fetched when the reference is opened
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub url: Option<String>,
    pub alt: String,
}
