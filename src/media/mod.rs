/// Remote image loading module
///
/// This module handles:
/// - Downloading gallery images from the content backend
/// - Generating thumbnails, with a grayscale variant for monochrome items
/// - Caching thumbnails to disk

pub mod thumbnail;

pub use thumbnail::{MediaError, Thumbnail};
