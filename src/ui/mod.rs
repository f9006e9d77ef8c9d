/// UI components module
///
/// View functions only; all state lives in `state/` and the application
/// struct in `main.rs`.
/// - `navbar.rs` - logo, filters, page links, theme toggle
/// - `grid.rs` - the paginated thumbnail grid
/// - `lightbox.rs` - full-size overlay and its keyboard mapping
/// - `pages.rs` - about, references and contact pages

pub mod grid;
pub mod lightbox;
pub mod navbar;
pub mod pages;

/// Loading state of something fetched in the background
#[derive(Debug, Clone)]
pub enum Remote<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Remote<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Remote<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Remote::Ready(value),
            Err(err) => Remote::Failed(err.to_string()),
        }
    }
}
