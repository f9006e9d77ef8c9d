/// Content backend access
///
/// - `client.rs` - REST client and the `PageSource` seam used by the gallery
/// - `records.rs` - JSON shapes served by the backend
/// - `error.rs` - error type shared by every request
pub mod client;
pub mod error;
pub mod records;

pub use client::{ContentClient, PageSource};
pub use error::CmsError;
