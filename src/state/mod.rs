/// State management module
///
/// This module handles all gallery state, independent of the UI toolkit:
/// - Shared data structures (data.rs)
/// - Backend record to gallery item mapping (mapper.rs)
/// - Page cursor, item store and lightbox navigation (cursor.rs, store.rs, lightbox.rs)
/// - Scroll proximity to page request bridge (scroll.rs)
/// - The per-filter session tying them together (session.rs)
/// - Contact form validation (contact.rs)

pub mod contact;
pub mod cursor;
pub mod data;
pub mod lightbox;
pub mod mapper;
pub mod scroll;
pub mod session;
pub mod store;
