/// Item Model Mapper
///
/// Turns raw backend image records into `GalleryItem`s. Every accepted
/// record layout is listed in `RecordShape`; anything else becomes a
/// placeholder item instead of an error.
use serde_json::Value;
use tracing::debug;

use super::data::{DisplayMode, GalleryFilter, GalleryItem, ItemId, PLACEHOLDER_ALT};
use crate::cms::records::{ImageFields, ImageRecord, RawPage};

/// Record layouts the mapper understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Fields inline next to `id` (current backend)
    Inline,
    /// Fields nested under `attributes` (legacy backend)
    Attributes,
    /// Not a JSON object, or fields of the wrong type
    Unrecognized,
}

impl RecordShape {
    pub fn detect(record: &Value) -> Self {
        match record {
            Value::Object(map) => match map.get("attributes") {
                Some(Value::Object(_)) => RecordShape::Attributes,
                _ => RecordShape::Inline,
            },
            _ => RecordShape::Unrecognized,
        }
    }
}

/// Resolve a media path against the backend origin.
///
/// Absolute URLs (with a scheme, or protocol-relative) are kept as they are;
/// anything else is treated as a path on the backend.
pub fn resolve_media_url(base_origin: &str, path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if has_scheme(path) {
        return Some(path.to_string());
    }
    if let Some(rest) = path.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    Some(format!(
        "{}/{}",
        base_origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

fn has_scheme(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => path.starts_with("data:"),
    }
}

/// Maps records of one page into gallery items
#[derive(Debug, Clone)]
pub struct ItemMapper {
    base_origin: String,
}

impl ItemMapper {
    pub fn new(base_origin: impl Into<String>) -> Self {
        Self {
            base_origin: base_origin.into(),
        }
    }

    /// Map every record of a page that the filter admits, in arrival order.
    ///
    /// `page_number` only feeds synthetic ids for records without one.
    pub fn map_page(&self, filter: &GalleryFilter, page: &RawPage, page_number: u32) -> Vec<GalleryItem> {
        page.data
            .iter()
            .enumerate()
            .filter(|(_, record)| Self::admits(filter, record))
            .map(|(index, record)| {
                let fallback = ItemId::new(format!("p{page_number}-{index}"));
                self.map_record(record, fallback)
            })
            .collect()
    }

    /// Whether a record belongs to the filter's result set.
    ///
    /// The backend already filters server-side; the home flag is checked again
    /// here since older entries keep it under `attributes`.
    pub fn admits(filter: &GalleryFilter, record: &Value) -> bool {
        match filter {
            GalleryFilter::Category(_) => true,
            GalleryFilter::Home => {
                record.get("home").and_then(Value::as_bool) == Some(true)
                    || record
                        .get("attributes")
                        .and_then(|a| a.get("home"))
                        .and_then(Value::as_bool)
                        == Some(true)
            }
        }
    }

    /// Map a single record. Never fails: unusable records come back as
    /// placeholders carrying `fallback_id` when they have no id of their own.
    pub fn map_record(&self, record: &Value, fallback_id: ItemId) -> GalleryItem {
        let shape = RecordShape::detect(record);
        if shape == RecordShape::Unrecognized {
            debug!(%fallback_id, "unrecognized image record, using placeholder");
            return GalleryItem::placeholder(fallback_id);
        }

        let parsed: ImageRecord = match serde_json::from_value(record.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(%fallback_id, ?shape, error = %err, "malformed image record, using placeholder");
                let id = record
                    .get("id")
                    .map(id_from_value)
                    .unwrap_or(fallback_id);
                return GalleryItem::placeholder(id);
            }
        };

        let id = parsed
            .id
            .as_ref()
            .map(|id| ItemId::new(id.to_string()))
            .or_else(|| parsed.document_id.clone().map(ItemId::new))
            .unwrap_or(fallback_id);

        self.item_from_fields(id, parsed.into_fields())
    }

    fn item_from_fields(&self, id: ItemId, fields: ImageFields) -> GalleryItem {
        let title = fields.title.unwrap_or_default();
        let alt_text = fields
            .alt
            .filter(|alt| !alt.is_empty())
            .or_else(|| Some(title.clone()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| PLACEHOLDER_ALT.to_string());

        let media = fields.image.as_ref().map(|m| m.media());
        let image_ref = media
            .and_then(|m| m.url.as_deref())
            .and_then(|url| resolve_media_url(&self.base_origin, url));

        GalleryItem {
            id,
            title,
            alt_text,
            image_ref,
            intrinsic_width: media.and_then(|m| m.width).filter(|w| *w > 0),
            intrinsic_height: media.and_then(|m| m.height).filter(|h| *h > 0),
            sort_key: fields.position.filter(|p| p.is_finite()).unwrap_or(0.0),
            display_mode: if fields.monochrome.unwrap_or(false) {
                DisplayMode::Monochrome
            } else {
                DisplayMode::Color
            },
        }
    }
}

fn id_from_value(value: &Value) -> ItemId {
    match value {
        Value::String(s) => ItemId::new(s.clone()),
        other => ItemId::new(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.com";

    fn mapper() -> ItemMapper {
        ItemMapper::new(BASE)
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        assert_eq!(
            resolve_media_url(BASE, "/uploads/a.jpg").as_deref(),
            Some("https://api.example.com/uploads/a.jpg")
        );
        assert_eq!(
            resolve_media_url("https://api.example.com/", "uploads/a.jpg").as_deref(),
            Some("https://api.example.com/uploads/a.jpg")
        );
        assert_eq!(
            resolve_media_url(BASE, "https://cdn.example.net/a.jpg").as_deref(),
            Some("https://cdn.example.net/a.jpg")
        );
        assert_eq!(
            resolve_media_url(BASE, "//cdn.example.net/a.jpg").as_deref(),
            Some("https://cdn.example.net/a.jpg")
        );
        assert_eq!(resolve_media_url(BASE, "  "), None);
    }

    #[test]
    fn test_maps_inline_record() {
        let item = mapper().map_record(
            &json!({
                "id": 5,
                "Title": "Portrait of M",
                "alt": "",
                "position": 2,
                "BW": true,
                "image": { "url": "/uploads/m.jpg", "width": 800, "height": 1200 }
            }),
            ItemId::new("fallback"),
        );

        assert_eq!(item.id, ItemId::new("5"));
        assert_eq!(item.title, "Portrait of M");
        assert_eq!(item.alt_text, "Portrait of M");
        assert_eq!(item.image_ref.as_deref(), Some("https://api.example.com/uploads/m.jpg"));
        assert_eq!(item.intrinsic_width, Some(800));
        assert_eq!(item.intrinsic_height, Some(1200));
        assert_eq!(item.sort_key, 2.0);
        assert_eq!(item.display_mode, DisplayMode::Monochrome);
    }

    #[test]
    fn test_maps_attributes_record() {
        let item = mapper().map_record(
            &json!({
                "id": 8,
                "attributes": {
                    "Title": "Coast",
                    "alt": "Rocks at dusk",
                    "image": { "data": { "attributes": { "url": "/c.jpg" } } }
                }
            }),
            ItemId::new("fallback"),
        );

        assert_eq!(item.id, ItemId::new("8"));
        assert_eq!(item.alt_text, "Rocks at dusk");
        assert_eq!(item.image_ref.as_deref(), Some("https://api.example.com/c.jpg"));
        assert_eq!(item.sort_key, 0.0);
        assert_eq!(item.display_mode, DisplayMode::Color);
    }

    #[test]
    fn test_missing_image_maps_to_placeholder_state() {
        let item = mapper().map_record(&json!({ "id": 3, "Title": "Lost" }), ItemId::new("f"));
        assert_eq!(item.image_ref, None);
        assert_eq!(item.title, "Lost");
    }

    #[test]
    fn test_malformed_records_fail_soft() {
        let wrong_type = mapper().map_record(&json!({ "id": 9, "position": "first" }), ItemId::new("f"));
        assert_eq!(wrong_type.id, ItemId::new("9"));
        assert!(!wrong_type.has_image());

        let not_object = mapper().map_record(&json!("garbage"), ItemId::new("p1-0"));
        assert_eq!(not_object.id, ItemId::new("p1-0"));
        assert_eq!(not_object.alt_text, PLACEHOLDER_ALT);
    }

    #[test]
    fn test_home_filter_checks_both_layouts() {
        let page = RawPage::new(vec![
            json!({ "id": 1, "home": true }),
            json!({ "id": 2, "home": false }),
            json!({ "id": 3, "attributes": { "home": true } }),
            json!({ "id": 4 }),
        ]);

        let home = mapper().map_page(&GalleryFilter::Home, &page, 1);
        let ids: Vec<_> = home.iter().map(|i| i.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let category = mapper().map_page(&GalleryFilter::Category("Portraits".into()), &page, 1);
        assert_eq!(category.len(), 4);
    }
}
