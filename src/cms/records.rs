/// Wire shapes of the content backend's JSON.
///
/// The backend has served two layouts over its lifetime: entries with their
/// fields inline next to `id`/`documentId`, and older entries that nest every
/// field under `attributes` (with media wrapped as `{ data: { attributes } }`).
/// Every field is optional so a partially populated entry still decodes.
use serde::Deserialize;
use std::fmt;

/// Top-level `{ "data": ... }` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Numeric or string entry id
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A collection entry in either layout
#[derive(Debug, Clone, Deserialize)]
pub struct Entry<T> {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<T>,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Entry<T> {
    /// Fields of the entry regardless of layout
    pub fn into_fields(self) -> T {
        self.attributes.unwrap_or(self.fields)
    }

    pub fn fields(&self) -> &T {
        self.attributes.as_ref().unwrap_or(&self.fields)
    }
}

/// Uploaded media file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub formats: Option<MediaFormats>,
}

impl Media {
    /// The medium rendition when present, the original otherwise
    pub fn preferred_url(&self) -> Option<&str> {
        self.formats
            .as_ref()
            .and_then(|f| f.medium.as_ref())
            .and_then(|m| m.url.as_deref())
            .or(self.url.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaFormats {
    #[serde(default)]
    pub medium: Option<MediaFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaFormat {
    #[serde(default)]
    pub url: Option<String>,
}

/// A media relation, inline or wrapped in `data.attributes`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MediaField {
    Wrapped { data: WrappedMedia },
    Inline(Media),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrappedMedia {
    pub attributes: Media,
}

impl MediaField {
    pub fn media(&self) -> &Media {
        match self {
            MediaField::Wrapped { data } => &data.attributes,
            MediaField::Inline(media) => media,
        }
    }
}

/// A to-many relation, inline or wrapped in `data`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    List(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> Relation<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Relation::List(items) | Relation::Wrapped { data: items } => items,
        }
    }
}

/// Fields of an entry in the `images` collection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFields {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub image: Option<MediaField>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(rename = "BW", default)]
    pub monochrome: Option<bool>,
    #[serde(default)]
    pub home: Option<bool>,
}

pub type ImageRecord = Entry<ImageFields>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFields {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub position: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoFields {
    #[serde(default)]
    pub img: Option<MediaField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AboutFields {
    #[serde(rename = "About_text", default)]
    pub about_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_light: Option<MediaField>,
    #[serde(default)]
    pub logo_dark: Option<MediaField>,
    #[serde(default)]
    pub images: Option<Relation<Entry<LinkFields>>>,
}

/// Fields of a relation stub; only the entry ids matter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkFields {}

/// Raw page of image records as returned by the backend.
///
/// Records are kept undecoded so one malformed entry cannot fail the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl RawPage {
    pub fn new(records: Vec<serde_json::Value>) -> Self {
        Self { data: records }
    }

    /// Number of records the backend returned, before any client-side filtering
    pub fn raw_count(&self) -> usize {
        self.data.len()
    }
}
