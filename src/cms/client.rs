/// HTTP client for the content backend.
use async_trait::async_trait;
use futures::future::try_join_all;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::error::CmsError;
use super::records::{
    AboutFields, CategoryFields, Entry, Envelope, ImageRecord, LogoFields, MediaField, RawPage,
    ReferenceFields,
};
use crate::config::Config;
use crate::state::data::{Category, GalleryFilter, ItemId, Reference, ReferenceImage};
use crate::state::mapper::resolve_media_url;

/// Shown when the about entry has no text
pub const ABOUT_FALLBACK: &str = "No content found.";

/// Source of raw image pages.
///
/// The gallery session only ever sees this seam, so tests can drive it with
/// canned pages instead of a live backend.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        filter: &GalleryFilter,
        page_number: u32,
        page_size: u32,
    ) -> Result<RawPage, CmsError>;
}

/// Client for the CMS REST API
#[derive(Clone)]
pub struct ContentClient {
    http: Client,
    base_url: Url,
    base_origin: String,
}

impl std::fmt::Debug for ContentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ContentClient {
    pub fn new(config: &Config) -> Result<Self, CmsError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("pistar-folio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base_url = Url::parse(&config.api_base)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        info!(base_url = %base_url, "created content client");

        Ok(Self {
            http,
            base_url,
            base_origin: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Shared HTTP connection pool, also used for image downloads
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Origin that relative media paths are resolved against
    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    pub fn build_url(&self, path: &str) -> Result<Url, CmsError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Query parameters for one page of the images collection
    pub fn page_query(filter: &GalleryFilter, page_number: u32, page_size: u32) -> Vec<(String, String)> {
        let mut query = vec![("populate".to_string(), "*".to_string())];
        match filter {
            GalleryFilter::Home => {
                query.push(("filters[home][$eq]".to_string(), "true".to_string()));
            }
            GalleryFilter::Category(title) => {
                query.push(("filters[categories][Title][$eq]".to_string(), title.clone()));
            }
        }
        query.push(("pagination[page]".to_string(), page_number.to_string()));
        query.push(("pagination[pageSize]".to_string(), page_size.to_string()));
        query
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, CmsError> {
        let url = self.build_url(path)?;
        debug!(%url, "GET");

        let response = self.http.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn populate() -> [(String, String); 1] {
        [("populate".to_string(), "*".to_string())]
    }

    /// Navigation categories, ordered by position
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, CmsError> {
        let envelope: Envelope<Vec<Entry<CategoryFields>>> =
            self.get_json("api/categories", &Self::populate()).await?;
        Ok(categories_from(envelope.data.unwrap_or_default()))
    }

    /// Absolute URL of the site logo, if one is configured
    pub async fn fetch_logo(&self) -> Result<Option<String>, CmsError> {
        let envelope: Envelope<Entry<LogoFields>> =
            self.get_json("api/logo", &Self::populate()).await?;
        Ok(envelope
            .data
            .and_then(|entry| entry.into_fields().img)
            .and_then(|img| {
                img.media()
                    .preferred_url()
                    .and_then(|url| resolve_media_url(&self.base_origin, url))
            }))
    }

    pub async fn fetch_references(&self) -> Result<Vec<Reference>, CmsError> {
        let envelope: Envelope<Vec<Entry<ReferenceFields>>> =
            self.get_json("api/references", &Self::populate()).await?;
        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, entry)| reference_from(entry, index, &self.base_origin))
            .collect())
    }

    /// Every image linked to a reference.
    ///
    /// Fetched concurrently; a single failure fails the whole set.
    pub async fn fetch_reference_images(
        &self,
        reference: &Reference,
    ) -> Result<Vec<ReferenceImage>, CmsError> {
        let requests = reference.image_documents.iter().map(|document| async move {
            let envelope: Envelope<ImageRecord> = self
                .get_json(&format!("api/images/{document}"), &Self::populate())
                .await?;
            Ok::<_, CmsError>(envelope.data.map(|record| reference_image_from(record, &self.base_origin)))
        });

        Ok(try_join_all(requests).await?.into_iter().flatten().collect())
    }

    /// About page text flattened to plain paragraphs
    pub async fn fetch_about(&self) -> Result<String, CmsError> {
        let envelope: Envelope<Entry<AboutFields>> =
            self.get_json("api/about", &Self::populate()).await?;
        Ok(envelope
            .data
            .and_then(|entry| entry.into_fields().about_text)
            .map(|html| flatten_html(&html))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| ABOUT_FALLBACK.to_string()))
    }
}

#[async_trait]
impl PageSource for ContentClient {
    async fn fetch_page(
        &self,
        filter: &GalleryFilter,
        page_number: u32,
        page_size: u32,
    ) -> Result<RawPage, CmsError> {
        let query = Self::page_query(filter, page_number, page_size);
        let page: RawPage = self.get_json("api/images", &query).await?;
        debug!(%filter, page_number, records = page.raw_count(), "fetched image page");
        Ok(page)
    }
}

/// Keep categories that have a numeric position, smallest first
pub fn categories_from(entries: Vec<Entry<CategoryFields>>) -> Vec<Category> {
    let mut categories: Vec<Category> = entries
        .into_iter()
        .filter_map(|entry| {
            let fields = entry.into_fields();
            match (fields.title, fields.position) {
                (Some(title), Some(position)) if !title.is_empty() => {
                    Some(Category { title, position })
                }
                _ => None,
            }
        })
        .collect();
    categories.sort_by(|a, b| a.position.total_cmp(&b.position));
    categories
}

pub fn reference_from(entry: Entry<ReferenceFields>, index: usize, base_origin: &str) -> Reference {
    let id = entry
        .id
        .as_ref()
        .map(|id| ItemId::new(id.to_string()))
        .or_else(|| entry.document_id.clone().map(ItemId::new))
        .unwrap_or_else(|| ItemId::new(format!("ref-{index}")));
    let fields = entry.into_fields();

    let logo = |field: &Option<MediaField>| {
        field
            .as_ref()
            .and_then(|m| m.media().preferred_url())
            .and_then(|url| resolve_media_url(base_origin, url))
    };

    Reference {
        id,
        title: fields.title.unwrap_or_default(),
        description: fields.description.filter(|d| !d.trim().is_empty()),
        logo_light: logo(&fields.logo_light),
        logo_dark: logo(&fields.logo_dark),
        image_documents: fields
            .images
            .map(|images| {
                images
                    .into_vec()
                    .into_iter()
                    .filter_map(|link| link.document_id)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

fn reference_image_from(record: ImageRecord, base_origin: &str) -> ReferenceImage {
    let fields = record.into_fields();
    let media = fields.image.as_ref().map(|m| m.media());

    ReferenceImage {
        url: media
            .and_then(|m| m.preferred_url())
            .and_then(|url| resolve_media_url(base_origin, url)),
        alt: media
            .and_then(|m| m.alt.clone())
            .unwrap_or_else(|| "Reference image".to_string()),
    }
}

/// Reduce rich text HTML to plain text paragraphs
pub fn flatten_html(html: &str) -> String {
    static BREAKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();

    let breaks = BREAKS.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</p\s*>|</h[1-6]\s*>|</li\s*>|</div\s*>").expect("valid regex")
    });
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    let blank_lines = BLANK_LINES.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let text = breaks.replace_all(html, "\n");
    let text = tags.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let text: Vec<&str> = text.lines().map(str::trim).collect();
    blank_lines
        .replace_all(&text.join("\n"), "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_query_for_home() {
        let query = ContentClient::page_query(&GalleryFilter::Home, 2, 25);
        assert_eq!(
            query,
            vec![
                ("populate".to_string(), "*".to_string()),
                ("filters[home][$eq]".to_string(), "true".to_string()),
                ("pagination[page]".to_string(), "2".to_string()),
                ("pagination[pageSize]".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_query_for_category() {
        let query = ContentClient::page_query(&GalleryFilter::Category("Portraits".into()), 1, 25);
        assert!(query.contains(&(
            "filters[categories][Title][$eq]".to_string(),
            "Portraits".to_string()
        )));
    }

    #[test]
    fn test_build_url_keeps_base_path() {
        let config = Config {
            api_base: "https://cms.example.com/strapi".to_string(),
            ..Config::default()
        };
        let client = ContentClient::new(&config).unwrap();
        assert_eq!(
            client.build_url("/api/images").unwrap().as_str(),
            "https://cms.example.com/strapi/api/images"
        );
        assert_eq!(client.base_origin(), "https://cms.example.com/strapi");
    }

    #[test]
    fn test_categories_sorted_and_filtered() {
        let entries: Vec<Entry<CategoryFields>> = serde_json::from_value(json!([
            { "id": 1, "Title": "Weddings", "position": 3 },
            { "id": 2, "Title": "Unlisted" },
            { "id": 3, "Title": "Portraits", "position": 1 },
            { "id": 4, "attributes": { "Title": "Events", "position": 2 } }
        ]))
        .unwrap();

        let titles: Vec<String> = categories_from(entries).into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Portraits", "Events", "Weddings"]);
    }

    #[test]
    fn test_reference_from_entry() {
        let entry: Entry<ReferenceFields> = serde_json::from_value(json!({
            "id": 11,
            "title": "Acme",
            "description": "  ",
            "logo_light": { "url": "/l.png", "formats": { "medium": { "url": "/l_m.png" } } },
            "images": [{ "id": 1, "documentId": "doc1" }, { "id": 2 }]
        }))
        .unwrap();

        let reference = reference_from(entry, 0, "https://cms.example.com");
        assert_eq!(reference.id, ItemId::new("11"));
        assert_eq!(reference.description, None);
        assert_eq!(reference.logo_light.as_deref(), Some("https://cms.example.com/l_m.png"));
        assert_eq!(reference.logo_dark, None);
        assert_eq!(reference.image_documents, vec!["doc1".to_string()]);
    }

    #[test]
    fn test_flatten_html() {
        let html = "<p>We are <strong>Pistar</strong>&nbsp;Media.</p><p>Tom &amp; Jerry<br/>Studio</p>";
        assert_eq!(flatten_html(html), "We are Pistar Media.\nTom & Jerry\nStudio");
        assert_eq!(flatten_html("<div></div>"), "");
    }
}
