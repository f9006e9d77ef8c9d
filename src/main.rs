use iced::widget::image::Handle;
use iced::widget::{column, scrollable, stack};
use iced::{keyboard, Element, Subscription, Task, Theme};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cms;
mod config;
mod media;
mod state;
mod ui;

use cms::{CmsError, ContentClient};
use config::Config;
use media::{MediaError, Thumbnail};
use state::contact::{ContactField, ContactForm};
use state::data::{Category, DisplayMode, GalleryFilter, ItemId, Reference, ReferenceImage};
use state::lightbox::LightboxKey;
use state::mapper::ItemMapper;
use state::scroll::{ScrollSignal, ScrollTrigger};
use state::session::{FetchTicket, GallerySession, PageOutcome, PageResponse};
use ui::Remote;

/// Top-level pages reachable from the navbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Gallery,
    About,
    References,
    Contact,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Page::Gallery => "Gallery",
            Page::About => "About",
            Page::References => "References",
            Page::Contact => "Contact",
        })
    }
}

/// Main application state
struct Folio {
    config: Config,
    client: ContentClient,
    /// Thumbnail cache location, `None` when caching is disabled
    cache_dir: Option<PathBuf>,
    /// The active gallery filter with its pages and lightbox
    session: GallerySession,
    scroll: ScrollTrigger,
    page: Page,
    categories: Vec<Category>,
    logo_url: Option<String>,
    /// Decoded thumbnails keyed by source URL
    thumbnails: HashMap<String, Remote<Thumbnail>>,
    /// Full-size lightbox images keyed by source URL
    full_images: HashMap<String, Remote<Handle>>,
    hovered: Option<ItemId>,
    about: Option<Remote<String>>,
    references: Option<Remote<Vec<Reference>>>,
    /// Index of the opened reference and its images
    open_reference: Option<(usize, Remote<Vec<ReferenceImage>>)>,
    contact: ContactForm,
    dark_mode: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    FilterSelected(GalleryFilter),
    PageSelected(Page),
    /// A gallery page came back from the backend
    PageLoaded(PageResponse),
    GridScrolled(ScrollSignal),
    RetryPage,
    ThumbnailLoaded(String, Result<Thumbnail, MediaError>),
    FullImageLoaded(String, Result<Handle, MediaError>),
    CellHovered(ItemId),
    CellUnhovered(ItemId),
    OpenLightbox(usize),
    CloseLightbox,
    PreviousImage,
    NextImage,
    LightboxKey(LightboxKey),
    CategoriesLoaded(Result<Vec<Category>, CmsError>),
    LogoLoaded(Result<Option<String>, CmsError>),
    AboutLoaded(Result<String, CmsError>),
    ReferencesLoaded(Result<Vec<Reference>, CmsError>),
    ReferenceOpened(usize),
    ReferenceImagesLoaded(usize, Result<Vec<ReferenceImage>, CmsError>),
    ReferenceClosed,
    ContactChanged(ContactField, String),
    ContactSubmitted,
    ToggleDarkMode,
}

impl Folio {
    fn new(config: Config, client: ContentClient) -> (Self, Task<Message>) {
        let cache_dir = media::thumbnail::ensure_cache_dir(config.thumbnail_cache_dir());
        let mapper = ItemMapper::new(client.base_origin());

        let mut app = Folio {
            session: GallerySession::new(GalleryFilter::Home, config.page_size, mapper),
            scroll: ScrollTrigger::new(config.scroll_threshold),
            config,
            client,
            cache_dir,
            page: Page::Gallery,
            categories: Vec::new(),
            logo_url: None,
            thumbnails: HashMap::new(),
            full_images: HashMap::new(),
            hovered: None,
            about: None,
            references: None,
            open_reference: None,
            contact: ContactForm::default(),
            dark_mode: false,
        };

        let categories = {
            let client = app.client.clone();
            Task::perform(
                async move { client.fetch_categories().await },
                Message::CategoriesLoaded,
            )
        };
        let logo = {
            let client = app.client.clone();
            Task::perform(async move { client.fetch_logo().await }, Message::LogoLoaded)
        };
        let first_page = app.session.request_next_page().map(|ticket| app.fetch(ticket));

        let mut tasks = vec![categories, logo];
        tasks.extend(first_page);
        (app, Task::batch(tasks))
    }

    /// Run a page ticket against the backend
    fn fetch(&self, ticket: FetchTicket) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(
            async move { ticket.run(&client).await },
            Message::PageLoaded,
        )
    }

    fn fetch_opt(&self, ticket: Option<FetchTicket>) -> Task<Message> {
        ticket.map_or_else(Task::none, |ticket| self.fetch(ticket))
    }

    /// Start loading a thumbnail unless it is loaded or in flight.
    /// Failed thumbnails are requested again.
    fn request_thumbnail(&mut self, url: &str, mode: DisplayMode) -> Task<Message> {
        if matches!(self.thumbnails.get(url), Some(Remote::Ready(_) | Remote::Loading)) {
            return Task::none();
        }
        self.thumbnails.insert(url.to_string(), Remote::Loading);

        let http = self.client.http().clone();
        let url = url.to_string();
        let cache_dir = self.cache_dir.clone();
        let size = self.config.thumbnail_size;
        Task::perform(
            media::thumbnail::load_thumbnail(http, url.clone(), cache_dir, size, mode),
            move |result| Message::ThumbnailLoaded(url.clone(), result),
        )
    }

    /// Thumbnails for every loaded gallery item that has none yet
    fn request_gallery_thumbnails(&mut self) -> Task<Message> {
        let wanted: Vec<(String, DisplayMode)> = self
            .session
            .store()
            .items()
            .iter()
            .filter_map(|item| item.image_ref.clone().map(|url| (url, item.display_mode)))
            .collect();

        Task::batch(
            wanted
                .into_iter()
                .map(|(url, mode)| self.request_thumbnail(&url, mode))
                .collect::<Vec<_>>(),
        )
    }

    /// Source URLs of the lightbox item and its two neighbours
    fn lightbox_window(&self) -> Vec<String> {
        let store = self.session.store();
        let len = store.item_count();
        let Some(index) = self.session.lightbox().open_index().filter(|_| len > 0) else {
            return Vec::new();
        };

        [(index + len - 1) % len, index, (index + 1) % len]
            .into_iter()
            .filter_map(|i| store.item_at(i).and_then(|item| item.image_ref.clone()))
            .collect()
    }

    /// Release full-size images the lightbox can no longer step to
    fn prune_full_images(&mut self) {
        let keep = self.lightbox_window();
        self.full_images.retain(|url, _| keep.contains(url));
    }

    /// Load the full-size image of the item shown in the lightbox
    fn request_full_image(&mut self) -> Task<Message> {
        self.prune_full_images();
        let Some(url) = self
            .session
            .current_item()
            .and_then(|item| item.image_ref.clone())
        else {
            return Task::none();
        };
        if matches!(self.full_images.get(&url), Some(Remote::Ready(_) | Remote::Loading)) {
            return Task::none();
        }
        self.full_images.insert(url.clone(), Remote::Loading);

        let http = self.client.http().clone();
        Task::perform(
            media::thumbnail::load_full_image(http, url.clone()),
            move |result| Message::FullImageLoaded(url.clone(), result),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::FilterSelected(filter) => {
                self.page = Page::Gallery;
                self.hovered = None;
                self.full_images.clear();
                let ticket = self.session.select(filter);
                Task::batch([
                    self.fetch_opt(ticket),
                    scrollable::snap_to(ui::grid::scroll_id(), scrollable::RelativeOffset::START),
                ])
            }
            Message::PageSelected(page) => {
                self.page = page;
                self.session.close_lightbox();
                self.full_images.clear();
                match page {
                    Page::About if !matches!(self.about, Some(Remote::Ready(_))) => {
                        self.about = Some(Remote::Loading);
                        let client = self.client.clone();
                        Task::perform(async move { client.fetch_about().await }, Message::AboutLoaded)
                    }
                    Page::References => {
                        self.open_reference = None;
                        if matches!(self.references, Some(Remote::Ready(_))) {
                            return Task::none();
                        }
                        self.references = Some(Remote::Loading);
                        let client = self.client.clone();
                        Task::perform(
                            async move { client.fetch_references().await },
                            Message::ReferencesLoaded,
                        )
                    }
                    _ => Task::none(),
                }
            }
            Message::PageLoaded(response) => match self.session.apply(response) {
                PageOutcome::Applied { added, exhausted } => {
                    if exhausted {
                        info!(
                            filter = %self.session.filter(),
                            total = self.session.store().item_count(),
                            "gallery fully loaded"
                        );
                    }
                    if added == 0 {
                        return self.request_full_image();
                    }
                    Task::batch([self.request_gallery_thumbnails(), self.request_full_image()])
                }
                PageOutcome::Stale | PageOutcome::Failed(_) => Task::none(),
            },
            Message::GridScrolled(signal) => {
                let ticket = self.session.on_scroll(&signal, &self.scroll);
                self.fetch_opt(ticket)
            }
            Message::RetryPage => {
                let ticket = self.session.retry();
                self.fetch_opt(ticket)
            }
            Message::ThumbnailLoaded(url, result) => {
                if let Err(err) = &result {
                    warn!(%url, error = %err, "thumbnail failed");
                }
                self.thumbnails.insert(url, result.into());
                Task::none()
            }
            Message::FullImageLoaded(url, result) => {
                if let Err(err) = &result {
                    warn!(%url, error = %err, "full image failed");
                }
                if self.lightbox_window().contains(&url) {
                    self.full_images.insert(url, result.into());
                } else {
                    debug!(%url, "discarding full image, lightbox moved on");
                }
                Task::none()
            }
            Message::CellHovered(id) => {
                self.hovered = Some(id);
                Task::none()
            }
            Message::CellUnhovered(id) => {
                if self.hovered.as_ref() == Some(&id) {
                    self.hovered = None;
                }
                Task::none()
            }
            Message::OpenLightbox(index) => {
                if let Err(err) = self.session.open_lightbox(index) {
                    warn!(error = %err, "ignoring lightbox request");
                    return Task::none();
                }
                self.request_full_image()
            }
            Message::CloseLightbox => {
                self.session.close_lightbox();
                self.full_images.clear();
                Task::none()
            }
            Message::PreviousImage => {
                self.session.previous_image();
                self.request_full_image()
            }
            Message::NextImage => {
                self.session.next_image();
                self.request_full_image()
            }
            Message::LightboxKey(key) => {
                self.session.handle_key(key);
                self.request_full_image()
            }
            Message::CategoriesLoaded(result) => {
                match result {
                    Ok(categories) => {
                        info!(count = categories.len(), "categories loaded");
                        self.categories = categories;
                    }
                    Err(err) => error!(error = %err, "failed to load categories"),
                }
                Task::none()
            }
            Message::LogoLoaded(result) => match result {
                Ok(Some(url)) => {
                    self.logo_url = Some(url.clone());
                    self.request_thumbnail(&url, DisplayMode::Color)
                }
                Ok(None) => Task::none(),
                Err(err) => {
                    warn!(error = %err, "failed to load logo");
                    Task::none()
                }
            },
            Message::AboutLoaded(result) => {
                if let Err(err) = &result {
                    error!(error = %err, "failed to load about page");
                }
                self.about = Some(result.into());
                Task::none()
            }
            Message::ReferencesLoaded(result) => {
                let logos: Vec<String> = match &result {
                    Ok(references) => references
                        .iter()
                        .flat_map(|r| [r.logo_light.clone(), r.logo_dark.clone()])
                        .flatten()
                        .collect(),
                    Err(err) => {
                        error!(error = %err, "failed to load references");
                        Vec::new()
                    }
                };
                self.references = Some(result.into());
                Task::batch(
                    logos
                        .iter()
                        .map(|url| self.request_thumbnail(url, DisplayMode::Color))
                        .collect::<Vec<_>>(),
                )
            }
            Message::ReferenceOpened(index) => {
                let Some(reference) = self
                    .references
                    .as_ref()
                    .and_then(Remote::ready)
                    .and_then(|references| references.get(index))
                    .cloned()
                else {
                    return Task::none();
                };
                self.open_reference = Some((index, Remote::Loading));

                let client = self.client.clone();
                Task::perform(
                    async move { client.fetch_reference_images(&reference).await },
                    move |result| Message::ReferenceImagesLoaded(index, result),
                )
            }
            Message::ReferenceImagesLoaded(index, result) => {
                if self.open_reference.as_ref().map(|(open, _)| *open) != Some(index) {
                    return Task::none();
                }
                let urls: Vec<String> = match &result {
                    Ok(images) => images.iter().filter_map(|image| image.url.clone()).collect(),
                    Err(err) => {
                        error!(error = %err, "failed to load reference images");
                        Vec::new()
                    }
                };
                self.open_reference = Some((index, result.into()));
                Task::batch(
                    urls.iter()
                        .map(|url| self.request_thumbnail(url, DisplayMode::Color))
                        .collect::<Vec<_>>(),
                )
            }
            Message::ReferenceClosed => {
                self.open_reference = None;
                Task::none()
            }
            Message::ContactChanged(field, value) => {
                self.contact.update(field, value);
                Task::none()
            }
            Message::ContactSubmitted => {
                // Validation errors are kept on the form for display
                let _ = self.contact.submit();
                Task::none()
            }
            Message::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let navbar = ui::navbar::view(
            self.logo_url.as_ref().and_then(|url| self.thumbnails.get(url)),
            &self.categories,
            self.session.filter(),
            self.page,
            self.dark_mode,
        );

        let body = match self.page {
            Page::Gallery => ui::grid::view(&self.session, &self.thumbnails, self.hovered.as_ref()),
            Page::About => ui::pages::about(self.about.as_ref()),
            Page::References => ui::pages::references(
                self.references.as_ref(),
                self.open_reference.as_ref(),
                &self.thumbnails,
                self.dark_mode,
            ),
            Page::Contact => ui::pages::contact(&self.contact),
        };

        let base = column![navbar, body];

        match (self.page, self.session.lightbox().open_index(), self.session.current_item()) {
            (Page::Gallery, Some(index), Some(item)) => {
                let image = item.image_ref.as_ref().and_then(|url| self.full_images.get(url));
                let overlay = ui::lightbox::view(item, image, index, self.session.store().item_count());
                stack![base, overlay].into()
            }
            _ => base.into(),
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.session.lightbox().is_open() {
            keyboard::on_key_press(|key, _modifiers| {
                ui::lightbox::key_signal(&key).map(Message::LightboxKey)
            })
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pistar_folio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().unwrap_or_else(|err| {
        error!(error = %err, "invalid configuration, using defaults");
        Config::default()
    });

    let client = match ContentClient::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to create content client");
            std::process::exit(1);
        }
    };

    info!(api_base = %config.api_base, "starting Pistar");

    iced::application("Pistar", Folio::update, Folio::view)
        .subscription(Folio::subscription)
        .theme(Folio::theme)
        .centered()
        .run_with(move || Folio::new(config, client))
}
