/// Gallery filter session
///
/// Owns everything that lives for one filter (Home or a category): the
/// pagination cursor, the loaded items and the lightbox position. Selecting
/// another filter discards all of it and bumps the cursor generation, so a
/// response still in flight for the old filter is dropped on arrival.
use tracing::{debug, info, warn};

use super::cursor::{PageRequest, PaginationCursor};
use super::data::{GalleryFilter, GalleryItem};
use super::lightbox::{Lightbox, LightboxKey, NavigationError};
use super::mapper::ItemMapper;
use super::scroll::{ScrollSignal, ScrollTrigger};
use super::store::GalleryStore;
use crate::cms::records::RawPage;
use crate::cms::{CmsError, PageSource};

/// A page request bound to the filter it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub filter: GalleryFilter,
    pub request: PageRequest,
}

impl FetchTicket {
    /// Fetch the ticket's page from `source`
    pub async fn run<S: PageSource + ?Sized>(self, source: &S) -> PageResponse {
        let result = source
            .fetch_page(&self.filter, self.request.page_number, self.request.page_size)
            .await;
        PageResponse {
            ticket: self,
            result,
        }
    }
}

/// Outcome of a fetched ticket, handed back to the session
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub ticket: FetchTicket,
    pub result: Result<RawPage, CmsError>,
}

/// What applying a response did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// Items were merged into the store
    Applied { added: usize, exhausted: bool },
    /// The response belonged to an earlier session and was ignored
    Stale,
    /// The fetch failed; loaded items are untouched and the page can be retried
    Failed(CmsError),
}

#[derive(Debug, Clone)]
pub struct GallerySession {
    filter: GalleryFilter,
    cursor: PaginationCursor,
    store: GalleryStore,
    lightbox: Lightbox,
    mapper: ItemMapper,
    last_error: Option<CmsError>,
}

impl GallerySession {
    pub fn new(filter: GalleryFilter, page_size: u32, mapper: ItemMapper) -> Self {
        Self {
            filter,
            cursor: PaginationCursor::new(page_size),
            store: GalleryStore::new(),
            lightbox: Lightbox::new(),
            mapper,
            last_error: None,
        }
    }

    pub fn filter(&self) -> &GalleryFilter {
        &self.filter
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn store(&self) -> &GalleryStore {
        &self.store
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn last_error(&self) -> Option<&CmsError> {
        self.last_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.cursor.is_fetching()
    }

    /// Switch to `filter`, discarding the current session, and claim page 1
    pub fn select(&mut self, filter: GalleryFilter) -> Option<FetchTicket> {
        info!(from = %self.filter, to = %filter, "switching gallery filter");
        self.filter = filter;
        self.cursor.reset();
        self.store.reset();
        self.lightbox.close();
        self.last_error = None;
        self.request_next_page()
    }

    /// Claim the next page, if one may be requested now
    pub fn request_next_page(&mut self) -> Option<FetchTicket> {
        let request = self.cursor.request_next_page()?;
        Some(self.ticket(request))
    }

    /// Explicit retry after a failure; same as requesting the next page
    pub fn retry(&mut self) -> Option<FetchTicket> {
        self.last_error.as_ref()?;
        self.request_next_page()
    }

    /// Feed a viewport position through the scroll trigger
    pub fn on_scroll(&mut self, signal: &ScrollSignal, trigger: &ScrollTrigger) -> Option<FetchTicket> {
        let request = trigger.on_signal(signal, &mut self.cursor)?;
        Some(self.ticket(request))
    }

    fn ticket(&self, request: PageRequest) -> FetchTicket {
        debug!(
            filter = %self.filter,
            page = request.page_number,
            generation = self.cursor.generation(),
            "requesting page"
        );
        FetchTicket {
            filter: self.filter.clone(),
            request,
        }
    }

    /// Settle a fetched page.
    ///
    /// Responses from an earlier generation are dropped without touching any
    /// state.
    pub fn apply(&mut self, response: PageResponse) -> PageOutcome {
        let PageResponse { ticket, result } = response;
        if ticket.filter != self.filter || !self.cursor.is_current(&ticket.request) {
            debug!(
                filter = %ticket.filter,
                page = ticket.request.page_number,
                "dropping stale page response"
            );
            return PageOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let items = self
                    .mapper
                    .map_page(&ticket.filter, &page, ticket.request.page_number);
                self.cursor.complete(&ticket.request, page.raw_count());
                let added = self.store.append(items);
                self.lightbox.reconcile(self.store.item_count());
                self.last_error = None;

                let exhausted = !self.cursor.has_more();
                debug!(
                    filter = %self.filter,
                    page = ticket.request.page_number,
                    added,
                    total = self.store.item_count(),
                    exhausted,
                    "applied page"
                );
                PageOutcome::Applied { added, exhausted }
            }
            Err(err) => {
                self.cursor.fail(&ticket.request);
                warn!(
                    filter = %self.filter,
                    page = ticket.request.page_number,
                    error = %err,
                    "failed to fetch gallery page"
                );
                self.last_error = Some(err.clone());
                PageOutcome::Failed(err)
            }
        }
    }

    pub fn open_lightbox(&mut self, index: usize) -> Result<(), NavigationError> {
        self.lightbox.open(index, self.store.item_count())
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox.close();
    }

    pub fn previous_image(&mut self) {
        self.lightbox.prev(self.store.item_count());
    }

    pub fn next_image(&mut self) {
        self.lightbox.next(self.store.item_count());
    }

    pub fn handle_key(&mut self, key: LightboxKey) {
        self.lightbox.handle_key(key, self.store.item_count());
    }

    /// Item currently shown in the lightbox
    pub fn current_item(&self) -> Option<&GalleryItem> {
        self.lightbox
            .open_index()
            .and_then(|index| self.store.item_at(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PAGE_SIZE: u32 = 25;

    /// Serves pages sliced from a fixed record list per filter
    #[derive(Default)]
    struct FakeSource {
        records: HashMap<GalleryFilter, Vec<Value>>,
        calls: AtomicUsize,
        fail_next: Mutex<bool>,
    }

    impl FakeSource {
        fn with_category(title: &str, count: usize) -> Self {
            let mut source = FakeSource::default();
            source.add(GalleryFilter::Category(title.to_string()), title, count);
            source
        }

        fn add(&mut self, filter: GalleryFilter, prefix: &str, count: usize) {
            let records = (1..=count)
                .map(|position| {
                    json!({
                        "id": format!("{prefix}-{position}"),
                        "Title": format!("{prefix} {position}"),
                        "position": position,
                        "home": true,
                        "image": { "url": format!("/uploads/{prefix}-{position}.jpg"), "width": 600, "height": 900 }
                    })
                })
                .collect();
            self.records.insert(filter, records);
        }
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch_page(
            &self,
            filter: &GalleryFilter,
            page_number: u32,
            page_size: u32,
        ) -> Result<RawPage, CmsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(CmsError::Transport("connection reset".into()));
            }
            let records = self.records.get(filter).cloned().unwrap_or_default();
            let start = ((page_number - 1) * page_size) as usize;
            let page = records
                .into_iter()
                .skip(start)
                .take(page_size as usize)
                .collect();
            Ok(RawPage::new(page))
        }
    }

    fn session(filter: GalleryFilter) -> GallerySession {
        GallerySession::new(filter, PAGE_SIZE, ItemMapper::new("https://cms.test"))
    }

    fn near_bottom() -> ScrollSignal {
        ScrollSignal {
            offset_y: 1950.0,
            viewport_height: 0.0,
            content_height: 2000.0,
        }
    }

    #[tokio::test]
    async fn test_portraits_scenario() {
        let source = FakeSource::with_category("Portraits", 30);
        let portraits = GalleryFilter::Category("Portraits".into());
        let trigger = ScrollTrigger::default();
        let mut session = session(GalleryFilter::Home);

        let first = session.select(portraits).unwrap();
        let outcome = session.apply(first.run(&source).await);
        assert_eq!(outcome, PageOutcome::Applied { added: 25, exhausted: false });
        assert!(session.cursor().has_more());
        let positions: Vec<f64> = session.store().items().iter().map(|i| i.sort_key).collect();
        assert_eq!(positions, (1..=25u32).map(f64::from).collect::<Vec<_>>());

        let second = session.on_scroll(&near_bottom(), &trigger).unwrap();
        assert_eq!(second.request.page_number, 2);
        let outcome = session.apply(second.run(&source).await);
        assert_eq!(outcome, PageOutcome::Applied { added: 5, exhausted: true });
        assert_eq!(session.store().item_count(), 30);

        for _ in 0..10 {
            assert!(session.on_scroll(&near_bottom(), &trigger).is_none());
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_requests_while_fetching_issue_one_call() {
        let source = FakeSource::with_category("Portraits", 30);
        let mut session = session(GalleryFilter::Home);

        let ticket = session.select(GalleryFilter::Category("Portraits".into())).unwrap();
        let duplicates = (0..20).filter_map(|_| session.request_next_page()).count();
        assert_eq!(duplicates, 0);

        session.apply(ticket.run(&source).await);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_response_is_not_applied() {
        let mut source = FakeSource::with_category("Portraits", 30);
        source.add(GalleryFilter::Category("Weddings".into()), "Weddings", 3);
        let mut session = session(GalleryFilter::Home);

        let stale = session.select(GalleryFilter::Category("Portraits".into())).unwrap();
        let fresh = session.select(GalleryFilter::Category("Weddings".into())).unwrap();

        let stale_response = stale.run(&source).await;
        assert_eq!(session.apply(stale_response), PageOutcome::Stale);
        assert!(session.store().is_empty());
        assert!(session.is_loading());

        let outcome = session.apply(fresh.run(&source).await);
        assert_eq!(outcome, PageOutcome::Applied { added: 3, exhausted: true });
        assert!(session
            .store()
            .items()
            .iter()
            .all(|item| item.id.as_str().starts_with("Weddings")));
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut session = session(GalleryFilter::Home);
        let stale = session.select(GalleryFilter::Category("Portraits".into())).unwrap();
        session.select(GalleryFilter::Category("Weddings".into())).unwrap();

        let outcome = session.apply(PageResponse {
            ticket: stale,
            result: Err(CmsError::Status {
                status: 502,
                url: "https://cms.test/api/images".into(),
            }),
        });

        assert_eq!(outcome, PageOutcome::Stale);
        assert!(session.last_error().is_none());
        assert!(session.is_loading());
        assert!(session.retry().is_none());
    }

    #[tokio::test]
    async fn test_stale_response_for_same_filter_after_reselect() {
        let source = FakeSource::with_category("Portraits", 30);
        let portraits = GalleryFilter::Category("Portraits".into());
        let mut session = session(GalleryFilter::Home);

        let stale = session.select(portraits.clone()).unwrap();
        let fresh = session.select(portraits).unwrap();

        assert_eq!(session.apply(stale.run(&source).await), PageOutcome::Stale);
        assert!(matches!(
            session.apply(fresh.run(&source).await),
            PageOutcome::Applied { added: 25, .. }
        ));
    }

    #[tokio::test]
    async fn test_failure_keeps_items_and_allows_retry() {
        let source = FakeSource::with_category("Portraits", 30);
        let trigger = ScrollTrigger::default();
        let mut session = session(GalleryFilter::Home);

        let first = session.select(GalleryFilter::Category("Portraits".into())).unwrap();
        session.apply(first.run(&source).await);

        *source.fail_next.lock().unwrap() = true;
        let second = session.on_scroll(&near_bottom(), &trigger).unwrap();
        let outcome = session.apply(second.run(&source).await);
        assert!(matches!(outcome, PageOutcome::Failed(CmsError::Transport(_))));
        assert_eq!(session.store().item_count(), 25);
        assert_eq!(session.cursor().page_number(), 2);
        assert!(session.cursor().has_more());
        assert!(session.last_error().is_some());

        let retry = session.retry().unwrap();
        assert_eq!(retry.request.page_number, 2);
        session.apply(retry.run(&source).await);
        assert_eq!(session.store().item_count(), 30);
        assert!(session.last_error().is_none());
        assert!(session.retry().is_none());
    }

    #[tokio::test]
    async fn test_lightbox_wraps_over_loaded_items() {
        let source = FakeSource::with_category("Portraits", 4);
        let mut session = session(GalleryFilter::Home);
        let ticket = session.select(GalleryFilter::Category("Portraits".into())).unwrap();
        session.apply(ticket.run(&source).await);

        session.open_lightbox(0).unwrap();
        session.handle_key(LightboxKey::Previous);
        assert_eq!(session.lightbox().open_index(), Some(3));
        session.handle_key(LightboxKey::Next);
        assert_eq!(session.lightbox().open_index(), Some(0));
        assert_eq!(session.current_item().unwrap().title, "Portraits 1");

        assert!(session.open_lightbox(4).is_err());
        session.handle_key(LightboxKey::Dismiss);
        assert!(session.current_item().is_none());
    }

    #[tokio::test]
    async fn test_home_filter_exhaustion_uses_raw_count() {
        let mut source = FakeSource::default();
        let records = (0..25)
            .map(|i| json!({ "id": i, "home": i % 5 != 0, "image": { "url": "/a.jpg" } }))
            .collect();
        source.records.insert(GalleryFilter::Home, records);
        let mut session = session(GalleryFilter::Home);

        let ticket = session.request_next_page().unwrap();
        let outcome = session.apply(ticket.run(&source).await);
        assert_eq!(outcome, PageOutcome::Applied { added: 20, exhausted: false });
        assert!(session.request_next_page().is_some());
    }

    #[test]
    fn test_select_closes_lightbox_and_clears_store() {
        let mut session = session(GalleryFilter::Home);
        let ticket = session.request_next_page().unwrap();
        let page = RawPage::new(vec![json!({ "id": 1, "home": true, "image": { "url": "/a.jpg" } })]);
        session.apply(PageResponse {
            ticket,
            result: Ok(page),
        });
        session.open_lightbox(0).unwrap();

        let next = session.select(GalleryFilter::Category("Events".into()));
        assert!(next.is_some());
        assert!(!session.lightbox().is_open());
        assert!(session.store().is_empty());
    }
}
