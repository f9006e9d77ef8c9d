/// Pagination Cursor
///
/// Tracks which page comes next, whether a request is outstanding and
/// whether the backend has run out of records. At most one request is
/// outstanding at a time, so pages always complete in issue order.

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Ticket for one outstanding page request.
///
/// Carries the generation of the session that issued it so responses that
/// arrive after a reset can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page_number: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
pub struct PaginationCursor {
    page_number: u32,
    page_size: u32,
    is_fetching: bool,
    has_more: bool,
    generation: u64,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationCursor {
    /// Create a cursor at page 1. A page size of 0 is bumped to 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
            is_fetching: false,
            has_more: true,
            generation: 0,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a call to `request_next_page` would issue a request
    pub fn can_request(&self) -> bool {
        !self.is_fetching && self.has_more
    }

    /// Claim the next page.
    ///
    /// Returns `None` while a request is outstanding or once the data is
    /// exhausted; otherwise marks the cursor as fetching and hands back the
    /// ticket the caller must fetch and later settle.
    pub fn request_next_page(&mut self) -> Option<PageRequest> {
        if !self.can_request() {
            return None;
        }
        self.is_fetching = true;
        Some(PageRequest {
            generation: self.generation,
            page_number: self.page_number,
            page_size: self.page_size,
        })
    }

    /// Whether a ticket belongs to the outstanding request of this session
    pub fn is_current(&self, request: &PageRequest) -> bool {
        self.is_fetching
            && request.generation == self.generation
            && request.page_number == self.page_number
    }

    /// Settle a successful request that returned `raw_count` records.
    ///
    /// Returns `false` and changes nothing for a stale ticket.
    pub fn complete(&mut self, request: &PageRequest, raw_count: usize) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.is_fetching = false;
        self.page_number += 1;
        if raw_count < self.page_size as usize {
            self.has_more = false;
        }
        true
    }

    /// Settle a failed request. The same page is requested again next time.
    ///
    /// Returns `false` and changes nothing for a stale ticket.
    pub fn fail(&mut self, request: &PageRequest) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.is_fetching = false;
        true
    }

    /// Start over at page 1 and invalidate every outstanding ticket
    pub fn reset(&mut self) {
        self.page_number = 1;
        self.is_fetching = false;
        self.has_more = true;
        self.generation += 1;
    }
}
