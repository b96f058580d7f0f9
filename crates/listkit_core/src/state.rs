use std::time::Duration;

use crate::cursor::{DEFAULT_PAGE_SIZE, DEFAULT_START_PAGE};
use crate::view_model::{LayoutType, ListViewModel};
use crate::{FetchSource, PagingCursor, RequestState, RequestType};

/// Delay between a request completing and its in-flight marker clearing.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(500);

/// Identifies one request attempt. Tickets grow monotonically per list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    pub start_page: u32,
    pub page_size: u32,
    /// Debounce window after completion during which new requests are
    /// still rejected.
    pub release_delay: Duration,
    pub auto_load_more: bool,
    /// Whether a search capability was injected.
    pub searchable: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            start_page: DEFAULT_START_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            release_delay: DEFAULT_RELEASE_DELAY,
            auto_load_more: true,
            searchable: false,
        }
    }
}

/// The in-flight marker. Its presence is the mutex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) ticket: RequestTicket,
    pub(crate) kind: RequestType,
    pub(crate) source: FetchSource,
    /// Result applied, waiting for the release timer.
    pub(crate) completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SearchState {
    pub(crate) active: bool,
    pub(crate) keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<T> {
    config: ListConfig,
    items: Vec<T>,
    total_count: Option<usize>,
    cursor: PagingCursor,
    request_state: RequestState,
    search: SearchState,
    in_flight: Option<InFlight>,
    /// Tickets dropped before their result arrived; each still owes one outcome.
    abandoned: Vec<RequestTicket>,
    next_ticket: u64,
    layout: LayoutType,
    user_scrolling: bool,
    dirty: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self::new(ListConfig::default())
    }
}

impl<T> ListState<T> {
    pub fn new(config: ListConfig) -> Self {
        let cursor = PagingCursor::new(config.start_page, config.page_size);
        Self {
            config,
            items: Vec::new(),
            total_count: None,
            cursor,
            request_state: RequestState::None,
            search: SearchState::default(),
            in_flight: None,
            abandoned: Vec::new(),
            next_ticket: 0,
            layout: LayoutType::default(),
            user_scrolling: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> ListViewModel {
        ListViewModel {
            item_count: self.items.len(),
            total_count: self.total_count,
            has_more_data: self.has_more_data(),
            is_requesting: self.is_requesting(),
            request_state: self.request_state,
            search_mode: self.search.active,
            search_keyword: self.search.keyword.clone(),
            next_page: self.cursor.next_page(),
            layout: self.layout,
            dirty: self.dirty,
        }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// `None` until the first successful page reports a total.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn cursor(&self) -> PagingCursor {
        self.cursor
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn is_search_mode(&self) -> bool {
        self.search.active
    }

    pub fn search_keyword(&self) -> &str {
        &self.search.keyword
    }

    pub fn layout(&self) -> LayoutType {
        self.layout
    }

    /// An unknown total counts as "more to fetch".
    pub fn has_more_data(&self) -> bool {
        self.total_count.is_none_or(|total| total > self.items.len())
    }

    pub fn is_requesting(&self) -> bool {
        self.in_flight.is_some() && self.request_state != RequestState::None
    }

    pub fn in_flight_ticket(&self) -> Option<RequestTicket> {
        self.in_flight.map(|flight| flight.ticket)
    }

    pub fn item_at_index(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Removes the item at `index` and shrinks the total by one.
    ///
    /// Out-of-range indices leave the state untouched. The cursor is not
    /// adjusted.
    pub fn delete_item(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.total_count = self.total_count.map(|total| total.saturating_sub(1));
        self.dirty = true;
        Some(removed)
    }

    /// Returns whether anything changed since the last call, and clears it.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    pub(crate) fn search(&self) -> &SearchState {
        &self.search
    }

    pub(crate) fn user_scrolling(&self) -> bool {
        self.user_scrolling
    }

    pub(crate) fn auto_load_more(&self) -> bool {
        self.config.auto_load_more
    }

    /// Takes the in-flight marker for a new request and returns its ticket.
    pub(crate) fn acquire(&mut self, kind: RequestType, source: FetchSource) -> RequestTicket {
        self.next_ticket += 1;
        let ticket = RequestTicket(self.next_ticket);
        self.in_flight = Some(InFlight {
            ticket,
            kind,
            source,
            completed: false,
        });
        self.request_state = RequestState::Requesting(kind);
        self.dirty = true;
        ticket
    }

    /// Drops the marker without waiting for the abandoned request.
    ///
    /// A request whose result was not applied yet is remembered so its late
    /// result can still be reported once.
    pub(crate) fn abandon(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            if !flight.completed {
                self.abandoned.push(flight.ticket);
            }
            self.request_state = RequestState::None;
            self.dirty = true;
        }
    }

    /// Forgets an abandoned ticket. Returns whether it was still pending.
    pub(crate) fn settle_abandoned(&mut self, ticket: RequestTicket) -> bool {
        let before = self.abandoned.len();
        self.abandoned.retain(|pending| *pending != ticket);
        self.abandoned.len() != before
    }

    pub(crate) fn mark_completed(&mut self) {
        if let Some(flight) = self.in_flight.as_mut() {
            flight.completed = true;
        }
    }

    pub(crate) fn release(&mut self, ticket: RequestTicket) -> bool {
        match self.in_flight {
            Some(flight) if flight.ticket == ticket => {
                self.in_flight = None;
                self.request_state = RequestState::None;
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn apply_page(&mut self, kind: RequestType, total_count: usize, items: Vec<T>) {
        match kind {
            RequestType::Refresh => self.items = items,
            RequestType::Fetch => self.items.extend(items),
        }
        self.total_count = Some(total_count);
        self.cursor.advance(kind);
        self.dirty = true;
    }

    pub(crate) fn enter_search(&mut self, keyword: String) {
        self.search.active = true;
        self.search.keyword = keyword;
        self.dirty = true;
    }

    pub(crate) fn leave_search(&mut self) {
        if self.search.active || !self.search.keyword.is_empty() {
            self.dirty = true;
        }
        self.search.active = false;
        self.search.keyword.clear();
    }

    pub(crate) fn set_user_scrolling(&mut self, scrolling: bool) {
        self.user_scrolling = scrolling;
    }

    pub(crate) fn set_auto_load_more(&mut self, enabled: bool) {
        if self.config.auto_load_more != enabled {
            self.config.auto_load_more = enabled;
            self.dirty = true;
        }
        if !enabled {
            self.user_scrolling = false;
        }
    }

    pub(crate) fn set_layout(&mut self, layout: LayoutType) {
        if self.layout != layout {
            self.layout = layout;
            self.dirty = true;
        }
    }
}
