use crate::RequestType;

pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page bookkeeping for incremental load-more.
///
/// `next_page >= start_page` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingCursor {
    start_page: u32,
    next_page: u32,
    page_size: u32,
}

impl PagingCursor {
    pub fn new(start_page: u32, page_size: u32) -> Self {
        Self {
            start_page,
            next_page: start_page,
            page_size,
        }
    }

    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Page to request for the given kind of request.
    pub fn page_for(&self, kind: RequestType) -> u32 {
        match kind {
            RequestType::Refresh => self.start_page,
            RequestType::Fetch => self.next_page,
        }
    }

    /// Advances after a successful page.
    pub(crate) fn advance(&mut self, kind: RequestType) {
        if kind == RequestType::Refresh {
            self.next_page = self.start_page;
        }
        self.next_page = self.next_page.saturating_add(1);
    }
}

impl Default for PagingCursor {
    fn default() -> Self {
        Self::new(DEFAULT_START_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_resets_then_advances() {
        let mut cursor = PagingCursor::new(1, 20);
        cursor.advance(RequestType::Refresh);
        cursor.advance(RequestType::Fetch);
        cursor.advance(RequestType::Fetch);
        assert_eq!(cursor.next_page(), 4);

        cursor.advance(RequestType::Refresh);
        assert_eq!(cursor.next_page(), 2);
        assert_eq!(cursor.page_for(RequestType::Refresh), 1);
        assert_eq!(cursor.page_for(RequestType::Fetch), 2);
    }

    #[test]
    fn zero_based_origin() {
        let mut cursor = PagingCursor::new(0, 10);
        assert_eq!(cursor.page_for(RequestType::Fetch), 0);
        cursor.advance(RequestType::Refresh);
        assert_eq!(cursor.page_for(RequestType::Fetch), 1);
        assert!(cursor.next_page() >= cursor.start_page());
    }
}
