use crate::{FetchSource, LayoutType, RequestTicket, RequestType, ResultState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<T> {
    /// Reload from the first page in the current mode.
    ///
    /// Like `FetchMoreRequested`, this is rejected with
    /// [`crate::ListError::HasRequesting`] while a request holds the marker.
    /// `SearchBegan` and `SearchReset` instead cut the pending request off
    /// and report it as superseded or cancelled.
    RefreshRequested,
    /// Load the next page if the total says there is one.
    FetchMoreRequested,
    /// Switch to search mode with a keyword and reload.
    SearchBegan(String),
    /// Leave search mode and reload the plain listing.
    SearchReset,
    /// A page source finished the request identified by `ticket`.
    PageLoaded {
        ticket: RequestTicket,
        kind: RequestType,
        source: FetchSource,
        result: ResultState<T>,
    },
    /// The debounce window after a completed request elapsed.
    InFlightReleased { ticket: RequestTicket },
    /// User put a finger on the list.
    ScrollDragBegan,
    /// Scroll position crossed the bottom edge (`true`) or left it.
    ScrolledToBottom(bool),
    /// User lifted the finger; the list may keep decelerating.
    ScrollDragEnded { decelerating: bool },
    ScrollDecelerationEnded,
    LayoutChanged(LayoutType),
    AutoLoadMoreToggled(bool),
    NoOp,
}
