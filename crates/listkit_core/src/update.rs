use crate::{
    Effect, FetchSource, ListError, ListState, Msg, Outcome, RequestTicket, RequestType,
    ResultState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update<T: Clone>(mut state: ListState<T>, msg: Msg<T>) -> (ListState<T>, Vec<Effect<T>>) {
    let effects = match msg {
        Msg::RefreshRequested => start_request(&mut state, RequestType::Refresh),
        Msg::FetchMoreRequested => {
            if state.has_more_data() {
                start_request(&mut state, RequestType::Fetch)
            } else {
                Vec::new()
            }
        }
        Msg::SearchBegan(keyword) => {
            if !state.config().searchable {
                return (
                    state,
                    vec![Effect::Publish(Outcome::rejected(
                        RequestType::Refresh,
                        ListError::SearchUnavailable,
                    ))],
                );
            }
            // Switching modes supersedes whatever is in flight; its late
            // result is reported without being applied in `page_loaded`.
            state.abandon();
            state.enter_search(keyword);
            start_request(&mut state, RequestType::Refresh)
        }
        Msg::SearchReset => {
            state.abandon();
            state.leave_search();
            start_request(&mut state, RequestType::Refresh)
        }
        Msg::PageLoaded {
            ticket,
            kind,
            source,
            result,
        } => page_loaded(&mut state, ticket, kind, source, result),
        Msg::InFlightReleased { ticket } => {
            state.release(ticket);
            Vec::new()
        }
        Msg::ScrollDragBegan => {
            if state.auto_load_more() {
                state.set_user_scrolling(true);
            }
            Vec::new()
        }
        Msg::ScrolledToBottom(at_bottom) => {
            let qualifies = at_bottom
                && !state.is_requesting()
                && state.user_scrolling()
                && state.auto_load_more()
                && state.has_more_data();
            if qualifies {
                state.set_user_scrolling(false);
                start_request(&mut state, RequestType::Fetch)
            } else {
                Vec::new()
            }
        }
        Msg::ScrollDragEnded { decelerating } => {
            if !decelerating {
                state.set_user_scrolling(false);
            }
            Vec::new()
        }
        Msg::ScrollDecelerationEnded => {
            state.set_user_scrolling(false);
            Vec::new()
        }
        Msg::LayoutChanged(layout) => {
            state.set_layout(layout);
            Vec::new()
        }
        Msg::AutoLoadMoreToggled(enabled) => {
            state.set_auto_load_more(enabled);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_request<T>(state: &mut ListState<T>, kind: RequestType) -> Vec<Effect<T>> {
    if state.in_flight().is_some() {
        return vec![Effect::Publish(Outcome::rejected(kind, ListError::HasRequesting))];
    }

    let source = if state.search().active {
        FetchSource::Search
    } else {
        FetchSource::Listing
    };
    if source == FetchSource::Listing && kind == RequestType::Refresh {
        state.leave_search();
    }

    let cursor = state.cursor();
    let page = cursor.page_for(kind);
    let page_size = cursor.page_size();
    let ticket = state.acquire(kind, source);

    let effect = match source {
        FetchSource::Listing => Effect::FetchPage {
            ticket,
            kind,
            page,
            page_size,
        },
        FetchSource::Search => Effect::SearchPage {
            ticket,
            kind,
            keyword: state.search().keyword.clone(),
            page,
            page_size,
        },
    };
    vec![effect]
}

fn page_loaded<T: Clone>(
    state: &mut ListState<T>,
    ticket: RequestTicket,
    kind: RequestType,
    source: FetchSource,
    result: ResultState<T>,
) -> Vec<Effect<T>> {
    let is_current = state
        .in_flight()
        .is_some_and(|flight| flight.ticket == ticket && !flight.completed);
    let release = Effect::ScheduleRelease {
        ticket,
        delay: state.config().release_delay,
    };

    if !is_current {
        // Cut off by a search switch or reset: report it once, touch nothing.
        if !state.settle_abandoned(ticket) {
            return Vec::new();
        }
        let err = if source == FetchSource::Search && !state.search().active {
            ListError::UserCancelledSearch
        } else {
            ListError::Superseded
        };
        return vec![Effect::Publish(Outcome::rejected(kind, err))];
    }

    if source == FetchSource::Search && !state.search().active {
        state.mark_completed();
        return vec![
            Effect::Publish(Outcome::rejected(kind, ListError::UserCancelledSearch)),
            release,
        ];
    }

    state.mark_completed();
    if let ResultState::Success { total_count, items } = &result {
        state.apply_page(kind, *total_count, items.clone());
    }

    vec![Effect::Publish(Outcome::new(kind, result)), release]
}
