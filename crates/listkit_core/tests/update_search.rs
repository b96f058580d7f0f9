use std::time::Duration;

use listkit_core::{
    update, Effect, FetchSource, ListConfig, ListError, ListState, Msg, Outcome, RequestTicket,
    RequestType, ResultState,
};

fn config(searchable: bool) -> ListConfig {
    ListConfig {
        start_page: 1,
        page_size: 3,
        release_delay: Duration::from_millis(100),
        auto_load_more: true,
        searchable,
    }
}

fn loaded(
    ticket: RequestTicket,
    kind: RequestType,
    source: FetchSource,
    result: ResultState<u32>,
) -> Msg<u32> {
    Msg::PageLoaded {
        ticket,
        kind,
        source,
        result,
    }
}

fn cancelled(kind: RequestType) -> Vec<Effect<u32>> {
    vec![Effect::Publish(Outcome::new(
        kind,
        ResultState::error(ListError::UserCancelledSearch),
    ))]
}

fn superseded(kind: RequestType) -> Vec<Effect<u32>> {
    vec![Effect::Publish(Outcome::new(
        kind,
        ResultState::error(ListError::Superseded),
    ))]
}

#[test]
fn begin_search_issues_keyword_request_from_start_page() {
    let state: ListState<u32> = ListState::new(config(true));
    let (state, effects) = update(state, Msg::SearchBegan("rust".to_string()));

    assert_eq!(
        effects,
        vec![Effect::SearchPage {
            ticket: RequestTicket(1),
            kind: RequestType::Refresh,
            keyword: "rust".to_string(),
            page: 1,
            page_size: 3,
        }]
    );
    assert!(state.is_search_mode());
    assert_eq!(state.search_keyword(), "rust");
}

#[test]
fn search_mode_survives_refresh_and_pages_by_keyword() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::SearchBegan("rust".to_string()));
    let ticket = state.in_flight_ticket().expect("marker present");
    let (state, _) = update(
        state,
        loaded(
            ticket,
            RequestType::Refresh,
            FetchSource::Search,
            ResultState::success(6, vec![1, 2, 3]),
        ),
    );
    let (state, _) = update(state, Msg::InFlightReleased { ticket });

    let (state, effects) = update(state, Msg::FetchMoreRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::SearchPage { kind: RequestType::Fetch, page: 2, keyword, .. }] if keyword == "rust"
    ));
    let ticket = state.in_flight_ticket().expect("marker present");
    let (state, _) = update(
        state,
        loaded(
            ticket,
            RequestType::Fetch,
            FetchSource::Search,
            ResultState::success(6, vec![4, 5, 6]),
        ),
    );
    let (state, _) = update(state, Msg::InFlightReleased { ticket });
    assert_eq!(state.items(), &[1, 2, 3, 4, 5, 6]);

    let (state, effects) = update(state, Msg::RefreshRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::SearchPage { kind: RequestType::Refresh, page: 1, .. }]
    ));
    assert!(state.is_search_mode());
}

#[test]
fn reset_during_search_discards_late_search_result() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::SearchBegan("x".to_string()));
    let search_ticket = state.in_flight_ticket().expect("marker present");

    let (state, effects) = update(state, Msg::SearchReset);
    assert!(matches!(
        effects.as_slice(),
        [Effect::FetchPage { kind: RequestType::Refresh, page: 1, .. }]
    ));
    assert!(!state.is_search_mode());
    assert_eq!(state.search_keyword(), "");
    let listing_ticket = state.in_flight_ticket().expect("marker present");

    let (state, _) = update(
        state,
        loaded(
            listing_ticket,
            RequestType::Refresh,
            FetchSource::Listing,
            ResultState::success(2, vec![10, 11]),
        ),
    );

    let (state, effects) = update(
        state,
        loaded(
            search_ticket,
            RequestType::Refresh,
            FetchSource::Search,
            ResultState::success(1, vec![99]),
        ),
    );
    assert_eq!(effects, cancelled(RequestType::Refresh));
    assert_eq!(state.items(), &[10, 11]);
    assert_eq!(state.total_count(), Some(2));
}

#[test]
fn late_search_result_before_listing_result_is_still_discarded() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::SearchBegan("x".to_string()));
    let search_ticket = state.in_flight_ticket().expect("marker present");
    let (state, _) = update(state, Msg::SearchReset);
    let listing_ticket = state.in_flight_ticket().expect("marker present");

    let (state, effects) = update(
        state,
        loaded(
            search_ticket,
            RequestType::Refresh,
            FetchSource::Search,
            ResultState::success(1, vec![99]),
        ),
    );
    assert_eq!(effects, cancelled(RequestType::Refresh));
    assert!(state.items().is_empty());
    assert_eq!(state.in_flight_ticket(), Some(listing_ticket));

    let (state, _) = update(
        state,
        loaded(
            listing_ticket,
            RequestType::Refresh,
            FetchSource::Listing,
            ResultState::success(2, vec![10, 11]),
        ),
    );
    assert_eq!(state.items(), &[10, 11]);
}

#[test]
fn new_keyword_supersedes_pending_search() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::SearchBegan("ru".to_string()));
    let first = state.in_flight_ticket().expect("marker present");
    let (state, effects) = update(state, Msg::SearchBegan("rust".to_string()));
    assert!(matches!(
        effects.as_slice(),
        [Effect::SearchPage { keyword, .. }] if keyword == "rust"
    ));

    let (state, effects) = update(
        state,
        loaded(
            first,
            RequestType::Refresh,
            FetchSource::Search,
            ResultState::success(1, vec![1]),
        ),
    );
    assert_eq!(effects, superseded(RequestType::Refresh));
    assert!(state.items().is_empty());
    assert!(state.is_requesting());
}

#[test]
fn refresh_cut_off_by_search_reports_superseded() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::RefreshRequested);
    let listing_ticket = state.in_flight_ticket().expect("marker present");
    let (mut state, _) = update(state, Msg::SearchBegan("x".to_string()));
    let search_ticket = state.in_flight_ticket().expect("marker present");
    state.consume_dirty();
    let before = state.view();

    let (mut state, effects) = update(
        state,
        loaded(
            listing_ticket,
            RequestType::Refresh,
            FetchSource::Listing,
            ResultState::success(1, vec![9]),
        ),
    );
    assert_eq!(effects, superseded(RequestType::Refresh));
    assert!(state.items().is_empty());
    assert_eq!(state.total_count(), None);
    assert_eq!(state.in_flight_ticket(), Some(search_ticket));
    assert!(state.is_search_mode());
    assert_eq!(state.view(), before);
    assert!(!state.consume_dirty());
}

#[test]
fn cut_off_result_is_reported_only_once() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::RefreshRequested);
    let listing_ticket = state.in_flight_ticket().expect("marker present");
    let (state, _) = update(state, Msg::SearchBegan("x".to_string()));

    let late = loaded(
        listing_ticket,
        RequestType::Refresh,
        FetchSource::Listing,
        ResultState::error(ListError::network("reset")),
    );
    let (state, effects) = update(state, late.clone());
    assert_eq!(effects, superseded(RequestType::Refresh));
    let (_, effects) = update(state, late);
    assert!(effects.is_empty());
}

#[test]
fn completed_request_is_not_reported_again_after_search() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::RefreshRequested);
    let ticket = state.in_flight_ticket().expect("marker present");
    let page = loaded(
        ticket,
        RequestType::Refresh,
        FetchSource::Listing,
        ResultState::success(1, vec![9]),
    );
    let (state, _) = update(state, page.clone());
    let (state, effects) = update(state, Msg::SearchBegan("x".to_string()));
    assert!(matches!(effects.as_slice(), [Effect::SearchPage { .. }]));

    let (state, effects) = update(state, page);
    assert!(effects.is_empty());
    assert_eq!(state.items(), &[9]);
}

#[test]
fn search_without_capability_is_rejected() {
    let state: ListState<u32> = ListState::new(config(false));
    let before = state.clone();
    let (state, effects) = update(state, Msg::SearchBegan("rust".to_string()));

    assert_eq!(
        effects,
        vec![Effect::Publish(Outcome::new(
            RequestType::Refresh,
            ResultState::error(ListError::SearchUnavailable),
        ))]
    );
    assert_eq!(state, before);
    assert!(!state.is_search_mode());
}

#[test]
fn plain_refresh_clears_stale_keyword() {
    let state = ListState::new(config(true));
    let (state, _) = update(state, Msg::SearchBegan("rust".to_string()));
    let ticket = state.in_flight_ticket().expect("marker present");
    let (state, _) = update(state, Msg::SearchReset);
    let (state, _) = update(
        state,
        loaded(
            ticket,
            RequestType::Refresh,
            FetchSource::Search,
            ResultState::success(0, Vec::new()),
        ),
    );
    assert_eq!(state.search_keyword(), "");
    assert!(!state.is_search_mode());
}

#[test]
fn refresh_is_rejected_where_search_replaces_the_request() {
    let state: ListState<u32> = ListState::new(config(true));
    let (state, _) = update(state, Msg::RefreshRequested);
    let listing_ticket = state.in_flight_ticket().expect("marker present");

    let (state, effects) = update(state, Msg::RefreshRequested);
    assert_eq!(
        effects,
        vec![Effect::Publish(Outcome::new(
            RequestType::Refresh,
            ResultState::error(ListError::HasRequesting),
        ))]
    );
    assert_eq!(state.in_flight_ticket(), Some(listing_ticket));

    let (state, effects) = update(state, Msg::SearchBegan("x".to_string()));
    assert!(matches!(
        effects.as_slice(),
        [Effect::SearchPage { ticket, .. }] if *ticket != listing_ticket
    ));
    assert!(state.is_search_mode());
}
