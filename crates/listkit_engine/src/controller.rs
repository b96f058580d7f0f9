use std::sync::Arc;
use std::time::{Duration, Instant};

use listkit_core::{
    update, Effect, LayoutType, ListBinding, ListConfig, ListState, ListViewModel, Msg, Outcome,
    Relay, RequestState, ResultState, Subscription,
};
use listkit_logging::{listkit_debug, listkit_info};

use crate::engine::{EngineCommand, EngineHandle};
use crate::{PageSource, SearchSource};

/// Paginated list bound to a listing capability and, optionally, a search
/// capability.
///
/// All state lives on the thread that owns the controller. Requests run on
/// the engine; their completions are applied by [`ListController::pump`]
/// (or one of its waiting variants), after which the relays republish.
pub struct ListController<T: Clone + Send + 'static> {
    state: ListState<T>,
    engine: EngineHandle<T>,
    items: Relay<Vec<T>>,
    total_count: Relay<Option<usize>>,
    request_state: Relay<RequestState>,
    layout: Relay<LayoutType>,
    outcomes: Relay<Outcome<T>>,
}

impl<T: Clone + Send + 'static> ListController<T> {
    pub fn new(
        config: ListConfig,
        listing: Arc<dyn PageSource<T>>,
        search: Option<Arc<dyn SearchSource<T>>>,
    ) -> std::io::Result<Self> {
        let config = ListConfig {
            searchable: search.is_some(),
            ..config
        };
        let state = ListState::new(config);
        let engine = EngineHandle::new(listing, search)?;
        Ok(Self {
            items: Relay::new(Vec::new()),
            total_count: Relay::new(state.total_count()),
            request_state: Relay::new(state.request_state()),
            layout: Relay::new(state.layout()),
            outcomes: Relay::empty(),
            state,
            engine,
        })
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn view(&self) -> ListViewModel {
        self.state.view()
    }

    pub fn items(&self) -> &[T] {
        self.state.items()
    }

    pub fn item_at_index(&self, index: usize) -> Option<&T> {
        self.state.item_at_index(index)
    }

    pub fn has_more_data(&self) -> bool {
        self.state.has_more_data()
    }

    pub fn is_requesting(&self) -> bool {
        self.state.is_requesting()
    }

    pub fn items_relay(&self) -> &Relay<Vec<T>> {
        &self.items
    }

    pub fn total_count_relay(&self) -> &Relay<Option<usize>> {
        &self.total_count
    }

    pub fn request_state_relay(&self) -> &Relay<RequestState> {
        &self.request_state
    }

    pub fn layout_relay(&self) -> &Relay<LayoutType> {
        &self.layout
    }

    /// Every completed or rejected request, in delivery order.
    pub fn outcomes_relay(&self) -> &Relay<Outcome<T>> {
        &self.outcomes
    }

    #[must_use = "dropping the subscription detaches the callback"]
    pub fn subscribe_outcomes(&self, callback: impl Fn(&Outcome<T>) + 'static) -> Subscription {
        self.outcomes.subscribe(callback)
    }

    pub fn refresh_data(&mut self) {
        self.dispatch(Msg::RefreshRequested);
    }

    /// Requests the next page. Does nothing once every item is loaded.
    pub fn fetch_more_data(&mut self) {
        self.dispatch(Msg::FetchMoreRequested);
    }

    pub fn begin_search(&mut self, keyword: impl Into<String>) {
        self.dispatch(Msg::SearchBegan(keyword.into()));
    }

    pub fn reset_search(&mut self) {
        self.dispatch(Msg::SearchReset);
    }

    pub fn delete_item(&mut self, index: usize) -> Option<T> {
        let removed = self.state.delete_item(index);
        self.publish_state();
        removed
    }

    pub fn scroll_drag_began(&mut self) {
        self.dispatch(Msg::ScrollDragBegan);
    }

    pub fn scrolled_to_bottom(&mut self, at_bottom: bool) {
        self.dispatch(Msg::ScrolledToBottom(at_bottom));
    }

    pub fn scroll_drag_ended(&mut self, decelerating: bool) {
        self.dispatch(Msg::ScrollDragEnded { decelerating });
    }

    pub fn scroll_deceleration_ended(&mut self) {
        self.dispatch(Msg::ScrollDecelerationEnded);
    }

    pub fn set_layout(&mut self, layout: LayoutType) {
        self.dispatch(Msg::LayoutChanged(layout));
    }

    pub fn set_auto_load_more(&mut self, enabled: bool) {
        self.dispatch(Msg::AutoLoadMoreToggled(enabled));
    }

    /// Applies every completion delivered so far. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(event.into_msg());
            applied += 1;
        }
        applied
    }

    /// Applies completions until no request is in flight.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub fn pump_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.is_requesting() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            match self.engine.recv_timeout(remaining) {
                Some(event) => self.dispatch(event.into_msg()),
                None => return !self.state.is_requesting(),
            }
        }
        self.pump();
        true
    }

    /// Applies completions as they arrive for the whole of `window`.
    pub fn pump_for(&mut self, window: Duration) -> usize {
        let deadline = Instant::now() + window;
        let mut applied = 0;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            match self.engine.recv_timeout(remaining) {
                Some(event) => {
                    self.dispatch(event.into_msg());
                    applied += 1;
                }
                None => break,
            }
        }
        applied
    }

    fn dispatch(&mut self, msg: Msg<T>) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.publish_state();
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect<T>) {
        match effect {
            Effect::FetchPage {
                ticket,
                kind,
                page,
                page_size,
            } => self.engine.submit(EngineCommand::Fetch {
                ticket,
                kind,
                page,
                page_size,
            }),
            Effect::SearchPage {
                ticket,
                kind,
                keyword,
                page,
                page_size,
            } => self.engine.submit(EngineCommand::Search {
                ticket,
                kind,
                keyword,
                page,
                page_size,
            }),
            Effect::ScheduleRelease { ticket, delay } => {
                self.engine.submit(EngineCommand::Release { ticket, delay })
            }
            Effect::Publish(outcome) => {
                match &outcome.result {
                    ResultState::Success { total_count, items } => listkit_info!(
                        "{:?} loaded {} item(s), {} in total",
                        outcome.kind,
                        items.len(),
                        total_count
                    ),
                    ResultState::Error(err) => {
                        listkit_debug!("{:?} failed ({}): {err}", outcome.kind, err.code())
                    }
                }
                self.outcomes.accept(outcome);
            }
        }
    }

    fn publish_state(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        self.items.accept(self.state.items().to_vec());
        self.total_count.accept(self.state.total_count());
        self.request_state.accept(self.state.request_state());
        self.layout.accept(self.state.layout());
    }
}

impl<T: Clone + Send + 'static> ListBinding<T> for ListController<T> {
    fn section_count(&self) -> usize {
        self.state.section_count()
    }

    fn row_count(&self, section: usize) -> usize {
        self.state.row_count(section)
    }

    fn item(&self, section: usize, row: usize) -> Option<&T> {
        self.state.item(section, row)
    }
}
