//! listkit core: pure paginated-list state machine and view-binding helpers.
mod cursor;
mod effect;
mod error;
mod msg;
mod relay;
mod result;
mod state;
mod update;
mod view_model;

pub use cursor::{PagingCursor, DEFAULT_PAGE_SIZE, DEFAULT_START_PAGE};
pub use effect::Effect;
pub use error::{
    ListError, CODE_HAS_REQUESTING, CODE_NO_FUNCTION, CODE_SUPERSEDED, CODE_UNKNOWN,
    CODE_USER_CANCEL,
};
pub use msg::Msg;
pub use relay::{Relay, Subscription};
pub use result::{FetchSource, Outcome, RequestState, RequestType, ResultState};
pub use state::{ListConfig, ListState, RequestTicket, DEFAULT_RELEASE_DELAY};
pub use update::update;
pub use view_model::{LayoutType, ListBinding, ListViewModel};
