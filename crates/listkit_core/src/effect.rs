use std::time::Duration;

use crate::{Outcome, RequestTicket, RequestType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<T> {
    FetchPage {
        ticket: RequestTicket,
        kind: RequestType,
        page: u32,
        page_size: u32,
    },
    SearchPage {
        ticket: RequestTicket,
        kind: RequestType,
        keyword: String,
        page: u32,
        page_size: u32,
    },
    /// Deliver `Msg::InFlightReleased { ticket }` after `delay`.
    ScheduleRelease { ticket: RequestTicket, delay: Duration },
    /// Push an entry onto the outcome channel.
    Publish(Outcome<T>),
}
