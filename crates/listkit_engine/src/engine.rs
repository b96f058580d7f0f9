use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use listkit_core::{FetchSource, ListError, Msg, RequestTicket, RequestType, ResultState};
use listkit_logging::{listkit_debug, listkit_trace};
use tokio_util::sync::CancellationToken;

use crate::{PageSource, SearchSource};

#[derive(Debug)]
pub(crate) enum EngineCommand {
    Fetch {
        ticket: RequestTicket,
        kind: RequestType,
        page: u32,
        page_size: u32,
    },
    Search {
        ticket: RequestTicket,
        kind: RequestType,
        keyword: String,
        page: u32,
        page_size: u32,
    },
    Release {
        ticket: RequestTicket,
        delay: Duration,
    },
}

/// Completion delivered back to the owning context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent<T> {
    PageLoaded {
        ticket: RequestTicket,
        kind: RequestType,
        source: FetchSource,
        result: ResultState<T>,
    },
    Released {
        ticket: RequestTicket,
    },
}

impl<T> EngineEvent<T> {
    pub fn into_msg(self) -> Msg<T> {
        match self {
            EngineEvent::PageLoaded {
                ticket,
                kind,
                source,
                result,
            } => Msg::PageLoaded {
                ticket,
                kind,
                source,
                result,
            },
            EngineEvent::Released { ticket } => Msg::InFlightReleased { ticket },
        }
    }
}

struct Worker<T: Send + 'static> {
    listing: Arc<dyn PageSource<T>>,
    search: Option<Arc<dyn SearchSource<T>>>,
    event_tx: mpsc::Sender<EngineEvent<T>>,
}

/// Runs page requests and release timers off the owning thread.
///
/// Dropping the handle cancels every pending task; their results are never
/// delivered.
pub struct EngineHandle<T> {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent<T>>,
    shutdown: CancellationToken,
}

impl<T: Send + 'static> EngineHandle<T> {
    pub fn new(
        listing: Arc<dyn PageSource<T>>,
        search: Option<Arc<dyn SearchSource<T>>>,
    ) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let worker = Arc::new(Worker {
            listing,
            search,
            event_tx,
        });

        let token = shutdown.clone();
        thread::Builder::new()
            .name("listkit-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let worker = worker.clone();
                    let token = token.clone();
                    runtime.spawn(async move {
                        tokio::select! {
                            _ = token.cancelled() => {
                                listkit_trace!("engine shut down before command finished");
                            }
                            event = handle_command(worker.as_ref(), command) => {
                                let _ = worker.event_tx.send(event);
                            }
                        }
                    });
                }
                runtime.shutdown_background();
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            shutdown,
        })
    }

    pub(crate) fn submit(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent<T>> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent<T>> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl<T> Drop for EngineHandle<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_command<T: Send + 'static>(
    worker: &Worker<T>,
    command: EngineCommand,
) -> EngineEvent<T> {
    match command {
        EngineCommand::Fetch {
            ticket,
            kind,
            page,
            page_size,
        } => {
            listkit_debug!("ticket {}: {kind:?} page {page} (size {page_size})", ticket.0);
            let result = worker.listing.fetch_page(page, page_size).await;
            EngineEvent::PageLoaded {
                ticket,
                kind,
                source: FetchSource::Listing,
                result,
            }
        }
        EngineCommand::Search {
            ticket,
            kind,
            keyword,
            page,
            page_size,
        } => {
            listkit_debug!(
                "ticket {}: {kind:?} search {keyword:?} page {page} (size {page_size})",
                ticket.0
            );
            let result = match &worker.search {
                Some(search) => search.search_page(&keyword, page, page_size).await,
                None => ResultState::error(ListError::SearchUnavailable),
            };
            EngineEvent::PageLoaded {
                ticket,
                kind,
                source: FetchSource::Search,
                result,
            }
        }
        EngineCommand::Release { ticket, delay } => {
            tokio::time::sleep(delay).await;
            EngineEvent::Released { ticket }
        }
    }
}
