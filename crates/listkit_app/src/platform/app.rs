use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use listkit_core::{ListError, ResultState};
use listkit_engine::{ApiClient, JsonPageSource, ListController, PageSource, SearchSource};
use listkit_logging::{listkit_info, listkit_warn};
use log::LevelFilter;
use serde_json::Value;

use super::cli::Args;
use super::config::{self, AppConfig};
use super::logging;

/// Slack on top of the request timeout for the release delay and delivery.
const PAGE_WAIT_SLACK: Duration = Duration::from_secs(5);

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        listkit_logging::default_level()
    };
    logging::initialize(args.log.into(), level);

    let config = config::load(&args.config)?;
    let mut list = build_controller(&config)?;

    let failure: Rc<RefCell<Option<ListError>>> = Rc::new(RefCell::new(None));
    let sink = failure.clone();
    let _outcomes = list.subscribe_outcomes(move |outcome| {
        if let ResultState::Error(err) = &outcome.result {
            listkit_warn!("{:?} request failed ({}): {err}", outcome.kind, err.code());
            *sink.borrow_mut() = Some(err.clone());
        }
    });

    match &args.keyword {
        Some(keyword) => list.begin_search(keyword.clone()),
        None => list.refresh_data(),
    }

    let wait = config.request_timeout() + config.list_config().release_delay + PAGE_WAIT_SLACK;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0;
    let mut pages = 0;
    loop {
        if !list.pump_until_idle(wait) {
            bail!("no answer for page {} within {:?}", pages + 1, wait);
        }
        pages += 1;
        if let Some(err) = failure.borrow_mut().take() {
            return Err(anyhow!(err).context(format!("loading page {pages}")));
        }

        let items = list.items();
        for item in &items[printed..] {
            serde_json::to_writer(&mut out, item)?;
            writeln!(out)?;
        }
        let added = items.len() - printed;
        printed = items.len();

        if !list.has_more_data() || args.max_pages.is_some_and(|max| pages >= max) {
            break;
        }
        if added == 0 && pages > 1 {
            listkit_warn!("Page {pages} was empty although more items were announced; stopping");
            break;
        }
        list.fetch_more_data();
    }
    out.flush()?;

    listkit_info!(
        "Printed {printed} of {} item(s) over {pages} page(s)",
        list.state()
            .total_count()
            .map_or_else(|| "?".to_string(), |total| total.to_string())
    );
    Ok(())
}

fn build_controller(config: &AppConfig) -> anyhow::Result<ListController<Value>> {
    let client = ApiClient::new(config.api_settings()).context("building HTTP client")?;
    let mut source = JsonPageSource::<Value>::new(Arc::new(client), config.list_path.clone())
        .with_method(config.http_method()?)
        .with_layout(config.page_layout())
        .signed(config.signed);
    if let Some(path) = &config.search_path {
        source = source.with_search_path(path.clone());
    }

    let source = Arc::new(source);
    let listing: Arc<dyn PageSource<Value>> = source.clone();
    let search: Arc<dyn SearchSource<Value>> = source;
    ListController::new(config.list_config(), listing, Some(search))
        .context("starting list engine")
}
