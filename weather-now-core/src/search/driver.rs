use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, sleep_until},
};

use crate::{
    model::LocationQuery,
    provider::WeatherSource,
    search::{SearchRequest, SearchSession, SearchSnapshot},
};

type Updates = Arc<watch::Sender<SearchSnapshot>>;

/// Runs a [`SearchSession`] on the tokio runtime: one debounce timer per
/// keystroke, lookups as detached tasks, and a watch channel carrying the
/// session state after every change.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct SearchDriver {
    session: Arc<Mutex<SearchSession>>,
    source: Arc<dyn WeatherSource>,
    updates: Updates,
    timer: Option<JoinHandle<()>>,
}

impl SearchDriver {
    pub fn new(source: Arc<dyn WeatherSource>, debounce: Duration) -> Self {
        let session = SearchSession::new(debounce);
        let (tx, _) = watch::channel(session.snapshot());

        Self { session: Arc::new(Mutex::new(session)), source, updates: Arc::new(tx), timer: None }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.session.lock().snapshot()
    }

    /// Record new query text and (re)arm the debounce timer.
    pub fn input(&mut self, text: impl Into<String>) {
        let deadline = self.update(|s| s.input(text, Instant::now()));
        self.cancel_timer();

        let session = Arc::clone(&self.session);
        let source = Arc::clone(&self.source);
        let updates = Arc::clone(&self.updates);

        self.timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;

            let request = {
                let mut s = session.lock();
                let request = s.poll(Instant::now());
                updates.send_replace(s.snapshot());
                request
            };

            // Detached so that a later keystroke never aborts a lookup already
            // on the wire; its response is dropped by the token check instead.
            if let Some(request) = request {
                tokio::spawn(run_lookup(session, source, updates, request));
            }
        }));
    }

    pub fn select(&mut self, index: usize) -> Option<LocationQuery> {
        self.cancel_timer();
        self.update(|s| s.select(index))
    }

    pub fn submit(&mut self) -> Option<LocationQuery> {
        self.cancel_timer();
        self.update(SearchSession::submit)
    }

    pub fn clear(&mut self) {
        self.cancel_timer();
        self.update(SearchSession::clear);
    }

    pub fn collapse(&self) {
        self.update(SearchSession::collapse);
    }

    pub fn expand(&self) {
        self.update(SearchSession::expand);
    }

    /// Cancel any pending debounce timer. Lookups already issued may still
    /// complete but no further ones will start.
    pub fn shutdown(&mut self) {
        self.cancel_timer();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut SearchSession) -> R) -> R {
        let mut s = self.session.lock();
        let out = f(&mut s);
        self.updates.send_replace(s.snapshot());
        out
    }
}

impl Drop for SearchDriver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_lookup(
    session: Arc<Mutex<SearchSession>>,
    source: Arc<dyn WeatherSource>,
    updates: Updates,
    request: SearchRequest,
) {
    tracing::debug!(token = ?request.token, query = %request.query, "searching places");

    let result = source.search_places(&request.query).await.map_err(|e| e.into_search_failure());

    let mut s = session.lock();
    let outcome = s.complete(request.token, result);
    tracing::debug!(token = ?request.token, ?outcome, "search lookup finished");
    updates.send_replace(s.snapshot());
}
