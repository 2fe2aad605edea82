//! Incremental place search: a debounced, race-safe state machine.
//!
//! [`SearchSession`] is driven purely by its inputs (text, clock, lookup
//! completions) so it can be stepped deterministically. [`driver::SearchDriver`]
//! runs it on the tokio runtime.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::{
    WeatherError,
    model::{LocationQuery, PlaceCandidate},
};

pub mod driver;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Queries of this many characters or fewer never reach the provider.
pub const MIN_QUERY_CHARS: usize = 2;

/// Identifies one issued lookup. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    InFlight(RequestToken),
    Resolved,
    Failed,
}

impl SearchPhase {
    /// No timer pending and no lookup awaited.
    pub fn is_settled(&self) -> bool {
        matches!(self, SearchPhase::Idle | SearchPhase::Resolved | SearchPhase::Failed)
    }
}

/// A lookup the host must issue and later report back via
/// [`SearchSession::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: RequestToken,
    pub query: String,
}

/// What happened to a lookup result handed to [`SearchSession::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Accepted,
    /// A newer lookup was issued, or the session moved on; nothing changed.
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    pub query: String,
    pub phase: SearchPhase,
    pub candidates: Vec<PlaceCandidate>,
    pub suggestions_visible: bool,
}

#[derive(Debug)]
pub struct SearchSession {
    query: String,
    phase: SearchPhase,
    deadline: Option<Instant>,
    debounce: Duration,
    last_token: u64,
    candidates: Vec<PlaceCandidate>,
    show_suggestions: bool,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchSession {
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            phase: SearchPhase::Idle,
            deadline: None,
            debounce,
            last_token: 0,
            candidates: Vec::new(),
            show_suggestions: false,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn candidates(&self) -> &[PlaceCandidate] {
        &self.candidates
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Suggestions are shown only when the list is open and non-empty.
    pub fn suggestions_visible(&self) -> bool {
        self.show_suggestions && !self.candidates.is_empty()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            query: self.query.clone(),
            phase: self.phase,
            candidates: self.candidates.clone(),
            suggestions_visible: self.suggestions_visible(),
        }
    }

    /// New text restarts the debounce window, whatever the current phase.
    /// Returns the new deadline.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) -> Instant {
        let deadline = now + self.debounce;
        self.query = text.into();
        self.phase = SearchPhase::Debouncing;
        self.deadline = Some(deadline);
        deadline
    }

    /// Advance the clock. Once the debounce window has elapsed this either
    /// settles a short query to Idle or mints a token and returns the lookup
    /// to issue.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        if self.phase != SearchPhase::Debouncing {
            return None;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return None,
        }
        self.deadline = None;

        if self.query.chars().count() <= MIN_QUERY_CHARS {
            self.phase = SearchPhase::Idle;
            self.candidates = Vec::new();
            self.show_suggestions = false;
            return None;
        }

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.phase = SearchPhase::InFlight(token);

        Some(SearchRequest { token, query: self.query.clone() })
    }

    /// Apply a lookup result. Only the most recently issued token, while the
    /// session is still waiting on it, may change state.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<Vec<PlaceCandidate>, WeatherError>,
    ) -> Completion {
        if self.phase != SearchPhase::InFlight(token) || token.0 != self.last_token {
            tracing::debug!(?token, phase = ?self.phase, "discarding stale search response");
            return Completion::Stale;
        }

        match result {
            Ok(candidates) => {
                self.candidates = candidates;
                self.show_suggestions = true;
                self.phase = SearchPhase::Resolved;
                Completion::Accepted
            }
            Err(err) => {
                tracing::warn!(query = %self.query, "place search failed: {err}");
                self.candidates = Vec::new();
                self.show_suggestions = false;
                self.phase = SearchPhase::Failed;
                Completion::Failed
            }
        }
    }

    /// Pick a suggestion: the list collapses, any pending timer or lookup is
    /// abandoned, and the place's `name, country` becomes the query.
    pub fn select(&mut self, index: usize) -> Option<LocationQuery> {
        let query = self.candidates.get(index)?.query();

        self.query = query.to_string();
        self.phase = SearchPhase::Idle;
        self.deadline = None;
        self.show_suggestions = false;

        Some(query)
    }

    /// Search for the typed text directly, without picking a suggestion.
    pub fn submit(&mut self) -> Option<LocationQuery> {
        let text = self.query.trim();
        if text.is_empty() {
            return None;
        }
        let query = LocationQuery::place(text);

        self.phase = SearchPhase::Idle;
        self.deadline = None;
        self.show_suggestions = false;

        Some(query)
    }

    /// Reset after a successful weather fetch.
    pub fn clear(&mut self) {
        self.query.clear();
        self.phase = SearchPhase::Idle;
        self.deadline = None;
        self.candidates = Vec::new();
        self.show_suggestions = false;
    }

    /// Hide the suggestion list; query text and candidates are kept.
    pub fn collapse(&mut self) {
        self.show_suggestions = false;
    }

    pub fn expand(&mut self) {
        self.show_suggestions = true;
    }
}
