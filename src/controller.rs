use crate::api::SearchApi;
use crate::document::Document;
use crate::error::Result;
use crate::request::{SearchOptions, SearchRequest};
use std::time::{Duration, Instant};

/// Read-only view of the search lifecycle
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub loading: bool,
    pub results: Vec<Document>,
    pub error: Option<String>,
    pub elapsed: Option<Duration>,
}

impl SearchState {
    /// Look up a document in the current result set
    pub fn find(&self, id: &str) -> Option<&Document> {
        self.results.iter().find(|d| d.id == id)
    }
}

/// A search that has been issued but not yet applied
#[derive(Debug, Clone)]
pub struct SearchTicket {
    seq: u64,
    started: Instant,
    request: SearchRequest,
}

impl SearchTicket {
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Owns the query, the selected options and the result/error state.
///
/// Each submission is tagged with a sequence number and only the latest one
/// may update the state.
#[derive(Debug, Default)]
pub struct SearchController {
    state: SearchState,
    options: SearchOptions,
    last_seq: u64,
}

impl SearchController {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Run one search end to end. Returns `false` for a blank query.
    pub async fn submit_search<A: SearchApi + ?Sized>(
        &mut self,
        api: &A,
        query: &str,
        options: SearchOptions,
    ) -> bool {
        let Some(ticket) = self.begin(query, options) else {
            return false;
        };
        let outcome = api.search(ticket.request()).await;
        self.finish(ticket, outcome);
        true
    }

    /// Enter the loading state and hand out a ticket for the request.
    /// A blank query leaves everything untouched and yields `None`.
    pub fn begin(&mut self, query: &str, options: SearchOptions) -> Option<SearchTicket> {
        let request = SearchRequest::new(query, options)?;

        self.last_seq += 1;
        self.options = options;
        self.state = SearchState {
            query: request.query().to_string(),
            loading: true,
            results: Vec::new(),
            error: None,
            elapsed: None,
        };
        tracing::info!("Searching for {:?} (#{})", request.query(), self.last_seq);

        Some(SearchTicket {
            seq: self.last_seq,
            started: Instant::now(),
            request,
        })
    }

    /// Apply a response. Completions of superseded searches are dropped and
    /// `false` is returned.
    pub fn finish(&mut self, ticket: SearchTicket, outcome: Result<Vec<Document>>) -> bool {
        if ticket.seq != self.last_seq {
            tracing::debug!(
                "Discarding stale response #{} (latest is #{})",
                ticket.seq,
                self.last_seq
            );
            return false;
        }

        match outcome {
            Ok(docs) => {
                self.state.elapsed = Some(ticket.started.elapsed());
                if docs.is_empty() {
                    self.state.error =
                        Some(format!("No results found for \"{}\"", ticket.request.query()));
                } else {
                    tracing::info!("Received {} results", docs.len());
                }
                self.state.results = docs;
            }
            Err(e) => {
                tracing::warn!("Search failed: {}", e.reason());
                self.state.elapsed = None;
                self.state.results.clear();
                self.state.error = Some(format!("Search failed: {}", e.reason()));
            }
        }
        self.state.loading = false;
        true
    }
}
