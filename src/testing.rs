//! In-memory stand-in for the remote API, recording every call.

use crate::api::SearchApi;
use crate::document::{Document, Stats};
use crate::error::{ClientError, Result};
use crate::request::SearchRequest;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};

pub struct FakeApi {
    stats: Option<Stats>,
    search_outcome: Result<Vec<Document>>,
    documents: Vec<Document>,
    document_error: Option<ClientError>,
    stats_calls: Cell<usize>,
    searches: RefCell<Vec<SearchRequest>>,
    document_requests: RefCell<Vec<String>>,
}

impl FakeApi {
    /// Unreachable until `with_stats` is called
    pub fn new() -> Self {
        Self {
            stats: None,
            search_outcome: Ok(Vec::new()),
            documents: Vec::new(),
            document_error: None,
            stats_calls: Cell::new(0),
            searches: RefCell::new(Vec::new()),
            document_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn connected() -> Self {
        Self::new().with_stats(Stats {
            document_count: 100,
            vocabulary_size: 2500,
            available_k_values: vec![10, 25, 50],
        })
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_results(mut self, docs: Vec<Document>) -> Self {
        self.search_outcome = Ok(docs);
        self
    }

    pub fn with_search_error(mut self, err: ClientError) -> Self {
        self.search_outcome = Err(err);
        self
    }

    pub fn with_document(mut self, doc: Document) -> Self {
        self.documents.push(doc);
        self
    }

    pub fn with_document_error(mut self, err: ClientError) -> Self {
        self.document_error = Some(err);
        self
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.get()
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.borrow().clone()
    }

    pub fn document_requests(&self) -> Vec<String> {
        self.document_requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SearchApi for FakeApi {
    async fn stats(&self) -> Result<Stats> {
        self.stats_calls.set(self.stats_calls.get() + 1);
        self.stats
            .clone()
            .ok_or_else(|| ClientError::Connectivity("connection refused".to_string()))
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        self.searches.borrow_mut().push(request.clone());
        self.search_outcome.clone()
    }

    async fn document(&self, id: &str) -> Result<Document> {
        self.document_requests.borrow_mut().push(id.to_string());
        if let Some(err) = &self.document_error {
            return Err(err.clone());
        }
        self.documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    fn base_url(&self) -> &str {
        "http://fake.invalid"
    }
}
