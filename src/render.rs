//! Text rendering of the search and document views.
//!
//! Everything here is a pure projection of state owned elsewhere.

use crate::controller::SearchState;
use crate::document::{Document, Stats};
use crate::monitor::{ConnectionMonitor, ConnectionStatus};
use crate::viewer::DocumentState;
use std::fmt;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

pub const SNIPPET_LEN: usize = 150;
const UNTITLED: &str = "Untitled Document";
const UNKNOWN_AUTHOR: &str = "Unknown Author";
const NO_CONTENT: &str = "No content available";

/// Score with exactly four decimals
pub fn format_score(score: f64) -> String {
    format!("{:.4}", score)
}

/// First `SNIPPET_LEN` characters, plus "..." when the text was longer
pub fn snippet(text: &str) -> String {
    if text.is_empty() {
        return NO_CONTENT.to_string();
    }
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_LEN).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub fn display_title(doc: &Document) -> &str {
    if doc.title.trim().is_empty() {
        UNTITLED
    } else {
        &doc.title
    }
}

pub fn summary_line(count: usize, elapsed: Option<Duration>) -> String {
    let secs = elapsed.map(|d| d.as_secs_f64()).unwrap_or(0.0);
    format!("About {} results ({:.2} seconds)", count, secs)
}

/// One row of the results list
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub rank: usize,
    pub title: String,
    pub id: String,
    pub score: String,
    pub authors: String,
    pub snippet: String,
}

impl ResultItem {
    fn from_document(rank: usize, doc: &Document) -> Self {
        Self {
            rank,
            title: display_title(doc).to_string(),
            id: doc.id.clone(),
            score: format_score(doc.score),
            authors: doc
                .author_names()
                .map(|names| names.join(", "))
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            snippet: snippet(&doc.text),
        }
    }
}

/// What the results area shows; the variants are mutually exclusive
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Idle,
    Loading,
    Error(String),
    Results {
        summary: String,
        items: Vec<ResultItem>,
    },
}

impl ResultsView {
    pub fn project(state: &SearchState) -> Self {
        if state.loading {
            return Self::Loading;
        }
        if state.results.is_empty() {
            return match &state.error {
                Some(err) => Self::Error(err.clone()),
                None => Self::Idle,
            };
        }
        Self::Results {
            summary: summary_line(state.results.len(), state.elapsed),
            items: state
                .results
                .iter()
                .enumerate()
                .map(|(i, doc)| ResultItem::from_document(i + 1, doc))
                .collect(),
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Loading => writeln!(f, "Searching..."),
            Self::Error(err) => writeln!(f, "{}", err),
            Self::Results { summary, items } => {
                writeln!(f, "{}", summary)?;
                for item in items {
                    writeln!(f)?;
                    writeln!(f, "{:>2}. {}", item.rank, item.title)?;
                    writeln!(f, "    id: {}  score: {}", item.id, item.score)?;
                    writeln!(f, "    {}", item.authors)?;
                    writeln!(f, "    {}", item.snippet)?;
                }
                Ok(())
            }
        }
    }
}

/// Full rendering of the document detail view
pub struct DocumentView<'a>(pub &'a DocumentState);

impl fmt::Display for DocumentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DocumentState::Loading => writeln!(f, "Loading document..."),
            DocumentState::NotFound(id) => writeln!(f, "Document not found: {}", id),
            DocumentState::Failed(err) => writeln!(f, "Error loading document: {}", err),
            DocumentState::Loaded(doc) => {
                writeln!(f, "{}", display_title(doc))?;
                writeln!(f, "{}", "=".repeat(display_title(doc).graphemes(true).count()))?;
                if let Some(names) = doc.author_names() {
                    writeln!(f, "By {}", names.join(", "))?;
                }
                writeln!(f, "id: {}  score: {}", doc.id, format_score(doc.score))?;
                if let Some(url) = doc.url.as_deref().filter(|u| !u.is_empty()) {
                    writeln!(f, "{}", url)?;
                }
                writeln!(f)?;
                if doc.text.is_empty() {
                    writeln!(f, "{}", NO_CONTENT)
                } else {
                    writeln!(f, "{}", doc.text)
                }
            }
        }
    }
}

/// One-line connection status banner
pub fn connection_banner(monitor: &ConnectionMonitor) -> String {
    match monitor.status() {
        ConnectionStatus::Checking => "Checking connection to the search API...".to_string(),
        ConnectionStatus::Connected => match monitor.stats() {
            Some(stats) => connected_line(stats),
            None => "Connected".to_string(),
        },
        ConnectionStatus::Error => format!(
            "{} Type :retry to try again.",
            monitor.error().unwrap_or("Unable to connect to the search API.")
        ),
    }
}

fn connected_line(stats: &Stats) -> String {
    let mut line = format!(
        "Connected · {} documents · {} terms",
        stats.document_count, stats.vocabulary_size
    );
    if !stats.available_k_values.is_empty() {
        let ks: Vec<String> = stats.available_k_values.iter().map(u32::to_string).collect();
        line.push_str(&format!(" · k ∈ {{{}}}", ks.join(", ")));
    }
    line
}
