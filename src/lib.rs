// Re-export main components
pub mod api;
pub mod controller;
pub mod document;
pub mod error;
pub mod monitor;
pub mod navigator;
pub mod render;
pub mod request;
pub mod session;
pub mod viewer;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use api::{ApiClient, SearchApi};
pub use controller::{SearchController, SearchState};
pub use document::{Document, Stats};
pub use monitor::{ConnectionMonitor, ConnectionStatus};
pub use navigator::{DocumentRoute, Navigator, View};
pub use render::ResultsView;
pub use request::{Ranking, RankingMethod, ResultLimit, SearchOptions, SearchRequest};
pub use session::{Command, Flow, Session};
pub use viewer::{DocumentState, DocumentViewer};

// Re-export error types
pub use error::{ClientError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
