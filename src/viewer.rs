use crate::api::SearchApi;
use crate::document::Document;
use crate::error::ClientError;

/// Terminal and transient states of the document detail view
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentState {
    Loading,
    Loaded(Document),
    NotFound(String),
    Failed(String),
}

impl DocumentState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, DocumentState::Loading)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentViewer {
    id: String,
    state: DocumentState,
}

impl DocumentViewer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DocumentState::Loading,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Resolve the document, using `inline` when a search already fetched it.
    /// Only fetches when nothing was handed over.
    pub async fn load_document<A: SearchApi + ?Sized>(
        &mut self,
        api: &A,
        inline: Option<Document>,
    ) -> &DocumentState {
        if let Some(doc) = inline {
            tracing::debug!("Using preloaded document {}", self.id);
            self.state = DocumentState::Loaded(doc);
            return &self.state;
        }

        self.state = DocumentState::Loading;
        self.state = match api.document(&self.id).await {
            Ok(doc) => DocumentState::Loaded(doc),
            Err(ClientError::NotFound(id)) => {
                tracing::info!("Document {} not found", id);
                DocumentState::NotFound(id)
            }
            Err(e) => {
                tracing::warn!("Failed to load document {}: {}", self.id, e.reason());
                DocumentState::Failed(e.reason())
            }
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_inline_document_skips_fetch() {
        let api = FakeApi::connected();
        let doc = Document::new("4", "Inline", "text").with_score(0.4);
        let mut viewer = DocumentViewer::new("4");

        let state = viewer.load_document(&api, Some(doc.clone())).await;
        assert_eq!(state, &DocumentState::Loaded(doc));
        assert!(api.document_requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetches_when_not_supplied() {
        let api = FakeApi::connected().with_document(Document::new("8", "Fetched", "body"));
        let mut viewer = DocumentViewer::new("8");
        assert!(!viewer.state().is_settled());

        let state = viewer.load_document(&api, None).await.clone();
        assert!(matches!(state, DocumentState::Loaded(ref d) if d.title == "Fetched"));
        assert_eq!(api.document_requests(), ["8"]);
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let api = FakeApi::connected();
        let mut viewer = DocumentViewer::new("404");
        let state = viewer.load_document(&api, None).await;
        assert_eq!(state, &DocumentState::NotFound("404".to_string()));
        assert!(state.is_settled());
    }

    #[tokio::test]
    async fn test_load_failure_is_distinct_from_not_found() {
        let api = FakeApi::connected().with_document_error(ClientError::Http {
            status: 503,
            body: String::new(),
        });
        let mut viewer = DocumentViewer::new("1");
        let state = viewer.load_document(&api, None).await;
        assert_eq!(state, &DocumentState::Failed("HTTP 503".to_string()));
    }
}
