use crate::document::Document;

/// Payload carried into the document view
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRoute {
    pub id: String,
    pub preloaded: Option<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Search,
    Document(DocumentRoute),
}

/// Stack of visited views; the search view is always at the bottom
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Vec<View>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            history: vec![View::Search],
        }
    }

    pub fn current(&self) -> &View {
        // history is never empty
        &self.history[self.history.len() - 1]
    }

    /// Open a document, handing over the matching result when there is one
    pub fn go_to_document(&mut self, id: &str, results: &[Document]) -> DocumentRoute {
        let preloaded = results.iter().find(|d| d.id == id).cloned();
        tracing::debug!(
            "Navigating to document {} ({})",
            id,
            if preloaded.is_some() { "preloaded" } else { "fetch" }
        );
        let route = DocumentRoute {
            id: id.to_string(),
            preloaded,
        };
        self.history.push(View::Document(route.clone()));
        route
    }

    /// Return to the previous view. Returns `false` when already at the search view.
    pub fn go_back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hand_off_from_results() {
        let results = vec![Document::new("1", "a", "x"), Document::new("2", "b", "y")];
        let mut nav = Navigator::new();
        assert_eq!(nav.current(), &View::Search);

        let route = nav.go_to_document("2", &results);
        assert_eq!(route.preloaded.as_ref().map(|d| d.title.as_str()), Some("b"));

        assert!(nav.go_back());
        assert_eq!(nav.current(), &View::Search);
        assert!(!nav.go_back());
    }

    #[test]
    fn test_unknown_id_has_no_payload() {
        let mut nav = Navigator::new();
        let route = nav.go_to_document("99", &[]);
        assert_eq!(route.id, "99");
        assert!(route.preloaded.is_none());
    }
}
