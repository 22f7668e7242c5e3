use crate::api::SearchApi;
use crate::controller::{SearchController, SearchState};
use crate::monitor::{ConnectionMonitor, ConnectionStatus};
use crate::navigator::{Navigator, View};
use crate::render::{self, DocumentView, ResultsView};
use crate::request::{Ranking, RankingMethod, ResultLimit, SearchOptions};
use crate::viewer::DocumentViewer;
use std::fmt::Write as _;

/// Rank parameter used when a reduced-rank method is picked without one
pub const DEFAULT_K: u32 = 25;

pub const HELP: &str = "\
Type a query to search, or one of:
  :open #<n>|<id>   open result n (1-based) or a document id
  :back             return to the results
  :retry            re-check the API connection
  :limit <n>        results per search (5, 10, 20, 50)
  :method <name>    ranking method (tfidf, svd, low-rank)
  :k <n>            rank parameter for svd / low-rank
  :stats            show index statistics
  :help             show this help
  :quit             leave";

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Open(String),
    Back,
    Retry,
    Limit(String),
    Method(String),
    K(String),
    Stats,
    Help,
    Quit,
}

impl Command {
    /// `None` for a blank line
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Some(Command::Search(line.to_string())));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let needs_arg = |cmd: fn(String) -> Command| {
            if arg.is_empty() {
                Err(format!(":{} needs an argument", name))
            } else {
                Ok(Some(cmd(arg.to_string())))
            }
        };

        match name {
            "open" | "o" => needs_arg(Command::Open),
            "back" | "b" => Ok(Some(Command::Back)),
            "retry" | "r" => Ok(Some(Command::Retry)),
            "limit" => needs_arg(Command::Limit),
            "method" => needs_arg(Command::Method),
            "k" => needs_arg(Command::K),
            "stats" => Ok(Some(Command::Stats)),
            "help" | "h" | "?" => Ok(Some(Command::Help)),
            "quit" | "q" | "exit" => Ok(Some(Command::Quit)),
            other => Err(format!("Unknown command ':{}'. Type :help for a list.", other)),
        }
    }

    /// Whether running this command may wait on the network
    pub fn is_remote(&self) -> bool {
        matches!(self, Command::Search(_) | Command::Open(_) | Command::Retry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Wires the monitor, controller, navigator and viewer to one API
pub struct Session<A> {
    api: A,
    monitor: ConnectionMonitor,
    controller: SearchController,
    navigator: Navigator,
    // one viewer per document view on the navigator stack
    viewers: Vec<DocumentViewer>,
    limit: ResultLimit,
    method: Option<RankingMethod>,
    k: Option<u32>,
    notice: Option<String>,
}

impl<A: SearchApi> Session<A> {
    pub fn new(api: A, options: SearchOptions) -> Self {
        Self {
            api,
            monitor: ConnectionMonitor::new(),
            controller: SearchController::new(options),
            navigator: Navigator::new(),
            viewers: Vec::new(),
            limit: options.limit,
            method: options.ranking.map(|r| r.method()),
            k: options.ranking.and_then(|r| r.k()),
            notice: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    pub fn search_state(&self) -> &SearchState {
        self.controller.state()
    }

    pub fn view(&self) -> &View {
        self.navigator.current()
    }

    /// Viewer of the document view currently shown, if any
    pub fn viewer(&self) -> Option<&DocumentViewer> {
        match self.navigator.current() {
            View::Document(_) => self.viewers.last(),
            View::Search => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Initial connection probe
    pub async fn start(&mut self) -> ConnectionStatus {
        self.monitor.check_connection(&self.api).await
    }

    pub async fn handle(&mut self, command: Command) -> Flow {
        self.notice = None;
        match command {
            Command::Search(query) => self.search(&query).await,
            Command::Open(selector) => self.open(&selector).await,
            Command::Back => self.back(),
            Command::Retry => {
                self.monitor.check_connection(&self.api).await;
            }
            Command::Limit(arg) => self.set_limit(&arg),
            Command::Method(arg) => self.set_method(&arg),
            Command::K(arg) => self.set_k(&arg),
            Command::Stats => self.notice = Some(render::connection_banner(&self.monitor)),
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn gated(&mut self) -> bool {
        if self.monitor.controls_enabled() {
            return false;
        }
        self.notice = Some("Not connected to the search API. Type :retry first.".to_string());
        true
    }

    /// Current options, validated into a request payload
    pub fn options(&self) -> Result<SearchOptions, String> {
        let mut options = SearchOptions::default().with_limit(self.limit);
        if let Some(method) = self.method {
            let ranking = Ranking::new(method, self.k).map_err(|e| e.reason())?;
            options = options.with_ranking(ranking);
        }
        Ok(options)
    }

    pub async fn search(&mut self, query: &str) {
        if self.gated() {
            return;
        }
        let options = match self.options() {
            Ok(options) => options,
            Err(err) => {
                self.notice = Some(err);
                return;
            }
        };
        if self
            .controller
            .submit_search(&self.api, query, options)
            .await
        {
            // a new search always lands on the results view
            while self.navigator.go_back() {}
            self.viewers.clear();
        }
    }

    /// Open a result by position (`#n`, 1-based) or by document id
    pub async fn open(&mut self, selector: &str) {
        if self.gated() {
            return;
        }
        let results = &self.controller.state().results;
        let id = match selector.strip_prefix('#') {
            Some(pos) => match pos.trim().parse::<usize>() {
                Ok(n) if (1..=results.len()).contains(&n) => results[n - 1].id.clone(),
                _ => {
                    self.notice = Some(format!(
                        "No result at position {} ({} shown).",
                        pos.trim(),
                        results.len()
                    ));
                    return;
                }
            },
            None => selector.to_string(),
        };

        let route = self.navigator.go_to_document(&id, results);
        let mut viewer = DocumentViewer::new(route.id);
        viewer.load_document(&self.api, route.preloaded).await;
        self.viewers.push(viewer);
    }

    pub fn back(&mut self) {
        if self.navigator.go_back() {
            self.viewers.pop();
        } else {
            self.notice = Some("Already at the search results.".to_string());
        }
    }

    fn set_limit(&mut self, arg: &str) {
        let parsed = arg
            .parse::<u32>()
            .map_err(|_| format!("'{}' is not a number", arg))
            .and_then(|n| ResultLimit::try_from(n).map_err(|e| e.reason()));
        self.notice = Some(match parsed {
            Ok(limit) => {
                self.limit = limit;
                format!("Showing up to {} results per search.", limit)
            }
            Err(err) => err,
        });
    }

    fn set_method(&mut self, arg: &str) {
        let method = match arg.parse::<RankingMethod>() {
            Ok(method) => method,
            Err(e) => {
                self.notice = Some(e.reason());
                return;
            }
        };
        if method.requires_k() && self.k.is_none() {
            let k = self
                .monitor
                .stats()
                .and_then(|s| s.available_k_values.first().copied())
                .unwrap_or(DEFAULT_K);
            self.k = Some(k);
        }
        self.method = Some(method);
        self.notice = Some(match (method.requires_k(), self.k) {
            (true, Some(k)) => format!("Ranking with {} (k = {}).", method, k),
            _ => format!("Ranking with {}.", method),
        });
    }

    fn set_k(&mut self, arg: &str) {
        let k = match arg.parse::<u32>() {
            Ok(k) if k > 0 => k,
            _ => {
                self.notice = Some(format!("'{}' is not a valid rank parameter", arg));
                return;
            }
        };
        if let Some(stats) = self.monitor.stats() {
            if !stats.supports_k(k) {
                let ks: Vec<String> = stats.available_k_values.iter().map(u32::to_string).collect();
                self.notice = Some(format!(
                    "The engine does not offer k = {}. Available: {}",
                    k,
                    ks.join(", ")
                ));
                return;
            }
        }
        self.k = Some(k);
        self.notice = Some(format!("Rank parameter set to k = {}.", k));
    }

    /// Banner, current view and any pending notice
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", render::connection_banner(&self.monitor));
        match (self.navigator.current(), self.viewer()) {
            (View::Document(_), Some(viewer)) => {
                let _ = writeln!(out);
                let _ = write!(out, "{}", DocumentView(viewer.state()));
            }
            _ => {
                let view = ResultsView::project(self.controller.state());
                if view != ResultsView::Idle {
                    let _ = writeln!(out);
                    let _ = write!(out, "{}", view);
                }
            }
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", notice);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::testing::FakeApi;
    use crate::viewer::DocumentState;

    fn results() -> Vec<Document> {
        vec![
            Document::new("11", "Indexing", "a").with_score(0.91),
            Document::new("12", "Retrieval", "b").with_score(0.77),
            Document::new("13", "Ranking", "c").with_score(0.52),
        ]
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(
            Command::parse("latent semantic"),
            Ok(Some(Command::Search("latent semantic".into())))
        );
        assert_eq!(Command::parse(":open #2"), Ok(Some(Command::Open("#2".into()))));
        assert_eq!(Command::parse(":q"), Ok(Some(Command::Quit)));
        assert!(Command::parse(":open").is_err());
        assert!(Command::parse(":frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_controls_gated_until_connected() {
        let mut session = Session::new(FakeApi::new(), SearchOptions::default());
        assert_eq!(session.start().await, ConnectionStatus::Error);

        session.handle(Command::Search("cats".into())).await;
        assert!(session.api().searches().is_empty());
        assert!(session.notice().unwrap().contains(":retry"));
        assert!(session.render().contains("Unable to connect"));
    }

    #[tokio::test]
    async fn test_open_from_results_skips_fetch() {
        let api = FakeApi::connected().with_results(results());
        let mut session = Session::new(api, SearchOptions::default());
        session.start().await;

        session.handle(Command::Search("information retrieval".into())).await;
        session.handle(Command::Open("#2".into())).await;

        assert!(session.api().document_requests().is_empty());
        let state = session.viewer().unwrap().state();
        assert!(matches!(state, DocumentState::Loaded(d) if d.id == "12"));
        assert!(session.render().contains("Retrieval"));

        session.handle(Command::Back).await;
        assert_eq!(session.view(), &View::Search);
        assert!(session.viewer().is_none());
        assert_eq!(session.search_state().results.len(), 3);
        assert_eq!(session.api().searches().len(), 1);
    }

    #[tokio::test]
    async fn test_open_unknown_id_fetches_once() {
        let api = FakeApi::connected()
            .with_results(results())
            .with_document(Document::new("77", "Elsewhere", "z"));
        let mut session = Session::new(api, SearchOptions::default());
        session.start().await;
        session.handle(Command::Search("retrieval".into())).await;

        session.handle(Command::Open("77".into())).await;
        assert_eq!(session.api().document_requests(), ["77"]);
        assert!(session.render().contains("Elsewhere"));
    }

    #[tokio::test]
    async fn test_back_between_documents_restores_previous_one() {
        let api = FakeApi::connected().with_results(results());
        let mut session = Session::new(api, SearchOptions::default());
        session.start().await;
        session.handle(Command::Search("retrieval".into())).await;

        session.handle(Command::Open("#1".into())).await;
        session.handle(Command::Open("#2".into())).await;
        assert_eq!(session.viewer().map(|v| v.id()), Some("12"));

        session.handle(Command::Back).await;
        let View::Document(route) = session.view() else {
            panic!("expected a document view");
        };
        assert_eq!(route.id, "11");
        assert_eq!(session.viewer().map(|v| v.id()), Some("11"));
        let rendered = session.render();
        assert!(rendered.contains("Indexing"));
        assert!(!rendered.contains("Retrieval"));

        session.handle(Command::Back).await;
        assert_eq!(session.view(), &View::Search);
        assert!(session.viewer().is_none());
        assert!(session.api().document_requests().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_id_is_not_a_position() {
        let api = FakeApi::connected()
            .with_results(results())
            .with_document(Document::new("2", "Second by id", "z"));
        let mut session = Session::new(api, SearchOptions::default());
        session.start().await;
        session.handle(Command::Search("retrieval".into())).await;

        session.handle(Command::Open("2".into())).await;
        assert_eq!(session.api().document_requests(), ["2"]);
        assert!(session.render().contains("Second by id"));

        session.handle(Command::Back).await;
        session.handle(Command::Open("#9".into())).await;
        assert_eq!(session.view(), &View::Search);
        assert_eq!(session.notice(), Some("No result at position 9 (3 shown)."));
    }

    #[tokio::test]
    async fn test_ranking_options_flow_into_request() {
        let mut session = Session::new(FakeApi::connected(), SearchOptions::default());
        session.start().await;

        session.handle(Command::Method("svd".into())).await;
        assert_eq!(session.notice(), Some("Ranking with svd (k = 10)."));
        session.handle(Command::K("30".into())).await;
        assert!(session.notice().unwrap().contains("does not offer k = 30"));
        session.handle(Command::K("50".into())).await;
        session.handle(Command::Limit("20".into())).await;
        session.handle(Command::Search("topics".into())).await;

        let sent = session.api().searches();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].options().limit, ResultLimit::Twenty);
        assert_eq!(sent[0].options().ranking, Some(Ranking::Svd { k: 50 }));
    }

    #[tokio::test]
    async fn test_bad_limit_is_reported() {
        let mut session = Session::new(FakeApi::connected(), SearchOptions::default());
        session.handle(Command::Limit("7".into())).await;
        assert!(session.notice().unwrap().contains("5, 10, 20 or 50"));
        assert_eq!(session.options().unwrap().limit, ResultLimit::Ten);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut session = Session::new(FakeApi::connected(), SearchOptions::default());
        assert_eq!(session.handle(Command::Quit).await, Flow::Quit);
        assert_eq!(session.handle(Command::Help).await, Flow::Continue);
    }
}
