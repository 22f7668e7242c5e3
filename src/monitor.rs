use crate::api::SearchApi;
use crate::document::Stats;
use crate::error::Result;

/// Health of the link to the remote engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Checking,
    Connected,
    Error,
}

/// Tracks whether the API is reachable and keeps the last stats it reported
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    status: ConnectionStatus,
    stats: Option<Stats>,
    error: Option<String>,
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Checking,
            stats: None,
            error: None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Search and detail controls are enabled only while connected
    pub fn controls_enabled(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// Probe `GET /stats`. Used at startup and for user-initiated retries.
    pub async fn check_connection<A: SearchApi + ?Sized>(&mut self, api: &A) -> ConnectionStatus {
        self.begin_check();
        let outcome = api.stats().await;
        self.finish_check(api.base_url(), outcome)
    }

    /// Enter `Checking`; controls stay disabled until `finish_check`
    pub fn begin_check(&mut self) {
        tracing::debug!("Checking API connection");
        self.status = ConnectionStatus::Checking;
    }

    /// Settle the check started by `begin_check` with the `/stats` outcome
    pub fn finish_check(&mut self, base_url: &str, outcome: Result<Stats>) -> ConnectionStatus {
        match outcome {
            Ok(stats) => {
                tracing::info!(
                    "Connected: {} documents, {} terms",
                    stats.document_count,
                    stats.vocabulary_size
                );
                self.stats = Some(stats);
                self.error = None;
                self.status = ConnectionStatus::Connected;
            }
            Err(e) => {
                tracing::warn!("Connection check failed: {}", e.reason());
                self.error = Some(format!(
                    "Unable to connect to the search API at {}. Make sure the server is running.",
                    base_url
                ));
                self.status = ConnectionStatus::Error;
            }
        }
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::render::connection_banner;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_successful_check() {
        let api = FakeApi::new().with_stats(Stats {
            document_count: 3,
            vocabulary_size: 40,
            available_k_values: vec![10, 25],
        });
        let mut monitor = ConnectionMonitor::new();
        assert_eq!(monitor.status(), ConnectionStatus::Checking);
        assert!(!monitor.controls_enabled());

        assert_eq!(monitor.check_connection(&api).await, ConnectionStatus::Connected);
        assert!(monitor.controls_enabled());
        assert_eq!(monitor.stats().map(|s| s.document_count), Some(3));
        assert!(monitor.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_check_then_retry() {
        let api = FakeApi::new();
        let mut monitor = ConnectionMonitor::new();

        assert_eq!(monitor.check_connection(&api).await, ConnectionStatus::Error);
        assert!(!monitor.controls_enabled());
        assert!(monitor.error().unwrap().contains(api.base_url()));
        assert!(monitor.stats().is_none());

        let api = api.with_stats(Stats {
            document_count: 1,
            vocabulary_size: 1,
            available_k_values: Vec::new(),
        });
        assert_eq!(monitor.check_connection(&api).await, ConnectionStatus::Connected);
        assert!(monitor.controls_enabled());
        assert!(monitor.error().is_none());
        assert_eq!(api.stats_calls(), 2);
    }

    #[test]
    fn test_retry_passes_through_checking() {
        let mut monitor = ConnectionMonitor::new();
        let base_url = "http://127.0.0.1:8080";

        let refused = ClientError::Connectivity("connection refused".into());
        assert_eq!(monitor.finish_check(base_url, Err(refused)), ConnectionStatus::Error);
        assert!(connection_banner(&monitor).ends_with("Type :retry to try again."));

        monitor.begin_check();
        assert_eq!(monitor.status(), ConnectionStatus::Checking);
        assert!(!monitor.controls_enabled());
        assert_eq!(
            connection_banner(&monitor),
            "Checking connection to the search API..."
        );

        let stats = Stats {
            document_count: 2,
            vocabulary_size: 20,
            available_k_values: Vec::new(),
        };
        assert_eq!(
            monitor.finish_check(base_url, Ok(stats)),
            ConnectionStatus::Connected
        );
        assert!(monitor.controls_enabled());
        assert!(monitor.error().is_none());
        assert_eq!(connection_banner(&monitor), "Connected · 2 documents · 20 terms");
    }

    #[tokio::test]
    async fn test_failure_keeps_last_known_stats() {
        let stats = Stats {
            document_count: 9,
            vocabulary_size: 90,
            available_k_values: Vec::new(),
        };
        let mut monitor = ConnectionMonitor::new();
        monitor.check_connection(&FakeApi::new().with_stats(stats.clone())).await;
        monitor.check_connection(&FakeApi::new()).await;

        assert_eq!(monitor.status(), ConnectionStatus::Error);
        assert_eq!(monitor.stats(), Some(&stats));
    }
}
