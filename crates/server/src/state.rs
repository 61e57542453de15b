// crates/server/src/state.rs
//! Application state for the Axum server.

use crate::config::Config;
use chat_analytics_core::{ConversationData, DashboardCharts};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// The analysis of the most recent upload.
#[derive(Debug, Clone)]
pub struct UploadedReport {
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub data: ConversationData,
    pub charts: DashboardCharts,
}

impl UploadedReport {
    pub fn new(filename: impl Into<String>, data: ConversationData) -> Self {
        let charts = DashboardCharts::from_data(&data);
        Self {
            filename: filename.into(),
            uploaded_at: Utc::now(),
            data,
            charts,
        }
    }
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    pub config: Config,
    /// `None` until the first upload and after the report is cleared.
    /// Each upload replaces the report wholesale.
    report: RwLock<Option<Arc<UploadedReport>>>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            config,
            report: RwLock::new(None),
        })
    }

    /// Get uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub async fn current_report(&self) -> Option<Arc<UploadedReport>> {
        self.report.read().await.clone()
    }

    pub async fn set_report(&self, report: UploadedReport) -> Arc<UploadedReport> {
        let report = Arc::new(report);
        *self.report.write().await = Some(report.clone());
        report
    }

    /// Drop the current report. Returns whether one was loaded.
    pub async fn clear_report(&self) -> bool {
        self.report.write().await.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_lifecycle() {
        let state = AppState::new(Config::default());
        assert!(state.current_report().await.is_none());

        state
            .set_report(UploadedReport::new("conversations.json", ConversationData::default()))
            .await;
        let report = state.current_report().await.unwrap();
        assert_eq!(report.filename, "conversations.json");
        assert_eq!(report.charts.summary.total_conversations, 0);

        assert!(state.clear_report().await);
        assert!(!state.clear_report().await);
        assert!(state.current_report().await.is_none());
    }

    #[test]
    fn test_uptime_starts_near_zero() {
        let state = AppState::new(Config::default());
        assert!(state.uptime_secs() < 5);
    }
}
