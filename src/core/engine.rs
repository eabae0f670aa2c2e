use crate::core::fallback::FallbackProvider;
use crate::core::pipeline::CauseListPipeline;
use crate::domain::model::{QueryParams, Record, ResultBundle};
use crate::domain::ports::{SessionProvider, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Wait for a person to fill the popup when auto-fill finds nothing.
    pub allow_manual_fill: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            allow_manual_fill: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    Live(ResultBundle),
    Fallback { pdf: PathBuf, records: Vec<Record> },
}

impl RunReport {
    pub fn records(&self) -> &[Record] {
        match self {
            RunReport::Live(bundle) => &bundle.records,
            RunReport::Fallback { records, .. } => records,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RunReport::Fallback { .. })
    }
}

/// One run end to end: session, pipeline, teardown, and the fallback list
/// when nothing was scraped.
pub struct CauseListEngine<P: SessionProvider, S: Storage> {
    sessions: P,
    pipeline: CauseListPipeline<S>,
    fallback: FallbackProvider<S>,
    monitor: SystemMonitor,
}

impl<P: SessionProvider, S: Storage> CauseListEngine<P, S> {
    pub fn new(sessions: P, pipeline: CauseListPipeline<S>, fallback: FallbackProvider<S>) -> Self {
        Self::new_with_monitoring(sessions, pipeline, fallback, false)
    }

    pub fn new_with_monitoring(
        sessions: P,
        pipeline: CauseListPipeline<S>,
        fallback: FallbackProvider<S>,
        enable_monitoring: bool,
    ) -> Self {
        Self {
            sessions,
            pipeline,
            fallback,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub async fn run(&self, query: &QueryParams, options: RunOptions) -> Result<RunReport> {
        tracing::info!(
            "🚀 Fetching cause list for {} / {} / {} on {}",
            query.state,
            query.district,
            query.court_complex,
            query.date
        );
        self.monitor.log_stats("Start");

        let session = self.sessions.acquire().await?;
        self.monitor.log_stats("Session acquired");

        let outcome = self
            .pipeline
            .run(&session, query, options.allow_manual_fill)
            .await;
        self.sessions.release(session).await;
        let bundle = outcome?;
        self.monitor.log_stats("Pipeline finished");

        let report = if bundle.records.is_empty() {
            tracing::warn!("⚠️  No data fetched; using fallback cause list");
            let (pdf, records) = self.fallback.fallback(&query.date).await?;
            RunReport::Fallback { pdf, records }
        } else {
            tracing::info!("✅ Cause list fetched: {} rows", bundle.records.len());
            RunReport::Live(bundle)
        };

        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }
        Ok(report)
    }
}
