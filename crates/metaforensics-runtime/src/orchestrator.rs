//! Runtime orchestrator for bounded, fault-isolated analysis.
//!
//! The orchestrator wraps a shared `Analyzer` and implements:
//! - Execution on tokio's blocking pool, one task per record
//! - A wall-clock timeout per record, substituting `AnalysisReport::timed_out()`
//! - Panic isolation, substituting `AnalysisReport::failed(..)`
//! - Bounded fan-out for batches with order-preserving fan-in

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::task::JoinError;

use metaforensics_core::{current_instant, AnalysisReport, Analyzer, MetadataRecord};

use crate::batch::{BatchReport, FileAnalysis, NamedRecord};
use crate::config::RuntimeConfig;

/// Runs analyses under the configured time and concurrency limits.
#[derive(Clone)]
pub struct ForensicRuntime {
    analyzer: Arc<Analyzer>,
    config: RuntimeConfig,
}

impl ForensicRuntime {
    /// A runtime with the default analyzer.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_analyzer(Analyzer::default(), config)
    }

    pub fn with_analyzer(analyzer: Analyzer, config: RuntimeConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Analyze one record.
    ///
    /// Never fails: a timeout or a fault is reported as a terminal report
    /// with status `error`. A timed-out analysis keeps running on the
    /// blocking pool, but its result is discarded.
    pub async fn analyze(&self, record: MetadataRecord) -> AnalysisReport {
        let analyzer = Arc::clone(&self.analyzer);
        let now = self.config.frozen_now.unwrap_or_else(current_instant);
        let timeout = self.config.analysis_timeout;

        let task = tokio::task::spawn_blocking(move || analyzer.analyze_at(&record, now));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Analysis task failed");
                AnalysisReport::failed(describe_join_error(&e))
            }
            Err(_) => {
                tracing::warn!(timeout = ?timeout, "Analysis timed out");
                AnalysisReport::timed_out()
            }
        }
    }

    /// Analyze several records concurrently.
    ///
    /// At most `max_concurrency` analyses are in flight; results keep the
    /// input order. Every record yields a result, since per-record faults
    /// are already substituted by `analyze`.
    pub async fn analyze_batch(&self, records: Vec<NamedRecord>) -> BatchReport {
        let mut batch = BatchReport::new();
        self.extend_batch(&mut batch, records).await;
        batch
    }

    /// Analyze records into an existing batch, e.g. one that already
    /// holds load failures.
    pub async fn extend_batch(&self, batch: &mut BatchReport, records: Vec<NamedRecord>) {
        let limit = self.config.max_concurrency.max(1);

        let analyses: Vec<FileAnalysis> = stream::iter(records)
            .map(|named| async move {
                let report = self.analyze(named.record.clone()).await;
                FileAnalysis::new(named.filename, &named.record, report)
            })
            .buffered(limit)
            .collect()
            .await;

        for analysis in analyses {
            batch.record_success(analysis);
        }

        tracing::info!(
            total_files = batch.total_files,
            successful = batch.successful,
            failed = batch.failed,
            "Batch analyzed"
        );
    }
}

impl Default for ForensicRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

fn describe_join_error(e: &JoinError) -> String {
    if e.is_panic() {
        "analysis panicked".to_string()
    } else {
        "analysis was cancelled".to_string()
    }
}
