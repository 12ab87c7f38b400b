use crate::domain::model::{BatchOutcome, BatchSummary};
use crate::domain::ports::Pipeline;
use crate::utils::error::{LeadError, Result};
use crate::utils::monitor::SystemMonitor;

/// What a finished (or interrupted) run produced.
#[derive(Debug)]
pub struct RunReport {
    pub output_path: String,
    pub summary: BatchSummary,
    pub interrupted: bool,
    pub fatal_error: Option<LeadError>,
}

/// Drives the three pipeline phases in order with progress logging and
/// optional resource monitoring.
pub struct PipelineEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PipelineEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("📥 Phase 1/3: scraping");
        let batch = self.pipeline.extract().await?;
        tracing::info!("Extracted {} candidate records", batch.records.len());
        self.monitor.log_stats("Scrape");

        tracing::info!("⚙️ Phase 2/3: enrichment");
        let outcome = self.pipeline.enrich(batch).await?;
        tracing::info!("Collected {} enrichment results", outcome.outcomes.len());
        self.monitor.log_stats("Enrichment");

        tracing::info!("📤 Phase 3/3: export");
        let output_path = self.pipeline.load(&outcome).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Export");

        let BatchOutcome {
            summary,
            interrupted,
            fatal_error,
            ..
        } = outcome;

        Ok(RunReport {
            output_path,
            summary,
            interrupted,
            fatal_error,
        })
    }
}
