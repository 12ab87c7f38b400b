use crate::core::dispatcher::Dispatcher;
use crate::core::exporter::Exporter;
use crate::core::normalizer;
use crate::domain::model::{BatchOutcome, NormalizedBatch};
use crate::domain::ports::{ConfigProvider, Enricher, LeadSource, Pipeline, Storage};
use crate::utils::error::Result;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// The full lead workflow: scrape raw records, normalize/dedup them,
/// fan out to enrichment workers, export whatever was collected.
pub struct LeadPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: Arc<dyn LeadSource>,
    worker: Arc<dyn Enricher>,
    dispatcher: Dispatcher,
    exporter: Exporter,
}

impl<S: Storage, C: ConfigProvider> LeadPipeline<S, C> {
    pub fn new(
        storage: S,
        config: C,
        source: Arc<dyn LeadSource>,
        worker: Arc<dyn Enricher>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        let dispatcher = Dispatcher::new(config.concurrency(), cancel);
        let exporter = Exporter::new(config.archive());
        Self {
            storage,
            config,
            source,
            worker,
            dispatcher,
            exporter,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LeadPipeline<S, C> {
    async fn extract(&self) -> Result<NormalizedBatch> {
        tracing::info!(
            query = self.config.search_query(),
            location = self.config.location(),
            max = self.config.max_records(),
            "🔎 fetching raw leads"
        );

        let raw = self
            .source
            .fetch_leads(
                self.config.search_query(),
                self.config.location(),
                self.config.max_records(),
            )
            .await?;

        let raw_count = raw.len();
        let batch = normalizer::normalize(raw);
        tracing::info!(
            raw = raw_count,
            kept = batch.records.len(),
            dropped = batch.dropped,
            duplicates = batch.duplicates,
            "normalized scrape output"
        );

        Ok(batch)
    }

    async fn enrich(&self, batch: NormalizedBatch) -> Result<BatchOutcome> {
        let dropped = batch.dropped;
        let mut outcome = self.dispatcher.run(batch.records, self.worker.clone()).await;
        // Data-quality drops happen before dispatch but belong in the
        // final summary.
        outcome.summary.dropped = dropped;
        Ok(outcome)
    }

    async fn load(&self, outcome: &BatchOutcome) -> Result<String> {
        self.exporter
            .export(&self.storage, outcome, self.config.output_path())
            .await
    }
}
