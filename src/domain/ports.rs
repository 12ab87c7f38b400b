use crate::domain::model::{
    BatchOutcome, Candidate, EnrichmentOutcome, LeadRecord, NormalizedBatch, RawLead,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Scraper backend producing raw business records for a search.
#[async_trait]
pub trait LeadSource: Send + Sync {
    async fn fetch_leads(
        &self,
        query: &str,
        location: &str,
        max_records: usize,
    ) -> Result<Vec<RawLead>>;
}

/// Search-based decision-maker discovery. "Not found" is a normal
/// outcome, not an error.
#[async_trait]
pub trait DecisionMakerSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Option<Candidate>>;
}

/// Best-effort profile/description lookup for a found decision-maker.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn lookup(&self, name: &str, company: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait EmailFinder: Send + Sync {
    async fn find(&self, name: &str, domain: &str) -> Result<Option<String>>;
}

/// Generates the short-form outreach message for a lead.
#[async_trait]
pub trait CopyGenerator: Send + Sync {
    async fn generate(
        &self,
        lead: &LeadRecord,
        fields: &crate::domain::model::EnrichmentFields,
    ) -> Result<String>;
}

/// Seam between the dispatcher and the worker, so fan-out behavior can
/// be tested with synthetic workers.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, index: usize, record: LeadRecord) -> Result<EnrichmentOutcome>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn search_query(&self) -> &str;
    fn location(&self) -> &str;
    fn max_records(&self) -> usize;
    fn concurrency(&self) -> usize;
    fn min_delay(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn skip_email(&self) -> bool;
    fn skip_copy(&self) -> bool;
    fn archive(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<NormalizedBatch>;
    async fn enrich(&self, batch: NormalizedBatch) -> Result<BatchOutcome>;
    async fn load(&self, outcome: &BatchOutcome) -> Result<String>;
}
