pub mod dispatcher;
pub mod engine;
pub mod exporter;
pub mod normalizer;
pub mod pipeline;
pub mod rate_limit;
pub mod worker;

pub use crate::domain::model::{
    BatchOutcome, BatchSummary, EnrichmentOutcome, LeadRecord, LeadStatus, RawLead,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
